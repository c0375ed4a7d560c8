//! Guards applied while reading EPUB archives: entry limits, path traversal,
//! decompression ratio and DRM detection.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::error::SecurityError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityLimits {
    /// Maximum decompression ratio before flagging as ZIP bomb.
    pub max_compression_ratio: u64,
    /// Maximum number of entries allowed in an archive.
    pub max_file_count: u64,
    /// Maximum size of a single resource in bytes.
    pub max_resource_size_bytes: u64,
}

impl Default for SecurityLimits {
    fn default() -> Self {
        Self {
            max_compression_ratio: 100,
            max_file_count: 10_000,
            max_resource_size_bytes: 200 * 1024 * 1024, // 200 MB
        }
    }
}

/// Reject absolute entry paths and any `..` component.
pub fn check_path_traversal(entry_path: &str) -> Result<(), SecurityError> {
    let traversal = || SecurityError::PathTraversal {
        path: entry_path.to_string(),
    };

    if entry_path.starts_with('/') || entry_path.starts_with('\\') {
        return Err(traversal());
    }

    // C:\ and friends
    if entry_path.len() >= 2 && entry_path.as_bytes()[1] == b':' {
        return Err(traversal());
    }

    if Path::new(entry_path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(traversal());
    }

    Ok(())
}

/// Check a decompression ratio against the configured limit (ZIP bomb detection).
pub fn check_compression_ratio(
    compressed_size: u64,
    uncompressed_size: u64,
    limits: &SecurityLimits,
) -> Result<(), SecurityError> {
    if compressed_size == 0 {
        if uncompressed_size > 0 {
            return Err(SecurityError::ZipBomb {
                ratio: u64::MAX,
                limit: limits.max_compression_ratio,
            });
        }
        return Ok(());
    }

    let ratio = uncompressed_size / compressed_size;
    if ratio > limits.max_compression_ratio {
        return Err(SecurityError::ZipBomb {
            ratio,
            limit: limits.max_compression_ratio,
        });
    }

    Ok(())
}

pub fn check_file_count(count: u64, limits: &SecurityLimits) -> Result<(), SecurityError> {
    if count > limits.max_file_count {
        return Err(SecurityError::TooManyFiles {
            count,
            limit: limits.max_file_count,
        });
    }
    Ok(())
}

pub fn check_resource_size(
    name: &str,
    size_bytes: u64,
    limits: &SecurityLimits,
) -> Result<(), SecurityError> {
    if size_bytes > limits.max_resource_size_bytes {
        return Err(SecurityError::OversizedResource {
            name: name.to_string(),
            size_mb: size_bytes / (1024 * 1024),
            limit_mb: limits.max_resource_size_bytes / (1024 * 1024),
        });
    }
    Ok(())
}

/// Inspect an EPUB's `META-INF/encryption.xml` for DRM schemes.
/// Font obfuscation is not DRM and passes.
pub fn check_epub_drm(encryption_xml: &str) -> Result<(), SecurityError> {
    let drm = |drm_type: &str| {
        Err(SecurityError::DrmProtected {
            drm_type: drm_type.to_string(),
        })
    };

    if encryption_xml.contains("http://ns.adobe.com/adept")
        || encryption_xml.contains("http://ns.adobe.com/digitaleditions")
    {
        return drm("Adobe DRM");
    }

    if encryption_xml.contains("http://www.apple.com/ibooks") || encryption_xml.contains("sinf")
    {
        return drm("Apple FairPlay");
    }

    if encryption_xml.contains("http://urms.org") {
        return drm("Sony URMS");
    }

    if encryption_xml.contains("EncryptedData") {
        let is_font_obfuscation = encryption_xml.contains("http://www.idpf.org/2008/embedding")
            || encryption_xml.contains("http://ns.adobe.com/pdf/enc#RC");
        if !is_font_obfuscation {
            return drm("Unknown DRM");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_safe_paths() {
        assert!(check_path_traversal("OEBPS/images/cover.jpg").is_ok());
        assert!(check_path_traversal("META-INF/container.xml").is_ok());
        assert!(check_path_traversal("cover.png").is_ok());
    }

    #[test]
    fn test_path_traversal_attacks() {
        assert!(check_path_traversal("../../../etc/passwd").is_err());
        assert!(check_path_traversal("OEBPS/../../etc/shadow").is_err());
        assert!(check_path_traversal("/etc/passwd").is_err());
        assert!(check_path_traversal("\\Windows\\System32\\config").is_err());
        assert!(check_path_traversal("C:\\Windows\\System32").is_err());
    }

    #[test]
    fn test_compression_ratio() {
        let limits = SecurityLimits::default();
        assert!(check_compression_ratio(1000, 50_000, &limits).is_ok()); // 50:1
        assert!(check_compression_ratio(100, 100_000, &limits).is_err()); // 1000:1
        assert!(check_compression_ratio(0, 0, &limits).is_ok());
        assert!(check_compression_ratio(0, 100, &limits).is_err());
    }

    #[test]
    fn test_file_count() {
        let limits = SecurityLimits::default();
        assert!(check_file_count(10_000, &limits).is_ok());
        assert!(matches!(
            check_file_count(10_001, &limits),
            Err(SecurityError::TooManyFiles { count: 10_001, .. })
        ));
    }

    #[test]
    fn test_resource_size_exceeded() {
        let limits = SecurityLimits {
            max_resource_size_bytes: 1024 * 1024,
            ..Default::default()
        };
        assert!(check_resource_size("cover.jpg", 1024, &limits).is_ok());
        let err = check_resource_size("cover.jpg", 3 * 1024 * 1024, &limits).unwrap_err();
        assert!(matches!(
            err,
            SecurityError::OversizedResource { size_mb: 3, limit_mb: 1, .. }
        ));
    }

    #[test]
    fn test_drm_detection() {
        let adobe = r#"<encryption><EncryptedData><EncryptionMethod Algorithm="http://ns.adobe.com/adept"/></EncryptedData></encryption>"#;
        assert!(check_epub_drm(adobe).is_err());

        let fonts = r#"<encryption><EncryptedData><EncryptionMethod Algorithm="http://www.idpf.org/2008/embedding"/></EncryptedData></encryption>"#;
        assert!(check_epub_drm(fonts).is_ok());

        let unknown = r#"<encryption><EncryptedData><EncryptionMethod Algorithm="urn:x-vendor"/></EncryptedData></encryption>"#;
        let err = check_epub_drm(unknown).unwrap_err();
        assert!(err.to_string().contains("Unknown DRM"));

        assert!(check_epub_drm("").is_ok());
    }
}
