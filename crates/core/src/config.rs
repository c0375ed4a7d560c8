//! Config file parsing for `~/.config/cover-extractor/config.toml`.
//!
//! The file is optional. Use `extract_options_from_config` and
//! `renderer_from_config` to apply it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::extract::ExtractOptions;
use crate::pdf::PdfiumRenderer;
use crate::security::SecurityLimits;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub dialogs: DialogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_scale")]
    pub scale: f32,
    /// Directory containing the PDFium shared library.
    pub pdfium_dir: Option<String>,
}

fn default_render_scale() -> f32 {
    1.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: default_render_scale(),
            pdfium_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub max_file_size_mb: Option<u64>,
    pub max_compression_ratio: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogConfig {
    /// Directory both pickers open in.
    pub start_dir: Option<String>,
}

/// Load config from the default path. Missing or malformed files give defaults.
pub fn load_config() -> AppConfig {
    let Some(path) = config_path() else {
        return AppConfig::default();
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return AppConfig::default(),
    };

    parse_config(&content).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
        AppConfig::default()
    })
}

pub fn parse_config(content: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Return the default config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("cover-extractor");
        p.push("config.toml");
        p
    })
}

/// Build security limits from config. Uses defaults for any unset values.
pub fn security_limits_from_config(c: &SecurityConfig) -> SecurityLimits {
    let mut limits = SecurityLimits::default();
    if let Some(mb) = c.max_file_size_mb {
        limits.max_resource_size_bytes = mb.saturating_mul(1024).saturating_mul(1024);
    }
    if let Some(r) = c.max_compression_ratio {
        limits.max_compression_ratio = r;
    }
    limits
}

pub fn extract_options_from_config(cfg: &AppConfig) -> ExtractOptions {
    ExtractOptions {
        security: security_limits_from_config(&cfg.security),
    }
}

pub fn renderer_from_config(cfg: &AppConfig) -> PdfiumRenderer {
    PdfiumRenderer::new(
        sanitize_scale(cfg.render.scale),
        cfg.render.pdfium_dir.as_ref().map(PathBuf::from),
    )
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        tracing::warn!("Render scale {} is not positive, using 1.0", scale);
        default_render_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(extract_options_from_config(&cfg), ExtractOptions::default());
    }

    #[test]
    fn test_partial_config() {
        let cfg = parse_config(
            r#"
[render]
pdfium_dir = "/opt/pdfium/lib"

[security]
max_file_size_mb = 5
"#,
        )
        .unwrap();

        assert_eq!(cfg.render.scale, 1.0);
        assert_eq!(cfg.dialogs.start_dir, None);

        let opts = extract_options_from_config(&cfg);
        assert_eq!(opts.security.max_resource_size_bytes, 5 * 1024 * 1024);
        assert_eq!(opts.security.max_compression_ratio, 100);

        let renderer = renderer_from_config(&cfg);
        assert_eq!(renderer.library_dir, Some(PathBuf::from("/opt/pdfium/lib")));
    }

    #[test]
    fn test_bad_scale_falls_back() {
        let cfg = parse_config("[render]\nscale = -2.0\n").unwrap();
        assert_eq!(renderer_from_config(&cfg).scale, 1.0);

        let cfg = parse_config("[render]\nscale = 2.5\n").unwrap();
        assert_eq!(renderer_from_config(&cfg).scale, 2.5);
    }

    #[test]
    fn test_malformed_config_errors() {
        assert!(parse_config("[render\nscale = ").is_err());
        assert!(parse_config("[render]\nscale = \"big\"\n").is_err());
    }

    #[test]
    fn test_config_path_location() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("cover-extractor/config.toml"));
        }
    }
}
