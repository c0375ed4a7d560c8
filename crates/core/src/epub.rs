//! EPUB reading, limited to what cover extraction needs: ZIP → container.xml →
//! OPF manifest → image items in declaration order → raw bytes.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use percent_encoding::percent_decode_str;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;

use crate::error::{ReadError, SecurityError};
use crate::security::{self, SecurityLimits};

/// One manifest item whose media type is an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestImage {
    pub id: String,
    /// Path inside the archive, already resolved against the OPF directory.
    pub path: String,
    pub media_type: String,
}

/// An opened EPUB container with its package document located.
pub struct EpubArchive<R> {
    archive: zip::ZipArchive<R>,
    opf_path: String,
    limits: SecurityLimits,
}

impl EpubArchive<BufReader<File>> {
    pub fn open(path: &Path, limits: &SecurityLimits) -> Result<Self, ReadError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), limits)
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    pub fn new(input: R, limits: &SecurityLimits) -> Result<Self, ReadError> {
        let mut archive = zip::ZipArchive::new(input)
            .map_err(|e| ReadError::Malformed(format!("Invalid ZIP archive: {e}")))?;

        security::check_file_count(archive.len() as u64, limits)?;

        if let Ok(mut enc_file) = archive.by_name("META-INF/encryption.xml") {
            let mut enc_xml = String::new();
            if enc_file.read_to_string(&mut enc_xml).is_ok() {
                security::check_epub_drm(&enc_xml)?;
            }
        }

        let opf_path = find_opf_path(&mut archive, limits)?;
        tracing::debug!("EPUB package document at {}", opf_path);

        Ok(Self {
            archive,
            opf_path,
            limits: limits.clone(),
        })
    }

    pub fn opf_path(&self) -> &str {
        &self.opf_path
    }

    /// All manifest items with an `image/*` media type, in manifest order.
    pub fn images(&mut self) -> Result<Vec<ManifestImage>, ReadError> {
        let opf = read_entry_string(&mut self.archive, &self.opf_path, &self.limits)?;
        let opf_dir = self
            .opf_path
            .rfind('/')
            .map(|i| &self.opf_path[..i + 1])
            .unwrap_or("");

        let mut images = Vec::new();
        for item in parse_manifest(&opf)? {
            if !is_image_media_type(&item.media_type) {
                continue;
            }
            images.push(ManifestImage {
                path: resolve_href(opf_dir, &item.href)?,
                id: item.id,
                media_type: item.media_type,
            });
        }
        Ok(images)
    }

    /// Raw bytes of a manifest image.
    pub fn read_image(&mut self, image: &ManifestImage) -> Result<Vec<u8>, ReadError> {
        read_entry_bytes(&mut self.archive, &image.path, &self.limits)
    }

    /// The first declared image with its bytes, or `None` when the manifest has no images.
    pub fn first_image(&mut self) -> Result<Option<(ManifestImage, Vec<u8>)>, ReadError> {
        let Some(image) = self.images()?.into_iter().next() else {
            return Ok(None);
        };
        let data = self.read_image(&image)?;
        Ok(Some((image, data)))
    }
}

fn is_image_media_type(media_type: &str) -> bool {
    media_type.trim().to_ascii_lowercase().starts_with("image/")
}

// --- Package parsing ---

#[derive(Debug)]
struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
}

fn find_opf_path<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    limits: &SecurityLimits,
) -> Result<String, ReadError> {
    let container = read_entry_string(archive, "META-INF/container.xml", limits)?;

    let mut reader = XmlReader::from_str(&container);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"rootfile" =>
            {
                if let Some(path) = attribute(e, b"full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ReadError::Malformed(format!(
                    "Failed to parse container.xml: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Err(ReadError::MissingContent(
        "No rootfile found in container.xml".into(),
    ))
}

fn parse_manifest(content: &str) -> Result<Vec<ManifestItem>, ReadError> {
    let mut reader = XmlReader::from_str(content);
    let mut buf = Vec::new();
    let mut items = Vec::new();
    let mut in_manifest = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"manifest" => {
                in_manifest = true;
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"manifest" => {
                in_manifest = false;
            }
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_manifest && e.local_name().as_ref() == b"item" =>
            {
                let href = attribute(e, b"href");
                let media_type = attribute(e, b"media-type");
                match (href, media_type) {
                    (Some(href), Some(media_type)) => items.push(ManifestItem {
                        id: attribute(e, b"id").unwrap_or_default(),
                        href,
                        media_type,
                    }),
                    _ => tracing::warn!("Skipping manifest item without href or media-type"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ReadError::Malformed(format!(
                    "Failed to parse package document: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| match a.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

/// Join a manifest href onto the OPF directory, folding `.` and `..` segments.
fn resolve_href(opf_dir: &str, href: &str) -> Result<String, SecurityError> {
    let href = href.find('#').map_or(href, |i| &href[..i]);
    let href = percent_decode_str(href).decode_utf8_lossy();
    let joined = format!("{opf_dir}{href}");

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(SecurityError::PathTraversal { path: joined.clone() });
                }
            }
            s => parts.push(s),
        }
    }

    let resolved = parts.join("/");
    security::check_path_traversal(&resolved)?;
    Ok(resolved)
}

// --- Archive helpers ---

fn read_entry_string<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    path: &str,
    limits: &SecurityLimits,
) -> Result<String, ReadError> {
    let bytes = read_entry_bytes(archive, path, limits)?;
    String::from_utf8(bytes)
        .map_err(|e| ReadError::Malformed(format!("Invalid UTF-8 in {path}: {e}")))
}

fn read_entry_bytes<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    path: &str,
    limits: &SecurityLimits,
) -> Result<Vec<u8>, ReadError> {
    security::check_path_traversal(path)?;

    let mut file = archive
        .by_name(path)
        .map_err(|_| ReadError::MissingContent(format!("Missing file: {path}")))?;

    security::check_resource_size(path, file.size(), limits)?;
    security::check_compression_ratio(file.compressed_size(), file.size(), limits)?;

    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)
        .map_err(|e| ReadError::Malformed(format!("Failed to read {path}: {e}")))?;
    Ok(buf)
}
