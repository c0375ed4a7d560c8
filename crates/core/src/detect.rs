//! Book format detection: extension for dispatch, magic bytes as a sanity check.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The two formats a cover can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFormat {
    Pdf,
    Epub,
}

impl BookFormat {
    /// Format implied by the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<BookFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(BookFormat::Pdf),
            "epub" => Some(BookFormat::Epub),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "pdf",
            BookFormat::Epub => "epub",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "application/pdf",
            BookFormat::Epub => "application/epub+zip",
        }
    }
}

impl std::fmt::Display for BookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

const HEADER_SIZE: usize = 128;

/// Guess the format from the leading bytes of a file.
///
/// EPUB requires the `mimetype` entry to be stored first and uncompressed, so
/// its content sits at a fixed offset after the ZIP local header.
pub fn sniff(header: &[u8]) -> Option<BookFormat> {
    if header.starts_with(b"%PDF-") {
        return Some(BookFormat::Pdf);
    }

    if header.starts_with(b"PK\x03\x04") && header.len() >= 30 {
        let name_len = u16::from_le_bytes([header[26], header[27]]) as usize;
        let extra_len = u16::from_le_bytes([header[28], header[29]]) as usize;
        let name = header.get(30..30 + name_len)?;
        if name == b"mimetype" {
            let start = 30 + name_len + extra_len;
            let mime = BookFormat::Epub.mime_type().as_bytes();
            if header.get(start..start + mime.len()) == Some(mime) {
                return Some(BookFormat::Epub);
            }
        }
    }

    None
}

/// Read the head of a file and sniff it.
pub fn sniff_file(path: &Path) -> std::io::Result<Option<BookFormat>> {
    let mut header = Vec::with_capacity(HEADER_SIZE);
    File::open(path)?
        .take(HEADER_SIZE as u64)
        .read_to_end(&mut header)?;
    Ok(sniff(&header))
}
