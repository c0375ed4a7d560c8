//! Fixture builders shared by unit tests.

use std::io::{Cursor, Write};
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

/// Encode a solid-colour PNG.
pub(crate) fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(width, height, rgb, ImageFormat::Png)
}

/// Encode a solid-colour JPEG.
pub(crate) fn jpeg_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(width, height, rgb, ImageFormat::Jpeg)
}

/// Lossless WebP, the only kind the encoder writes.
pub(crate) fn webp_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(width, height, rgb, ImageFormat::WebP)
}

fn encode(width: u32, height: u32, rgb: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

struct Item {
    id: String,
    href: String,
    media_type: String,
}

/// Assembles a minimal EPUB archive in memory.
pub(crate) struct EpubBuilder {
    opf_path: String,
    items: Vec<Item>,
    files: Vec<(String, Vec<u8>)>,
    encryption_xml: Option<String>,
    container: bool,
}

impl EpubBuilder {
    pub(crate) fn new() -> Self {
        Self {
            opf_path: "OEBPS/content.opf".to_string(),
            items: Vec::new(),
            files: Vec::new(),
            encryption_xml: None,
            container: true,
        }
    }

    pub(crate) fn opf_path(mut self, path: &str) -> Self {
        self.opf_path = path.to_string();
        self
    }

    /// Declare a manifest item without adding archive content.
    pub(crate) fn item(mut self, id: &str, href: &str, media_type: &str) -> Self {
        self.items.push(Item {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
        });
        self
    }

    /// Add an archive entry without declaring it.
    pub(crate) fn file(mut self, path: &str, data: Vec<u8>) -> Self {
        self.files.push((path.to_string(), data));
        self
    }

    /// Declare a manifest item and store its content next to the OPF.
    pub(crate) fn image(self, id: &str, href: &str, media_type: &str, data: Vec<u8>) -> Self {
        let path = format!("{}{}", self.opf_dir(), href);
        self.item(id, href, media_type).file(&path, data)
    }

    pub(crate) fn encryption(mut self, xml: &str) -> Self {
        self.encryption_xml = Some(xml.to_string());
        self
    }

    pub(crate) fn without_container(mut self) -> Self {
        self.container = false;
        self
    }

    fn opf_dir(&self) -> &str {
        self.opf_path
            .rfind('/')
            .map(|i| &self.opf_path[..i + 1])
            .unwrap_or("")
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        if self.container {
            zip.start_file("META-INF/container.xml", deflated).unwrap();
            write!(
                zip,
                r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
                self.opf_path
            )
            .unwrap();
        }

        if let Some(xml) = &self.encryption_xml {
            zip.start_file("META-INF/encryption.xml", deflated).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        let mut manifest = String::new();
        for item in &self.items {
            manifest.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                item.id, item.href, item.media_type
            ));
        }
        zip.start_file(self.opf_path.as_str(), deflated).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:uuid:fixture</dc:identifier>
    <dc:title>Fixture</dc:title>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine/>
</package>"#
        )
        .unwrap();

        for (path, data) in &self.files {
            // Images are stored like most EPUB producers do.
            zip.start_file(path.as_str(), stored).unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    pub(crate) fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}
