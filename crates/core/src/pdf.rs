//! First-page rasterisation for PDFs.
//!
//! Rendering goes through [`PageRenderer`] so extraction can be exercised
//! without the PDFium shared library; [`PdfiumRenderer`] is the real thing.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;

use crate::error::{ExtractError, RenderError};

/// Renders page index 0 of a PDF.
pub trait PageRenderer {
    /// Returns [`ExtractError::NoPages`] for a document without pages.
    fn render_first_page(&self, path: &Path) -> Result<DynamicImage, ExtractError>;
}

/// PDFium-backed renderer. The library is bound on every call, so a missing
/// PDFium only affects PDF extraction.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    /// 1.0 renders one pixel per PDF point (72 dpi).
    pub scale: f32,
    /// Extra directory searched for the PDFium shared library.
    pub library_dir: Option<PathBuf>,
}

impl Default for PdfiumRenderer {
    fn default() -> Self {
        Self {
            scale: 1.0,
            library_dir: None,
        }
    }
}

impl PdfiumRenderer {
    pub fn new(scale: f32, library_dir: Option<PathBuf>) -> Self {
        Self { scale, library_dir }
    }

    /// Search the configured directory, then the working directory, then the
    /// system library paths.
    fn bind(&self) -> Result<Pdfium, RenderError> {
        let dirs = self
            .library_dir
            .as_deref()
            .into_iter()
            .chain(std::iter::once(Path::new("./")));

        for dir in dirs {
            match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)) {
                Ok(bindings) => return Ok(Pdfium::new(bindings)),
                Err(e) => tracing::debug!("No PDFium in {}: {:?}", dir.display(), e),
            }
        }

        Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| RenderError::Binding(format!("{e:?}")))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_first_page(&self, path: &Path) -> Result<DynamicImage, ExtractError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| RenderError::Open(format!("{e:?}")))?;

        let pages = document.pages();
        tracing::debug!("{} has {} page(s)", path.display(), pages.len());
        if pages.len() == 0 {
            return Err(ExtractError::NoPages);
        }

        let page = pages.get(0).map_err(|e| RenderError::Page {
            page: 0,
            detail: format!("{e:?}"),
        })?;

        let config = PdfRenderConfig::new().scale_page_by_factor(self.scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::Page {
                page: 0,
                detail: format!("{e:?}"),
            })?;

        let width = bitmap.width().max(0) as u32;
        let height = bitmap.height().max(0) as u32;
        let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or(RenderError::Bitmap { width, height })?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }
}
