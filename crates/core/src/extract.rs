//! Cover extraction: validate the selection, dispatch on format, write `<stem>_cover.png`.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::detect::{self, BookFormat};
use crate::epub::EpubArchive;
use crate::error::ExtractError;
use crate::pdf::PageRenderer;
use crate::security::SecurityLimits;

const COVER_SUFFIX: &str = "_cover";

/// Settings for the EPUB path. PDF settings live on the [`PageRenderer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub security: SecurityLimits,
}

/// A selection that passed every precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    pub input: PathBuf,
    pub format: BookFormat,
    pub output_dir: PathBuf,
}

/// Check the selection in order: input exists, input is PDF/EPUB, output dir chosen.
pub fn check_preconditions(
    input: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<ExtractRequest, ExtractError> {
    let input = input
        .filter(|p| p.exists())
        .ok_or(ExtractError::MissingInput)?;
    let format = BookFormat::from_path(input).ok_or(ExtractError::UnsupportedFormat)?;
    let output_dir = output_dir.ok_or(ExtractError::MissingOutputDir)?;

    Ok(ExtractRequest {
        input: input.to_path_buf(),
        format,
        output_dir: output_dir.to_path_buf(),
    })
}

/// `<output_dir>/<input stem>_cover.png`
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}{COVER_SUFFIX}.png"))
}

/// Run one extraction and return the path of the written PNG.
pub fn extract_cover(
    request: &ExtractRequest,
    renderer: &dyn PageRenderer,
    opts: &ExtractOptions,
) -> Result<PathBuf, ExtractError> {
    let output = output_path(&request.input, &request.output_dir);

    match detect::sniff_file(&request.input) {
        Ok(Some(sniffed)) if sniffed != request.format => tracing::warn!(
            "{} has a .{} extension but looks like {}",
            request.input.display(),
            request.format.extension(),
            sniffed
        ),
        Ok(_) => {}
        Err(e) => tracing::debug!("Could not sniff {}: {}", request.input.display(), e),
    }

    tracing::debug!(
        "Extracting {} cover from {}",
        request.format,
        request.input.display()
    );

    let image = match request.format {
        BookFormat::Pdf => renderer.render_first_page(&request.input)?,
        BookFormat::Epub => first_epub_image(&request.input, opts)?,
    };

    write_png(&image, &output)?;
    tracing::info!(
        "Saved {}x{} cover to {}",
        image.width(),
        image.height(),
        output.display()
    );
    Ok(output)
}

fn first_epub_image(path: &Path, opts: &ExtractOptions) -> Result<DynamicImage, ExtractError> {
    let mut epub = EpubArchive::open(path, &opts.security)?;
    let (item, data) = epub.first_image()?.ok_or(ExtractError::NoImages)?;
    tracing::debug!(
        "Using manifest image '{}' ({}, {}) from {}",
        item.id,
        item.path,
        item.media_type,
        epub.opf_path()
    );
    Ok(image::load_from_memory(&data)?)
}

/// Encode fully in memory, then move a temp file over the target so the output
/// is either complete or absent. An existing file is replaced.
fn write_png(image: &DynamicImage, output: &Path) -> Result<(), ExtractError> {
    let mut encoded = Cursor::new(Vec::new());
    image.write_to(&mut encoded, ImageFormat::Png)?;

    let dir = output.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".cover-")
        .suffix(".png.part")
        .tempfile_in(dir)?;
    tmp.write_all(encoded.get_ref())?;

    // Temp files are created 0600. Keep the mode of a replaced cover, else 0644.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(output)
            .map(|m| m.permissions().mode() & 0o777)
            .unwrap_or(0o644);
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(mode))?;
    }

    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}
