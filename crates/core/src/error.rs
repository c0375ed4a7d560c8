use std::path::PathBuf;

/// Top-level error for one extraction attempt. `Session::extract` returns this.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Please select a valid PDF or EPUB file")]
    MissingInput,

    #[error("Selected file is not a PDF or EPUB")]
    UnsupportedFormat,

    #[error("Please select an output directory")]
    MissingOutputDir,

    #[error("PDF file has no pages")]
    NoPages,

    #[error("EPUB file has no images")]
    NoImages,

    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// True for failures raised by a collaborator (archive, renderer, codec,
    /// filesystem) rather than by our own checks.
    pub fn is_library_failure(&self) -> bool {
        matches!(
            self,
            ExtractError::Read(_)
                | ExtractError::Render(_)
                | ExtractError::Image(_)
                | ExtractError::Io(_)
        )
    }

    /// Text for the error dialog.
    pub fn dialog_message(&self) -> String {
        if self.is_library_failure() {
            format!("An error occurred while processing the file:\n{self}")
        } else {
            self.to_string()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Selected directory does not exist or is not writable")]
    OutputDirUnusable { path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    #[error("ZIP bomb detected: decompression ratio {ratio}:1 exceeds limit {limit}:1")]
    ZipBomb { ratio: u64, limit: u64 },

    #[error("Path traversal detected in archive entry: {path}")]
    PathTraversal { path: String },

    #[error("Archive contains {count} files, exceeding limit of {limit}")]
    TooManyFiles { count: u64, limit: u64 },

    #[error("Resource {name} is {size_mb}MB, exceeding limit of {limit_mb}MB")]
    OversizedResource {
        name: String,
        size_mb: u64,
        limit_mb: u64,
    },

    #[error("DRM protected file ({drm_type})")]
    DrmProtected { drm_type: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Malformed EPUB file: {0}")]
    Malformed(String),

    #[error("Missing required content: {0}")]
    MissingContent(String),

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load the PDFium library: {0}")]
    Binding(String),

    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Failed to render page {page}: {detail}")]
    Page { page: u16, detail: String },

    #[error("Rendered bitmap has unexpected size {width}x{height}")]
    Bitmap { width: u32, height: u32 },
}
