//! Selection state behind the window: the chosen book, the output directory,
//! and the status line shown to the user.

use std::path::{Path, PathBuf};

use crate::detect::BookFormat;
use crate::error::{ExtractError, SelectionError};
use crate::extract::{self, ExtractOptions};
use crate::pdf::PageRenderer;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_FILE_SELECTED: &str =
    "File selected. Select output directory and click 'Extract Image'.";
pub const STATUS_DIR_SELECTED: &str = "Output directory selected. Click 'Extract Image' to proceed.";
pub const STATUS_FILE_DROPPED: &str = "File dropped. Click 'Extract Image' to proceed.";
pub const STATUS_DROP_NOT_A_BOOK: &str = "Please drop a PDF or EPUB file.";
pub const STATUS_DROP_INVALID: &str = "Invalid file dropped.";
pub const STATUS_PROCESSING: &str = "Processing...";
pub const STATUS_ERROR: &str = "Error occurred";

/// What happened to a drop payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Accepted(PathBuf),
    /// An existing file that is not a PDF or EPUB.
    NotABook(PathBuf),
    /// Empty payload or not an existing file.
    Invalid,
}

#[derive(Debug, Clone)]
pub struct Session {
    file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    status: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            file: None,
            output_dir: None,
            status: STATUS_READY.to_string(),
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the extract action is enabled.
    pub fn can_extract(&self) -> bool {
        self.file.is_some() && self.output_dir.is_some()
    }

    /// Store a file chosen in the picker. The picker filter is only a hint, so
    /// the extension is checked at extraction time.
    pub fn select_file(&mut self, path: PathBuf) {
        tracing::info!("Selected {}", path.display());
        self.file = Some(path);
        self.status = STATUS_FILE_SELECTED.to_string();
    }

    /// Store the output directory if it exists and accepts new files.
    pub fn select_output_directory(&mut self, path: PathBuf) -> Result<(), SelectionError> {
        if !is_writable_dir(&path) {
            tracing::warn!("Rejected output directory {}", path.display());
            return Err(SelectionError::OutputDirUnusable { path });
        }
        tracing::info!("Output directory {}", path.display());
        self.output_dir = Some(path);
        self.status = STATUS_DIR_SELECTED.to_string();
        Ok(())
    }

    /// Handle a drag-and-drop payload. Only the status changes on rejection.
    pub fn accept_dropped_path(&mut self, raw: &str) -> DropOutcome {
        let trimmed = raw.trim_matches(&['{', '}'][..]);
        let path = PathBuf::from(trimmed);

        if trimmed.is_empty() || !path.is_file() {
            tracing::warn!("Ignoring drop of {:?}", raw);
            self.status = STATUS_DROP_INVALID.to_string();
            return DropOutcome::Invalid;
        }

        if BookFormat::from_path(&path).is_none() {
            tracing::warn!("Ignoring drop of non-book {}", path.display());
            self.status = STATUS_DROP_NOT_A_BOOK.to_string();
            return DropOutcome::NotABook(path);
        }

        tracing::info!("Dropped {}", path.display());
        self.file = Some(path.clone());
        self.status = STATUS_FILE_DROPPED.to_string();
        DropOutcome::Accepted(path)
    }

    /// Extract the cover of the selected file into the output directory.
    ///
    /// Precondition failures leave the status untouched; any later failure
    /// sets it to [`STATUS_ERROR`].
    pub fn extract(
        &mut self,
        renderer: &dyn PageRenderer,
        opts: &ExtractOptions,
    ) -> Result<PathBuf, ExtractError> {
        let request = extract::check_preconditions(self.file(), self.output_dir())?;

        self.status = STATUS_PROCESSING.to_string();
        match extract::extract_cover(&request, renderer, opts) {
            Ok(output) => {
                self.status = format!("Image saved as: {}", file_name(&output));
                Ok(output)
            }
            Err(e) => {
                tracing::warn!("Extraction from {} failed: {}", request.input.display(), e);
                self.status = STATUS_ERROR.to_string();
                Err(e)
            }
        }
    }
}

/// Final path component for display, or the whole path when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Writability is probed by creating (and dropping) a temp file inside.
fn is_writable_dir(path: &Path) -> bool {
    path.is_dir()
        && tempfile::Builder::new()
            .prefix(".cover-probe-")
            .tempfile_in(path)
            .is_ok()
}
