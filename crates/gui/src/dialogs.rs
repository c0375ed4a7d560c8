//! Native pickers and blocking message boxes.

use std::path::{Path, PathBuf};

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

fn file_dialog(start_dir: Option<&Path>) -> FileDialog {
    match start_dir {
        Some(dir) => FileDialog::new().set_directory(dir),
        None => FileDialog::new(),
    }
}

pub fn pick_book(start_dir: Option<&Path>) -> Option<PathBuf> {
    file_dialog(start_dir)
        .set_title("Select PDF or EPUB File")
        .add_filter("PDF and EPUB files", &["pdf", "epub"])
        .add_filter("All files", &["*"])
        .pick_file()
}

pub fn pick_output_dir(start_dir: Option<&Path>) -> Option<PathBuf> {
    file_dialog(start_dir)
        .set_title("Select Output Directory")
        .pick_folder()
}

pub fn show_error(message: &str) {
    show(MessageLevel::Error, "Error", message);
}

pub fn show_info(title: &str, message: &str) {
    show(MessageLevel::Info, title, message);
}

fn show(level: MessageLevel, title: &str, message: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}
