use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::PathBuf;

use crate::upload::IMAGE_EXTENSIONS;

/// Blocking prompts the gallery needs from the desktop
pub trait Dialogs {
    /// Ask a yes/no question; `true` means the user confirmed
    fn confirm(&self, title: &str, message: &str) -> bool;
    /// Show an error the user has to acknowledge
    fn alert(&self, title: &str, message: &str);
    /// Let the user pick one image file
    fn pick_image(&self) -> Option<PathBuf>;
}

/// Native dialogs via rfd
pub struct NativeDialogs;

impl Dialogs for NativeDialogs {
    fn confirm(&self, title: &str, message: &str) -> bool {
        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();
        matches!(answer, MessageDialogResult::Yes)
    }

    fn alert(&self, title: &str, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn pick_image(&self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Select a Photo")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
    }
}
