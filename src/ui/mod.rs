/// Views of the photo wall
///
/// - `gallery.rs` - card grid derived from the photo collection
/// - `overlay.rs` - full-screen view of one photo
/// - `toast.rs` - transient notifications
/// - `upload_form.rs` - file picker, description and action buttons

pub mod gallery;
pub mod overlay;
pub mod toast;
pub mod upload_form;
