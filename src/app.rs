use iced::widget::{column, scrollable, text, Column, Stack};
use iced::{time, Alignment, Element, Length, Subscription, Task, Theme};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dialogs::Dialogs;
use crate::state::{PhotoCollection, PhotoId, PhotoRecord, PhotoStore, StoreError};
use crate::ui::gallery::Gallery;
use crate::ui::overlay::Overlay;
use crate::ui::toast::{Notifications, ToastKind};
use crate::ui::upload_form::UploadForm;
use crate::upload::{self, UploadError};

/// Animation frame interval while something is fading
const FRAME: Duration = Duration::from_millis(16);

/// Main application state
pub struct PhotoWall {
    /// Source of truth for the gallery
    store: PhotoStore,
    /// Last collection the store handed back; the view is derived from it
    photos: PhotoCollection,
    gallery: Gallery,
    overlay: Overlay,
    notifications: Notifications,
    form: UploadForm,
    dialogs: Box<dyn Dialogs>,
    theme: Theme,
    now: Instant,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Choose File..."
    ChooseFile,
    DescriptionChanged(String),
    /// User clicked "Upload Photo" (or pressed Enter in the description)
    Upload,
    /// Background read of the picked file finished
    PhotoRead(Result<PhotoRecord, UploadError>),
    /// User clicked a card image
    Enlarge(PhotoId),
    /// Backdrop click or Escape
    CloseOverlay,
    /// User clicked a card's delete button
    DeletePhoto(PhotoId),
    ClearAll,
    /// Animation frame
    Tick(Instant),
}

impl PhotoWall {
    /// Create the application around an opened store
    pub fn new(store: PhotoStore, dialogs: Box<dyn Dialogs>, config: &Config) -> (Self, Task<Message>) {
        let photos = store.load();
        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        info!(photos = photos.len(), "photo wall initialized");

        let theme = if config.dark_theme { Theme::Dark } else { Theme::Light };

        (
            PhotoWall {
                store,
                photos,
                gallery,
                overlay: Overlay::default(),
                notifications: Notifications::new(config.notification_duration()),
                form: UploadForm::default(),
                dialogs,
                theme,
                now: Instant::now(),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.now = Instant::now();

        match message {
            Message::ChooseFile => {
                if let Some(path) = self.dialogs.pick_image() {
                    info!(path = %path.display(), "file selected");
                    self.form.selected = Some(path);
                }
            }
            Message::DescriptionChanged(description) => {
                self.form.description = description;
            }
            Message::Upload => {
                if self.form.uploading {
                    return Task::none();
                }

                match upload::validate(self.form.selected.as_deref()) {
                    Ok(file) => {
                        self.form.uploading = true;
                        return Task::perform(
                            upload::read_photo(file, self.form.description.clone()),
                            Message::PhotoRead,
                        );
                    }
                    Err(e) => self.report_upload_error(&e),
                }
            }
            Message::PhotoRead(Ok(record)) => {
                self.form.uploading = false;

                match self.store.insert(record.clone()) {
                    Ok(photos) => {
                        self.photos = photos;
                        self.gallery.prepend(&record, &self.photos);
                        self.form.clear();
                        self.notifications
                            .show("Photo uploaded!", ToastKind::Success, self.now);
                    }
                    Err(e) => self.report_store_error(&e),
                }
            }
            Message::PhotoRead(Err(e)) => {
                self.form.uploading = false;
                self.report_upload_error(&e);
            }
            Message::Enlarge(id) => {
                if let Some(record) = self.photos.get(id) {
                    self.overlay.open(id, &record.description);
                }
            }
            Message::CloseOverlay => {
                self.overlay.close();
            }
            Message::DeletePhoto(id) => self.delete_photo(id),
            Message::ClearAll => self.clear_all(),
            Message::Tick(now) => {
                self.now = now;
                for id in self.gallery.tick(now) {
                    info!(%id, "card removed");
                    self.notifications.show("Photo deleted", ToastKind::Info, now);
                }
                self.notifications.tick(now);
            }
        }

        Task::none()
    }

    fn delete_photo(&mut self, id: PhotoId) {
        let Some(record) = self.photos.get(id).cloned() else {
            warn!(%id, "delete requested for a photo that is not shown");
            return;
        };
        if !self
            .dialogs
            .confirm("Delete Photo", "Permanently delete this photo?")
        {
            return;
        }

        match self.store.remove(id) {
            Ok(photos) => {
                self.gallery.remove_card(&record, &self.photos, self.now);
                self.photos = photos;
                if self.overlay.showing() == Some(id) {
                    self.overlay.close();
                }
            }
            Err(e) => self.report_store_error(&e),
        }
    }

    fn clear_all(&mut self) {
        if !self.dialogs.confirm(
            "Clear All Photos",
            "Remove every uploaded photo? This cannot be undone.",
        ) {
            return;
        }

        match self.store.clear() {
            Ok(()) => self.reload(),
            Err(e) => self.report_store_error(&e),
        }
    }

    /// Re-read the store and rebuild the whole view
    fn reload(&mut self) {
        self.photos = self.store.load();
        self.gallery.render_all(&self.photos);
        self.overlay.close();
    }

    fn report_upload_error(&mut self, e: &UploadError) {
        warn!(error = %e, "upload rejected");
        let title = match e {
            UploadError::Validation(_) => "Cannot Upload",
            UploadError::Read(_) => "Could Not Read Photo",
        };
        self.dialogs.alert(title, &e.to_string());
    }

    fn report_store_error(&mut self, e: &StoreError) {
        error!(error = %e, "photo store write failed");
        self.dialogs.alert("Storage Error", &e.to_string());
        self.reload();
    }

    /// Build the user interface
    pub fn view(&self) -> Element<'_, Message> {
        let header: Column<'_, Message> = column![
            text("Photo Wall").size(40),
            text(format!("{} photos", self.photos.len())).size(14),
        ]
        .spacing(4)
        .align_x(Alignment::Center);

        let content: Column<'_, Message> = column![
            header,
            self.form.view(),
            self.gallery.view(&self.photos, self.now),
        ]
        .spacing(30)
        .padding(40)
        .width(Length::Fill)
        .align_x(Alignment::Center);

        let mut layers = Stack::new()
            .width(Length::Fill)
            .height(Length::Fill)
            .push(scrollable(content).width(Length::Fill).height(Length::Fill));

        let enlarged = self.overlay.showing().and_then(|id| self.gallery.handle(id));
        if let Some(overlay) = self.overlay.view(enlarged) {
            layers = layers.push(overlay);
        }
        if let Some(toast) = self.notifications.view(self.now) {
            layers = layers.push(toast);
        }

        layers.into()
    }

    /// Escape only while the overlay is open, frames only while animating
    pub fn subscription(&self) -> Subscription<Message> {
        let frames = if self.gallery.is_animating() || self.notifications.is_active() {
            time::every(FRAME).map(Message::Tick)
        } else {
            Subscription::none()
        };

        Subscription::batch([self.overlay.subscription(), frames])
    }

    pub fn theme(&self) -> Theme {
        self.theme.clone()
    }
}
