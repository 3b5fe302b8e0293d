use iced::keyboard::{self, key::Named, Key, Modifiers};
use iced::widget::{center, container, image, mouse_area, opaque, text, Column};
use iced::{Alignment, Color, ContentFit, Element, Length, Subscription, Theme};
use tracing::debug;

use crate::app::Message;
use crate::state::PhotoId;

/// Largest box the enlarged photo is fitted into
const MAX_IMAGE_WIDTH: f32 = 900.0;
const MAX_IMAGE_HEIGHT: f32 = 600.0;

/// The photo currently shown full-screen
#[derive(Debug, Clone, PartialEq)]
pub struct Enlarged {
    pub id: PhotoId,
    pub description: String,
}

/// Full-screen view of one photo. At most one is ever open; the Escape
/// listener only exists while it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Overlay {
    #[default]
    Closed,
    Open(Enlarged),
}

impl Overlay {
    /// Open on `id`. Ignored (returns false) while already open.
    pub fn open(&mut self, id: PhotoId, description: &str) -> bool {
        if self.is_open() {
            debug!(%id, "overlay already open, ignoring");
            return false;
        }
        *self = Overlay::Open(Enlarged {
            id,
            description: description.to_string(),
        });
        true
    }

    /// Close the overlay. Returns whether it was open.
    pub fn close(&mut self) -> bool {
        matches!(std::mem::take(self), Overlay::Open(_))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Overlay::Open(_))
    }

    pub fn showing(&self) -> Option<PhotoId> {
        match self {
            Overlay::Open(enlarged) => Some(enlarged.id),
            Overlay::Closed => None,
        }
    }

    /// The Escape listener is registered exactly while this is true
    pub fn listens_for_escape(&self) -> bool {
        self.is_open()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.listens_for_escape() {
            keyboard::on_key_press(close_on_escape)
        } else {
            Subscription::none()
        }
    }

    /// Backdrop with the image and its description. The content shrinks to
    /// fit, so the backdrop stays clickable around it; clicks on the backdrop
    /// close the overlay, clicks on the content are swallowed.
    pub fn view<'a>(&'a self, handle: Option<&image::Handle>) -> Option<Element<'a, Message>> {
        let Overlay::Open(enlarged) = self else {
            return None;
        };

        let mut content: Column<'a, Message> = Column::new()
            .spacing(20)
            .width(Length::Shrink)
            .align_x(Alignment::Center);
        if let Some(handle) = handle {
            content = content.push(
                container(image(handle.clone()).content_fit(ContentFit::Contain))
                    .max_width(MAX_IMAGE_WIDTH)
                    .max_height(MAX_IMAGE_HEIGHT),
            );
        }
        if !enlarged.description.is_empty() {
            content = content.push(
                container(text(&enlarged.description).size(18).color(Color::WHITE))
                    .padding([10, 20])
                    .style(container::rounded_box),
            );
        }
        content = content.push(
            text("Click outside the photo or press Esc to close")
                .size(14)
                .color(Color::from_rgba(1.0, 1.0, 1.0, 0.7)),
        );

        let backdrop = center(opaque(content)).style(|_theme: &Theme| container::Style {
            background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.95).into()),
            ..container::Style::default()
        });

        Some(opaque(mouse_area(backdrop).on_press(Message::CloseOverlay)))
    }
}

fn close_on_escape(key: Key, _modifiers: Modifiers) -> Option<Message> {
    match key {
        Key::Named(Named::Escape) => Some(Message::CloseOverlay),
        _ => None,
    }
}
