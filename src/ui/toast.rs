use iced::alignment::Horizontal;
use iced::widget::{container, text};
use iced::{Border, Color, Element, Length, Theme};
use std::time::{Duration, Instant};

use crate::app::Message;

/// Fade in/out time at either end of a notification
pub const SLIDE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
}

impl ToastKind {
    fn color(self) -> Color {
        match self {
            ToastKind::Success => Color::from_rgb8(46, 204, 113),
            ToastKind::Info => Color::from_rgb8(52, 152, 219),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

/// Transient notifications. Only one is visible; a new one replaces it.
#[derive(Debug)]
pub struct Notifications {
    current: Option<Toast>,
    duration: Duration,
}

impl Notifications {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// Drop the toast once it has been shown and faded out
    pub fn tick(&mut self, now: Instant) {
        let expired = self.current.as_ref().is_some_and(|toast| {
            now.saturating_duration_since(toast.shown_at) >= self.duration + SLIDE_DURATION
        });
        if expired {
            self.current = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    fn opacity(&self, toast: &Toast, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(toast.shown_at);
        let slide = SLIDE_DURATION.as_secs_f32();

        if elapsed < SLIDE_DURATION {
            elapsed.as_secs_f32() / slide
        } else if elapsed < self.duration {
            1.0
        } else {
            (1.0 - (elapsed - self.duration).as_secs_f32() / slide).max(0.0)
        }
    }

    /// Top-right notification layer
    pub fn view(&self, now: Instant) -> Option<Element<'_, Message>> {
        let toast = self.current.as_ref()?;
        let opacity = self.opacity(toast, now);
        let background = Color {
            a: opacity,
            ..toast.kind.color()
        };

        let bubble = container(text(&toast.message).color(Color {
            a: opacity,
            ..Color::WHITE
        }))
        .padding([15, 25])
        .style(move |_theme: &Theme| container::Style {
            background: Some(background.into()),
            border: Border {
                radius: 8.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

        Some(
            container(bubble)
                .width(Length::Fill)
                .align_x(Horizontal::Right)
                .padding(20)
                .into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_after_fade_out() {
        let mut notifications = Notifications::new(Duration::from_secs(3));
        let start = Instant::now();
        notifications.show("Photo uploaded!", ToastKind::Success, start);

        notifications.tick(start + Duration::from_secs(3));
        assert!(notifications.is_active());

        notifications.tick(start + Duration::from_secs(3) + SLIDE_DURATION);
        assert!(!notifications.is_active());
    }

    #[test]
    fn test_new_toast_replaces_old() {
        let mut notifications = Notifications::new(Duration::from_secs(3));
        let start = Instant::now();
        notifications.show("first", ToastKind::Info, start);
        notifications.show("second", ToastKind::Success, start);

        let toast = notifications.current().unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.kind, ToastKind::Success);
    }

    #[test]
    fn test_opacity_ramps() {
        let notifications = Notifications::new(Duration::from_secs(3));
        let start = Instant::now();
        let toast = Toast {
            message: String::new(),
            kind: ToastKind::Info,
            shown_at: start,
        };

        assert_eq!(notifications.opacity(&toast, start), 0.0);
        assert_eq!(notifications.opacity(&toast, start + Duration::from_secs(1)), 1.0);
        let fading = notifications.opacity(&toast, start + Duration::from_millis(3150));
        assert!(fading > 0.0 && fading < 1.0);
    }
}
