/// Gallery renderer
///
/// Cards are derived from the current collection on every view. The only
/// state kept here is the decoded image handle per photo and the snapshot
/// of cards that are still fading out after a delete.
use iced::widget::{button, column, container, image, mouse_area, text};
use iced::{mouse, ContentFit, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::app::Message;
use crate::state::{PhotoCollection, PhotoId, PhotoRecord};
use crate::upload::encode::decode_data_url;

/// How long a deleted card takes to fade out
pub const FADE_DURATION: Duration = Duration::from_millis(300);

const CARD_WIDTH: f32 = 240.0;
const CARD_IMAGE_HEIGHT: f32 = 180.0;

/// What one card shows
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: PhotoId,
    pub alt: String,
    pub caption: String,
    pub time_label: String,
    pub opacity: f32,
    /// False while the card is fading out
    pub removable: bool,
}

impl Card {
    fn from_record(record: &PhotoRecord) -> Self {
        Self {
            id: record.id,
            alt: record.description.clone(),
            caption: record.description.clone(),
            time_label: record.time_label(),
            opacity: 1.0,
            removable: true,
        }
    }
}

/// A card whose record is already gone from the store
#[derive(Debug, Clone)]
struct Departing {
    /// Position in the displayed cards, fading ones included
    index: usize,
    card: Card,
    handle: Option<image::Handle>,
    started: Instant,
}

#[derive(Debug, Default)]
pub struct Gallery {
    handles: HashMap<PhotoId, image::Handle>,
    /// Sorted by `index`
    departing: Vec<Departing>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild everything from `photos`, dropping pending fades
    pub fn render_all(&mut self, photos: &PhotoCollection) {
        self.handles.clear();
        self.departing.clear();
        for record in photos.iter() {
            self.cache(record);
        }
    }

    /// Register a freshly inserted record. `photos` already holds it at the
    /// head, so its card is drawn first; handles of photos pushed past the
    /// cap are released.
    pub fn prepend(&mut self, record: &PhotoRecord, photos: &PhotoCollection) {
        self.cache(record);
        self.handles.retain(|id, _| photos.get(*id).is_some());
        for departing in &mut self.departing {
            departing.index += 1;
        }
    }

    /// Start fading out the card of `record`. `shown` is the collection the
    /// card was drawn from, before the record was removed.
    pub fn remove_card(&mut self, record: &PhotoRecord, shown: &PhotoCollection, now: Instant) {
        let displayed = self.cards(shown, now);
        let index = displayed
            .iter()
            .position(|card| card.id == record.id)
            .unwrap_or(displayed.len());

        let mut card = Card::from_record(record);
        card.removable = false;

        let at = self.departing.partition_point(|departing| departing.index < index);
        self.departing.insert(
            at,
            Departing {
                index,
                card,
                handle: self.handles.remove(&record.id),
                started: now,
            },
        );
    }

    /// Drop finished fades and return the ids whose fade completed
    pub fn tick(&mut self, now: Instant) -> Vec<PhotoId> {
        let mut finished = Vec::new();
        let mut vacated = Vec::new();
        self.departing.retain(|departing| {
            let done = now.saturating_duration_since(departing.started) >= FADE_DURATION;
            if done {
                finished.push(departing.card.id);
                vacated.push(departing.index);
            }
            !done
        });

        // Cards after a vanished one move up
        for departing in &mut self.departing {
            let before = vacated.iter().filter(|index| **index < departing.index).count();
            departing.index -= before;
        }
        finished
    }

    pub fn is_animating(&self) -> bool {
        !self.departing.is_empty()
    }

    pub fn handle(&self, id: PhotoId) -> Option<&image::Handle> {
        self.handles.get(&id)
    }

    /// Cards in display order: the collection, with fading cards kept at
    /// the position they had. Fades are inserted lowest index first, so each
    /// one lands where it was drawn.
    pub fn cards(&self, photos: &PhotoCollection, now: Instant) -> Vec<Card> {
        let mut cards: Vec<Card> = photos.iter().map(Card::from_record).collect();

        for departing in &self.departing {
            let elapsed = now.saturating_duration_since(departing.started);
            let progress = elapsed.as_secs_f32() / FADE_DURATION.as_secs_f32();

            let mut card = departing.card.clone();
            card.opacity = (1.0 - progress).clamp(0.0, 1.0);
            cards.insert(departing.index.min(cards.len()), card);
        }

        cards
    }

    pub fn view(&self, photos: &PhotoCollection, now: Instant) -> Element<'_, Message> {
        let cards = self.cards(photos, now);
        if cards.is_empty() {
            return text("No photos yet. Add one above.").size(16).into();
        }

        let elements = cards
            .into_iter()
            .map(|card| {
                let handle = self.handles.get(&card.id).cloned().or_else(|| {
                    self.departing
                        .iter()
                        .find(|departing| departing.card.id == card.id)
                        .and_then(|departing| departing.handle.clone())
                });
                card_view(card, handle)
            })
            .collect();

        Wrap::with_elements(elements)
            .spacing(16.0)
            .line_spacing(16.0)
            .into()
    }

    /// Decode a record's data URL into an image handle, once
    fn cache(&mut self, record: &PhotoRecord) {
        if self.handles.contains_key(&record.id) {
            return;
        }
        match decode_data_url(&record.data) {
            Ok((_, bytes)) => {
                self.handles.insert(record.id, image::Handle::from_bytes(bytes));
            }
            Err(e) => warn!(id = %record.id, error = %e, "photo has unreadable image data"),
        }
    }
}

fn card_view<'a>(card: Card, handle: Option<image::Handle>) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match handle {
        Some(handle) => image(handle)
            .width(Length::Fill)
            .height(CARD_IMAGE_HEIGHT)
            .content_fit(ContentFit::Cover)
            .opacity(card.opacity)
            .into(),
        None => container(text(card.alt.clone()).size(12))
            .width(Length::Fill)
            .height(CARD_IMAGE_HEIGHT)
            .center_x(Length::Fill)
            .center_y(CARD_IMAGE_HEIGHT)
            .into(),
    };

    let picture: Element<'a, Message> = if card.removable {
        mouse_area(picture)
            .on_press(Message::Enlarge(card.id))
            .interaction(mouse::Interaction::Pointer)
            .into()
    } else {
        picture
    };

    let delete = button(text("Delete").size(14))
        .style(button::danger)
        .on_press_maybe(card.removable.then_some(Message::DeletePhoto(card.id)));

    container(
        column![
            picture,
            text(card.caption).size(16),
            text(format!("({})", card.time_label)).size(12),
            delete,
        ]
        .spacing(8),
    )
    .width(CARD_WIDTH)
    .padding(10)
    .style(container::rounded_box)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::encode::encode_data_url;
    use chrono::Utc;

    fn photo(description: &str) -> PhotoRecord {
        PhotoRecord::new(encode_data_url("image/png", b"png"), description, Utc::now())
    }

    fn collection(records: &[PhotoRecord]) -> PhotoCollection {
        let mut photos = PhotoCollection::new();
        for record in records.iter().rev() {
            photos.prepend(record.clone());
        }
        photos
    }

    #[test]
    fn test_cards_follow_collection_order() {
        let first = photo("first");
        let second = photo("second");
        let photos = collection(&[first.clone(), second.clone()]);

        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        let cards = gallery.cards(&photos, Instant::now());
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, first.id);
        assert_eq!(cards[1].alt, "second");
        assert!(gallery.handle(first.id).is_some());
    }

    #[test]
    fn test_prepend_shows_new_card_first() {
        let old = photo("old");
        let mut photos = collection(&[old.clone()]);
        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        let new = photo("sunset");
        photos.prepend(new.clone());
        gallery.prepend(&new, &photos);

        let cards = gallery.cards(&photos, Instant::now());
        assert_eq!(cards[0].alt, "sunset");
        assert_eq!(cards[1].id, old.id);
    }

    #[test]
    fn test_removed_card_fades_in_place() {
        let a = photo("a");
        let b = photo("b");
        let c = photo("c");
        let mut photos = collection(&[a.clone(), b.clone(), c.clone()]);
        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        let start = Instant::now();
        gallery.remove_card(&b, &photos, start);
        photos.remove(b.id);
        assert!(gallery.is_animating());
        assert!(gallery.handle(b.id).is_none());

        let halfway = gallery.cards(&photos, start + FADE_DURATION / 2);
        assert_eq!(halfway.len(), 3);
        assert_eq!(halfway[1].id, b.id);
        assert!(!halfway[1].removable);
        assert!(halfway[1].opacity > 0.0 && halfway[1].opacity < 1.0);

        assert!(gallery.tick(start + FADE_DURATION / 2).is_empty());
        assert_eq!(gallery.tick(start + FADE_DURATION), vec![b.id]);
        assert!(!gallery.is_animating());

        let after = gallery.cards(&photos, start + FADE_DURATION);
        assert_eq!(ids(&after), vec![a.id, c.id]);
    }

    fn ids(cards: &[Card]) -> Vec<PhotoId> {
        cards.iter().map(|card| card.id).collect()
    }

    #[test]
    fn test_two_quick_deletes_keep_order() {
        let a = photo("a");
        let b = photo("b");
        let c = photo("c");
        let mut photos = collection(&[a.clone(), b.clone(), c.clone()]);
        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        let start = Instant::now();
        gallery.remove_card(&b, &photos, start);
        photos.remove(b.id);

        let later = start + FADE_DURATION / 3;
        gallery.remove_card(&c, &photos, later);
        photos.remove(c.id);

        let fading = gallery.cards(&photos, later);
        assert_eq!(ids(&fading), vec![a.id, b.id, c.id]);

        // b finishes first; c stays after a
        assert_eq!(gallery.tick(start + FADE_DURATION), vec![b.id]);
        assert_eq!(ids(&gallery.cards(&photos, start + FADE_DURATION)), vec![a.id, c.id]);

        assert_eq!(gallery.tick(later + FADE_DURATION), vec![c.id]);
        assert_eq!(ids(&gallery.cards(&photos, later + FADE_DURATION)), vec![a.id]);
    }

    #[test]
    fn test_earlier_fade_finishing_shifts_later_one() {
        let a = photo("a");
        let b = photo("b");
        let c = photo("c");
        let mut photos = collection(&[a.clone(), b.clone(), c.clone()]);
        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        let start = Instant::now();
        gallery.remove_card(&a, &photos, start);
        photos.remove(a.id);

        let later = start + FADE_DURATION / 2;
        gallery.remove_card(&b, &photos, later);
        photos.remove(b.id);
        assert_eq!(ids(&gallery.cards(&photos, later)), vec![a.id, b.id, c.id]);

        assert_eq!(gallery.tick(start + FADE_DURATION), vec![a.id]);
        assert_eq!(ids(&gallery.cards(&photos, start + FADE_DURATION)), vec![b.id, c.id]);
    }

    #[test]
    fn test_upload_during_fade_keeps_fading_card_in_place() {
        let a = photo("a");
        let b = photo("b");
        let mut photos = collection(&[a.clone(), b.clone()]);
        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        let start = Instant::now();
        gallery.remove_card(&b, &photos, start);
        photos.remove(b.id);

        let new = photo("new");
        photos.prepend(new.clone());
        gallery.prepend(&new, &photos);

        assert_eq!(ids(&gallery.cards(&photos, start)), vec![new.id, a.id, b.id]);
    }

    #[test]
    fn test_unreadable_data_still_gets_a_card() {
        let mut broken = photo("broken");
        broken.data = "not a data url".to_string();
        let photos = collection(&[broken.clone()]);

        let mut gallery = Gallery::new();
        gallery.render_all(&photos);

        assert!(gallery.handle(broken.id).is_none());
        assert_eq!(gallery.cards(&photos, Instant::now()).len(), 1);
    }
}
