use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Card, Column};

/// Read-only snapshot of the board handed to the view layer.
///
/// A card lives in exactly one of `active_cards` and `archived_cards`,
/// decided by whether `archived_at` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub columns: Vec<Column>,
    pub active_cards: Vec<Card>,
    pub archived_cards: Vec<Card>,
    pub loading: bool,
    pub last_error: Option<StoreError>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            active_cards: Vec::new(),
            archived_cards: Vec::new(),
            loading: true,
            last_error: None,
        }
    }
}

impl BoardState {
    /// Builds the state a successful full read of the backend describes.
    pub fn from_remote(mut columns: Vec<Column>, cards: Vec<Card>) -> Self {
        columns.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));

        let (mut archived_cards, mut active_cards): (Vec<Card>, Vec<Card>) =
            cards.into_iter().partition(Card::is_archived);
        active_cards.sort_by(card_order);
        archived_cards.sort_by(card_order);

        Self {
            columns,
            active_cards,
            archived_cards,
            loading: false,
            last_error: None,
        }
    }

    pub fn column(&self, id: Uuid) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn active_card(&self, id: Uuid) -> Option<&Card> {
        self.active_cards.iter().find(|c| c.id == id)
    }

    pub fn archived_card(&self, id: Uuid) -> Option<&Card> {
        self.archived_cards.iter().find(|c| c.id == id)
    }

    pub fn card(&self, id: Uuid) -> Option<&Card> {
        self.active_card(id).or_else(|| self.archived_card(id))
    }

    /// Active cards of one column in display order.
    pub fn cards_in_column(&self, column_id: Uuid) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self
            .active_cards
            .iter()
            .filter(|c| c.column_id == column_id)
            .collect();
        cards.sort_by(|a, b| card_order(a, b));
        cards
    }

    /// Active cards created on the given calendar day (UTC).
    pub fn created_on(&self, day: NaiveDate) -> Vec<&Card> {
        self.active_cards
            .iter()
            .filter(|c| c.created_on(day))
            .collect()
    }

    pub(crate) fn active_count_in(&self, column_id: Uuid) -> usize {
        self.active_cards
            .iter()
            .filter(|c| c.column_id == column_id)
            .count()
    }

    /// Moves a card from active to archived in one step. Returns false when
    /// the card is not active.
    pub(crate) fn archive(&mut self, id: Uuid, at: DateTime<Utc>) -> bool {
        let Some(index) = self.active_cards.iter().position(|c| c.id == id) else {
            return false;
        };

        let mut card = self.active_cards.remove(index);
        card.archived_at = Some(at);
        self.archived_cards.retain(|c| c.id != id);
        self.archived_cards.push(card);
        true
    }

    /// Inverse of [`BoardState::archive`].
    pub(crate) fn restore(&mut self, id: Uuid) -> bool {
        let Some(index) = self.archived_cards.iter().position(|c| c.id == id) else {
            return false;
        };

        let mut card = self.archived_cards.remove(index);
        card.archived_at = None;
        self.active_cards.retain(|c| c.id != id);
        self.active_cards.push(card);
        true
    }

    pub(crate) fn card_mut(&mut self, id: Uuid) -> Option<&mut Card> {
        self.active_cards
            .iter_mut()
            .chain(self.archived_cards.iter_mut())
            .find(|c| c.id == id)
    }
}

fn card_order(a: &Card, b: &Card) -> std::cmp::Ordering {
    a.order
        .cmp(&b.order)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}
