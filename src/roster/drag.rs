//! Which card is being dragged.
//!
//! Set on `dragstart`, cleared on `dragend`. Drop handlers prefer this value
//! and only fall back to the id carried in the drag payload when nothing is
//! recorded.

use crate::roster::model::PlayerId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    dragged: Option<PlayerId>,
}

impl DragState {
    pub fn begin(&mut self, id: PlayerId) {
        self.dragged = Some(id);
    }

    pub fn end(&mut self) {
        self.dragged = None;
    }

    pub fn dragged(&self) -> Option<PlayerId> {
        self.dragged
    }

    /// Source of a drop: the recorded id, else the parsed payload.
    pub fn resolve(&self, payload: Option<&str>) -> Option<PlayerId> {
        self.dragged
            .or_else(|| payload.and_then(|p| p.parse().ok()))
    }
}
