use std::collections::HashSet;

use crate::stroke::{StrokeId, StrokeRef};

/// The scene: committed strokes in paint order.
#[derive(Debug, Default)]
pub struct StrokeStore {
    strokes: Vec<StrokeRef>,
    ids: HashSet<StrokeId>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished stroke. Returns `false`, leaving the scene untouched,
    /// if a stroke with the same id is already present.
    pub fn commit(&mut self, stroke: StrokeRef) -> bool {
        if !self.ids.insert(stroke.id()) {
            log::warn!("Ignoring stroke {} already in the scene", stroke.id());
            return false;
        }
        self.strokes.push(stroke);
        true
    }

    pub fn remove_last(&mut self) -> Option<StrokeRef> {
        let stroke = self.strokes.pop()?;
        self.ids.remove(&stroke.id());
        Some(stroke)
    }

    /// Re-append strokes previously taken out of the store, keeping their order.
    pub fn append_restored(&mut self, strokes: impl IntoIterator<Item = StrokeRef>) {
        for stroke in strokes {
            self.commit(stroke);
        }
    }

    pub fn all(&self) -> &[StrokeRef] {
        &self.strokes
    }

    /// Empty the store, handing the removed strokes back in paint order.
    pub fn clear(&mut self) -> Vec<StrokeRef> {
        self.ids.clear();
        std::mem::take(&mut self.strokes)
    }

    pub fn get(&self, id: StrokeId) -> Option<&StrokeRef> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.strokes.iter().find(|stroke| stroke.id() == id)
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
