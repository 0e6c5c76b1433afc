use std::sync::Arc;

use crate::document::StrokeStore;
use crate::sampler::SamplerConfig;
use crate::state::DrawingState;
use crate::stroke::{BrushSettings, MutableStroke, Stroke, StrokePoint, StrokeRef};

/// What a redo re-applies.
#[derive(Debug, Clone)]
pub enum RedoEntry {
    /// Strokes taken off the end of the scene by an undo.
    Strokes(Vec<StrokeRef>),
    /// An undone clear.
    Clear,
}

/// Undo/redo/clear state machine over the [`StrokeStore`].
///
/// Undo first takes strokes off the end of the scene one at a time; once the
/// scene is empty it restores the most recently cleared scene in one step.
/// Every operation is total: with nothing to do it is a no-op and returns
/// `false` (or `None`).
#[derive(Debug)]
pub struct HistoryManager {
    store: StrokeStore,
    /// Scenes archived by `clear`, most recent last.
    undo_snapshots: Vec<Vec<StrokeRef>>,
    redo_stack: Vec<RedoEntry>,
    drawing: DrawingState,
    sampler_config: SamplerConfig,
    /// Bumped on every scene mutation.
    version: u64,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

impl HistoryManager {
    pub fn new(sampler_config: SamplerConfig) -> Self {
        Self {
            store: StrokeStore::new(),
            undo_snapshots: Vec::new(),
            redo_stack: Vec::new(),
            drawing: DrawingState::Idle,
            sampler_config,
            version: 0,
        }
    }

    /// Start a session over an existing scene. History starts out empty.
    pub fn with_scene(sampler_config: SamplerConfig, strokes: Vec<StrokeRef>) -> Self {
        let mut history = Self::new(sampler_config);
        history.store.append_restored(strokes);
        history
    }

    // Drawing

    /// Idle → Drawing. Starting a stroke invalidates redo.
    ///
    /// A stroke already in progress is committed first.
    pub fn begin_stroke(&mut self, point: StrokePoint, settings: BrushSettings) {
        if self.drawing.is_drawing() {
            log::warn!("Stroke started while another was in progress; finishing the old one");
            self.end_stroke();
        }

        self.redo_stack.clear();

        let mut stroke = MutableStroke::new(settings, self.sampler_config);
        stroke.add_raw_point(point);
        self.drawing = DrawingState::Drawing { stroke };
    }

    /// Feed a sample to the stroke in progress. Ignored while idle.
    pub fn extend_stroke(&mut self, point: StrokePoint) {
        if let Some(stroke) = self.drawing.stroke_mut() {
            stroke.add_raw_point(point);
        }
    }

    /// Drawing → Idle, committing the finished stroke.
    pub fn end_stroke(&mut self) -> Option<StrokeRef> {
        let stroke = Arc::new(self.drawing.take()?.finish()?);
        self.commit(Arc::clone(&stroke));
        Some(stroke)
    }

    /// Pointer cancel or focus loss. Behaves exactly like [`Self::end_stroke`].
    pub fn cancel_stroke(&mut self) -> Option<StrokeRef> {
        self.end_stroke()
    }

    pub fn in_progress(&self) -> Option<&MutableStroke> {
        self.drawing.stroke()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    // Edits

    /// Append a finished stroke to the scene as a new edit. A duplicate id is
    /// rejected without touching the redo stack.
    pub fn commit(&mut self, stroke: StrokeRef) -> bool {
        log::debug!("Committing stroke {} ({} points)", stroke.id(), stroke.points().len());
        if !self.store.commit(stroke) {
            return false;
        }
        self.redo_stack.clear();
        self.touch();
        true
    }

    /// Convenience for committing an owned stroke.
    pub fn commit_stroke(&mut self, stroke: Stroke) -> StrokeRef {
        let stroke = Arc::new(stroke);
        self.commit(Arc::clone(&stroke));
        stroke
    }

    pub fn undo(&mut self) -> bool {
        if let Some(stroke) = self.store.remove_last() {
            self.redo_stack.push(RedoEntry::Strokes(vec![stroke]));
        } else if let Some(snapshot) = self.undo_snapshots.pop() {
            self.store.append_restored(snapshot);
            self.redo_stack.push(RedoEntry::Clear);
        } else {
            return false;
        }

        self.touch();
        log::info!("Undo: {} strokes in scene", self.store.len());
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };

        match entry {
            RedoEntry::Strokes(strokes) => self.store.append_restored(strokes),
            RedoEntry::Clear => self.archive_scene(),
        }

        self.touch();
        log::info!("Redo: {} strokes in scene", self.store.len());
        true
    }

    /// Remove every stroke as one undoable step. No-op on an empty scene.
    pub fn clear(&mut self) -> bool {
        if self.store.is_empty() {
            return false;
        }

        self.archive_scene();
        self.redo_stack.clear();
        self.touch();
        log::info!("Cleared canvas");
        true
    }

    fn archive_scene(&mut self) {
        let snapshot = self.store.clear();
        if !snapshot.is_empty() {
            self.undo_snapshots.push(snapshot);
        }
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    // Queries

    pub fn scene(&self) -> &[StrokeRef] {
        self.store.all()
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    /// Immutable copy of the scene for background work.
    pub fn snapshot(&self) -> Vec<StrokeRef> {
        self.store.all().to_vec()
    }

    pub fn can_undo(&self) -> bool {
        !self.store.is_empty() || !self.undo_snapshots.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.store.len() + self.undo_snapshots.len()
    }

    pub fn redo_stack(&self) -> &[RedoEntry] {
        &self.redo_stack
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
