use eframe_ink::history::RedoEntry;
use eframe_ink::{BrushSettings, CapStyle, HistoryManager, Stroke, StrokePoint, StrokeRef, Tool};
use egui::Color32;

fn make_stroke(tool: Tool, width: f32, points: usize) -> Stroke {
    let settings = BrushSettings::new(tool, Color32::BLACK, width, CapStyle::RoundCap);
    let points = (0..points)
        .map(|i| StrokePoint::new(10.0 + i as f32 * 3.0, 10.0, None, i as u64 * 16))
        .collect();
    Stroke::new(settings, points).unwrap()
}

fn ids(scene: &[StrokeRef]) -> Vec<String> {
    scene.iter().map(|s| s.id().to_string()).collect()
}

#[test]
fn test_undo_redo_walkthrough() {
    let mut history = HistoryManager::default();
    let a = history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    let b = history.commit_stroke(make_stroke(Tool::Erase, 20.0, 3));

    assert!(history.undo());
    assert_eq!(history.scene(), &[a.clone()]);
    assert!(history.undo());
    assert!(history.scene().is_empty());
    assert!(history.redo());
    assert_eq!(history.scene(), &[a.clone()]);
    assert!(history.redo());
    assert_eq!(history.scene(), &[a.clone(), b.clone()]);

    history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    assert!(!history.can_redo());
    assert!(!history.redo());
    assert_eq!(history.scene().len(), 3);
}

#[test]
fn test_redo_invalidated_by_new_commit_after_undo() {
    let mut history = HistoryManager::default();
    history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    history.undo();
    assert!(history.can_redo());

    let c = history.commit_stroke(make_stroke(Tool::Draw, 5.0, 4));
    assert!(!history.redo());
    assert_eq!(history.scene().last(), Some(&c));
}

#[test]
fn test_duplicate_commit_keeps_redo_and_version() {
    let mut history = HistoryManager::default();
    let a = history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    history.undo();
    let version = history.version();

    assert!(!history.commit(a.clone()));
    assert!(history.can_redo());
    assert_eq!(history.version(), version);
    assert_eq!(history.scene(), &[a]);

    assert!(history.redo());
    assert_eq!(history.scene().len(), 2);
}

#[test]
fn test_starting_a_stroke_invalidates_redo() {
    let mut history = HistoryManager::default();
    history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    history.undo();

    history.begin_stroke(StrokePoint::new(1.0, 1.0, None, 0), BrushSettings::default());
    assert!(history.is_drawing());
    assert!(!history.can_redo());
}

#[test]
fn test_clear_is_undone_in_one_step() {
    let mut history = HistoryManager::default();
    for _ in 0..3 {
        history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    }
    let before = ids(history.scene());

    assert!(history.clear());
    assert!(history.scene().is_empty());

    assert!(history.undo());
    assert_eq!(ids(history.scene()), before);

    // Redo re-clears, and undo brings the same strokes back again.
    assert!(matches!(history.redo_stack().last(), Some(RedoEntry::Clear)));
    assert!(history.redo());
    assert!(history.scene().is_empty());
    assert!(history.undo());
    assert_eq!(ids(history.scene()), before);
}

#[test]
fn test_undo_after_clear_then_draw() {
    let mut history = HistoryManager::default();
    let a = history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
    history.clear();
    let b = history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));

    assert!(history.undo());
    assert!(history.scene().is_empty());
    assert!(history.undo());
    assert_eq!(history.scene(), &[a]);

    assert!(history.redo());
    assert!(history.scene().is_empty());
    assert!(history.redo());
    assert_eq!(history.scene(), &[b]);
}

#[test]
fn test_clear_on_empty_scene_is_noop() {
    let mut history = HistoryManager::default();
    assert!(!history.clear());
    assert!(!history.can_undo());
    assert_eq!(history.version(), 0);
}

#[test]
fn test_operations_are_total_on_empty_history() {
    let mut history = HistoryManager::default();
    assert!(!history.undo());
    assert!(!history.redo());
    assert!(history.end_stroke().is_none());
    assert!(history.cancel_stroke().is_none());
    history.extend_stroke(StrokePoint::new(1.0, 1.0, None, 0));
    assert!(history.scene().is_empty());
}

#[test]
fn test_cancel_commits_like_pointer_up() {
    let drag = |history: &mut HistoryManager| {
        history.begin_stroke(StrokePoint::new(0.0, 0.0, None, 0), BrushSettings::default());
        history.extend_stroke(StrokePoint::new(20.0, 0.0, None, 50));
    };

    let mut ended = HistoryManager::default();
    drag(&mut ended);
    let ended = ended.end_stroke().unwrap();

    let mut cancelled = HistoryManager::default();
    drag(&mut cancelled);
    let cancelled = cancelled.cancel_stroke().unwrap();

    assert_eq!(ended.points(), cancelled.points());
    assert_eq!(ended.settings(), cancelled.settings());
}

#[test]
fn test_undo_then_redo_is_identity_for_any_length() {
    for len in 0..6 {
        let mut history = HistoryManager::default();
        for _ in 0..len {
            history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
        }
        let before = history.snapshot();
        if history.undo() {
            assert!(history.redo());
        }
        assert_eq!(history.snapshot(), before, "scene of {len} strokes");
    }
}

#[test]
fn test_random_interleavings_keep_invariants() {
    // Small LCG so the sequence is reproducible without extra dependencies.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as u32
    };

    let mut history = HistoryManager::default();
    for _ in 0..500 {
        let before = history.snapshot();
        match next() % 4 {
            0 => {
                history.commit_stroke(make_stroke(Tool::Draw, 10.0, 3));
                assert!(!history.can_redo());
            }
            1 => {
                let could_undo = history.can_undo();
                assert_eq!(history.undo(), could_undo);
                if could_undo {
                    assert!(history.redo());
                    assert_eq!(history.snapshot(), before);
                    history.undo();
                }
            }
            2 => {
                let could_redo = history.can_redo();
                assert_eq!(history.redo(), could_redo);
            }
            _ => {
                let was_empty = before.is_empty();
                assert_eq!(history.clear(), !was_empty);
                assert!(history.scene().is_empty());
            }
        }

        let scene_ids = ids(history.scene());
        let mut unique = scene_ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), scene_ids.len(), "duplicate stroke in scene");
    }
}
