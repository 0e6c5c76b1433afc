use egui::{
    Context, Event, Key, KeyboardShortcut, Modifiers, PointerButton, Pos2, Rect, TouchPhase,
};

use crate::stroke::{StrokePoint, Tool};

/// Brush widths bound to the number keys 1, 2 and 3.
pub const WIDTH_PRESETS: [f32; 3] = [5.0, 25.0, 50.0];

const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
const REDO: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::Z);

/// Keyboard commands understood by the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    SelectTool(Tool),
    SetWidth(f32),
}

/// Pointer and keyboard input, already translated into canvas terms.
///
/// Pointer positions are relative to the canvas origin.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(StrokePoint),
    PointerMove(StrokePoint),
    PointerUp,
    /// The stroke was interrupted (focus lost, pointer left the window).
    Cancel,
    Shortcut(ShortcutAction),
}

/// Turns raw egui input into [`InputEvent`]s for the canvas.
#[derive(Debug)]
pub struct InputHandler {
    canvas_rect: Rect,
    pointer_down: bool,
    last_pos: Option<Pos2>,
    /// Force of the most recent touch, if the device reports one.
    force: Option<f32>,
    /// Input time of the previous frame, in seconds.
    last_time: Option<f64>,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            pointer_down: false,
            last_pos: None,
            force: None,
            last_time: None,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    fn to_canvas(&self, pos: Pos2, time: f64) -> StrokePoint {
        let local = pos - self.canvas_rect.min;
        let timestamp = (time * 1000.0).round().max(0.0) as u64;
        StrokePoint::new(local.x, local.y, self.force, timestamp)
    }

    /// Process this frame's input, one pointer event per raw sample and in
    /// the order they arrived.
    ///
    /// A press only starts a stroke when `press_on_canvas` is set, i.e. the
    /// canvas widget and not some layer above it was hit. Shortcuts are
    /// skipped while a text field has focus.
    pub fn process_input(&mut self, ctx: &Context, press_on_canvas: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            // Samples arriving within one frame share its time span evenly.
            let now = input.time;
            let start = self.last_time.filter(|t| *t <= now).unwrap_or(now);
            let samples = input
                .raw
                .events
                .iter()
                .filter(|event| is_pointer_sample(event))
                .count();
            let mut sample = 0;
            let mut sample_time = || {
                sample += 1;
                start + (now - start) * sample as f64 / samples.max(1) as f64
            };

            for event in &input.raw.events {
                match event {
                    Event::Touch { phase, force, .. } => {
                        self.force = match phase {
                            TouchPhase::Start | TouchPhase::Move => *force,
                            TouchPhase::End | TouchPhase::Cancel => None,
                        };
                    }
                    Event::PointerGone | Event::WindowFocused(false) => {
                        if self.pointer_down {
                            events.push(InputEvent::Cancel);
                            self.pointer_down = false;
                            self.last_pos = None;
                        }
                    }
                    Event::PointerButton {
                        pos,
                        button: PointerButton::Primary,
                        pressed: true,
                        ..
                    } => {
                        let time = sample_time();
                        let on_canvas = press_on_canvas && self.canvas_rect.contains(*pos);
                        if on_canvas && !self.pointer_down {
                            events.push(InputEvent::PointerDown(self.to_canvas(*pos, time)));
                            self.pointer_down = true;
                            self.last_pos = Some(*pos);
                        }
                    }
                    Event::PointerButton {
                        pos,
                        button: PointerButton::Primary,
                        pressed: false,
                        ..
                    } => {
                        let time = sample_time();
                        if self.pointer_down {
                            if self.last_pos != Some(*pos) {
                                events.push(InputEvent::PointerMove(self.to_canvas(*pos, time)));
                            }
                            events.push(InputEvent::PointerUp);
                            self.pointer_down = false;
                            self.last_pos = None;
                        }
                    }
                    Event::PointerMoved(pos) => {
                        let time = sample_time();
                        if self.pointer_down && self.last_pos != Some(*pos) {
                            events.push(InputEvent::PointerMove(self.to_canvas(*pos, time)));
                            self.last_pos = Some(*pos);
                        }
                    }
                    _ => {}
                }
            }

            // The release can be lost, e.g. when it happens outside the window.
            if self.pointer_down && !input.pointer.primary_down() {
                events.push(InputEvent::PointerUp);
                self.pointer_down = false;
                self.last_pos = None;
            }

            self.last_time = Some(now);
        });

        if !ctx.wants_keyboard_input() {
            events.extend(Self::shortcuts(ctx).into_iter().map(InputEvent::Shortcut));
        }

        events
    }

    fn shortcuts(ctx: &Context) -> Vec<ShortcutAction> {
        ctx.input_mut(|input| {
            let mut actions = Vec::new();
            // Redo first: the undo shortcut would also match Shift+Z.
            if input.consume_shortcut(&REDO) {
                actions.push(ShortcutAction::Redo);
            }
            if input.consume_shortcut(&UNDO) {
                actions.push(ShortcutAction::Undo);
            }
            if input.consume_key(Modifiers::NONE, Key::B) {
                actions.push(ShortcutAction::SelectTool(Tool::Draw));
            }
            if input.consume_key(Modifiers::NONE, Key::E) {
                actions.push(ShortcutAction::SelectTool(Tool::Erase));
            }
            let presets = [Key::Num1, Key::Num2, Key::Num3].into_iter().zip(WIDTH_PRESETS);
            for (key, width) in presets {
                if input.consume_key(Modifiers::NONE, key) {
                    actions.push(ShortcutAction::SetWidth(width));
                }
            }
            actions
        })
    }
}

fn is_pointer_sample(event: &Event) -> bool {
    matches!(
        event,
        Event::PointerMoved(_)
            | Event::PointerButton {
                button: PointerButton::Primary,
                ..
            }
    )
}
