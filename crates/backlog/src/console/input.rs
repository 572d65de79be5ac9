use winit::event::{ElementState, KeyEvent, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleKey {
    Toggle,
    Cancel,
    HistoryPrev,
    HistoryNext,
    PageUp,
    PageDown,
    Submit,
    Backspace,
}

const KEY_COUNT: usize = 8;

impl ConsoleKey {
    const fn index(self) -> usize {
        match self {
            ConsoleKey::Toggle => 0,
            ConsoleKey::Cancel => 1,
            ConsoleKey::HistoryPrev => 2,
            ConsoleKey::HistoryNext => 3,
            ConsoleKey::PageUp => 4,
            ConsoleKey::PageDown => 5,
            ConsoleKey::Submit => 6,
            ConsoleKey::Backspace => 7,
        }
    }

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Home | KeyCode::Backquote => Some(ConsoleKey::Toggle),
            KeyCode::Escape => Some(ConsoleKey::Cancel),
            KeyCode::ArrowUp => Some(ConsoleKey::HistoryPrev),
            KeyCode::ArrowDown => Some(ConsoleKey::HistoryNext),
            KeyCode::PageUp => Some(ConsoleKey::PageUp),
            KeyCode::PageDown => Some(ConsoleKey::PageDown),
            KeyCode::Enter | KeyCode::NumpadEnter => Some(ConsoleKey::Submit),
            KeyCode::Backspace => Some(ConsoleKey::Backspace),
            _ => None,
        }
    }
}

/// Console input for one frame: key edges, held keys, wheel and typed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleInput {
    pressed: [bool; KEY_COUNT],
    down: [bool; KEY_COUNT],
    backspace_presses: u32,
    wheel_delta: f32,
    typed_text: String,
}

impl ConsoleInput {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True only on the frame the key went down.
    pub fn pressed(&self, key: ConsoleKey) -> bool {
        self.pressed[key.index()]
    }

    pub fn is_down(&self, key: ConsoleKey) -> bool {
        self.down[key.index()]
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Includes key repeats.
    pub fn backspace_presses(&self) -> u32 {
        self.backspace_presses
    }

    pub fn with_pressed(mut self, key: ConsoleKey) -> Self {
        self.pressed[key.index()] = true;
        self.down[key.index()] = true;
        if key == ConsoleKey::Backspace {
            self.backspace_presses += 1;
        }
        self
    }

    pub fn with_held(mut self, key: ConsoleKey) -> Self {
        self.down[key.index()] = true;
        self
    }

    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.typed_text.push_str(text.as_ref());
        self
    }

    pub fn with_wheel(mut self, delta: f32) -> Self {
        self.wheel_delta += delta;
        self
    }
}

/// Accumulates window events between frames and hands out one
/// [`ConsoleInput`] per frame.
#[derive(Debug, Default)]
pub struct InputCollector {
    down: [bool; KEY_COUNT],
    pressed_edges: [bool; KEY_COUNT],
    backspace_presses: u32,
    wheel_delta: f32,
    typed_text: String,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key_event(&mut self, key_event: &KeyEvent) {
        let consumed = match key_event.physical_key {
            PhysicalKey::Code(code) => self.handle_key_code(code, key_event.state),
            PhysicalKey::Unidentified(_) => false,
        };
        if consumed || key_event.state != ElementState::Pressed {
            return;
        }

        if let Some(text) = key_event.text.as_ref() {
            self.handle_text(text);
        }
    }

    /// Returns whether `code` is a console key; such keys never produce text.
    pub fn handle_key_code(&mut self, code: KeyCode, state: ElementState) -> bool {
        let Some(key) = ConsoleKey::from_key_code(code) else {
            return false;
        };

        let index = key.index();
        match state {
            ElementState::Pressed => {
                if !self.down[index] {
                    self.pressed_edges[index] = true;
                }
                self.down[index] = true;
                if key == ConsoleKey::Backspace {
                    self.backspace_presses = self.backspace_presses.saturating_add(1);
                }
            }
            ElementState::Released => self.down[index] = false,
        }
        true
    }

    pub fn handle_text(&mut self, text: &str) {
        self.typed_text.push_str(text);
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel_delta += wheel_lines_from_scroll_delta(delta);
    }

    pub fn snapshot_for_frame(&mut self) -> ConsoleInput {
        let snapshot = ConsoleInput {
            pressed: self.pressed_edges,
            down: self.down,
            backspace_presses: self.backspace_presses,
            wheel_delta: self.wheel_delta,
            typed_text: std::mem::take(&mut self.typed_text),
        };
        self.pressed_edges = [false; KEY_COUNT];
        self.backspace_presses = 0;
        self.wheel_delta = 0.0;
        snapshot
    }
}

fn wheel_lines_from_scroll_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => {
            if position.y > 0.0 {
                1.0
            } else if position.y < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
    }
}
