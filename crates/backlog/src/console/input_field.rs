use crate::render::Vec2;

use super::input::{ConsoleInput, ConsoleKey};

pub const MAX_LINE_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Idle,
    Active,
}

/// Single-line text widget the console types into.
pub trait InputField {
    fn set_text(&mut self, text: &str);

    fn text(&self) -> &str;

    fn set_active(&mut self);

    fn deactivate(&mut self);

    fn state(&self) -> FieldState;

    fn set_pos(&mut self, pos: Vec2);

    fn pos(&self) -> Vec2;

    fn set_size(&mut self, size: Vec2);

    fn size(&self) -> Vec2;

    /// Per-frame update. Returns the accepted line when the user submitted.
    fn update(&mut self, input: &ConsoleInput, dt: f32) -> Option<String>;
}

/// Minimal [`InputField`]: printable text, backspace and submit.
#[derive(Debug, Default)]
pub struct LineInput {
    text: String,
    state: FieldState,
    pos: Vec2,
    size: Vec2,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn append_printable_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            if self.text.chars().count() >= MAX_LINE_CHARS {
                break;
            }
            self.text.push(ch);
        }
    }
}

impl InputField for LineInput {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.append_printable_text(text);
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn set_active(&mut self) {
        self.state = FieldState::Active;
    }

    fn deactivate(&mut self) {
        self.state = FieldState::Idle;
    }

    fn state(&self) -> FieldState {
        self.state
    }

    fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn update(&mut self, input: &ConsoleInput, _dt: f32) -> Option<String> {
        if self.state != FieldState::Active {
            return None;
        }

        for _ in 0..input.backspace_presses() {
            self.text.pop();
        }
        self.append_printable_text(input.typed_text());

        input
            .pressed(ConsoleKey::Submit)
            .then(|| self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_field() -> LineInput {
        let mut field = LineInput::new();
        field.set_active();
        field
    }

    #[test]
    fn idle_field_ignores_input() {
        let mut field = LineInput::new();
        let input = ConsoleInput::empty()
            .with_text("abc")
            .with_pressed(ConsoleKey::Submit);

        assert_eq!(field.update(&input, 0.016), None);
        assert_eq!(field.text(), "");
    }

    #[test]
    fn typed_text_skips_control_characters() {
        let mut field = active_field();
        field.update(&ConsoleInput::empty().with_text("a\n\tb"), 0.016);
        assert_eq!(field.text(), "ab");
    }

    #[test]
    fn backspace_removes_characters_safely() {
        let mut field = active_field();
        field.set_text("ab");
        let input = ConsoleInput::empty()
            .with_pressed(ConsoleKey::Backspace)
            .with_pressed(ConsoleKey::Backspace)
            .with_pressed(ConsoleKey::Backspace);

        field.update(&input, 0.016);
        assert_eq!(field.text(), "");
    }

    #[test]
    fn submit_returns_current_line() {
        let mut field = active_field();
        let input = ConsoleInput::empty()
            .with_text("echo hi")
            .with_pressed(ConsoleKey::Submit);

        assert_eq!(field.update(&input, 0.016).as_deref(), Some("echo hi"));
    }

    #[test]
    fn line_has_character_cap() {
        let mut field = active_field();
        let over_limit = "x".repeat(MAX_LINE_CHARS + 20);
        field.update(&ConsoleInput::empty().with_text(over_limit), 0.016);
        assert_eq!(field.text().chars().count(), MAX_LINE_CHARS);
    }
}
