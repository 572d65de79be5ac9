use serde::{Deserialize, Serialize};

const MONOSPACE_ADVANCE_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scissor rectangle in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn unbounded() -> Self {
        Self {
            left: 0,
            top: 0,
            right: i32::MAX,
            bottom: i32::MAX,
        }
    }
}

/// Logical viewport the console overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scale_factor: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub fn logical_to_physical(&self, value: f32) -> i32 {
        (value * self.scale_factor) as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextStyle {
    pub size: f32,
    pub row_spacing: f32,
    pub color: [u8; 4],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 16.0,
            row_spacing: 0.0,
            color: [249, 249, 249, 255],
        }
    }
}

impl TextStyle {
    pub fn line_height(&self) -> f32 {
        self.size + self.row_spacing
    }
}

/// Everything a single text draw needs.
///
/// `cursor` is relative to `position`; drawing returns the cursor where the
/// next draw continues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextParams {
    pub position: Vec2,
    pub cursor: Vec2,
    pub h_wrap: Option<f32>,
    pub style: TextStyle,
}

impl TextParams {
    pub fn new(style: TextStyle) -> Self {
        Self {
            position: Vec2::ZERO,
            cursor: Vec2::ZERO,
            h_wrap: None,
            style,
        }
    }
}

/// Text measurement and drawing backend the console renders through.
pub trait ConsoleCanvas {
    fn measure_height(&self, text: &str, params: &TextParams) -> f32;

    fn draw_text(&mut self, text: &str, params: &TextParams) -> Vec2;

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]);

    fn set_clip(&mut self, clip: ClipRect);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: [u8; 4] },
    Text { text: String, origin: Vec2, color: [u8; 4] },
    SetClip(ClipRect),
}

/// Recording canvas with monospace metrics.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clips(&self) -> impl Iterator<Item = ClipRect> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::SetClip(clip) => Some(*clip),
            _ => None,
        })
    }
}

impl ConsoleCanvas for DrawList {
    fn measure_height(&self, text: &str, params: &TextParams) -> f32 {
        let end = layout_cursor(text, Vec2::ZERO, params);
        let line_height = params.style.line_height();
        if end.x > 0.0 {
            end.y + line_height
        } else {
            end.y
        }
    }

    fn draw_text(&mut self, text: &str, params: &TextParams) -> Vec2 {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin: Vec2::new(
                params.position.x + params.cursor.x,
                params.position.y + params.cursor.y,
            ),
            color: params.style.color,
        });
        layout_cursor(text, params.cursor, params)
    }

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn set_clip(&mut self, clip: ClipRect) {
        self.commands.push(DrawCommand::SetClip(clip));
    }
}

fn layout_cursor(text: &str, start: Vec2, params: &TextParams) -> Vec2 {
    let advance = params.style.size * MONOSPACE_ADVANCE_RATIO;
    let line_height = params.style.line_height();
    let mut cursor = start;
    for ch in text.chars() {
        if ch == '\n' {
            cursor.x = 0.0;
            cursor.y += line_height;
            continue;
        }
        if let Some(wrap) = params.h_wrap {
            if cursor.x > 0.0 && cursor.x + advance > wrap {
                cursor.x = 0.0;
                cursor.y += line_height;
            }
        }
        cursor.x += advance;
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TextParams {
        TextParams::new(TextStyle {
            size: 10.0,
            row_spacing: 2.0,
            color: [1, 2, 3, 255],
        })
    }

    #[test]
    fn measure_counts_newline_terminated_lines() {
        let canvas = DrawList::new();
        assert_eq!(canvas.measure_height("", &params()), 0.0);
        assert_eq!(canvas.measure_height("a\n", &params()), 12.0);
        assert_eq!(canvas.measure_height("a\nb\nc", &params()), 36.0);
    }

    #[test]
    fn wrapping_adds_lines() {
        let canvas = DrawList::new();
        let mut wrapped = params();
        wrapped.h_wrap = Some(20.0);
        // 5px advance, 4 glyphs per row.
        assert_eq!(canvas.measure_height("abcdefgh\n", &wrapped), 24.0);
    }

    #[test]
    fn draw_returns_cursor_for_next_line() {
        let mut canvas = DrawList::new();
        let mut params = params();
        params.position = Vec2::new(5.0, 100.0);

        params.cursor = canvas.draw_text("one\n", &params);
        assert_eq!(params.cursor, Vec2::new(0.0, 12.0));
        canvas.draw_text("two\n", &params);

        assert_eq!(
            canvas.commands()[1],
            DrawCommand::Text {
                text: "two\n".to_string(),
                origin: Vec2::new(5.0, 112.0),
                color: [1, 2, 3, 255],
            }
        );
    }
}
