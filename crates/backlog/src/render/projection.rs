use crate::log::{LogEntry, Severity};

use super::canvas::{ClipRect, ConsoleCanvas, TextParams, Vec2, Viewport};

pub const WARNING_COLOR: [u8; 4] = [238, 210, 2, 255];
pub const ERROR_COLOR: [u8; 4] = [255, 72, 72, 255];

const MAX_BACKGROUND_OPACITY: f32 = 0.9;

/// Text color for an entry of `level`; `default_color` covers the untagged
/// severities.
pub fn severity_color(level: Severity, default_color: [u8; 4]) -> [u8; 4] {
    match level {
        Severity::None | Severity::Default => default_color,
        Severity::Warning => WARNING_COLOR,
        Severity::Error | Severity::Critical => ERROR_COLOR,
    }
}

/// Draws `entries` in order, each continuing at the cursor the previous draw
/// returned. Returns the final cursor.
pub fn project_entries(
    entries: &[LogEntry],
    params: &TextParams,
    canvas: &mut dyn ConsoleCanvas,
) -> Vec2 {
    let default_color = params.style.color;
    let mut params = *params;
    for entry in entries {
        params.style.color = severity_color(entry.level(), default_color);
        params.cursor = canvas.draw_text(entry.text(), &params);
    }
    params.cursor
}

/// Scissor for the output area: viewport origin down to `gap` above the input
/// field.
pub fn clip_above_input(input_top: f32, gap: f32, viewport: &Viewport) -> ClipRect {
    ClipRect {
        left: 0,
        top: 0,
        right: viewport.logical_to_physical(viewport.width),
        bottom: viewport.logical_to_physical(input_top - gap).max(0),
    }
}

/// Scroll offset that keeps the last line of `text_height` tall output at
/// least `bottom_margin` above the viewport bottom.
pub fn refit_scroll(scroll: f32, text_height: f32, viewport_height: f32, bottom_margin: f32) -> f32 {
    let limit = viewport_height - bottom_margin;
    if scroll + text_height > limit {
        limit - text_height
    } else {
        scroll
    }
}

/// Background fades out as the console slides away.
pub fn background_opacity(position: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 {
        return 0.0;
    }
    let hidden_fraction = (-position / viewport_height).clamp(0.0, 1.0);
    MAX_BACKGROUND_OPACITY * (1.0 - hidden_fraction)
}

pub fn with_opacity(color: [u8; 4], opacity: f32) -> [u8; 4] {
    let alpha = (color[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    [color[0], color[1], color[2], alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList, TextStyle};

    #[test]
    fn entries_are_colored_by_severity() {
        let entries = vec![
            LogEntry::format("plain", Severity::Default),
            LogEntry::format("careful", Severity::Warning),
            LogEntry::format("broken", Severity::Error),
            LogEntry::format("dead", Severity::Critical),
        ];
        let style = TextStyle::default();
        let mut canvas = DrawList::new();

        project_entries(&entries, &TextParams::new(style), &mut canvas);

        let colors: Vec<[u8; 4]> = canvas
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(
            colors,
            vec![style.color, WARNING_COLOR, ERROR_COLOR, ERROR_COLOR]
        );
    }

    #[test]
    fn entries_advance_one_line_each() {
        let entries = vec![
            LogEntry::format("a", Severity::Default),
            LogEntry::format("b", Severity::Default),
        ];
        let mut params = TextParams::new(TextStyle::default());
        params.position = Vec2::new(5.0, -40.0);
        let mut canvas = DrawList::new();

        let end = project_entries(&entries, &params, &mut canvas);

        let line = TextStyle::default().line_height();
        assert_eq!(end, Vec2::new(0.0, 2.0 * line));
        assert_eq!(
            canvas.commands()[1],
            DrawCommand::Text {
                text: "b\n".to_string(),
                origin: Vec2::new(5.0, -40.0 + line),
                color: TextStyle::default().color,
            }
        );
    }

    #[test]
    fn clip_stops_above_input_field() {
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
            scale_factor: 2.0,
        };
        let clip = clip_above_input(580.0, 15.0, &viewport);
        assert_eq!(
            clip,
            ClipRect {
                left: 0,
                top: 0,
                right: 1600,
                bottom: 1130,
            }
        );
    }

    #[test]
    fn clip_never_goes_negative_while_sliding_out() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(clip_above_input(5.0, 15.0, &viewport).bottom, 0);
    }

    #[test]
    fn refit_pulls_tall_text_back_into_view() {
        assert_eq!(refit_scroll(0.0, 1000.0, 720.0, 50.0), -330.0);
        assert_eq!(refit_scroll(0.0, 100.0, 720.0, 50.0), 0.0);
        assert_eq!(refit_scroll(-500.0, 1000.0, 720.0, 50.0), -500.0);
    }

    #[test]
    fn background_fades_with_slide_position() {
        assert!((background_opacity(0.0, 600.0) - 0.9).abs() < 1e-6);
        assert!((background_opacity(-300.0, 600.0) - 0.45).abs() < 1e-6);
        assert_eq!(background_opacity(-600.0, 600.0), 0.0);
        assert_eq!(with_opacity([10, 20, 30, 200], 0.5), [10, 20, 30, 100]);
    }
}
