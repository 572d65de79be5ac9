mod canvas;
mod projection;

pub use canvas::{
    ClipRect, ConsoleCanvas, DrawCommand, DrawList, Rect, TextParams, TextStyle, Vec2, Viewport,
};
pub use projection::{
    background_opacity, clip_above_input, project_entries, refit_scroll, severity_color,
    with_opacity, ERROR_COLOR, WARNING_COLOR,
};
