use std::sync::Arc;

use tracing::debug;

use crate::config::ConsoleConfig;
use crate::log::{LogStore, Severity};
use crate::render::{
    background_opacity, clip_above_input, project_entries, refit_scroll, with_opacity, ClipRect,
    ConsoleCanvas, Rect, TextParams, TextStyle, Vec2, Viewport,
};

use super::commands::CommandExecutor;
use super::history::CommandHistory;
use super::input::{ConsoleInput, ConsoleKey};
use super::input_field::{FieldState, InputField, LineInput};

const PROMPT_PREFIX: &str = "> ";
const EXECUTION_DISABLED_MESSAGE: &str = "execution is disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidePhase {
    Hidden,
    Transitioning,
    Shown,
}

/// Slide position after `dt` seconds, clamped to `[-height, 0]`.
pub fn next_position(current: f32, target_visible: bool, speed: f32, dt: f32, height: f32) -> f32 {
    let step = speed * dt;
    let moved = if target_visible {
        current + step
    } else {
        current - step
    };
    moved.clamp(-height.max(0.0), 0.0)
}

/// The developer console: visibility and slide animation, scrolling, prompt
/// handling and rendering over a shared [`LogStore`].
///
/// `update` and `draw` belong to the driving thread. Producers only ever touch
/// the store.
pub struct Console<E: CommandExecutor> {
    store: Arc<LogStore>,
    history: CommandHistory,
    executor: E,
    input_field: Box<dyn InputField>,
    visible: bool,
    was_ever_enabled: bool,
    locked: bool,
    execution_blocked: bool,
    position: f32,
    scroll: f32,
    viewport: Viewport,
    slide_speed: f32,
    page_scroll_speed: f32,
    wheel_scroll_factor: f32,
    refit_bottom_margin: f32,
    input_height: f32,
    clip_gap: f32,
    text_left: f32,
    font: TextStyle,
    background_color: [u8; 4],
}

impl<E: CommandExecutor> Console<E> {
    pub fn new(store: Arc<LogStore>, executor: E, config: &ConsoleConfig) -> Self {
        let viewport = Viewport::default();
        Self {
            store,
            history: CommandHistory::new(config.max_history),
            executor,
            input_field: Box::new(LineInput::new()),
            visible: false,
            was_ever_enabled: false,
            locked: false,
            execution_blocked: config.execution_blocked,
            position: -viewport.height,
            scroll: 0.0,
            viewport,
            slide_speed: config.slide_speed,
            page_scroll_speed: config.page_scroll_speed,
            wheel_scroll_factor: config.wheel_scroll_factor,
            refit_bottom_margin: config.refit_bottom_margin,
            input_height: config.input_height,
            clip_gap: config.clip_gap,
            text_left: config.text_left,
            font: config.font,
            background_color: config.background_color,
        }
    }

    pub fn with_input_field(mut self, input_field: Box<dyn InputField>) -> Self {
        self.input_field = input_field;
        self
    }

    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn input_field(&self) -> &dyn InputField {
        self.input_field.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.visible
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn phase(&self) -> SlidePhase {
        if self.position <= -self.viewport.height {
            SlidePhase::Hidden
        } else if self.position < 0.0 {
            SlidePhase::Transitioning
        } else {
            SlidePhase::Shown
        }
    }

    /// Highest severity logged since the console last drew its output.
    pub fn unseen_level(&self) -> Severity {
        self.store.unseen_level()
    }

    pub fn toggle(&mut self) {
        if self.locked {
            self.visible = false;
            return;
        }
        self.visible = !self.visible;
        self.was_ever_enabled = true;
    }

    /// Hides the console and stops it from taking input until `unlock`.
    pub fn lock(&mut self) {
        self.locked = true;
        self.visible = false;
        self.input_field.deactivate();
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn block_execution(&mut self) {
        self.execution_blocked = true;
    }

    pub fn unblock_execution(&mut self) {
        self.execution_blocked = false;
    }

    pub fn is_execution_blocked(&self) -> bool {
        self.execution_blocked
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll += delta;
    }

    pub fn set_background_color(&mut self, color: [u8; 4]) {
        self.background_color = color;
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font.size = size;
    }

    pub fn set_font_row_spacing(&mut self, row_spacing: f32) {
        self.font.row_spacing = row_spacing;
    }

    pub fn set_font_color(&mut self, color: [u8; 4]) {
        self.font.color = color;
    }

    pub fn history_prev(&mut self) {
        if let Some(command) = self.history.prev() {
            self.input_field.set_text(&command);
            self.input_field.set_active();
        }
    }

    pub fn history_next(&mut self) {
        if let Some(command) = self.history.next() {
            self.input_field.set_text(&command);
            self.input_field.set_active();
        }
    }

    /// Runs one frame of input handling and slide animation.
    pub fn update(&mut self, input: &ConsoleInput, dt: f32, viewport: Viewport) {
        self.viewport = viewport;
        if self.store.take_scroll_reset() {
            self.scroll = 0.0;
        }

        if !self.locked {
            if input.pressed(ConsoleKey::Toggle) {
                self.toggle();
            }

            if self.is_active() {
                if input.pressed(ConsoleKey::Cancel) {
                    self.toggle();
                }
                if input.pressed(ConsoleKey::HistoryPrev) {
                    self.history_prev();
                }
                if input.pressed(ConsoleKey::HistoryNext) {
                    self.history_next();
                }
                if input.is_down(ConsoleKey::PageUp) {
                    self.scroll_by(self.page_scroll_speed * dt);
                }
                if input.is_down(ConsoleKey::PageDown) {
                    self.scroll_by(-self.page_scroll_speed * dt);
                }
                self.scroll_by(input.wheel_delta() * self.wheel_scroll_factor);

                if self.input_field.state() != FieldState::Active {
                    self.input_field.set_active();
                }
            } else {
                self.input_field.deactivate();
            }
        } else {
            self.input_field.deactivate();
        }

        self.position = next_position(
            self.position,
            self.visible,
            self.slide_speed,
            dt,
            viewport.height,
        );

        self.input_field
            .set_size(Vec2::new(viewport.width, self.input_height));
        self.input_field.set_pos(Vec2::new(
            0.0,
            viewport.height - self.input_height + self.position,
        ));
        if self.locked {
            return;
        }
        if let Some(line) = self.input_field.update(input, dt) {
            self.submit(&line);
        }
    }

    /// Handles an accepted prompt line. Blank lines are dropped.
    pub fn submit(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.input_field.set_text("");
            return;
        }

        self.history.record(line);
        self.store.append(line, Severity::Default);
        if self.execution_blocked {
            self.store
                .append(EXECUTION_DISABLED_MESSAGE, Severity::Error);
        } else {
            debug!(command = line, "console_command_submitted");
            self.executor.execute(line, &self.store);
        }
        self.input_field.set_text("");
    }

    /// Draws the overlay. Does nothing until the console has been opened once
    /// or while it is fully hidden.
    pub fn draw(&mut self, canvas: &mut dyn ConsoleCanvas) {
        if !self.was_ever_enabled || self.phase() == SlidePhase::Hidden {
            return;
        }

        let viewport = self.viewport;
        let opacity = background_opacity(self.position, viewport.height);
        canvas.fill_rect(
            Rect {
                x: 0.0,
                y: self.position,
                width: viewport.width,
                height: viewport.height,
            },
            with_opacity(self.background_color, opacity),
        );

        self.draw_input_field(canvas);

        let input_top = self.input_field.pos().y;
        canvas.set_clip(clip_above_input(input_top, self.clip_gap, &viewport));
        self.draw_output_text(canvas);
        canvas.set_clip(ClipRect::unbounded());
    }

    fn draw_input_field(&self, canvas: &mut dyn ConsoleCanvas) {
        let pos = self.input_field.pos();
        let size = self.input_field.size();
        canvas.fill_rect(
            Rect {
                x: pos.x,
                y: pos.y,
                width: size.x,
                height: size.y,
            },
            self.background_color,
        );

        let mut params = TextParams::new(self.font);
        params.position = Vec2::new(pos.x + self.text_left, pos.y);
        let prompt = format!("{PROMPT_PREFIX}{}", self.input_field.text());
        canvas.draw_text(&prompt, &params);
    }

    fn draw_output_text(&mut self, canvas: &mut dyn ConsoleCanvas) {
        // A `clear` run by this frame's submit lands after `update` looked.
        if self.store.take_scroll_reset() {
            self.scroll = 0.0;
        }

        let mut params = TextParams::new(self.font);
        params.h_wrap = Some(self.viewport.width - self.text_left);

        if self.store.take_refit_pending() {
            let text_height = canvas.measure_height(&self.store.concatenated_text(), &params);
            self.scroll = refit_scroll(
                self.scroll,
                text_height,
                self.viewport.height,
                self.refit_bottom_margin,
            );
        }

        params.position = Vec2::new(self.text_left, self.position + self.scroll);
        // Taken before the copy: anything logged from here on, including by
        // the canvas itself, raises the watermark again.
        self.store.take_unseen_level();
        // The canvas may log (and so lock the store) while drawing; it only
        // ever sees a copy.
        let entries = self.store.snapshot();
        project_entries(&entries, &params, canvas);
    }
}
