use backlog::{ConsoleInput, InputCollector};
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Tap(KeyCode),
    Hold(KeyCode),
    Release(KeyCode),
    Type(&'static str),
    Wheel(f32),
}

/// Keystrokes the demo replays, keyed by frame number.
const SCRIPT: &[(u32, Step)] = &[
    (2, Step::Tap(KeyCode::Home)),
    (20, Step::Type("help")),
    (21, Step::Tap(KeyCode::Enter)),
    (40, Step::Type("echo hello from the demo")),
    (41, Step::Tap(KeyCode::Enter)),
    (60, Step::Type("echo \"quoted words\" stay together")),
    (61, Step::Tap(KeyCode::Enter)),
    (80, Step::Tap(KeyCode::ArrowUp)),
    (81, Step::Tap(KeyCode::ArrowUp)),
    (82, Step::Tap(KeyCode::Enter)),
    (100, Step::Hold(KeyCode::PageUp)),
    (110, Step::Release(KeyCode::PageUp)),
    (115, Step::Wheel(-3.0)),
    (130, Step::Type("bogus")),
    (131, Step::Tap(KeyCode::Enter)),
    (150, Step::Type("log_level warning")),
    (151, Step::Tap(KeyCode::Enter)),
    (170, Step::Tap(KeyCode::Escape)),
    (200, Step::Tap(KeyCode::Backquote)),
    (215, Step::Type("log_level default")),
    (216, Step::Tap(KeyCode::Enter)),
    (225, Step::Type("flush")),
    (226, Step::Tap(KeyCode::Enter)),
    (235, Step::Type("quit")),
    (236, Step::Tap(KeyCode::Enter)),
];

/// Feeds the scripted keystrokes for `frame` through `collector`, the same
/// path real window events take, and returns that frame's input.
pub(super) fn input_for_frame(frame: u32, collector: &mut InputCollector) -> ConsoleInput {
    for (_, step) in SCRIPT.iter().filter(|(at, _)| *at == frame) {
        match *step {
            Step::Tap(code) => {
                collector.handle_key_code(code, ElementState::Pressed);
                collector.handle_key_code(code, ElementState::Released);
            }
            Step::Hold(code) => {
                collector.handle_key_code(code, ElementState::Pressed);
            }
            Step::Release(code) => {
                collector.handle_key_code(code, ElementState::Released);
            }
            Step::Type(text) => collector.handle_text(text),
            Step::Wheel(lines) => {
                collector.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, lines));
            }
        }
    }
    collector.snapshot_for_frame()
}
