mod commands;
mod history;
mod input;
mod input_field;
mod state;

pub use commands::{CommandError, CommandExecutor, ConsoleCommands, HostCommand};
pub use history::{CommandHistory, DEFAULT_MAX_HISTORY};
pub use input::{ConsoleInput, ConsoleKey, InputCollector};
pub use input_field::{FieldState, InputField, LineInput, MAX_LINE_CHARS};
pub use state::{next_position, Console, SlidePhase};
