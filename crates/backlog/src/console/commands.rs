use std::collections::{BTreeMap, VecDeque};

use thiserror::Error;

use crate::log::{LogStore, ParseSeverityError, Severity};
use crate::util::push_bounded;

const MAX_PENDING_HOST_COMMANDS: usize = 128;

/// Runs lines submitted at the console prompt.
pub trait CommandExecutor {
    fn execute(&mut self, command: &str, store: &LogStore);
}

impl<F> CommandExecutor for F
where
    F: FnMut(&str, &LogStore),
{
    fn execute(&mut self, command: &str, store: &LogStore) {
        self(command, store)
    }
}

/// A line addressed to the host application rather than the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no such command '{0}' (type help for a list)")]
    Unknown(String),
    #[error("{command} takes no arguments")]
    UnexpectedArgs { command: &'static str },
    #[error("{command} takes at most one argument")]
    TooManyArgs { command: &'static str },
    #[error("{command} needs {expected}")]
    MissingArgs {
        command: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Level(#[from] ParseSeverityError),
    #[error("unbalanced quote in command line")]
    UnbalancedQuote,
    #[error("host command name cannot be blank")]
    BlankName,
    #[error("'{0}' is already a command")]
    NameTaken(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Help,
    Clear,
    Echo,
    LogLevel,
    Flush,
}

impl Builtin {
    const ALL: [Builtin; 5] = [
        Builtin::Help,
        Builtin::Clear,
        Builtin::Echo,
        Builtin::LogLevel,
        Builtin::Flush,
    ];

    fn name(self) -> &'static str {
        match self {
            Builtin::Help => "help",
            Builtin::Clear => "clear",
            Builtin::Echo => "echo",
            Builtin::LogLevel => "log_level",
            Builtin::Flush => "flush",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Builtin::Help => "list commands",
            Builtin::Clear => "empty the console output",
            Builtin::Echo => "print the arguments",
            Builtin::LogLevel => "show or set the lowest admitted severity",
            Builtin::Flush => "write the log file now",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.name().eq_ignore_ascii_case(name))
    }
}

/// Default [`CommandExecutor`]: the console's builtins plus host commands the
/// application opted into, which are queued instead of run.
#[derive(Debug, Default)]
pub struct ConsoleCommands {
    host_commands: BTreeMap<String, String>,
    pending: VecDeque<HostCommand>,
}

impl ConsoleCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `name` as a host command. Names match case-insensitively and
    /// may not shadow a builtin.
    pub fn with_host_command(
        mut self,
        name: &str,
        summary: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let key = name.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(CommandError::BlankName);
        }
        if Builtin::lookup(&key).is_some() || self.host_commands.contains_key(&key) {
            return Err(CommandError::NameTaken(name.to_string()));
        }
        self.host_commands.insert(key, summary.into());
        Ok(self)
    }

    /// Hands over queued host commands, oldest first.
    pub fn take_host_commands(&mut self) -> Vec<HostCommand> {
        self.pending.drain(..).collect()
    }

    fn run(&mut self, line: &str, store: &LogStore) -> Result<(), CommandError> {
        let mut words = split_words(line)?.into_iter();
        let Some(name) = words.next() else {
            return Ok(());
        };
        let args: Vec<String> = words.collect();

        if let Some(builtin) = Builtin::lookup(&name) {
            return self.run_builtin(builtin, &args, store);
        }

        let key = name.to_ascii_lowercase();
        if !self.host_commands.contains_key(&key) {
            return Err(CommandError::Unknown(name));
        }
        push_bounded(
            &mut self.pending,
            HostCommand { name: key, args },
            MAX_PENDING_HOST_COMMANDS,
        );
        Ok(())
    }

    fn run_builtin(
        &self,
        builtin: Builtin,
        args: &[String],
        store: &LogStore,
    ) -> Result<(), CommandError> {
        match (builtin, args) {
            (Builtin::Echo, []) => Err(CommandError::MissingArgs {
                command: "echo",
                expected: "some text",
            }),
            (Builtin::Echo, words) => {
                store.append(words.join(" "), Severity::Default);
                Ok(())
            }
            (Builtin::LogLevel, []) => {
                store.append(
                    format!("filter level is {}", store.filter_level()),
                    Severity::Default,
                );
                Ok(())
            }
            (Builtin::LogLevel, [raw]) => {
                let level: Severity = raw.parse()?;
                store.set_filter_level(level);
                store.append(format!("filter level set to {level}"), Severity::Default);
                Ok(())
            }
            (Builtin::LogLevel, _) => Err(CommandError::TooManyArgs {
                command: "log_level",
            }),
            (other, [_, ..]) => Err(CommandError::UnexpectedArgs {
                command: other.name(),
            }),
            (Builtin::Help, []) => {
                for builtin in Builtin::ALL {
                    store.append(
                        format!("{:<10} {}", builtin.name(), builtin.summary()),
                        Severity::Default,
                    );
                }
                for (name, summary) in &self.host_commands {
                    store.append(format!("{name:<10} {summary}"), Severity::Default);
                }
                Ok(())
            }
            (Builtin::Clear, []) => {
                store.clear();
                Ok(())
            }
            (Builtin::Flush, []) => {
                match store.flush() {
                    Ok(()) => store.append("log file written", Severity::Default),
                    Err(error) => store.append(error.to_string(), Severity::Warning),
                }
                Ok(())
            }
        }
    }
}

impl CommandExecutor for ConsoleCommands {
    fn execute(&mut self, command: &str, store: &LogStore) {
        if let Err(error) = self.run(command, store) {
            store.append(error.to_string(), Severity::Error);
        }
    }
}

/// Splits on whitespace; double quotes group words and may be empty.
fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let pieces: Vec<&str> = line.split('"').collect();
    if pieces.len() % 2 == 0 {
        return Err(CommandError::UnbalancedQuote);
    }

    let mut words = Vec::new();
    let mut current: Option<String> = None;
    for (index, piece) in pieces.into_iter().enumerate() {
        if index % 2 == 1 {
            current.get_or_insert_with(String::new).push_str(piece);
            continue;
        }
        for (n, word) in piece.split(char::is_whitespace).enumerate() {
            if n > 0 {
                words.extend(current.take());
            }
            if !word.is_empty() {
                current.get_or_insert_with(String::new).push_str(word);
            }
        }
    }
    words.extend(current);
    Ok(words)
}
