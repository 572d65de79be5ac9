use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use backlog::render::{DrawList, Viewport};
use backlog::{Console, ConsoleCommands, ConsoleConfig, InputCollector, LogStore, Severity};
use tracing::{error, info};

use super::bootstrap::{AppWiring, DemoError};
use super::script;

const FIXED_DT_SECONDS: f32 = 1.0 / 60.0;
const PRODUCER_COUNT: usize = 3;
const PRODUCER_INTERVAL: Duration = Duration::from_millis(4);
const PRODUCER_MAX_MESSAGES: u32 = 200;
const FRAME_LOG_INTERVAL: u32 = 60;
const QUIT_COMMAND: &str = "quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) frames_run: u32,
    pub(crate) entries_retained: usize,
    pub(crate) quit_requested: bool,
}

/// Owns the store for the whole run; dropping it performs the final flush on
/// every exit path.
struct DemoContext {
    store: Arc<LogStore>,
    console: Console<ConsoleCommands>,
}

impl Drop for DemoContext {
    fn drop(&mut self) {
        self.store.shutdown();
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_frames(&app.config, app.frames) {
        Ok(summary) => {
            info!(
                frames = summary.frames_run,
                entries = summary.entries_retained,
                quit_requested = summary.quit_requested,
                "demo_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "demo_failed");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn run_frames(config: &ConsoleConfig, frames: u32) -> Result<RunSummary, DemoError> {
    let store = Arc::new(LogStore::from_config(config));
    let commands = ConsoleCommands::new().with_host_command(QUIT_COMMAND, "stop the demo")?;
    let mut context = DemoContext {
        console: Console::new(Arc::clone(&store), commands, config),
        store,
    };

    let stop = AtomicBool::new(false);
    let summary = thread::scope(|scope| -> Result<RunSummary, DemoError> {
        for producer_index in 0..PRODUCER_COUNT {
            let store = Arc::clone(&context.store);
            let stop = &stop;
            thread::Builder::new()
                .name(format!("producer-{producer_index}"))
                .spawn_scoped(scope, move || produce(producer_index, &store, stop))
                .map_err(DemoError::Spawn)?;
        }

        let summary = drive_frames(&mut context, frames);
        stop.store(true, Ordering::Relaxed);
        Ok(summary)
    })?;

    context.store.flush()?;
    Ok(summary)
}

fn drive_frames(context: &mut DemoContext, frames: u32) -> RunSummary {
    let viewport = Viewport::default();
    let mut collector = InputCollector::new();
    let mut canvas = DrawList::new();
    let mut frames_run = 0;
    let mut quit_requested = false;

    for frame in 0..frames {
        let input = script::input_for_frame(frame, &mut collector);
        context.console.update(&input, FIXED_DT_SECONDS, viewport);
        canvas.clear();
        context.console.draw(&mut canvas);
        frames_run = frame + 1;

        if frame % FRAME_LOG_INTERVAL == 0 {
            info!(
                frame,
                entries = context.store.len(),
                draw_commands = canvas.len(),
                unseen = %context.console.unseen_level(),
                "demo_frame"
            );
        }

        let host_commands = context.console.executor_mut().take_host_commands();
        if host_commands
            .iter()
            .any(|command| command.name == QUIT_COMMAND)
        {
            info!(frame, "quit_requested");
            quit_requested = true;
            break;
        }
    }

    RunSummary {
        frames_run,
        entries_retained: context.store.len(),
        quit_requested,
    }
}

fn produce(producer_index: usize, store: &LogStore, stop: &AtomicBool) {
    for sequence in 0..PRODUCER_MAX_MESSAGES {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let level = match sequence % 50 {
            49 => Severity::Error,
            n if n % 10 == 9 => Severity::Warning,
            _ => Severity::Default,
        };
        store.append(
            format!("producer {producer_index}: tick {sequence}"),
            level,
        );
        thread::sleep(PRODUCER_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn config_in(dir: &TempDir) -> ConsoleConfig {
        ConsoleConfig {
            log_file: Some(dir.path().join("log.txt")),
            ..ConsoleConfig::default()
        }
    }

    #[test]
    fn scripted_run_stops_on_quit_and_writes_log_file() {
        let dir = TempDir::new().expect("temp dir");
        let config = config_in(&dir);

        let summary = run_frames(&config, 400).expect("demo run");

        assert!(summary.quit_requested);
        assert_eq!(summary.frames_run, 237);
        assert!(summary.entries_retained <= config.max_entries);

        let written = fs::read_to_string(dir.path().join("log.txt")).expect("log file");
        assert!(written.contains("hello from the demo\n"));
        assert!(written.contains("quoted words stay together\n"));
        assert!(written.contains("[Error] no such command 'bogus' (type help for a list)\n"));
    }

    #[test]
    fn short_run_ends_before_quit_is_typed() {
        let dir = TempDir::new().expect("temp dir");

        let summary = run_frames(&config_in(&dir), 30).expect("demo run");

        assert!(!summary.quit_requested);
        assert_eq!(summary.frames_run, 30);
        assert!(dir.path().join("log.txt").exists());
    }

    #[test]
    fn producers_write_in_their_own_order() {
        let store = LogStore::new(1_000);
        let stop = AtomicBool::new(false);

        produce(7, &store, &stop);

        let ticks: Vec<u32> = store
            .snapshot()
            .iter()
            .filter_map(|entry| {
                entry
                    .text()
                    .trim_end()
                    .rsplit(' ')
                    .next()
                    .and_then(|tick| tick.parse().ok())
            })
            .collect();
        assert_eq!(ticks.len(), PRODUCER_MAX_MESSAGES as usize);
        assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
