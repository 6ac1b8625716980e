//! Command channel
//!
//! Tooling drives the simulation with six commands: `spin`, `pause`,
//! `resume`, `step`, `dump` and `toggleDebug`. Two encodings are accepted:
//!
//! ```text
//! {"cmd": "step", "frames": 3}
//! step 3
//! ```
//!
//! Command names are matched case-insensitively with `_` and `-` ignored, so
//! `toggleDebug`, `toggle_debug` and `TOGGLE-DEBUG` are the same command.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, CommandResult};

/// A parsed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Spin,
    Pause,
    Resume,
    /// Run `frames` updates, then stay paused
    Step { frames: u32 },
    /// Write one snapshot on this tick
    Dump,
    ToggleDebug,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Spin => "spin",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Step { .. } => "step",
            Command::Dump => "dump",
            Command::ToggleDebug => "toggleDebug",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    #[serde(alias = "command", alias = "type")]
    cmd: String,
    #[serde(default)]
    frames: Option<i64>,
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn step_frames(frames: Option<i64>) -> CommandResult<u32> {
    let frames = frames.unwrap_or(1);
    if frames < 1 {
        return Err(CommandError::InvalidStep(frames));
    }
    u32::try_from(frames).map_err(|_| CommandError::Malformed(format!("step frames {frames} too large")))
}

fn build(name: &str, frames: Option<i64>) -> CommandResult<Command> {
    let command = match normalize(name).as_str() {
        "spin" => Command::Spin,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "step" => Command::Step {
            frames: step_frames(frames)?,
        },
        "dump" => Command::Dump,
        "toggledebug" => Command::ToggleDebug,
        _ => return Err(CommandError::Unknown(name.to_string())),
    };

    if frames.is_some() && !matches!(command, Command::Step { .. }) {
        return Err(CommandError::Malformed(format!(
            "{} takes no arguments",
            command.name()
        )));
    }
    Ok(command)
}

/// Parse one message in either encoding
pub fn parse_command(raw: &str) -> CommandResult<Command> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CommandError::Empty);
    }

    if raw.starts_with('{') {
        let msg: RawCommand =
            serde_json::from_str(raw).map_err(|e| CommandError::Malformed(e.to_string()))?;
        return build(msg.cmd.trim(), msg.frames);
    }

    let mut tokens = raw.split_whitespace();
    let name = tokens.next().ok_or(CommandError::Empty)?;
    let frames = match tokens.next() {
        Some(arg) => Some(
            arg.parse::<i64>()
                .map_err(|_| CommandError::Malformed(format!("bad argument {arg:?}")))?,
        ),
        None => None,
    };
    if let Some(extra) = tokens.next() {
        return Err(CommandError::Malformed(format!("unexpected {extra:?}")));
    }
    build(name, frames)
}

/// Non-blocking source of raw command messages
pub trait CommandSource {
    /// At most one message per call. A returned message is consumed and never returned again.
    fn poll(&mut self) -> io::Result<Option<String>>;
}

/// In-memory FIFO, used by tests and embedders
#[derive(Debug, Default, Clone)]
pub struct QueueCommandSource {
    queue: VecDeque<String>,
}

impl QueueCommandSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.queue.push_back(message.into());
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for QueueCommandSource {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl CommandSource for QueueCommandSource {
    fn poll(&mut self) -> io::Result<Option<String>> {
        Ok(self.queue.pop_front())
    }
}

/// Single-message command file.
///
/// The whole file is one message. It is deleted once read; if deletion
/// fails, the contents are remembered so the same message is not applied
/// again on the next poll.
#[derive(Debug, Clone)]
pub struct FileCommandSource {
    path: PathBuf,
    stale: Option<String>,
}

impl FileCommandSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stale: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandSource for FileCommandSource {
    fn poll(&mut self) -> io::Result<Option<String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.stale = None;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let message = text.trim().to_string();

        match std::fs::remove_file(&self.path) {
            Ok(()) => self.stale = None,
            Err(e) => {
                log::warn!(
                    "Failed to consume command file {}: {}",
                    self.path.display(),
                    e
                );
                if self.stale.as_deref() == Some(message.as_str()) {
                    return Ok(None);
                }
                self.stale = Some(message.clone());
            }
        }

        if message.is_empty() {
            return Ok(None);
        }
        Ok(Some(message))
    }
}

impl CommandSource for Receiver<String> {
    fn poll(&mut self) -> io::Result<Option<String>> {
        match self.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }
}

/// A source that never yields anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn poll(&mut self) -> io::Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_commands() {
        assert_eq!(parse_command("spin"), Ok(Command::Spin));
        assert_eq!(parse_command("  PAUSE \n"), Ok(Command::Pause));
        assert_eq!(parse_command("resume"), Ok(Command::Resume));
        assert_eq!(parse_command("dump"), Ok(Command::Dump));
        assert_eq!(parse_command("step"), Ok(Command::Step { frames: 1 }));
        assert_eq!(parse_command("step 3"), Ok(Command::Step { frames: 3 }));
        assert_eq!(parse_command("toggleDebug"), Ok(Command::ToggleDebug));
        assert_eq!(parse_command("toggle_debug"), Ok(Command::ToggleDebug));
    }

    #[test]
    fn test_json_commands() {
        assert_eq!(parse_command(r#"{"cmd":"spin"}"#), Ok(Command::Spin));
        assert_eq!(
            parse_command(r#"{"cmd":"step","frames":3}"#),
            Ok(Command::Step { frames: 3 })
        );
        assert_eq!(
            parse_command(r#"{"command":"toggle_debug"}"#),
            Ok(Command::ToggleDebug)
        );
        assert_eq!(
            parse_command(r#"{"type":"toggleDebug"}"#),
            Ok(Command::ToggleDebug)
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("explode"),
            Err(CommandError::Unknown("explode".into()))
        );
        assert_eq!(parse_command("step 0"), Err(CommandError::InvalidStep(0)));
        assert_eq!(
            parse_command(r#"{"cmd":"step","frames":-2}"#),
            Err(CommandError::InvalidStep(-2))
        );
        assert!(matches!(parse_command("step many"), Err(CommandError::Malformed(_))));
        assert!(matches!(parse_command("spin 2"), Err(CommandError::Malformed(_))));
        assert!(matches!(parse_command("{not json"), Err(CommandError::Malformed(_))));
        assert!(matches!(parse_command(r#"{"frames":2}"#), Err(CommandError::Malformed(_))));
    }

    #[test]
    fn test_queue_source_fifo() {
        let mut source: QueueCommandSource = ["spin", "dump"].into_iter().collect();
        assert_eq!(source.poll().unwrap().as_deref(), Some("spin"));
        assert_eq!(source.poll().unwrap().as_deref(), Some("dump"));
        assert_eq!(source.poll().unwrap(), None);
    }

    #[test]
    fn test_channel_source() {
        let (tx, mut rx) = std::sync::mpsc::channel::<String>();
        tx.send("pause".into()).unwrap();
        assert_eq!(rx.poll().unwrap().as_deref(), Some("pause"));
        assert_eq!(rx.poll().unwrap(), None);
        drop(tx);
        assert_eq!(rx.poll().unwrap(), None);
    }
}
