//! Interactive line commands
//!
//! Track and queue positions are 1-based, matching what `queue` and
//! `inspect` print.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One command typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Play catalog entry `n` now
    Play(usize),
    Pause,
    Resume,
    Toggle,
    Next,
    Previous,
    /// Seek to an absolute position in seconds
    Seek(f64),
    /// Set volume (0.0-1.0)
    Volume(f32),
    Mute,
    /// Append catalog entry `n` to the queue
    Add(usize),
    /// Append the whole catalog to the queue
    AddAll,
    /// Remove queue entry `n`
    Remove(usize),
    Clear,
    ShowQueue,
    ShowHistory,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{command}': '{value}' is not {expected}")]
    BadArgument {
        command: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Help text for the prompt
pub const HELP: &str = "\
Commands:
  play <n>      play catalog track n now
  pause         pause playback
  resume        resume playback
  toggle        toggle play/pause
  next          skip to the next queued track
  prev          restart, or go back in history
  seek <secs>   jump to a position
  vol <0..1>    set volume
  mute          toggle mute
  add <n>       queue catalog track n
  addall        queue the whole catalog
  rm <n>        remove queue entry n
  clear         empty the queue
  queue         show the queue
  history       show recently played tracks
  status        show what is playing
  help          show this help
  quit          stop and exit";

impl Command {
    /// Parse a prompt line; blank lines yield `None`
    pub fn parse_line(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match word.to_ascii_lowercase().as_str() {
            "play" | "p" => Command::Play(position("play", arg)?),
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "toggle" | "t" => Command::Toggle,
            "next" | "n" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "seek" => Command::Seek(number("seek", arg, "a number of seconds", |s: f64| {
                s.is_finite() && s >= 0.0
            })?),
            "vol" | "volume" => Command::Volume(number("vol", arg, "a volume between 0 and 1", |v: f32| {
                (0.0..=1.0).contains(&v)
            })?),
            "mute" | "m" => Command::Mute,
            "add" => Command::Add(position("add", arg)?),
            "addall" => Command::AddAll,
            "rm" | "remove" => Command::Remove(position("rm", arg)?),
            "clear" => Command::Clear,
            "queue" | "q" => Command::ShowQueue,
            "history" | "h" => Command::ShowHistory,
            "status" | "s" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse_line(s)?.ok_or_else(|| CommandError::Unknown(String::new()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Play(n) => write!(f, "play {n}"),
            Command::Pause => f.write_str("pause"),
            Command::Resume => f.write_str("resume"),
            Command::Toggle => f.write_str("toggle"),
            Command::Next => f.write_str("next"),
            Command::Previous => f.write_str("prev"),
            Command::Seek(secs) => write!(f, "seek {secs}"),
            Command::Volume(level) => write!(f, "vol {level}"),
            Command::Mute => f.write_str("mute"),
            Command::Add(n) => write!(f, "add {n}"),
            Command::AddAll => f.write_str("addall"),
            Command::Remove(n) => write!(f, "rm {n}"),
            Command::Clear => f.write_str("clear"),
            Command::ShowQueue => f.write_str("queue"),
            Command::ShowHistory => f.write_str("history"),
            Command::Status => f.write_str("status"),
            Command::Help => f.write_str("help"),
            Command::Quit => f.write_str("quit"),
        }
    }
}

/// 1-based position argument
fn position(command: &'static str, arg: Option<&str>) -> Result<usize, CommandError> {
    number(command, arg, "a position (1, 2, ...)", |n: usize| n >= 1)
}

fn number<T: FromStr>(
    command: &'static str,
    arg: Option<&str>,
    expected: &'static str,
    valid: impl Fn(T) -> bool,
) -> Result<T, CommandError>
where
    T: Copy,
{
    let raw = arg.ok_or(CommandError::MissingArgument { command, expected })?;
    raw.parse::<T>()
        .ok()
        .filter(|v| valid(*v))
        .ok_or_else(|| CommandError::BadArgument {
            command,
            value: raw.to_string(),
            expected,
        })
}
