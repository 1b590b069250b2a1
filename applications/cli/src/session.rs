//! Interactive playback session
//!
//! Owns the controller and the loaded catalog, executes prompt commands and
//! prints controller events as they are drained.

use crate::command::{Command, HELP};
use crossbeam_channel::{never, select, Receiver};
use lyra_core::text::format_time;
use lyra_core::Track;
use lyra_playback::{PlaybackController, PlaybackEngine, PlaybackEvent, PlaybackState};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Whether the session should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going
    Continue,
    /// `quit` was entered
    Quit,
}

/// Prompt-driven player over a fixed catalog
///
/// Generic over the engine and the output sink so it can run against an
/// in-memory engine and a byte buffer.
pub struct Session<E: PlaybackEngine, W: Write> {
    player: PlaybackController<E>,
    catalog: Vec<Track>,
    out: W,
    last_state: PlaybackState,
}

impl<E: PlaybackEngine, W: Write> Session<E, W> {
    /// Wrap a controller; `out` receives everything the session prints
    pub fn new(player: PlaybackController<E>, catalog: Vec<Track>, out: W) -> Self {
        let last_state = player.state();
        Self {
            player,
            catalog,
            out,
            last_state,
        }
    }

    /// Controller being driven
    pub fn player(&self) -> &PlaybackController<E> {
        &self.player
    }

    /// Output written so far
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Queue the catalog from 1-based entry `start` and begin playback
    pub fn start(&mut self, start: usize) -> io::Result<()> {
        let skip = start.saturating_sub(1);
        if skip >= self.catalog.len() {
            writeln!(
                self.out,
                "Catalog has {} tracks; nothing to start at {}",
                self.catalog.len(),
                start
            )?;
            return Ok(());
        }

        info!(tracks = self.catalog.len() - skip, "Queueing catalog");
        self.player.enqueue_many(self.catalog[skip..].to_vec());
        self.report_events()
    }

    /// Parse and execute one prompt line
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match Command::parse_line(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute a command and print what it changed
    pub fn execute(&mut self, command: Command) -> io::Result<Flow> {
        debug!(%command, "Executing command");

        match command {
            Command::Play(n) => match self.catalog_track(n) {
                Some(track) => self.player.play_track(track),
                None => self.no_such_track(n)?,
            },
            Command::Pause => self.player.pause(),
            Command::Resume => self.player.resume(),
            Command::Toggle => self.player.toggle_play_pause(),
            Command::Next => self.player.skip_next(),
            Command::Previous => self.player.skip_previous(),
            Command::Seek(secs) => self.player.seek(secs),
            Command::Volume(level) => self.player.set_volume(level),
            Command::Mute => self.player.toggle_mute(),
            Command::Add(n) => match self.catalog_track(n) {
                Some(track) => {
                    writeln!(self.out, "Queued: {}", track.now_playing_title())?;
                    self.player.enqueue(track);
                }
                None => self.no_such_track(n)?,
            },
            Command::AddAll => {
                writeln!(self.out, "Queued {} tracks", self.catalog.len())?;
                self.player.enqueue_many(self.catalog.clone());
            }
            Command::Remove(n) => match n
                .checked_sub(1)
                .and_then(|i| self.player.remove_from_queue(i))
            {
                Some(track) => writeln!(self.out, "Removed: {}", track.now_playing_title())?,
                None => writeln!(self.out, "Nothing at queue position {n}")?,
            },
            Command::Clear => {
                self.player.clear_queue();
                writeln!(self.out, "Queue cleared")?;
            }
            Command::ShowQueue => self.print_queue()?,
            Command::ShowHistory => self.print_history()?,
            Command::Status => self.print_status()?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => {
                self.player.shutdown();
                self.report_events()?;
                return Ok(Flow::Quit);
            }
        }

        self.report_events()?;
        Ok(Flow::Continue)
    }

    /// Feed engine notices and the position ticker into the controller
    pub fn pump(&mut self) -> io::Result<()> {
        self.player.pump_engine();
        self.player.tick();
        self.report_events()
    }

    /// Run until `quit`, or until input closes and playback goes idle
    pub fn run(mut self, lines: Receiver<String>, tick: Duration) -> io::Result<()> {
        let mut lines = lines;
        let mut input_open = true;

        loop {
            let received = select! {
                recv(lines) -> line => Some(line),
                default(tick) => None,
            };

            match received {
                Some(Ok(line)) => {
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                Some(Err(_)) => {
                    debug!("Input closed; playing out the queue");
                    lines = never();
                    input_open = false;
                }
                None => {}
            }

            self.pump()?;

            if !input_open && self.player.state() == PlaybackState::Idle {
                break;
            }
        }

        self.player.shutdown();
        self.report_events()?;
        self.out.flush()
    }

    /// Print and discard pending controller events
    pub fn report_events(&mut self) -> io::Result<()> {
        for event in self.player.drain_events() {
            match event {
                PlaybackEvent::TrackChanged {
                    track_id: Some(id), ..
                } => {
                    let title = self
                        .player
                        .current_track()
                        .filter(|t| t.id == id)
                        .map_or(id, |t| t.now_playing_title());
                    writeln!(self.out, "Now playing: {title}")?;
                }
                PlaybackEvent::TrackChanged { track_id: None, .. } => {
                    writeln!(self.out, "Playback stopped")?;
                }
                PlaybackEvent::StateChanged { state } => {
                    match (self.last_state, state) {
                        (PlaybackState::Playing, PlaybackState::Paused) => {
                            writeln!(self.out, "Paused")?;
                        }
                        (PlaybackState::Paused, PlaybackState::Playing) => {
                            writeln!(self.out, "Resumed")?;
                        }
                        _ => {}
                    }
                    self.last_state = state;
                }
                PlaybackEvent::VolumeChanged { level, muted } => {
                    if muted {
                        writeln!(self.out, "Muted")?;
                    } else {
                        writeln!(self.out, "Volume: {}%", percent(level))?;
                    }
                }
                PlaybackEvent::Error { message } => {
                    writeln!(self.out, "Skipped: {message}")?;
                }
                PlaybackEvent::PositionUpdate {
                    position_secs,
                    duration_secs,
                } => {
                    trace!(position_secs, duration_secs, "Position");
                }
                PlaybackEvent::QueueChanged { length } => debug!(length, "Queue changed"),
                PlaybackEvent::HistoryChanged { length } => debug!(length, "History changed"),
            }
        }
        Ok(())
    }

    fn catalog_track(&self, n: usize) -> Option<Track> {
        n.checked_sub(1).and_then(|i| self.catalog.get(i)).cloned()
    }

    fn no_such_track(&mut self, n: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "No catalog track {n} (catalog has {})",
            self.catalog.len()
        )
    }

    fn print_queue(&mut self) -> io::Result<()> {
        if self.player.queue().is_empty() {
            return writeln!(self.out, "Queue is empty");
        }
        writeln!(self.out, "Up next:")?;
        for (i, track) in self.player.queue().iter().enumerate() {
            writeln!(self.out, "  {:>2}. {}", i + 1, track.now_playing_title())?;
        }
        Ok(())
    }

    fn print_history(&mut self) -> io::Result<()> {
        if self.player.history().is_empty() {
            return writeln!(self.out, "History is empty");
        }
        writeln!(self.out, "Recently played:")?;
        for (i, track) in self.player.history().iter().enumerate() {
            writeln!(self.out, "  {:>2}. {}", i + 1, track.now_playing_title())?;
        }
        Ok(())
    }

    fn print_status(&mut self) -> io::Result<()> {
        let volume = if self.player.is_muted() {
            "muted".to_string()
        } else {
            format!("{}%", percent(self.player.volume()))
        };

        let Some(track) = self.player.current_track() else {
            return writeln!(
                self.out,
                "[{:?}] nothing playing | vol {volume} | queue {}",
                self.player.state(),
                self.player.queue().len()
            );
        };

        let duration = if self.player.duration_secs() > 0.0 {
            self.player.duration_secs()
        } else {
            track.duration_hint_secs().unwrap_or(0.0)
        };

        writeln!(
            self.out,
            "[{:?}] {} {} / {} | vol {volume} | queue {}",
            self.player.state(),
            track.now_playing_title(),
            format_time(self.player.position_secs()),
            format_time(duration),
            self.player.queue().len()
        )?;

        if let Some(failure) = self.player.last_failure() {
            writeln!(self.out, "Last failure: {failure}")?;
        }
        Ok(())
    }
}

fn percent(level: f32) -> u32 {
    (level * 100.0).round() as u32
}
