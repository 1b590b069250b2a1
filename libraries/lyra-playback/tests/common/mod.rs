//! Shared test infrastructure: a scriptable in-memory engine

#![allow(dead_code)]

use lyra_core::{MediaVariant, Track};
use lyra_playback::{
    EngineEvent, EngineNotice, HandleId, PlaybackController, PlaybackEngine, PlaybackError,
    PlayerConfig, Result,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Command observed by the mock engine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Play,
    Pause,
    Stop,
    Seek(f64),
    SetVolume(f32),
    Release,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    live: Option<HandleId>,
    playing: bool,
    position: f64,
    volume: f32,
    commands: Vec<Command>,
    pending: Vec<EngineNotice>,
    failing_urls: HashSet<String>,
    auto_start: Option<f64>,
    seek_step: Option<f64>,
}

/// Engine half handed to the controller
pub struct MockEngine {
    state: Rc<RefCell<MockState>>,
}

/// Test half used to script and inspect the engine
#[derive(Clone)]
pub struct MockHandle {
    state: Rc<RefCell<MockState>>,
}

pub fn mock_engine() -> (MockEngine, MockHandle) {
    let state = Rc::new(RefCell::new(MockState::default()));
    (
        MockEngine {
            state: Rc::clone(&state),
        },
        MockHandle { state },
    )
}

impl PlaybackEngine for MockEngine {
    fn load(&mut self, url: &str, volume: f32) -> Result<HandleId> {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Load(url.to_string()));

        if state.failing_urls.contains(url) {
            return Err(PlaybackError::Engine(format!("cannot open {}", url)));
        }

        state.next_id += 1;
        let handle = HandleId(state.next_id);
        state.live = Some(handle);
        state.volume = volume;
        state.position = 0.0;
        state.playing = false;

        if let Some(duration_secs) = state.auto_start {
            state
                .pending
                .push(EngineNotice::new(handle, EngineEvent::Loaded { duration_secs }));
            state.pending.push(EngineNotice::new(handle, EngineEvent::Started));
        }

        Ok(handle)
    }

    fn play(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Play);
        if state.live.is_some() {
            state.playing = true;
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Pause);
        state.playing = false;
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Stop);
        state.playing = false;
        state.position = 0.0;
    }

    fn seek(&mut self, seconds: f64) -> f64 {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Seek(seconds));
        let reached = match state.seek_step {
            Some(step) => (seconds / step).floor() * step,
            None => seconds,
        };
        state.position = reached;
        reached
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::SetVolume(volume));
        state.volume = volume;
    }

    fn position(&self) -> f64 {
        self.state.borrow().position
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Release);
        state.live = None;
        state.playing = false;
        state.position = 0.0;
    }

    fn poll_events(&mut self) -> Vec<EngineNotice> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}

impl MockHandle {
    /// Every load reports `Loaded { duration }` then `Started`
    pub fn auto_start(&self, duration_secs: f64) {
        self.state.borrow_mut().auto_start = Some(duration_secs);
    }

    /// Seeks land on the previous multiple of `step` seconds
    pub fn snap_seeks_to(&self, step: f64) {
        self.state.borrow_mut().seek_step = Some(step);
    }

    /// Make `load` fail synchronously for this URL
    pub fn fail_url(&self, url: &str) {
        self.state.borrow_mut().failing_urls.insert(url.to_string());
    }

    pub fn live(&self) -> Option<HandleId> {
        self.state.borrow().live
    }

    pub fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    pub fn set_position(&self, seconds: f64) {
        self.state.borrow_mut().position = seconds;
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    pub fn loads(&self) -> Vec<String> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Load(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn push(&self, handle: HandleId, event: EngineEvent) {
        self.state
            .borrow_mut()
            .pending
            .push(EngineNotice::new(handle, event));
    }

    /// Queue an event for the live handle
    pub fn emit(&self, event: EngineEvent) {
        let handle = self.live().expect("no live handle");
        self.push(handle, event);
    }
}

pub fn create_test_track(id: &str) -> Track {
    Track::new(id, format!("Track {}", id))
        .with_artists("Test Artist")
        .with_sources(vec![
            MediaVariant::new("96kbps", format!("https://cdn.test/{}_96.mp3", id)),
            MediaVariant::new("320kbps", url_for(id)),
        ])
}

pub fn url_for(id: &str) -> String {
    format!("https://cdn.test/{}_320.mp3", id)
}

/// Track whose variant list is empty
pub fn dead_track(id: &str) -> Track {
    Track::new(id, format!("Dead {}", id))
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| create_test_track(id)).collect()
}

pub fn controller() -> (PlaybackController<MockEngine>, MockHandle) {
    controller_with(PlayerConfig::default())
}

pub fn controller_with(config: PlayerConfig) -> (PlaybackController<MockEngine>, MockHandle) {
    let (engine, handle) = mock_engine();
    (PlaybackController::new(engine, config), handle)
}

pub fn queue_ids(player: &PlaybackController<MockEngine>) -> Vec<String> {
    player.queue().iter().map(|t| t.id.clone()).collect()
}

pub fn history_ids(player: &PlaybackController<MockEngine>) -> Vec<String> {
    player.history().iter().map(|t| t.id.clone()).collect()
}

pub fn current_id(player: &PlaybackController<MockEngine>) -> Option<String> {
    player.current_track().map(|t| t.id.clone())
}
