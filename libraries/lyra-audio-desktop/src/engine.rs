//! Desktop playback engine
//!
//! [`RodioEngine`] implements [`PlaybackEngine`] on top of rodio. A dedicated
//! audio thread owns the output stream and at most one `Sink`; the engine talks
//! to it over crossbeam channels. Every command carries the handle it targets,
//! so commands and fetch results for a released handle are dropped.

use crate::error::{AudioError, Result};
use crate::fetch::{FetchSettings, Fetcher, MediaLocation};
use crate::probe::probe_duration;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use lyra_playback::{EngineEvent, EngineNotice, HandleId, PlaybackEngine};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How often the audio thread checks for end of track
const TICK: Duration = Duration::from_millis(200);

/// Commands sent to the audio thread
#[derive(Debug)]
enum AudioCommand {
    /// New handle; drop whatever was playing
    Load { handle: HandleId, volume: f32 },

    /// Fetched media for a handle
    Attach {
        handle: HandleId,
        bytes: Vec<u8>,
        extension: Option<String>,
    },

    /// Fetch failed for a handle
    Failed { handle: HandleId, message: String },

    Play(HandleId),
    Pause(HandleId),
    Stop(HandleId),
    Seek(HandleId, f64),
    SetVolume(f32),
    Release(HandleId),
    Shutdown,
}

/// State published by the audio thread
#[derive(Debug, Default)]
struct PlaybackStatus {
    handle: Option<HandleId>,
    position_secs: f64,
    ended: bool,
}

/// rodio-backed playback engine
pub struct RodioEngine {
    command_tx: Sender<AudioCommand>,
    notice_rx: Receiver<EngineNotice>,
    status: Arc<Mutex<PlaybackStatus>>,
    fetcher: Fetcher,
    fetch_task: Option<tokio::task::JoinHandle<()>>,
    audio_thread: Option<JoinHandle<()>>,
    next_handle: u64,
    live: Option<HandleId>,
    playing: bool,
}

impl RodioEngine {
    /// Open the default output device and start the audio thread
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let fetcher = Fetcher::new(&settings)?;

        let (command_tx, command_rx) = unbounded();
        let (notice_tx, notice_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);
        let status = Arc::new(Mutex::new(PlaybackStatus::default()));

        let thread_status = Arc::clone(&status);
        let audio_thread = thread::Builder::new()
            .name("lyra-audio".to_string())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                stream.log_on_drop(false);
                let _ = ready_tx.send(Ok(()));

                AudioThread::new(stream, notice_tx, thread_status).run(&command_rx);
            })
            .map_err(|e| AudioError::Runtime(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                let _ = audio_thread.join();
                return Err(AudioError::Device(message));
            }
            Err(_) => return Err(AudioError::ThreadStopped),
        }

        info!("Audio output ready");

        Ok(Self {
            command_tx,
            notice_rx,
            status,
            fetcher,
            fetch_task: None,
            audio_thread: Some(audio_thread),
            next_handle: 0,
            live: None,
            playing: false,
        })
    }

    fn send(&self, command: AudioCommand) {
        if self.command_tx.send(command).is_err() {
            warn!("Audio thread is gone; dropping command");
        }
    }

    fn abort_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }

    fn live_status<T>(&self, read: impl FnOnce(&PlaybackStatus) -> T) -> Option<T> {
        let status = self.status.lock().ok()?;
        (status.handle.is_some() && status.handle == self.live).then(|| read(&status))
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, url: &str, volume: f32) -> lyra_playback::Result<HandleId> {
        let location = MediaLocation::parse(url)?;
        let extension = location.extension();

        self.abort_fetch();
        self.next_handle += 1;
        let handle = HandleId(self.next_handle);

        self.command_tx
            .send(AudioCommand::Load { handle, volume })
            .map_err(|_| AudioError::ThreadStopped)?;

        let tx = self.command_tx.clone();
        self.fetch_task = Some(self.fetcher.spawn(location, move |result| {
            let command = match result {
                Ok(bytes) => AudioCommand::Attach {
                    handle,
                    bytes,
                    extension,
                },
                Err(e) => AudioCommand::Failed {
                    handle,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(command);
        }));

        debug!(handle = %handle, url, "Loading media");
        self.live = Some(handle);
        self.playing = false;
        Ok(handle)
    }

    fn play(&mut self) {
        if let Some(handle) = self.live {
            self.playing = true;
            self.send(AudioCommand::Play(handle));
        }
    }

    fn pause(&mut self) {
        if let Some(handle) = self.live {
            self.playing = false;
            self.send(AudioCommand::Pause(handle));
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.live {
            self.playing = false;
            self.send(AudioCommand::Stop(handle));
        }
    }

    fn seek(&mut self, seconds: f64) -> f64 {
        let seconds = seconds.max(0.0);
        if let Some(handle) = self.live {
            self.send(AudioCommand::Seek(handle, seconds));
        }
        seconds
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCommand::SetVolume(volume.clamp(0.0, 1.0)));
    }

    fn position(&self) -> f64 {
        self.live_status(|s| s.position_secs).unwrap_or(0.0)
    }

    fn is_playing(&self) -> bool {
        self.playing && self.live_status(|s| !s.ended).unwrap_or(false)
    }

    fn release(&mut self) {
        self.abort_fetch();
        if let Some(handle) = self.live.take() {
            self.send(AudioCommand::Release(handle));
        }
        self.playing = false;
    }

    fn poll_events(&mut self) -> Vec<EngineNotice> {
        self.notice_rx.try_iter().collect()
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.abort_fetch();
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(thread) = self.audio_thread.take() {
            if thread.join().is_err() {
                error!("Audio thread panicked");
            }
        }
    }
}

/// Audio thread state
struct AudioThread {
    stream: OutputStream,
    notices: Sender<EngineNotice>,
    status: Arc<Mutex<PlaybackStatus>>,
    current: Option<HandleId>,
    sink: Option<Sink>,
    want_play: bool,
    volume: f32,
    ended_reported: bool,
}

impl AudioThread {
    fn new(
        stream: OutputStream,
        notices: Sender<EngineNotice>,
        status: Arc<Mutex<PlaybackStatus>>,
    ) -> Self {
        Self {
            stream,
            notices,
            status,
            current: None,
            sink: None,
            want_play: false,
            volume: 1.0,
            ended_reported: false,
        }
    }

    fn run(mut self, commands: &Receiver<AudioCommand>) {
        loop {
            match commands.recv_timeout(TICK) {
                Ok(AudioCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(command) => self.handle(command),
                Err(RecvTimeoutError::Timeout) => {}
            }
            self.tick();
        }

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        debug!("Audio thread exiting");
    }

    fn is_current(&self, handle: HandleId) -> bool {
        self.current == Some(handle)
    }

    fn handle(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Load { handle, volume } => {
                self.drop_sink();
                self.current = Some(handle);
                self.volume = volume;
                self.want_play = false;
                self.ended_reported = false;
                self.publish(0.0, false);
            }
            AudioCommand::Attach {
                handle,
                bytes,
                extension,
            } => {
                if self.is_current(handle) {
                    self.attach(handle, bytes, extension.as_deref());
                } else {
                    debug!(handle = %handle, "Dropping media for released handle");
                }
            }
            AudioCommand::Failed { handle, message } => {
                if self.is_current(handle) {
                    warn!(handle = %handle, %message, "Media fetch failed");
                    self.notify(handle, EngineEvent::Errored { message });
                }
            }
            AudioCommand::Play(handle) if self.is_current(handle) => {
                self.want_play = true;
                if let Some(sink) = &self.sink {
                    sink.play();
                    self.notify(handle, EngineEvent::Started);
                }
            }
            AudioCommand::Pause(handle) if self.is_current(handle) => {
                self.want_play = false;
                if let Some(sink) = &self.sink {
                    sink.pause();
                    self.notify(handle, EngineEvent::Paused);
                }
            }
            AudioCommand::Stop(handle) if self.is_current(handle) => {
                self.want_play = false;
                if let Some(sink) = &self.sink {
                    sink.pause();
                    if let Err(e) = sink.try_seek(Duration::ZERO) {
                        debug!(error = %e, "Rewind on stop failed");
                    }
                    self.notify(handle, EngineEvent::Stopped);
                }
            }
            AudioCommand::Seek(handle, seconds) if self.is_current(handle) => {
                let (Some(sink), Ok(target)) = (&self.sink, Duration::try_from_secs_f64(seconds))
                else {
                    return;
                };
                if let Err(e) = sink.try_seek(target) {
                    warn!(handle = %handle, error = %e, "Seek failed");
                }
            }
            AudioCommand::SetVolume(volume) => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
            }
            AudioCommand::Release(handle) if self.is_current(handle) => {
                self.drop_sink();
                self.current = None;
                self.want_play = false;
                if let Ok(mut status) = self.status.lock() {
                    *status = PlaybackStatus::default();
                }
            }
            AudioCommand::Play(handle)
            | AudioCommand::Pause(handle)
            | AudioCommand::Stop(handle)
            | AudioCommand::Seek(handle, _)
            | AudioCommand::Release(handle) => {
                debug!(handle = %handle, "Ignoring command for stale handle");
            }
            AudioCommand::Shutdown => {}
        }
    }

    fn attach(&mut self, handle: HandleId, bytes: Vec<u8>, extension: Option<&str>) {
        let duration_secs = probe_duration(&bytes, extension).unwrap_or(0.0);
        let byte_len = bytes.len() as u64;

        let mut builder = Decoder::builder()
            .with_data(Cursor::new(bytes))
            .with_byte_len(byte_len)
            .with_seekable(true);
        if let Some(ext) = extension {
            builder = builder.with_hint(ext);
        }

        let source = match builder.build() {
            Ok(source) => source,
            Err(e) => {
                warn!(handle = %handle, error = %e, "Decode failed");
                self.notify(
                    handle,
                    EngineEvent::Errored {
                        message: AudioError::Decode(e.to_string()).to_string(),
                    },
                );
                return;
            }
        };

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        self.notify(handle, EngineEvent::Loaded { duration_secs });

        if self.want_play {
            sink.play();
            self.sink = Some(sink);
            self.notify(handle, EngineEvent::Started);
        } else {
            sink.pause();
            self.sink = Some(sink);
        }
    }

    fn drop_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn tick(&mut self) {
        let Some(handle) = self.current else {
            return;
        };
        let Some(sink) = &self.sink else {
            return;
        };

        let ended = sink.empty();
        let position = sink.get_pos().as_secs_f64();
        self.publish(position, ended);

        if ended && self.want_play && !self.ended_reported {
            self.ended_reported = true;
            self.notify(handle, EngineEvent::Ended);
        }
    }

    fn publish(&self, position_secs: f64, ended: bool) {
        if let Ok(mut status) = self.status.lock() {
            status.handle = self.current;
            status.position_secs = position_secs;
            status.ended = ended;
        }
    }

    fn notify(&self, handle: HandleId, event: EngineEvent) {
        if self.notices.send(EngineNotice::new(handle, event)).is_err() {
            debug!("Engine dropped; notice discarded");
        }
    }
}
