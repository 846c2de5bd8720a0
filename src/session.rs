use std::sync::mpsc::{self, Receiver, Sender};

/// Repeat setting reported by the media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    Context,
    Track,
    Unknown,
}

/// One authoritative report from the OS media session. Arrivals replace the
/// previous snapshot wholesale; fields are never merged across snapshots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaSnapshot {
    pub app_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub playing: bool,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
    pub position_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    /// Encoded image bytes as handed over by the session, not yet decoded.
    pub thumbnail: Option<Vec<u8>>,
}

/// User intent forwarded to the session, fire-and-forget. Dispatched at most
/// once per gesture and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    Play,
    Pause,
    SkipPrevious,
    SkipNext,
    ChangeRepeatMode,
    ChangeShuffleMode,
}

enum WorkerMessage {
    Command(MediaCommand),
    Shutdown,
}

/// Handle for an active subscription. Dropping it unsubscribes; explicit
/// `unsubscribe` is idempotent and safe after the transport has closed.
pub struct SubscriptionHandle {
    worker_tx: Option<Sender<WorkerMessage>>,
}

impl SubscriptionHandle {
    pub fn dispatch(&self, command: MediaCommand) {
        match &self.worker_tx {
            Some(tx) => {
                if tx.send(WorkerMessage::Command(command)).is_err() {
                    tracing::debug!(?command, "transport closed, command dropped");
                }
            }
            None => tracing::debug!(?command, "no transport, command dropped"),
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(tx) = self.worker_tx.take() {
            let _ = tx.send(WorkerMessage::Shutdown);
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Subscribe to the system media session. Snapshots arrive serially, in
/// arrival order; each one is authoritative regardless of timestamp skew.
/// There is no reconnection: once the channel disconnects the consumer keeps
/// its last snapshot indefinitely.
pub fn subscribe(preferred_app: Option<String>) -> (SubscriptionHandle, Receiver<MediaSnapshot>) {
    let (snapshot_tx, snapshot_rx) = mpsc::channel();
    let (worker_tx, worker_rx) = mpsc::channel::<WorkerMessage>();

    #[cfg(windows)]
    {
        transport::spawn_worker(preferred_app, snapshot_tx, worker_rx);
        (
            SubscriptionHandle {
                worker_tx: Some(worker_tx),
            },
            snapshot_rx,
        )
    }

    #[cfg(not(windows))]
    {
        let _ = preferred_app;
        drop(snapshot_tx);
        drop(worker_rx);
        drop(worker_tx);
        tracing::info!("no media session transport on this platform");
        (SubscriptionHandle { worker_tx: None }, snapshot_rx)
    }
}

#[cfg(windows)]
mod transport {
    use super::{MediaCommand, MediaSnapshot, RepeatMode, WorkerMessage};
    use futures::executor::block_on;
    use std::{
        future::IntoFuture,
        sync::mpsc::{Receiver, RecvTimeoutError, Sender},
        thread,
        time::Duration,
    };
    use windows::{
        core::Result as WinResult,
        Media::Control::{
            GlobalSystemMediaTransportControlsSession as Session,
            GlobalSystemMediaTransportControlsSessionManager as Manager,
            GlobalSystemMediaTransportControlsSessionPlaybackStatus as PlaybackStatus,
        },
        Media::MediaPlaybackAutoRepeatMode,
        Storage::Streams::{DataReader, InputStreamOptions},
        Win32::{
            Foundation::RPC_E_CHANGED_MODE,
            System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED},
        },
    };

    const POLL_INTERVAL: Duration = Duration::from_millis(500);

    pub(super) fn spawn_worker(
        preferred_app: Option<String>,
        snapshot_tx: Sender<MediaSnapshot>,
        worker_rx: Receiver<WorkerMessage>,
    ) {
        thread::spawn(move || {
            let com_initialized = unsafe {
                let hr = CoInitializeEx(None, COINIT_MULTITHREADED);
                if hr.is_ok() {
                    true
                } else if hr == RPC_E_CHANGED_MODE {
                    false
                } else {
                    tracing::warn!("COM init failed: {hr:?}");
                    return;
                }
            };

            run_loop(preferred_app.as_deref(), snapshot_tx, worker_rx);

            if com_initialized {
                unsafe {
                    CoUninitialize();
                }
            }
        });
    }

    fn run_loop(
        preferred_app: Option<&str>,
        snapshot_tx: Sender<MediaSnapshot>,
        worker_rx: Receiver<WorkerMessage>,
    ) {
        let manager = match request_manager() {
            Ok(manager) => manager,
            Err(err) => {
                tracing::warn!("failed to reach the media session manager: {err:?}");
                return;
            }
        };

        let mut last: Option<MediaSnapshot> = None;

        loop {
            match worker_rx.recv_timeout(POLL_INTERVAL) {
                Ok(WorkerMessage::Command(command)) => {
                    if let Err(err) = run_command(&manager, preferred_app, command) {
                        tracing::warn!(?command, "session command failed: {err:?}");
                    }
                }
                Ok(WorkerMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    // Emit only on change; the consumer sees a push channel.
                    let snapshot = poll_snapshot(&manager, preferred_app).unwrap_or_default();
                    if last.as_ref() != Some(&snapshot) {
                        if snapshot_tx.send(snapshot.clone()).is_err() {
                            break;
                        }
                        last = Some(snapshot);
                    }
                }
            }
        }
    }

    fn block_on_operation<O, T>(operation: O) -> WinResult<T>
    where
        O: IntoFuture<Output = WinResult<T>>,
    {
        block_on(operation.into_future())
    }

    fn request_manager() -> WinResult<Manager> {
        block_on_operation(Manager::RequestAsync()?)
    }

    /// Pick the session whose source app id contains the preferred substring,
    /// falling back to the system's current session.
    fn pick_session(manager: &Manager, preferred_app: Option<&str>) -> Option<Session> {
        if let Some(preferred) = preferred_app {
            let preferred = preferred.to_lowercase();
            if let Ok(sessions) = manager.GetSessions() {
                for session in sessions {
                    if let Ok(id) = session.SourceAppUserModelId() {
                        if id.to_string().to_lowercase().contains(&preferred) {
                            return Some(session);
                        }
                    }
                }
            }
        }
        manager.GetCurrentSession().ok()
    }

    fn poll_snapshot(manager: &Manager, preferred_app: Option<&str>) -> Option<MediaSnapshot> {
        let session = pick_session(manager, preferred_app)?;
        Some(normalize_session(&session))
    }

    /// Normalize a raw session into a `MediaSnapshot`. Absent fields default
    /// to `None`/`false`/`Off` rather than failing the whole snapshot.
    fn normalize_session(session: &Session) -> MediaSnapshot {
        let mut snapshot = MediaSnapshot::default();

        if let Ok(app_id) = session.SourceAppUserModelId() {
            snapshot.app_id = Some(app_id.to_string());
        }

        if let Ok(op) = session.TryGetMediaPropertiesAsync() {
            if let Ok(props) = block_on_operation(op) {
                snapshot.title = props.Title().ok().map(|h| h.to_string());
                snapshot.artist = props.Artist().ok().map(|h| h.to_string());
                snapshot.album = props.AlbumTitle().ok().map(|h| h.to_string());
                snapshot.thumbnail = props
                    .Thumbnail()
                    .ok()
                    .and_then(|reference| read_stream(&reference).ok().flatten());
            }
        }

        if let Ok(info) = session.GetPlaybackInfo() {
            snapshot.playing = info
                .PlaybackStatus()
                .map(|status| status == PlaybackStatus::Playing)
                .unwrap_or(false);
            snapshot.repeat_mode =
                match info.AutoRepeatMode().ok().and_then(|v| v.Value().ok()) {
                    Some(MediaPlaybackAutoRepeatMode::None) => RepeatMode::Off,
                    Some(MediaPlaybackAutoRepeatMode::List) => RepeatMode::Context,
                    Some(MediaPlaybackAutoRepeatMode::Track) => RepeatMode::Track,
                    Some(_) => RepeatMode::Unknown,
                    None => RepeatMode::Off,
                };
            snapshot.shuffle = info
                .IsShuffleActive()
                .ok()
                .and_then(|v| v.Value().ok())
                .unwrap_or(false);
        }

        if let Ok(timeline) = session.GetTimelineProperties() {
            // TimeSpan ticks are 100 ns.
            snapshot.position_ms =
                Some((timeline.Position().unwrap_or_default().Duration / 10_000).max(0) as u64);
            snapshot.duration_ms =
                Some((timeline.EndTime().unwrap_or_default().Duration / 10_000).max(0) as u64);
        }

        snapshot
    }

    fn read_stream(
        reference: &windows::Storage::Streams::IRandomAccessStreamReference,
    ) -> WinResult<Option<Vec<u8>>> {
        let stream = block_on_operation(reference.OpenReadAsync()?)?;
        let input_stream = stream.GetInputStreamAt(0)?;
        let reader = DataReader::CreateDataReader(&input_stream)?;
        reader.SetInputStreamOptions(InputStreamOptions::Partial)?;

        let mut buffer = Vec::new();
        const CHUNK: u32 = 64 * 1024;

        loop {
            let loaded = block_on_operation(reader.LoadAsync(CHUNK)?)?;
            if loaded == 0 {
                break;
            }
            let mut chunk = vec![0u8; loaded as usize];
            reader.ReadBytes(&mut chunk)?;
            buffer.extend_from_slice(&chunk);
            if loaded < CHUNK {
                break;
            }
        }

        Ok((!buffer.is_empty()).then_some(buffer))
    }

    fn run_command(
        manager: &Manager,
        preferred_app: Option<&str>,
        command: MediaCommand,
    ) -> WinResult<()> {
        let Some(session) = pick_session(manager, preferred_app) else {
            tracing::debug!(?command, "no active session, command dropped");
            return Ok(());
        };

        match command {
            MediaCommand::Play => {
                block_on_operation(session.TryPlayAsync()?)?;
            }
            MediaCommand::Pause => {
                block_on_operation(session.TryPauseAsync()?)?;
            }
            MediaCommand::SkipPrevious => {
                block_on_operation(session.TrySkipPreviousAsync()?)?;
            }
            MediaCommand::SkipNext => {
                block_on_operation(session.TrySkipNextAsync()?)?;
            }
            MediaCommand::ChangeRepeatMode => {
                let current = session
                    .GetPlaybackInfo()?
                    .AutoRepeatMode()
                    .ok()
                    .and_then(|v| v.Value().ok());
                let next = match current {
                    Some(MediaPlaybackAutoRepeatMode::List) => MediaPlaybackAutoRepeatMode::Track,
                    Some(MediaPlaybackAutoRepeatMode::Track) => MediaPlaybackAutoRepeatMode::None,
                    _ => MediaPlaybackAutoRepeatMode::List,
                };
                block_on_operation(session.TryChangeAutoRepeatModeAsync(next)?)?;
            }
            MediaCommand::ChangeShuffleMode => {
                let current = session
                    .GetPlaybackInfo()?
                    .IsShuffleActive()
                    .ok()
                    .and_then(|v| v.Value().ok())
                    .unwrap_or(false);
                block_on_operation(session.TryChangeShuffleActiveAsync(!current)?)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_has_documented_absent_values() {
        let snapshot = MediaSnapshot::default();
        assert_eq!(snapshot.app_id, None);
        assert_eq!(snapshot.title, None);
        assert!(!snapshot.playing);
        assert!(!snapshot.shuffle);
        assert_eq!(snapshot.repeat_mode, RepeatMode::Off);
        assert_eq!(snapshot.position_ms, None);
        assert_eq!(snapshot.duration_ms, None);
        assert_eq!(snapshot.thumbnail, None);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let (tx, rx) = mpsc::channel();
        let mut handle = SubscriptionHandle {
            worker_tx: Some(tx),
        };

        handle.unsubscribe();
        handle.unsubscribe();

        // Exactly one shutdown went out.
        assert!(matches!(rx.try_recv(), Ok(WorkerMessage::Shutdown)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_is_safe_after_transport_close() {
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        drop(rx);
        let mut handle = SubscriptionHandle {
            worker_tx: Some(tx),
        };
        handle.dispatch(MediaCommand::Play);
        handle.unsubscribe();
    }

    #[test]
    fn dispatch_without_transport_is_a_noop() {
        let handle = SubscriptionHandle { worker_tx: None };
        handle.dispatch(MediaCommand::SkipNext);
    }
}
