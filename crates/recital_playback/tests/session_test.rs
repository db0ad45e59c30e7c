//! Tests for the async narration session.

mod test_utils;

use recital_core::{LineCursor, PlaybackPosition, ScriptBuilder};
use recital_error::RecitalErrorKind;
use recital_interface::{SpeechEvent, SystemClock};
use recital_playback::{
    NarrationHandle, NarrationSession, PlaybackCommand, PlaybackConfig, PlaybackMachine,
    PlaybackNotification, PlaybackPhase, PlaybackSnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{RecordingBackend, SpeechLog, two_by_two, two_by_two_table};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn fast_config() -> PlaybackConfig {
    PlaybackConfig {
        tick_ms: 5,
        fallback_ms_per_char: 1,
        fallback_min_ms: 20,
        ..PlaybackConfig::default()
    }
}

fn spawn(
    backend: RecordingBackend,
) -> (
    NarrationHandle,
    JoinHandle<PlaybackMachine<RecordingBackend>>,
    mpsc::UnboundedSender<SpeechEvent>,
) {
    let machine =
        PlaybackMachine::new(backend, fast_config(), Arc::new(SystemClock::new())).unwrap();
    let (events, events_rx) = mpsc::unbounded_channel();
    let (handle, task) = NarrationSession::spawn(machine, events_rx);
    (handle, task, events)
}

async fn wait_until(
    handle: &NarrationHandle,
    predicate: impl FnMut(&PlaybackSnapshot) -> bool,
) -> PlaybackSnapshot {
    let mut snapshots = handle.watch();
    let snapshot = timeout(WAIT, snapshots.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("session closed")
        .clone();
    snapshot
}

fn at(section: usize, line: usize) -> Option<PlaybackPosition> {
    Some(PlaybackPosition::Line(LineCursor::new(section, line)))
}

#[tokio::test]
async fn test_session_plays_through_speech_events() {
    let (backend, log): (RecordingBackend, SpeechLog) = RecordingBackend::new();
    let (handle, task, events) = spawn(backend);

    handle
        .load(two_by_two(), Some(two_by_two_table()), None)
        .await
        .unwrap();
    assert_eq!(*handle.snapshot().phase(), PlaybackPhase::Ready);

    handle.send(PlaybackCommand::TogglePlay).await.unwrap();
    let playing = wait_until(&handle, |s| *s.is_playing()).await;

    events.send(SpeechEvent::ended(*playing.generation())).unwrap();
    let advanced = wait_until(&handle, |s| *s.position() == at(0, 1)).await;
    assert_eq!(advanced.current_text().as_deref(), Some("bbbb bbbb bbbb"));

    handle.shutdown().await.unwrap();
    let machine = timeout(WAIT, task).await.unwrap().unwrap();
    assert_eq!(machine.phase(), PlaybackPhase::Idle);
    assert_eq!(log.speaks().len(), 2);
}

#[tokio::test]
async fn test_stale_event_does_not_advance_session() {
    let (backend, _log) = RecordingBackend::new();
    let (handle, _task, events) = spawn(backend);
    handle
        .load(two_by_two(), Some(two_by_two_table()), None)
        .await
        .unwrap();

    handle.send(PlaybackCommand::TogglePlay).await.unwrap();
    let playing = wait_until(&handle, |s| *s.is_playing()).await;
    handle
        .send(PlaybackCommand::JumpToLine { section: 1, line: 0 })
        .await
        .unwrap();
    let jumped = wait_until(&handle, |s| *s.position() == at(1, 0)).await;

    events.send(SpeechEvent::ended(*playing.generation())).unwrap();
    handle.send(PlaybackCommand::Pause).await.unwrap();
    let paused = wait_until(&handle, |s| *s.phase() == PlaybackPhase::Paused).await;

    assert_eq!(*paused.position(), at(1, 0));
    assert_eq!(*paused.generation(), jumped.generation().next());
}

#[tokio::test]
async fn test_ticks_drive_speech_fallback() {
    let (backend, _log) = RecordingBackend::failing(&["yunxi"]);
    let (handle, _task, _events) = spawn(backend);
    handle
        .load(two_by_two(), Some(two_by_two_table()), None)
        .await
        .unwrap();

    handle.send(PlaybackCommand::StartNarration).await.unwrap();

    let ended = wait_until(&handle, |s| *s.phase() == PlaybackPhase::Ended).await;
    assert_eq!(*ended.position(), Some(PlaybackPosition::Ended));
    assert_eq!(ended.completed_sections(), &vec![0, 1]);
}

#[tokio::test]
async fn test_notifications_are_broadcast() {
    let (backend, _log) = RecordingBackend::new();
    let (handle, _task, _events) = spawn(backend);
    handle
        .load(two_by_two(), Some(two_by_two_table()), None)
        .await
        .unwrap();
    let mut notifications = handle.subscribe();

    handle.send(PlaybackCommand::Play).await.unwrap();
    handle.send(PlaybackCommand::Pause).await.unwrap();

    let first = timeout(WAIT, notifications.recv()).await.unwrap().unwrap();
    let second = timeout(WAIT, notifications.recv()).await.unwrap().unwrap();
    let cursor = LineCursor::new(0, 0);
    assert_eq!(first, PlaybackNotification::Resumed { cursor });
    assert_eq!(second, PlaybackNotification::Paused { cursor });
}

#[tokio::test]
async fn test_invalid_script_is_reported_to_loader() {
    let (backend, _log) = RecordingBackend::new();
    let (handle, _task, _events) = spawn(backend);
    let empty = ScriptBuilder::default()
        .id("empty")
        .title("Empty")
        .sections(vec![])
        .build()
        .unwrap();

    let err = handle.load(empty, None, None).await.unwrap_err();

    assert!(matches!(err.kind(), RecitalErrorKind::Config(_)));
    assert_eq!(*handle.snapshot().phase(), PlaybackPhase::Idle);
}

#[tokio::test]
async fn test_handle_reports_closed_session() {
    let (backend, _log) = RecordingBackend::new();
    let (handle, task, _events) = spawn(backend);

    handle.shutdown().await.unwrap();
    timeout(WAIT, task).await.unwrap().unwrap();

    assert!(handle.send(PlaybackCommand::Play).await.is_err());
}
