// Integration tests for the session controller state machine
//
// A scripted engine stands in for the recognition capability so the tests
// can drive every lifecycle path: confirmation, unexpected termination,
// transient and fatal errors, stop-grace expiry, and device restarts.

use livescribe::recognition::{EngineEvent, RecognitionResult, ScriptedEngine, ScriptedHandle};
use livescribe::session::{RecordingState, SessionConfig, SessionController};
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn test_config() -> SessionConfig {
    SessionConfig {
        stop_grace: Duration::from_millis(200),
        restart_settle: Duration::from_millis(10),
        ..SessionConfig::default()
    }
}

fn scripted_controller() -> (SessionController, ScriptedHandle) {
    let engine = ScriptedEngine::new();
    let handle = engine.handle();
    let controller = SessionController::new(Box::new(engine), test_config());
    (controller, handle)
}

async fn wait_for_state(controller: &SessionController, state: RecordingState) {
    let mut rx = controller.subscribe_state();
    timeout(Duration::from_secs(1), async {
        loop {
            if *rx.borrow_and_update() == state {
                break;
            }
            rx.changed().await.expect("state channel closed");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {:?}", state));
}

async fn wait_for_committed(controller: &SessionController, expected: &str) {
    timeout(Duration::from_secs(1), async {
        loop {
            if controller.transcript().await.committed == expected {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for committed {:?}", expected));
}

fn final_event(index: usize, text: &str) -> EngineEvent {
    EngineEvent::Result {
        index,
        results: vec![RecognitionResult::final_text(text)],
    }
}

fn interim_event(index: usize, text: &str) -> EngineEvent {
    EngineEvent::Result {
        index,
        results: vec![RecognitionResult::interim(text)],
    }
}

#[tokio::test]
async fn test_start_reaches_listening() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    assert_eq!(handle.starts(), 1);

    let status = controller.status().await;
    assert!(status.session_id.is_some());
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_results_accumulate_while_listening() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    assert!(handle.emit(final_event(0, "hello ")).await);
    assert!(handle.emit(interim_event(1, "world")).await);

    timeout(Duration::from_secs(1), async {
        loop {
            if controller.transcript().await.display == "hello world" {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("display never reached \"hello world\"");

    let view = controller.transcript().await;
    assert_eq!(view.committed, "hello ");
    assert_eq!(view.interim, "world");

    assert!(handle.emit(final_event(1, "world")).await);
    wait_for_committed(&controller, "hello world").await;

    let view = controller.transcript().await;
    assert_eq!(view.interim, "");
}

#[tokio::test]
async fn test_start_clears_previous_transcript() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;
    handle.emit(final_event(0, "first session")).await;
    wait_for_committed(&controller, "first session").await;

    controller.stop().await.expect("stop failed");
    wait_for_state(&controller, RecordingState::Idle).await;

    // Committed text survives the stop and is only reset by the next start.
    assert_eq!(controller.transcript().await.committed, "first session");

    controller.start(None).await.expect("restart failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    assert_eq!(controller.transcript().await.committed, "");
}

#[tokio::test]
async fn test_clear_mid_session_then_append() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    handle.emit(final_event(0, "before")).await;
    wait_for_committed(&controller, "before").await;

    controller.clear_transcript().await;
    assert_eq!(controller.transcript().await.display, "");

    handle.emit(final_event(1, "after")).await;
    wait_for_committed(&controller, "after").await;
}

#[tokio::test]
async fn test_no_stale_events_after_stop_start() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;
    handle.emit(final_event(0, "first")).await;
    wait_for_committed(&controller, "first").await;

    // Keep a feed into the session that is about to be torn down.
    let old_feed = handle.session_feed().expect("no live session feed");

    controller.stop().await.expect("stop failed");
    wait_for_state(&controller, RecordingState::Idle).await;

    // A late callback from the dead session.
    let _ = old_feed.try_send(final_event(0, "ghost"));

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    handle.emit(final_event(0, "second")).await;
    wait_for_committed(&controller, "second").await;

    let view = controller.transcript().await;
    assert!(!view.committed.contains("ghost"));
    assert!(!view.committed.contains("first"));
}

#[tokio::test]
async fn test_auto_restart_on_unexpected_end() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;
    handle.emit(final_event(0, "kept")).await;
    wait_for_committed(&controller, "kept").await;

    // The engine terminates on its own, as it does after a silence window.
    handle.end_session().await;

    timeout(Duration::from_secs(1), async {
        loop {
            if handle.starts() == 2 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no auto-restart happened");

    wait_for_state(&controller, RecordingState::Listening).await;

    // No stop request was involved and the transcript survived.
    assert_eq!(handle.stops(), 0);
    assert_eq!(controller.transcript().await.committed, "kept");
}

#[tokio::test]
async fn test_intentional_stop_does_not_restart() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    controller.stop().await.expect("stop failed");
    wait_for_state(&controller, RecordingState::Idle).await;

    // Give a would-be restart time to happen; it must not.
    sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.starts(), 1);
    assert_eq!(handle.stops(), 1);
    assert_eq!(controller.state(), RecordingState::Idle);
}

#[tokio::test]
async fn test_transient_error_is_absorbed() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    handle
        .emit(EngineEvent::Error {
            code: "no-speech".to_string(),
        })
        .await;
    handle.emit(final_event(0, "still here")).await;

    wait_for_committed(&controller, "still here").await;

    let status = controller.status().await;
    assert_eq!(status.state, RecordingState::Listening);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_fatal_error_stops_session() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    handle
        .emit(EngineEvent::Error {
            code: "audio-capture".to_string(),
        })
        .await;

    wait_for_state(&controller, RecordingState::Error).await;

    let status = controller.status().await;
    assert_eq!(
        status.error.as_deref(),
        Some("Speech recognition failed: audio-capture")
    );

    // The session is released, and no auto-restart is attempted.
    sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.starts(), 1);
    assert_eq!(handle.stops(), 1);

    // An explicit user start recovers and clears the error.
    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;
    assert!(controller.status().await.error.is_none());
}

#[tokio::test]
async fn test_permission_error_message() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    handle
        .emit(EngineEvent::Error {
            code: "not-allowed".to_string(),
        })
        .await;

    wait_for_state(&controller, RecordingState::Error).await;

    let status = controller.status().await;
    assert_eq!(
        status.error.as_deref(),
        Some("Please grant microphone permission to use speech recognition.")
    );
}

#[tokio::test]
async fn test_unconfirmed_stop_forces_idle() {
    let engine = ScriptedEngine::unresponsive();
    let handle = engine.handle();
    let controller = SessionController::new(Box::new(engine), test_config());

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    handle.emit(final_event(0, "committed text")).await;
    handle.emit(interim_event(1, "pending")).await;
    wait_for_committed(&controller, "committed text").await;

    // The engine never confirms; stop must still return within the grace
    // period and force the transition.
    timeout(Duration::from_secs(1), controller.stop())
        .await
        .expect("stop did not return")
        .expect("stop failed");

    assert_eq!(controller.state(), RecordingState::Idle);

    // Interim text never survives a session's end.
    let view = controller.transcript().await;
    assert_eq!(view.committed, "committed text");
    assert_eq!(view.interim, "");
}

#[tokio::test]
async fn test_device_restart_is_one_stop_one_start() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;
    handle.emit(final_event(0, "kept ")).await;
    wait_for_committed(&controller, "kept ").await;

    controller
        .restart(Some("usb-mic".to_string()))
        .await
        .expect("restart failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    assert_eq!(handle.starts(), 2);
    assert_eq!(handle.stops(), 1);
    assert_eq!(controller.transcript().await.committed, "kept ");

    let options = handle.last_options().expect("no session options");
    assert_eq!(options.device_id.as_deref(), Some("usb-mic"));
}

#[tokio::test]
async fn test_restart_without_active_session_is_noop() {
    let (controller, handle) = scripted_controller();

    controller
        .restart(Some("usb-mic".to_string()))
        .await
        .expect("restart failed");

    assert_eq!(handle.starts(), 0);
    assert_eq!(controller.state(), RecordingState::Idle);
}

#[tokio::test]
async fn test_start_while_active_is_noop() {
    let (controller, handle) = scripted_controller();

    controller.start(None).await.expect("start failed");
    wait_for_state(&controller, RecordingState::Listening).await;

    controller.start(None).await.expect("second start failed");

    assert_eq!(handle.starts(), 1);
    assert_eq!(controller.state(), RecordingState::Listening);
}

#[tokio::test]
async fn test_stop_when_idle_is_noop() {
    let (controller, handle) = scripted_controller();

    controller.stop().await.expect("stop failed");

    assert_eq!(handle.stops(), 0);
    assert_eq!(controller.state(), RecordingState::Idle);
}
