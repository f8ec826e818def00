//! Play, pause and message delivery against a live worker.
#![cfg(unix)]

use wallpaper_host::host::RenderableSurface;
use wallpaper_host::models::content::ContentKind;
use wallpaper_host::models::state::SupervisorState;

use super::test_helpers::{initialized, FakeWindowSystem, Harness, WindowCall, TEST_TIMEOUT};

#[tokio::test]
async fn play_and_pause_before_handshake_are_no_ops() {
    let harness = Harness::new(FakeWindowSystem::default());
    let mut supervisor = harness.supervisor("exec sleep 30");

    supervisor.pause();
    supervisor.play();
    supervisor.show().expect("worker spawns");
    supervisor.pause();
    supervisor.play();
    supervisor.stop();
    supervisor.resume();

    assert!(harness.windows.calls().is_empty());
    assert_eq!(supervisor.state(), SupervisorState::AwaitingHandshake);

    supervisor.terminate().await;
}

#[tokio::test]
async fn pause_minimizes_and_play_restores() {
    let harness = Harness::new(FakeWindowSystem::with_content(300, 301));
    let mut supervisor = harness.supervisor("echo HWND300; exec sleep 30");

    supervisor.show().expect("worker spawns");
    assert!(initialized(&mut supervisor).await.success);

    supervisor.pause();
    assert_eq!(supervisor.state(), SupervisorState::Paused);
    supervisor.play();
    assert_eq!(supervisor.state(), SupervisorState::Running);

    assert_eq!(
        harness.windows.calls(),
        vec![
            WindowCall::Hide(300),
            WindowCall::Minimize(301),
            WindowCall::Restore(301),
        ]
    );

    supervisor.close().await;
    assert!(supervisor.window_handle().is_none());
}

#[tokio::test]
async fn stop_resume_and_volume_leave_state_alone() {
    let harness = Harness::new(FakeWindowSystem::with_content(300, 301));
    let mut supervisor = harness.supervisor("echo HWND300; exec sleep 30");

    supervisor.show().expect("worker spawns");
    assert!(initialized(&mut supervisor).await.success);

    supervisor.stop();
    supervisor.resume();
    supervisor.set_volume(20);

    assert_eq!(supervisor.state(), SupervisorState::Running);
    assert_eq!(harness.windows.calls(), vec![WindowCall::Hide(300)]);

    supervisor.terminate().await;
}

#[tokio::test]
async fn message_reaches_worker_stdin_as_one_line() {
    let harness = Harness::new(FakeWindowSystem::with_content(4242, 4243));
    let mut supervisor = harness.supervisor(r#"read line; echo "HWND$line"; exec sleep 30"#);

    supervisor.show().expect("worker spawns");
    supervisor.send_message("4242").await;

    let result = initialized(&mut supervisor).await;
    assert!(result.success, "unexpected failure: {result:?}");
    assert_eq!(result.raw_message, "HWND4242");

    supervisor.terminate().await;
}

#[tokio::test]
async fn message_after_worker_exit_is_swallowed() {
    let harness = Harness::new(FakeWindowSystem::default());
    let mut supervisor = harness.supervisor("exit 0");

    supervisor.show().expect("worker spawns");
    initialized(&mut supervisor).await;

    supervisor.send_message("lively:terminate").await;
    supervisor.send_message("lively:terminate").await;
    supervisor.terminate().await;
    supervisor.send_message("after teardown").await;
}

#[tokio::test]
async fn supervisor_drives_as_renderable_surface() {
    let harness = Harness::new(FakeWindowSystem::with_content(900, 901));
    let mut supervisor = harness.supervisor(r#"read line; echo "HWND$line"; exec sleep 30"#);
    let init_rx = supervisor.take_initialized().expect("receiver");
    supervisor.show().expect("worker spawns");

    let mut surface: Box<dyn RenderableSurface> = Box::new(supervisor);
    assert_eq!(surface.content_kind(), ContentKind::Online);
    assert!(surface.window_handle().is_none());

    surface.send_message("900").await;
    let result = tokio::time::timeout(TEST_TIMEOUT, init_rx)
        .await
        .expect("initialization within timeout")
        .expect("event delivered");
    assert!(result.success);
    assert_eq!(surface.window_handle().map(|w| w.raw()), Some(901));

    surface.pause();
    surface.play();
    surface.close().await;
    assert!(surface.window_handle().is_none());
    assert_eq!(harness.compositor.refreshes(), 1);
}
