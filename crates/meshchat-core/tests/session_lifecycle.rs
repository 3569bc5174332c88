//! End-to-end session tests against the mock device
//!
//! Each test drives `run_session` with scripted input and a recording sink,
//! then inspects the device probe: what was provisioned, what was sent, and
//! how many times the connection was closed.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use meshchat_core::{run_session, ChannelRequest, RadioEvent, SessionOptions};
use meshchat_harness::{MockDevice, RecordingSink, ScriptedInput, SinkRecord};

fn fast_options() -> SessionOptions {
    SessionOptions {
        settle_delay: Duration::from_millis(5),
        send_pacing: Duration::from_millis(1),
        ..SessionOptions::default()
    }
}

/// Poll until `cond` holds, failing the test after two seconds.
async fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {what}");
}

#[tokio::test]
async fn full_session_scenario() {
    let (device, probe) = MockDevice::new();
    let (events_tx, events_rx) = mpsc::channel(64);
    let (sink, output) = RecordingSink::new();
    let input = ScriptedInput::ending_with_wait(&["hello"]);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let session = tokio::spawn(run_session(
        device,
        events_rx,
        sink,
        input,
        async move {
            let _ = stop_rx.await;
        },
        fast_options(),
    ));

    // Settle delay elapses, channel 1 is provisioned, "hello" goes out.
    wait_for("outbound send", {
        let probe = probe.clone();
        move || !probe.sent_messages().is_empty()
    })
    .await;
    assert_eq!(probe.sent_messages(), vec![("hello".to_string(), 1)]);

    let slot = probe.channel(1).unwrap();
    assert_eq!(slot.name, "DC540");
    assert!(!slot.use_preset);

    // An inbound text arrives while the loop waits for more input.
    events_tx
        .send(RadioEvent::text(Some("!abcd1234"), "hi"))
        .await
        .unwrap();
    wait_for("inbound dispatch", {
        let output = output.clone();
        move || !output.messages().is_empty()
    })
    .await;

    let records = output.records();
    let at = records
        .iter()
        .position(|r| *r == SinkRecord::Message("!abcd1234: hi".to_string()))
        .expect("inbound message displayed");
    assert_eq!(records[at + 1], SinkRecord::Prompt("Ch1> ".to_string()));

    // Interrupt; teardown closes the connection exactly once.
    stop_tx.send(()).unwrap();
    session.await.unwrap().unwrap();
    assert_eq!(probe.close_count(), 1);
    assert_eq!(probe.sent_messages().len(), 1);
}

#[tokio::test]
async fn empty_input_lines_send_nothing() {
    let (device, probe) = MockDevice::new();
    let (_events_tx, events_rx) = mpsc::channel(64);
    let (sink, _output) = RecordingSink::new();
    let input = ScriptedInput::new(&["", "", "hi there"]);

    run_session(
        device,
        events_rx,
        sink,
        input,
        std::future::pending::<()>(),
        fast_options(),
    )
    .await
    .unwrap();

    assert_eq!(probe.sent_messages(), vec![("hi there".to_string(), 1)]);
    assert_eq!(probe.close_count(), 1);
}

#[tokio::test]
async fn interrupt_while_waiting_for_input_closes_once() {
    let (device, probe) = MockDevice::new();
    let (_events_tx, events_rx) = mpsc::channel(64);
    let (sink, _output) = RecordingSink::new();
    let input = ScriptedInput::ending_with_wait(&[]);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let session = tokio::spawn(run_session(
        device,
        events_rx,
        sink,
        input,
        async move {
            let _ = stop_rx.await;
        },
        fast_options(),
    ));

    // Let the session reach the pending input wait, then interrupt it.
    wait_for("channel provisioned", {
        let probe = probe.clone();
        move || probe.config_writes() == 1
    })
    .await;
    stop_tx.send(()).unwrap();

    session.await.unwrap().unwrap();
    assert_eq!(probe.close_count(), 1);
    assert!(probe.sent_messages().is_empty());
}

#[tokio::test]
async fn provisioning_failure_does_not_prevent_chat() {
    let (device, probe) = MockDevice::new();
    probe.fail_channel_writes("radio rebooted");
    let (_events_tx, events_rx) = mpsc::channel(64);
    let (sink, _output) = RecordingSink::new();
    let input = ScriptedInput::new(&["still here"]);

    run_session(
        device,
        events_rx,
        sink,
        input,
        std::future::pending::<()>(),
        fast_options(),
    )
    .await
    .unwrap();

    // Channel kept its prior (unconfigured) state, but chat went ahead.
    assert_eq!(probe.channel(1).unwrap().name, "");
    assert_eq!(probe.sent_messages(), vec![("still here".to_string(), 1)]);
    assert_eq!(probe.close_count(), 1);
}

#[tokio::test]
async fn invalid_psk_is_nonfatal() {
    let (device, probe) = MockDevice::new();
    let (_events_tx, events_rx) = mpsc::channel(64);
    let (sink, _output) = RecordingSink::new();
    let input = ScriptedInput::new(&["yo"]);
    let options = SessionOptions {
        channel: ChannelRequest {
            // Decodes to 5 bytes, not the 32 a 256-bit key needs.
            psk_base64: "c2hvcnQ=".to_string(),
            ..ChannelRequest::default()
        },
        ..fast_options()
    };

    run_session(
        device,
        events_rx,
        sink,
        input,
        std::future::pending::<()>(),
        options,
    )
    .await
    .unwrap();

    // No provisioning writes happened, but the loop ran and sent.
    assert!(probe.written_channels().is_empty());
    assert_eq!(probe.sent_messages(), vec![("yo".to_string(), 1)]);
    assert_eq!(probe.close_count(), 1);
}

#[tokio::test]
async fn send_failure_keeps_the_loop_alive() {
    let (device, probe) = MockDevice::new();
    probe.fail_sends("tx queue full");
    let (_events_tx, events_rx) = mpsc::channel(64);
    let (sink, _output) = RecordingSink::new();
    let input = ScriptedInput::new(&["first", "second"]);
    let prompts = input.prompts();

    run_session(
        device,
        events_rx,
        sink,
        input,
        std::future::pending::<()>(),
        fast_options(),
    )
    .await
    .unwrap();

    // Both lines were read (the first failure did not end the loop), and
    // teardown still ran exactly once.
    assert_eq!(prompts.lock().unwrap().len(), 3);
    assert!(probe.sent_messages().is_empty());
    assert_eq!(probe.close_count(), 1);
}

#[tokio::test]
async fn events_without_payload_produce_no_output() {
    let (device, probe) = MockDevice::new();
    let (events_tx, events_rx) = mpsc::channel(64);
    let (sink, output) = RecordingSink::new();
    let input = ScriptedInput::ending_with_wait(&[]);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let session = tokio::spawn(run_session(
        device,
        events_rx,
        sink,
        input,
        async move {
            let _ = stop_rx.await;
        },
        fast_options(),
    ));

    wait_for("channel provisioned", {
        let probe = probe.clone();
        move || probe.config_writes() == 1
    })
    .await;

    events_tx.send(RadioEvent::default()).await.unwrap();
    events_tx
        .send(RadioEvent::text(Some("!cafe0001"), "ping"))
        .await
        .unwrap();
    wait_for("qualifying event dispatched", {
        let output = output.clone();
        move || !output.messages().is_empty()
    })
    .await;

    // Only the qualifying event produced output.
    assert_eq!(output.messages(), vec!["!cafe0001: ping".to_string()]);

    stop_tx.send(()).unwrap();
    session.await.unwrap().unwrap();
}
