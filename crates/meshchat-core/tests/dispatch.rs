//! Receive dispatcher tests, exercised against the recording sink.
//!
//! These live as integration tests because `meshchat-harness` depends on
//! `meshchat-core`; using the harness from in-crate unit tests would link
//! two copies of the core crate.

use meshchat_core::{DecodedPayload, RadioEvent, ReceiveDispatcher};
use meshchat_harness::{RecordingSink, SinkRecord};
use tokio::sync::mpsc;

fn dispatcher(sink: RecordingSink) -> ReceiveDispatcher<RecordingSink> {
    let (_tx, rx) = mpsc::channel(8);
    ReceiveDispatcher::new(rx, sink, "Ch1> ".to_string())
}

#[test]
fn event_without_payload_produces_no_output() {
    let (sink, output) = RecordingSink::new();
    let mut dispatcher = dispatcher(sink);

    dispatcher.dispatch(RadioEvent::default());

    assert!(output.records().is_empty());
}

#[test]
fn event_without_text_is_ignored() {
    let (sink, output) = RecordingSink::new();
    let mut dispatcher = dispatcher(sink);

    // Decoded section present (e.g. telemetry) but no text payload.
    dispatcher.dispatch(RadioEvent {
        from_id: Some("!abcd1234".to_string()),
        decoded: Some(DecodedPayload { text: None }),
    });

    assert!(output.records().is_empty());
}

#[test]
fn text_event_shows_message_then_prompt() {
    let (sink, output) = RecordingSink::new();
    let mut dispatcher = dispatcher(sink);

    dispatcher.dispatch(RadioEvent::text(Some("!abcd1234"), "hi"));

    assert_eq!(
        output.records(),
        vec![
            SinkRecord::Message("!abcd1234: hi".to_string()),
            SinkRecord::Prompt("Ch1> ".to_string()),
        ]
    );
}

#[test]
fn missing_sender_defaults_to_unknown() {
    let (sink, output) = RecordingSink::new();
    let mut dispatcher = dispatcher(sink);

    dispatcher.dispatch(RadioEvent::text(None, "hello"));

    assert_eq!(
        output.records()[0],
        SinkRecord::Message("unknown: hello".to_string())
    );
}

#[test]
fn arrival_order_is_monotonic() {
    let (sink, _output) = RecordingSink::new();
    let mut dispatcher = dispatcher(sink);

    let first = dispatcher.accept(RadioEvent::text(None, "a")).unwrap();
    // Non-qualifying events do not consume sequence numbers.
    assert!(dispatcher.accept(RadioEvent::default()).is_none());
    let second = dispatcher.accept(RadioEvent::text(None, "b")).unwrap();

    assert_eq!(first.arrival_order, 0);
    assert_eq!(second.arrival_order, 1);
}

#[tokio::test]
async fn run_drains_events_in_arrival_order() {
    let (sink, output) = RecordingSink::new();
    let (tx, rx) = mpsc::channel(8);
    let dispatcher = ReceiveDispatcher::new(rx, sink, "Ch1> ".to_string());

    tx.send(RadioEvent::text(Some("!aa"), "first")).await.unwrap();
    tx.send(RadioEvent::default()).await.unwrap();
    tx.send(RadioEvent::text(Some("!bb"), "second")).await.unwrap();
    drop(tx);

    dispatcher.run().await;

    let lines: Vec<_> = output
        .records()
        .into_iter()
        .filter_map(|r| match r {
            SinkRecord::Message(line) => Some(line),
            SinkRecord::Prompt(_) => None,
        })
        .collect();
    assert_eq!(lines, vec!["!aa: first", "!bb: second"]);
}
