// Tests for the session channel client's observable state
//
// The transport is replaced by driving `handle_event` directly; requests the
// client sends land in a plain mpsc receiver. Time is paused so the error
// display timer can be checked precisely.

use live_translator::channel::{ChannelClient, ChannelEvent, ERROR_DISPLAY_DURATION};
use live_translator::protocol::{
    ClientMessage, ErrorEvent, ServerMessage, TranslationRequest, TranslationResult,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn client() -> (ChannelClient, mpsc::UnboundedReceiver<ClientMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelClient::new(tx, ERROR_DISPLAY_DURATION), rx)
}

fn translation(original: &str, translated: &str) -> ChannelEvent {
    ChannelEvent::Message(ServerMessage::Translation(TranslationResult {
        original: original.to_string(),
        translated: translated.to_string(),
        id: None,
    }))
}

fn error(message: &str) -> ChannelEvent {
    ChannelEvent::Message(ServerMessage::Error(ErrorEvent {
        message: message.to_string(),
        id: None,
    }))
}

#[tokio::test]
async fn test_connection_state_follows_signals() {
    let (client, _rx) = client();
    let connected = client.subscribe_connected();

    assert!(!client.is_connected());

    client.handle_event(ChannelEvent::Connected);
    assert!(client.is_connected());
    assert!(*connected.borrow());

    client.handle_event(ChannelEvent::Disconnected);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_translate_sends_when_connected() {
    let (client, mut rx) = client();
    client.handle_event(ChannelEvent::Connected);

    assert!(client.translate("Hello there", "Spanish"));

    assert_eq!(
        rx.try_recv().unwrap(),
        ClientMessage::Translate(TranslationRequest::new("Hello there", "Spanish"))
    );
}

#[tokio::test]
async fn test_translate_is_dropped_while_disconnected() {
    let (client, mut rx) = client();

    assert!(!client.translate("Hello there", "Spanish"));
    assert!(rx.try_recv().is_err(), "Nothing is queued while disconnected");

    // Reconnecting does not replay the dropped request
    client.handle_event(ChannelEvent::Connected);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_translations_are_most_recent_first() {
    let (client, _rx) = client();

    client.handle_event(translation("one", "uno"));
    client.handle_event(translation("two", "dos"));

    let log = client.translations();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].original, "two");
    assert_eq!(log[1].original, "one");
}

#[tokio::test]
async fn test_duplicate_results_are_kept() {
    let (client, _rx) = client();

    client.handle_event(translation("hello", "hola"));
    client.handle_event(translation("hello", "hola"));

    assert_eq!(client.translations().len(), 2);
}

#[tokio::test]
async fn test_translation_subscribers_are_notified() {
    let (client, _rx) = client();
    let mut translations = client.subscribe_translations();

    client.handle_event(translation("hello", "hola"));

    assert!(translations.has_changed().unwrap());
    assert_eq!(translations.borrow_and_update()[0].translated, "hola");
}

#[tokio::test(start_paused = true)]
async fn test_error_clears_after_five_seconds() {
    let (client, _rx) = client();

    client.handle_event(error("Translation failed: rate limit exceeded"));
    assert_eq!(
        client.last_error().as_deref(),
        Some("Translation failed: rate limit exceeded")
    );

    sleep(Duration::from_millis(4900)).await;
    assert!(client.last_error().is_some(), "Still shown before 5 seconds");

    sleep(Duration::from_millis(200)).await;
    assert_eq!(client.last_error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_second_error_restarts_timer() {
    let (client, _rx) = client();

    client.handle_event(error("first"));
    sleep(Duration::from_secs(3)).await;

    client.handle_event(error("second"));
    assert_eq!(client.last_error().as_deref(), Some("second"));

    // First timer would have fired at t=5s
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(client.last_error().as_deref(), Some("second"));

    // Second timer fires at t=8s
    sleep(Duration::from_millis(2600)).await;
    assert_eq!(client.last_error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_connect_clears_error() {
    let (client, _rx) = client();

    client.handle_event(error("Translation failed: network"));
    client.handle_event(ChannelEvent::Connected);

    assert_eq!(client.last_error(), None);
}

#[tokio::test]
async fn test_close_disconnects() {
    let (client, mut rx) = client();
    client.handle_event(ChannelEvent::Connected);

    client.close();
    client.close();

    assert!(!client.is_connected());
    assert!(!client.translate("late", "Spanish"));
    assert!(rx.try_recv().is_err());
}
