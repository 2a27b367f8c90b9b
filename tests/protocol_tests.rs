use live_translator::protocol::{
    ClientMessage, ErrorEvent, ServerMessage, TranslationRequest, TranslationResult,
};

#[test]
fn test_translate_frame_encoding() {
    let msg = ClientMessage::Translate(TranslationRequest::new("Hello there", "Spanish"));

    let json = msg.encode().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["event"], "translate");
    assert_eq!(value["data"]["text"], "Hello there");
    assert_eq!(value["data"]["targetLanguage"], "Spanish");
    assert!(value["data"].get("id").is_none(), "Absent id stays off the wire");
}

#[test]
fn test_translate_frame_without_language() {
    let json = r#"{"event":"translate","data":{"text":"Good morning"}}"#;

    let msg = ClientMessage::decode(json).unwrap();
    let ClientMessage::Translate(request) = msg;

    assert_eq!(request.text.as_deref(), Some("Good morning"));
    assert_eq!(request.target_language, None);
    assert_eq!(request.id, None);
}

#[test]
fn test_translate_frame_without_text() {
    let json = r#"{"event":"translate","data":{}}"#;

    let ClientMessage::Translate(request) = ClientMessage::decode(json).unwrap();
    assert_eq!(request.text, None);
}

#[test]
fn test_unknown_event_is_rejected() {
    assert!(ClientMessage::decode(r#"{"event":"shout","data":{"text":"hi"}}"#).is_err());
    assert!(ClientMessage::decode("not json").is_err());
    assert!(ClientMessage::decode(r#"{"text":"untagged"}"#).is_err());
}

#[test]
fn test_translation_frame() {
    let msg = ServerMessage::Translation(TranslationResult {
        original: "Hello there".to_string(),
        translated: "Hola, ¿qué tal?".to_string(),
        id: None,
    });

    let json = msg.encode().unwrap();
    assert_eq!(
        json,
        r#"{"event":"translation","data":{"original":"Hello there","translated":"Hola, ¿qué tal?"}}"#
    );
}

#[test]
fn test_error_frame() {
    let json = r#"{"event":"error","data":{"message":"Translation failed: rate limit exceeded"}}"#;

    let msg = ServerMessage::decode(json).unwrap();
    assert_eq!(
        msg,
        ServerMessage::Error(ErrorEvent {
            message: "Translation failed: rate limit exceeded".to_string(),
            id: None,
        })
    );
}

#[test]
fn test_correlation_id_is_carried() {
    let request = TranslationRequest {
        id: Some("req-7".to_string()),
        ..TranslationRequest::new("Hi", "German")
    };
    let json = ClientMessage::Translate(request).encode().unwrap();
    assert!(json.contains(r#""id":"req-7""#));

    let reply = r#"{"event":"translation","data":{"original":"Hi","translated":"Hallo","id":"req-7"}}"#;
    match ServerMessage::decode(reply).unwrap() {
        ServerMessage::Translation(result) => assert_eq!(result.id.as_deref(), Some("req-7")),
        other => panic!("unexpected message: {:?}", other),
    }
}
