#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;

fn load_str(raw: &str) -> Result<PresentationMeta, MetaError> {
    load(&mut raw.as_bytes())
}

#[test]
fn load_full_document() {
    let meta = load_str(
        r#"{
            "presentation_path": "/tmp/deck.md",
            "images": [
                {"content_path": "logo.png", "full_path": "/tmp/logo.png", "line": 3, "column": 5}
            ],
            "commands": [
                {"type": "capture"},
                {"type": "keys", "keys": "l"},
                {"type": "wait_for_change"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(meta.presentation_path, "/tmp/deck.md");
    assert_eq!(meta.images.len(), 1);
    assert_eq!(meta.images[0].line, 3);
    assert_eq!(meta.images[0].column, 5);
    assert_eq!(
        meta.capture_commands(),
        vec![
            CaptureCommand::CaptureSnapshot,
            CaptureCommand::SendKeys("l".into()),
            CaptureCommand::WaitForChange,
        ]
    );
}

#[test]
fn images_and_commands_default_to_empty() {
    let meta = load_str(r#"{"presentation_path": "deck.md"}"#).unwrap();
    assert!(meta.images.is_empty());
    assert!(meta.capture_commands().is_empty());
}

#[test]
fn empty_or_absent_type_is_a_noop() {
    let meta = load_str(
        r#"{
            "presentation_path": "deck.md",
            "commands": [{"type": ""}, {"keys": "x"}, {"type": "capture"}]
        }"#,
    )
    .unwrap();
    assert_eq!(meta.capture_commands(), vec![CaptureCommand::CaptureSnapshot]);
}

#[test]
fn keyed_command_without_keys_is_skipped() {
    let meta = load_str(
        r#"{"presentation_path": "deck.md", "commands": [{"type": "keys"}]}"#,
    )
    .unwrap();
    assert!(meta.capture_commands().is_empty());
}

#[test]
fn corrupted_metadata_is_an_error() {
    let err = load_str("{not json").unwrap_err();
    assert!(matches!(err, MetaError::InputCorrupted(_)));
    assert!(err.to_string().contains("corrupted"));
}

#[test]
fn inline_image_content_parses() {
    let meta = load_str(
        r#"{
            "presentation_path": "deck.md",
            "images": [{"content_path": "inline", "content_base64": "aGk=", "line": 1, "column": 1}]
        }"#,
    )
    .unwrap();
    assert_eq!(meta.images[0].content_base64.as_deref(), Some("aGk="));
    assert!(meta.images[0].full_path.is_none());
}
