use editor_analysis::{
    Buffer, Coordinate, EditEvent, MirroredDocument, PositionTranslator, Range, TextEdit,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_insert_character_mirrors_into_flat_text() {
    let mut buffer = Buffer::from_lines(["abc", "def"]);
    let mut mirror = MirroredDocument::from_text(&buffer.text());

    let event = buffer.insert_text(Coordinate::new(0, 1), "X");
    mirror.edit(&event.to_text_edit(&buffer)).unwrap();

    assert_eq!(mirror.text(), "aXbc\ndef");
    assert_eq!(mirror.version(), 2);
}

#[test]
fn test_offset_of_second_row() {
    let buffer = Buffer::from_lines(["abc", "def"]);
    assert_eq!(buffer.to_offset(Coordinate::new(1, 2)), 6);
}

#[test]
fn test_remove_whole_line_event_from_json() {
    let mut buffer = Buffer::from_lines(["abc", "def", "ghi"]);
    let mut mirror = MirroredDocument::from_text(&buffer.text());

    let event = EditEvent::from_value(&json!({
        "action": "removeLines",
        "range": { "start": { "row": 1, "column": 0 }, "end": { "row": 2, "column": 0 } },
        "lines": ["def"]
    }))
    .unwrap();
    buffer.apply_event(&event).unwrap();

    let edit = event.to_text_edit(&buffer);
    assert_eq!(edit, TextEdit::delete(4, 8));
    mirror.edit(&edit).unwrap();
    assert_eq!(mirror.text(), "abc\nghi");
}

#[test]
fn test_insert_lines_into_empty_document() {
    let mut buffer = Buffer::new();
    let mut mirror = MirroredDocument::new();

    let event = buffer.insert_lines(0, vec!["foo".to_string(), "bar".to_string()]);
    mirror.edit(&event.to_text_edit(&buffer)).unwrap();

    assert_eq!(mirror.text(), "foo\nbar\n");
    assert_eq!(buffer.text(), mirror.text());
}

#[test]
fn test_multi_row_removal_round_trip() {
    let mut buffer = Buffer::from_lines(["one", "two", "three"]);
    let mut mirror = MirroredDocument::from_text(&buffer.text());

    let event = buffer.remove_text(Range::from_rows(0, 2, 2, 1));
    assert_eq!(
        event,
        EditEvent::RemoveText {
            range: Range::from_rows(0, 2, 2, 1),
            text: "e\ntwo\nt".to_string(),
        }
    );
    mirror.edit(&event.to_text_edit(&buffer)).unwrap();
    assert_eq!(mirror.text(), "onhree");
}

#[test]
fn test_registering_identical_content_is_idempotent() {
    let buffer = Buffer::from_lines(["abc", "def"]);
    let mut mirror = MirroredDocument::from_text(&buffer.text());
    mirror.update_content(&buffer.text());
    mirror.update_content(&buffer.text());
    assert_eq!(mirror.text(), buffer.text());
}
