use editor_analysis::{
    Buffer, Coordinate, EditEvent, MirroredDocument, PositionTranslator, Range, sum_lengths,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SNIPPETS: &[&str] = &["x", "ab", "\n", "foo\nbar", "你好", "\n\n", "👋 ok", ""];

fn replay(buffer: &Buffer, mirror: &mut MirroredDocument, event: &EditEvent) {
    let edit = event.to_text_edit(buffer);
    mirror.edit(&edit).unwrap();
}

fn random_coordinate(rng: &mut StdRng, buffer: &Buffer) -> Coordinate {
    let row = rng.gen_range(0..buffer.line_count());
    let column = rng.gen_range(0..=buffer.line_len(row));
    Coordinate::new(row, column)
}

fn random_event(rng: &mut StdRng, buffer: &mut Buffer) -> EditEvent {
    match rng.gen_range(0..4) {
        0 => {
            let at = random_coordinate(rng, buffer);
            let text = SNIPPETS[rng.gen_range(0..SNIPPETS.len())];
            buffer.insert_text(at, text)
        }
        1 => {
            let row = rng.gen_range(0..=buffer.line_count());
            let count = rng.gen_range(1..3);
            let lines = (0..count).map(|i| format!("line{i}")).collect();
            buffer.insert_lines(row, lines)
        }
        2 => {
            let a = random_coordinate(rng, buffer);
            let b = random_coordinate(rng, buffer);
            buffer.remove_text(Range::new(a, b))
        }
        _ => {
            let first = rng.gen_range(0..buffer.line_count());
            let last = rng.gen_range(first..buffer.line_count());
            buffer.remove_lines(first, last)
        }
    }
}

#[test]
fn test_random_event_sequences_keep_mirror_equal() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut buffer = Buffer::from_text("function f(a, b) {\n    return a + b;\n}\n");
        let mut mirror = MirroredDocument::from_text(&buffer.text());

        for step in 0..200 {
            let event = random_event(&mut rng, &mut buffer);
            replay(&buffer, &mut mirror, &event);
            assert_eq!(
                mirror.text(),
                buffer.text(),
                "seed {seed} step {step} event {event:?}"
            );
        }
        assert_eq!(mirror.version(), 201);
    }
}

#[test]
fn test_replayed_events_reproduce_buffer() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut source = Buffer::from_lines(["alpha", "beta", "gamma"]);
    let mut copy = source.clone();

    for _ in 0..300 {
        let event = random_event(&mut rng, &mut source);
        let value = event.to_value();
        let decoded = EditEvent::from_value(&value).unwrap();
        copy.apply_event(&decoded).unwrap();
    }
    assert_eq!(copy.lines(), source.lines());
}

#[test]
fn test_translators_agree_after_edits() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut buffer = Buffer::from_lines(["abc", "", "de"]);
    let mut mirror = MirroredDocument::from_text(&buffer.text());

    for _ in 0..50 {
        let event = random_event(&mut rng, &mut buffer);
        replay(&buffer, &mut mirror, &event);
    }

    let limit = sum_lengths(buffer.lines());
    for offset in 0..=limit + 1 {
        assert_eq!(mirror.to_coordinate(offset), buffer.to_coordinate(offset));
    }
    for row in 0..buffer.line_count() {
        for column in 0..=buffer.line_len(row) {
            let c = Coordinate::new(row, column);
            assert_eq!(mirror.to_offset(c), buffer.to_offset(c));
            assert_eq!(buffer.to_coordinate(buffer.to_offset(c)), c);
        }
    }
    assert_eq!(buffer.to_offset(Coordinate::new(buffer.line_count(), 0)), limit);
}
