//! Symbol occurrences: highlighting, rename-style multi-selection and go-to-definition.

use crate::debounce::Debouncer;
use crate::engine::ReferenceEntry;
use editor_analysis::{Coordinate, PositionTranslator, Range};
use std::time::{Duration, Instant};

/// Coordinate ranges of `references` (in engine order).
pub fn occurrence_ranges<T: PositionTranslator>(
    translator: &T,
    references: &[ReferenceEntry],
) -> Vec<Range> {
    references
        .iter()
        .map(|r| translator.to_range(r.min_char, r.lim_char))
        .collect()
}

/// Where go-to-definition lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionTarget {
    /// New cursor position (start of the declared name).
    pub cursor: Coordinate,
    /// Range of the declared name.
    pub range: Range,
}

/// The declaration of the first occurrence, if the engine knows it.
pub fn definition_target<T: PositionTranslator>(
    translator: &T,
    references: &[ReferenceEntry],
) -> Option<DefinitionTarget> {
    let span = references.first()?.declaration?;
    let range = translator.to_range(span.start, span.end());
    Some(DefinitionTarget {
        cursor: range.start,
        range,
    })
}

/// Cursor-driven occurrence highlighting, refreshed a short while after the cursor settles.
#[derive(Debug, Clone)]
pub struct OccurrenceState {
    debouncer: Debouncer,
    ranges: Vec<Range>,
}

impl OccurrenceState {
    /// Create an empty state with the given settle delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            ranges: Vec::new(),
        }
    }

    /// The cursor moved: restart the settle delay.
    pub fn cursor_moved(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// Returns `true` once the cursor has settled; fires once per move.
    pub fn take_due(&mut self, now: Instant) -> bool {
        self.debouncer.take_due(now).is_some()
    }

    /// Replace the highlighted ranges.
    pub fn set_ranges(&mut self, ranges: Vec<Range>) {
        self.ranges = ranges;
    }

    /// Highlighted ranges.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Drop highlights and any pending refresh.
    pub fn clear(&mut self) {
        self.ranges.clear();
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_analysis::{Buffer, TextSpan};

    fn reference(min_char: usize, lim_char: usize, declaration: Option<TextSpan>) -> ReferenceEntry {
        ReferenceEntry {
            file_name: "temp.ts".to_string(),
            min_char,
            lim_char,
            is_write_access: false,
            declaration,
        }
    }

    #[test]
    fn test_ranges_and_definition() {
        let buffer = Buffer::from_lines(["var abc = 1;", "abc++;"]);
        let decl = Some(TextSpan::from_bounds(4, 7));
        let refs = vec![reference(13, 16, decl), reference(4, 7, decl)];

        assert_eq!(
            occurrence_ranges(&buffer, &refs),
            vec![Range::from_rows(1, 0, 1, 3), Range::from_rows(0, 4, 0, 7)]
        );
        let target = definition_target(&buffer, &refs).unwrap();
        assert_eq!(target.cursor, Coordinate::new(0, 4));
        assert_eq!(target.range, Range::from_rows(0, 4, 0, 7));
    }

    #[test]
    fn test_no_definition_without_declaration() {
        let buffer = Buffer::from_lines(["x"]);
        assert_eq!(definition_target(&buffer, &[reference(0, 1, None)]), None);
        assert_eq!(definition_target(&buffer, &[]), None);
    }

    #[test]
    fn test_settle_delay() {
        let mut state = OccurrenceState::new(Duration::from_millis(200));
        let now = Instant::now();
        state.cursor_moved(now);
        state.cursor_moved(now + Duration::from_millis(150));
        assert!(!state.take_due(now + Duration::from_millis(250)));
        assert!(state.take_due(now + Duration::from_millis(350)));
        assert!(!state.take_due(now + Duration::from_millis(400)));
    }
}
