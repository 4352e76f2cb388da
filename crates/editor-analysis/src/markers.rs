//! Marker ranges published to the host editor.
//!
//! Markers are coordinate-ranged highlights (error squiggles, go-to-definition targets, type
//! highlights). They are derived state: the host renders them, this crate keeps them roughly in
//! place while the buffer changes and replaces them wholesale when fresh analysis results arrive.

use crate::event::EditEvent;
use crate::position::{Coordinate, Range};

/// Stable marker identifier, unique within one [`MarkerSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// What a marker highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerClass {
    /// A diagnostic error span.
    Error,
    /// A declaration reached through go-to-definition.
    Reference,
    /// The span a type tooltip refers to.
    TypeHighlight,
}

impl MarkerClass {
    /// CSS-style class name the host can use for rendering.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Error => "typescript-error",
            Self::Reference => "typescript-ref",
            Self::TypeHighlight => "typescript-type",
        }
    }
}

/// A single marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Identifier.
    pub id: MarkerId,
    /// Marker class.
    pub class: MarkerClass,
    /// Highlighted range.
    pub range: Range,
}

/// The markers currently shown in one buffer.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    next_id: u64,
}

impl MarkerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker and return its id.
    pub fn add(&mut self, class: MarkerClass, range: Range) -> MarkerId {
        self.next_id += 1;
        let id = MarkerId(self.next_id);
        self.markers.push(Marker { id, class, range });
        id
    }

    /// Remove a marker. Returns `false` if the id is unknown.
    pub fn remove(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|marker| marker.id != id);
        self.markers.len() != before
    }

    /// Remove every marker of `class`; returns how many were removed.
    pub fn clear_class(&mut self, class: MarkerClass) -> usize {
        let before = self.markers.len();
        self.markers.retain(|marker| marker.class != class);
        before - self.markers.len()
    }

    /// Remove all markers.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Look up a marker.
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    /// All markers, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Markers of one class.
    pub fn of_class(&self, class: MarkerClass) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |marker| marker.class == class)
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if there are no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Move markers so they stay on the text they covered before `event`.
    ///
    /// Positions at or after an insertion point move with the inserted text (rows and, on the
    /// insertion row, columns). Positions after a removed range move back; positions inside it
    /// collapse to the removal start.
    pub fn shift_for_event(&mut self, event: &EditEvent) {
        for marker in &mut self.markers {
            marker.range.start = map_through(marker.range.start, event);
            marker.range.end = map_through(marker.range.end, event);
        }
    }
}

/// Where `at` ends up after `event`.
fn map_through(at: Coordinate, event: &EditEvent) -> Coordinate {
    let Range { start, end } = event.range();
    let rows = end.row.saturating_sub(start.row);

    if event.is_insert() {
        if at < start {
            at
        } else if at.row == start.row {
            Coordinate::new(end.row, end.column + (at.column - start.column))
        } else {
            Coordinate::new(at.row + rows, at.column)
        }
    } else if at <= start {
        at
    } else if at < end {
        start
    } else if at.row == end.row {
        Coordinate::new(start.row, start.column + (at.column - end.column))
    } else {
        Coordinate::new(at.row - rows, at.column)
    }
}
