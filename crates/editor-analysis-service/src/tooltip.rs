//! Type tooltips.
//!
//! Hovering asks the engine for the type at the hovered offset (after a short delay) and, when
//! the type belongs to a call target, for the signature just past the symbol so the active
//! overload can be picked.

use crate::debounce::Debouncer;
use crate::engine::{AnalysisEngine, SignatureInfo, TypeInfo};
use crate::error::EngineError;
use editor_analysis::{Coordinate, PositionTranslator, Range};
use std::time::{Duration, Instant};

/// Text shown for `type_info`.
///
/// Plain text wins; a single overload is shown as is; several overloads show the active one
/// (by the signature's active formal, clamped) plus the number of others.
pub fn tooltip_text(type_info: &TypeInfo, signature: Option<&SignatureInfo>) -> Option<String> {
    let member = &type_info.member_name;
    if let Some(text) = member.text.as_deref().filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }
    match member.entries.as_slice() {
        [] => None,
        [single] => Some(single.clone()),
        entries => {
            let active = signature
                .map(|sig| sig.active_formal)
                .unwrap_or(0)
                .min(entries.len() - 1);
            Some(format!(
                "{} (+ {} overload(s))",
                entries[active],
                entries.len() - 1
            ))
        }
    }
}

/// A resolved tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    /// Text to show.
    pub text: String,
    /// Range to highlight; only set when the symbol fits on one row.
    pub highlight: Option<Range>,
}

/// Resolve the tooltip for `at`. Engine failures for the signature lookup are ignored.
pub fn tooltip_at<E, T>(
    engine: &E,
    document_id: &str,
    translator: &T,
    at: Coordinate,
) -> Result<Option<Tooltip>, EngineError>
where
    E: AnalysisEngine + ?Sized,
    T: PositionTranslator,
{
    let offset = translator.to_offset(at);
    let Some(type_info) = engine.type_at(document_id, offset)? else {
        return Ok(None);
    };
    let signature = engine
        .signature_at(document_id, type_info.lim_char + 1)
        .ok()
        .flatten();
    let Some(text) = tooltip_text(&type_info, signature.as_ref()) else {
        return Ok(None);
    };

    let range = translator.to_range(type_info.min_char, type_info.lim_char);
    Ok(Some(Tooltip {
        text,
        highlight: range.is_single_row().then_some(range),
    }))
}

/// Hover tooltip state owned by one session.
#[derive(Debug, Clone)]
pub struct TooltipState {
    debouncer: Debouncer,
    hover: Option<Coordinate>,
    current: Option<Tooltip>,
}

impl TooltipState {
    /// Create a closed tooltip with the given hover delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            hover: None,
            current: None,
        }
    }

    /// Record the hovered position.
    ///
    /// A pending lookup is not pushed back by further movement; it resolves the latest position
    /// when it fires.
    pub fn hover(&mut self, at: Coordinate, now: Instant) {
        self.hover = Some(at);
        if !self.debouncer.is_pending() {
            self.debouncer.schedule(now);
        }
    }

    /// The position to resolve, once the hover delay has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<Coordinate> {
        self.debouncer.take_due(now)?;
        self.hover
    }

    /// Show `tooltip`.
    pub fn open(&mut self, tooltip: Tooltip) {
        self.current = Some(tooltip);
    }

    /// Hide the tooltip and drop any pending lookup.
    pub fn close(&mut self) {
        self.current = None;
        self.hover = None;
        self.debouncer.cancel();
    }

    /// Returns `true` while a tooltip is shown.
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// The shown tooltip.
    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemberName;

    fn overloads(entries: &[&str]) -> TypeInfo {
        TypeInfo {
            member_name: MemberName {
                text: None,
                entries: entries.iter().map(|e| e.to_string()).collect(),
            },
            min_char: 0,
            lim_char: 3,
        }
    }

    #[test]
    fn test_tooltip_text_variants() {
        let plain = TypeInfo {
            member_name: MemberName {
                text: Some("(var) x: number".to_string()),
                entries: vec!["ignored".to_string()],
            },
            min_char: 0,
            lim_char: 1,
        };
        assert_eq!(tooltip_text(&plain, None).as_deref(), Some("(var) x: number"));
        assert_eq!(
            tooltip_text(&overloads(&["f(a)"]), None).as_deref(),
            Some("f(a)")
        );
        assert_eq!(tooltip_text(&overloads(&[]), None), None);
    }

    #[test]
    fn test_tooltip_text_picks_active_overload() {
        let info = overloads(&["f()", "f(a)", "f(a, b)"]);
        let sig = SignatureInfo {
            name: "f".to_string(),
            active_formal: 1,
        };
        assert_eq!(
            tooltip_text(&info, Some(&sig)).as_deref(),
            Some("f(a) (+ 2 overload(s))")
        );

        let out_of_range = SignatureInfo {
            name: "f".to_string(),
            active_formal: 9,
        };
        assert_eq!(
            tooltip_text(&info, Some(&out_of_range)).as_deref(),
            Some("f(a, b) (+ 2 overload(s))")
        );
    }

    #[test]
    fn test_hover_waits_for_delay() {
        let mut state = TooltipState::new(Duration::from_millis(100));
        let now = Instant::now();
        state.hover(Coordinate::new(0, 1), now);
        state.hover(Coordinate::new(0, 4), now + Duration::from_millis(60));
        assert_eq!(state.take_due(now + Duration::from_millis(60)), None);
        assert_eq!(
            state.take_due(now + Duration::from_millis(100)),
            Some(Coordinate::new(0, 4))
        );

        state.open(Tooltip {
            text: "x".to_string(),
            highlight: None,
        });
        assert!(state.is_open());
        state.close();
        assert!(!state.is_open());
    }
}
