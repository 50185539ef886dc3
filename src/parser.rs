//! Melody string parsing.
//!
//! A melody string is a space-separated list of tokens, each a pitch letter
//! followed by a duration symbol, e.g. `"C♩ D♩ E♪"`. Malformed tokens are
//! skipped rather than failing the whole melody.

use crate::note::{DurationClass, NoteEvent, Pitch};

/// Parse a melody string into an ordered note sequence.
///
/// Tokens shorter than two characters, unknown pitch letters, and unknown
/// duration symbols are all silently skipped. An empty input yields an
/// empty sequence. Pure and deterministic.
pub fn parse_melody(input: &str) -> Vec<NoteEvent> {
    let mut notes = Vec::new();

    for token in input.split(' ') {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        let rest = chars.as_str();
        if rest.is_empty() {
            continue;
        }

        let Some(pitch) = Pitch::from_char(first) else {
            continue;
        };
        let Some(duration) = DurationClass::from_symbol(rest) else {
            continue;
        };

        notes.push(NoteEvent { pitch, duration });
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_melody() {
        let notes = parse_melody("C\u{2669} D\u{2669} E\u{2669}");
        assert_eq!(notes.len(), 3);
        assert_eq!(
            notes[0],
            NoteEvent {
                pitch: Pitch::C,
                duration: DurationClass::Quarter
            }
        );
        assert_eq!(
            notes[2],
            NoteEvent {
                pitch: Pitch::E,
                duration: DurationClass::Quarter
            }
        );
    }

    #[test]
    fn test_parse_mixed_durations() {
        let notes = parse_melody("G\u{266A} A\u{1D157}\u{1D165}");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].duration, DurationClass::Eighth);
        assert_eq!(notes[1].duration, DurationClass::Half);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_melody("").is_empty());
        assert!(parse_melody("   ").is_empty());
    }

    #[test]
    fn test_malformed_tokens_skipped() {
        // Bare pitch letter, unknown pitch, unknown duration symbol
        let notes = parse_melody("C C\u{2669} X\u{2669} D? E\u{266A}");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].pitch, Pitch::C);
        assert_eq!(notes[1].pitch, Pitch::E);
    }

    #[test]
    fn test_parse_deterministic() {
        let input = "C\u{2669} D\u{266A} E\u{1D157}\u{1D165} F\u{2669}";
        assert_eq!(parse_melody(input), parse_melody(input));
    }
}
