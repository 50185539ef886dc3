//! Static melody catalog: two banks of song-name → melody-string pairs.
//!
//! Melody strings use the grammar from `parser`: pitch letter plus duration
//! symbol, space separated. All tunes stay on the naturals C..B so every
//! note lands on one of the seven pads.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::note::NoteEvent;
use crate::parser::parse_melody;

/// Which bank to draw songs from
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Category {
    Children,
    Pop,
}

impl Category {
    pub fn toggled(self) -> Category {
        match self {
            Category::Children => Category::Pop,
            Category::Pop => Category::Children,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Children => "children's tunes",
            Category::Pop => "pop songs",
        }
    }
}

const CHILDREN: &[(&str, &str)] = &[
    (
        "Twinkle Twinkle Little Star",
        "C\u{2669} C\u{2669} G\u{2669} G\u{2669} A\u{2669} A\u{2669} G\u{1D157}\u{1D165} \
         F\u{2669} F\u{2669} E\u{2669} E\u{2669} D\u{2669} D\u{2669} C\u{1D157}\u{1D165}",
    ),
    (
        "Mary Had a Little Lamb",
        "E\u{2669} D\u{2669} C\u{2669} D\u{2669} E\u{2669} E\u{2669} E\u{1D157}\u{1D165} \
         D\u{2669} D\u{2669} D\u{1D157}\u{1D165} E\u{2669} G\u{2669} G\u{1D157}\u{1D165}",
    ),
    (
        "Hot Cross Buns",
        "E\u{2669} D\u{2669} C\u{1D157}\u{1D165} E\u{2669} D\u{2669} C\u{1D157}\u{1D165} \
         C\u{266A} C\u{266A} C\u{266A} C\u{266A} D\u{266A} D\u{266A} D\u{266A} D\u{266A} \
         E\u{2669} D\u{2669} C\u{1D157}\u{1D165}",
    ),
    (
        "Row Row Row Your Boat",
        "C\u{2669} C\u{2669} C\u{266A} D\u{266A} E\u{2669} \
         E\u{266A} D\u{266A} E\u{266A} F\u{266A} G\u{1D157}\u{1D165}",
    ),
    (
        "London Bridge",
        "G\u{2669} A\u{266A} G\u{266A} F\u{2669} E\u{266A} F\u{266A} G\u{2669} \
         D\u{2669} E\u{2669} F\u{2669} E\u{2669} F\u{2669} G\u{2669} \
         G\u{2669} A\u{266A} G\u{266A} F\u{2669} E\u{266A} F\u{266A} G\u{2669} \
         D\u{2669} G\u{2669} E\u{2669} C\u{1D157}\u{1D165}",
    ),
];

const POP: &[(&str, &str)] = &[
    (
        "Ode to Joy",
        "E\u{2669} E\u{2669} F\u{2669} G\u{2669} G\u{2669} F\u{2669} E\u{2669} D\u{2669} \
         C\u{2669} C\u{2669} D\u{2669} E\u{2669} E\u{1D157}\u{1D165} D\u{266A} D\u{1D157}\u{1D165}",
    ),
    (
        "Jingle Bells",
        "E\u{2669} E\u{2669} E\u{1D157}\u{1D165} E\u{2669} E\u{2669} E\u{1D157}\u{1D165} \
         E\u{2669} G\u{2669} C\u{2669} D\u{2669} E\u{1D157}\u{1D165} \
         F\u{2669} F\u{2669} F\u{2669} F\u{266A} F\u{266A} E\u{2669} E\u{2669} E\u{266A} E\u{266A} \
         E\u{2669} D\u{2669} D\u{2669} E\u{2669} D\u{1D157}\u{1D165} G\u{1D157}\u{1D165}",
    ),
    (
        "Happy Birthday",
        "G\u{266A} G\u{266A} A\u{2669} G\u{2669} C\u{2669} B\u{1D157}\u{1D165} \
         G\u{266A} G\u{266A} A\u{2669} G\u{2669} D\u{2669} C\u{1D157}\u{1D165}",
    ),
    (
        "When the Saints Go Marching In",
        "C\u{266A} E\u{266A} F\u{266A} G\u{1D157}\u{1D165} \
         C\u{266A} E\u{266A} F\u{266A} G\u{1D157}\u{1D165} \
         C\u{266A} E\u{266A} F\u{266A} G\u{2669} E\u{2669} C\u{2669} E\u{2669} D\u{1D157}\u{1D165}",
    ),
];

fn bank(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::Children => CHILDREN,
        Category::Pop => POP,
    }
}

/// Song names in a bank, in table order
pub fn songs(category: Category) -> Vec<&'static str> {
    bank(category).iter().map(|(name, _)| *name).collect()
}

/// Raw melody string for a song, searching both banks
pub fn melody_string(name: &str) -> Option<&'static str> {
    CHILDREN
        .iter()
        .chain(POP.iter())
        .find(|(n, _)| *n == name)
        .map(|(_, m)| *m)
}

/// Pick one song uniformly at random from a bank and parse its melody.
/// Returns `None` only if the parsed melody comes out empty.
pub fn pick_song<R: Rng + ?Sized>(
    category: Category,
    rng: &mut R,
) -> Option<(&'static str, Vec<NoteEvent>)> {
    let &(name, melody) = bank(category).choose(rng)?;
    let notes = parse_melody(melody);
    if notes.is_empty() {
        return None;
    }
    Some((name, notes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: &str = "\u{1D157}\u{1D165}";

    #[test]
    fn test_every_song_parses_cleanly() {
        for (name, melody) in CHILDREN.iter().chain(POP.iter()) {
            let notes = parse_melody(melody);
            assert!(!notes.is_empty(), "{} parsed to an empty melody", name);
            // No token in the tables may be malformed (skipped)
            assert_eq!(
                notes.len(),
                melody.split_whitespace().count(),
                "{} has a malformed token",
                name
            );
        }
    }

    #[test]
    fn test_half_symbol_matches_tables() {
        // The two-codepoint half-note symbol must round-trip through the parser
        assert!(CHILDREN[0].1.contains(HALF));
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(melody_string("Hot Cross Buns").is_some());
        assert!(melody_string("Ode to Joy").is_some());
        assert!(melody_string("No Such Song").is_none());
    }

    #[test]
    fn test_pick_song_from_each_bank() {
        let mut rng = rand::rng();
        for category in [Category::Children, Category::Pop] {
            let (name, notes) = pick_song(category, &mut rng).unwrap();
            assert!(songs(category).contains(&name));
            assert!(!notes.is_empty());
        }
    }

    #[test]
    fn test_category_toggle() {
        assert_eq!(Category::Children.toggled(), Category::Pop);
        assert_eq!(Category::Pop.toggled(), Category::Children);
    }
}
