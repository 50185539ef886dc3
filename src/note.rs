/// The seven natural pitches, one per pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

/// All pitches in pad order (C = pad 0 .. B = pad 6)
pub const PITCHES: [Pitch; 7] = [
    Pitch::C,
    Pitch::D,
    Pitch::E,
    Pitch::F,
    Pitch::G,
    Pitch::A,
    Pitch::B,
];

impl Pitch {
    /// Pad index for this pitch. Total bijection with `from_pad`.
    pub fn pad(self) -> usize {
        match self {
            Pitch::C => 0,
            Pitch::D => 1,
            Pitch::E => 2,
            Pitch::F => 3,
            Pitch::G => 4,
            Pitch::A => 5,
            Pitch::B => 6,
        }
    }

    /// Pitch for a pad index (0..=6)
    pub fn from_pad(index: usize) -> Option<Pitch> {
        PITCHES.get(index).copied()
    }

    /// Semitone within an octave (C=0, B=11)
    pub fn semitone(self) -> u8 {
        match self {
            Pitch::C => 0,
            Pitch::D => 2,
            Pitch::E => 4,
            Pitch::F => 5,
            Pitch::G => 7,
            Pitch::A => 9,
            Pitch::B => 11,
        }
    }

    /// MIDI note number at octave 4 (middle C = 60)
    pub fn to_midi(self) -> u8 {
        5 * 12 + self.semitone()
    }

    /// Frequency in Hz (A4 = 440 Hz)
    pub fn to_freq(self) -> f64 {
        let midi = self.to_midi() as f64;
        440.0 * 2.0_f64.powf((midi - 69.0) / 12.0)
    }

    /// Parse the pitch letter used in melody strings
    pub fn from_char(c: char) -> Option<Pitch> {
        match c {
            'C' => Some(Pitch::C),
            'D' => Some(Pitch::D),
            'E' => Some(Pitch::E),
            'F' => Some(Pitch::F),
            'G' => Some(Pitch::G),
            'A' => Some(Pitch::A),
            'B' => Some(Pitch::B),
            _ => None,
        }
    }
}

/// Categorical note length, resolved to milliseconds for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationClass {
    Quarter,
    Eighth,
    Half,
}

impl DurationClass {
    /// Authored duration in milliseconds (quarter = 1 beat at 120 BPM)
    pub fn millis(self) -> u64 {
        match self {
            DurationClass::Quarter => 500,
            DurationClass::Eighth => 250,
            DurationClass::Half => 1000,
        }
    }

    /// Parse the duration symbol that follows the pitch letter in a
    /// melody string: ♩ = quarter, ♪ = eighth, notehead + stem = half.
    pub fn from_symbol(s: &str) -> Option<DurationClass> {
        match s {
            "\u{2669}" => Some(DurationClass::Quarter),
            "\u{266A}" => Some(DurationClass::Eighth),
            "\u{1D157}\u{1D165}" => Some(DurationClass::Half),
            _ => None,
        }
    }

    /// The melody-string symbol for this class
    pub fn symbol(self) -> &'static str {
        match self {
            DurationClass::Quarter => "\u{2669}",
            DurationClass::Eighth => "\u{266A}",
            DurationClass::Half => "\u{1D157}\u{1D165}",
        }
    }
}

/// A single note of a melody: what to play and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub pitch: Pitch,
    pub duration: DurationClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_bijection() {
        for (i, &pitch) in PITCHES.iter().enumerate() {
            assert_eq!(pitch.pad(), i);
            assert_eq!(Pitch::from_pad(i), Some(pitch));
        }
        assert_eq!(Pitch::from_pad(7), None);
    }

    #[test]
    fn test_middle_c_midi() {
        assert_eq!(Pitch::C.to_midi(), 60);
    }

    #[test]
    fn test_a4_frequency() {
        let freq = Pitch::A.to_freq();
        assert!((freq - 440.0).abs() < 0.01);
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(DurationClass::Quarter.millis(), 500);
        assert_eq!(DurationClass::Eighth.millis(), 250);
        assert_eq!(DurationClass::Half.millis(), 1000);
    }

    #[test]
    fn test_duration_symbols() {
        for class in [DurationClass::Quarter, DurationClass::Eighth, DurationClass::Half] {
            assert_eq!(DurationClass::from_symbol(class.symbol()), Some(class));
        }
        assert_eq!(DurationClass::from_symbol("x"), None);
        assert_eq!(DurationClass::from_symbol(""), None);
    }
}
