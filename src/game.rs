//! The round/turn state machine.
//!
//! Owns the authoritative session state: selected song, round counter,
//! frozen expected sequence, player input buffer, score, and the response
//! deadline. All decisions are pure functions of the event plus an injected
//! `Instant`, so the machine is deterministic under test; the main loop in
//! `ui` supplies real wall-clock time.
//!
//! Every presentation is stamped with the session generation. `start_game`
//! bumps the generation, so a completion arriving from a presentation
//! launched before the bump is recognized as stale and dropped instead of
//! mutating the new session.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::catalog::{self, Category};
use crate::note::{NoteEvent, Pitch, PITCHES};
use crate::playback::{DurationPolicy, DRILL_NOTE_MS};

/// Player response window per pad press
pub const RESPONSE_WINDOW_MS: u64 = 3000;

/// Lead-in before the priming note
pub const PRIMING_LEAD_IN_MS: u64 = 500;

/// Pause before each subsequent round and before the finale
pub const ROUND_LEAD_IN_MS: u64 = 1000;

/// Per-pad hold during the game-over sweep
pub const SWEEP_NOTE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No song chosen yet
    Idle,
    /// Presenting the single first note of a new game
    Priming,
    /// Presenting the current round's sequence
    Playing,
    /// Awaiting pad input
    PlayerTurn,
    /// Presenting the whole melody as a reward
    Finale,
    /// Terminal until a new game starts
    GameOver,
}

/// A sequence the loop should hand to the playback driver
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub sequence: Vec<NoteEvent>,
    pub policy: DurationPolicy,
    pub lead_in_ms: u64,
    pub generation: u64,
}

/// Outcome of a pad press
#[derive(Debug, Clone, PartialEq)]
pub enum PadPress {
    /// Not the player's turn, or not a real pad
    Ignored,
    /// Correct so far; more notes remain this round
    Continue { pitch: Pitch },
    /// Round complete; present the next round
    NextRound { pitch: Pitch, presentation: Presentation },
    /// Round complete and the melody is exhausted; play the finale
    Finale { pitch: Pitch, presentation: Presentation },
    /// Wrong pad; the game is over
    Mismatch { pitch: Pitch },
}

#[derive(Debug)]
pub struct Game {
    phase: Phase,
    category: Category,
    song: Option<&'static str>,
    melody: Vec<NoteEvent>,
    /// `None` is the priming round (about to present one note)
    round: Option<usize>,
    /// Frozen copy of whatever was actually presented this round
    expected: Vec<NoteEvent>,
    /// Pad indices pressed so far this round
    input: Vec<usize>,
    score: u32,
    high_score: u32,
    generation: u64,
    deadline: Option<Instant>,
}

impl Game {
    pub fn new(category: Category) -> Self {
        Self {
            phase: Phase::Idle,
            category,
            song: None,
            melody: Vec::new(),
            round: None,
            expected: Vec::new(),
            input: Vec::new(),
            score: 0,
            high_score: 0,
            generation: 0,
            deadline: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn song(&self) -> Option<&'static str> {
        self.song
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Whole seconds left on the response clock, counting down 3, 2, 1
    pub fn countdown(&self, now: Instant) -> Option<u64> {
        if self.phase != Phase::PlayerTurn {
            return None;
        }
        let deadline = self.deadline?;
        let remaining = deadline.saturating_duration_since(now).as_millis() as u64;
        Some(remaining.div_ceil(1000))
    }

    /// Category switching is only allowed outside a live game
    pub fn can_switch_category(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::GameOver)
    }

    /// Switch banks for the next game. Ignored mid-game.
    pub fn switch_category(&mut self) -> bool {
        if !self.can_switch_category() {
            return false;
        }
        self.category = self.category.toggled();
        true
    }

    /// Start (or restart) a game: pick a random song from the active bank
    /// and return the priming presentation. Always invalidates any in-flight
    /// presentation by bumping the session generation. Returns `None` and
    /// falls back to `Idle` if the chosen melody parses empty.
    pub fn start_game<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Presentation> {
        match catalog::pick_song(self.category, rng) {
            Some((name, melody)) => self.begin(name, melody),
            None => {
                self.reset_to_idle();
                None
            }
        }
    }

    fn begin(&mut self, name: &'static str, melody: Vec<NoteEvent>) -> Option<Presentation> {
        self.generation += 1;
        if melody.is_empty() {
            self.reset_to_idle();
            return None;
        }
        self.phase = Phase::Priming;
        self.song = Some(name);
        self.melody = melody;
        self.round = None;
        self.expected.clear();
        self.input.clear();
        self.score = 0;
        self.deadline = None;
        Some(Presentation {
            sequence: self.melody[..1].to_vec(),
            policy: DurationPolicy::Fixed(DRILL_NOTE_MS),
            lead_in_ms: PRIMING_LEAD_IN_MS,
            generation: self.generation,
        })
    }

    fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.song = None;
        self.melody.clear();
        self.round = None;
        self.expected.clear();
        self.input.clear();
        self.score = 0;
        self.deadline = None;
    }

    /// How many notes the current round presents
    fn presentation_len(&self) -> usize {
        match self.round {
            None => 1,
            Some(r) => (r + 2).min(self.melody.len()),
        }
    }

    /// A presentation finished. `sequence` is the exact note list the driver
    /// played; it becomes the expected sequence for the player's turn. Stale
    /// generations (from a presentation outlived by a newer game) are
    /// dropped without touching the session.
    pub fn playback_finished(&mut self, generation: u64, sequence: Vec<NoteEvent>, now: Instant) {
        if generation != self.generation {
            return;
        }
        match self.phase {
            Phase::Priming | Phase::Playing => {
                self.expected = sequence;
                self.input.clear();
                self.phase = Phase::PlayerTurn;
                self.deadline = Some(now + Duration::from_millis(RESPONSE_WINDOW_MS));
            }
            Phase::Finale => {
                self.phase = Phase::GameOver;
                self.deadline = None;
            }
            // The game-over sweep also completes through here; nothing to do
            Phase::Idle | Phase::PlayerTurn | Phase::GameOver => {}
        }
    }

    /// A pad was pressed. Validates the press against the expected sequence
    /// prefix-wise and decides the transition.
    pub fn press_pad(&mut self, pad: usize, now: Instant) -> PadPress {
        if self.phase != Phase::PlayerTurn {
            return PadPress::Ignored;
        }
        let Some(pitch) = Pitch::from_pad(pad) else {
            return PadPress::Ignored;
        };

        // Each press re-arms the response window
        self.deadline = Some(now + Duration::from_millis(RESPONSE_WINDOW_MS));
        self.input.push(pad);

        let k = self.input.len() - 1;
        match self.expected.get(k) {
            Some(note) if note.pitch == pitch => {}
            _ => {
                self.enter_game_over();
                return PadPress::Mismatch { pitch };
            }
        }

        if self.input.len() < self.expected.len() {
            return PadPress::Continue { pitch };
        }

        // Round complete: priming scores 0, round r scores r + 1
        self.score = match self.round {
            None => 0,
            Some(r) => r as u32 + 1,
        };
        self.high_score = self.high_score.max(self.score);
        self.deadline = None;
        self.input.clear();
        self.expected.clear();

        // Finale once the just-completed round covered the whole melody.
        // Priming never qualifies: even a one-note melody gets a round 0.
        if matches!(self.round, Some(r) if r + 2 >= self.melody.len()) {
            self.phase = Phase::Finale;
            let presentation = Presentation {
                sequence: self.melody.clone(),
                policy: DurationPolicy::Authored,
                lead_in_ms: ROUND_LEAD_IN_MS,
                generation: self.generation,
            };
            return PadPress::Finale { pitch, presentation };
        }

        self.round = Some(match self.round {
            None => 0,
            Some(r) => r + 1,
        });
        self.phase = Phase::Playing;
        let presentation = Presentation {
            sequence: self.melody[..self.presentation_len()].to_vec(),
            policy: DurationPolicy::Fixed(DRILL_NOTE_MS),
            lead_in_ms: ROUND_LEAD_IN_MS,
            generation: self.generation,
        };
        PadPress::NextRound { pitch, presentation }
    }

    /// Check the response clock. Returns true when the deadline has passed
    /// and the game has transitioned to `GameOver`.
    pub fn deadline_expired(&mut self, now: Instant) -> bool {
        if self.phase != Phase::PlayerTurn {
            return false;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.enter_game_over();
                true
            }
            _ => false,
        }
    }

    fn enter_game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.deadline = None;
        self.input.clear();
        self.expected.clear();
    }

    /// All seven pads in index order, for the game-over animation
    pub fn sweep(&self) -> Presentation {
        Presentation {
            sequence: PITCHES
                .iter()
                .map(|&pitch| NoteEvent {
                    pitch,
                    duration: crate::note::DurationClass::Quarter,
                })
                .collect(),
            policy: DurationPolicy::Fixed(SWEEP_NOTE_MS),
            lead_in_ms: 100,
            generation: self.generation,
        }
    }
}
