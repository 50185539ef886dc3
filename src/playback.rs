//! Presents a note sequence on the pads with correct pacing.
//!
//! The driver is a small state machine ticked from the main loop: an
//! optional lead-in, then for each note a hold followed by a gap. It never
//! sleeps; every wait is a deadline checked against the `Instant` passed to
//! `tick`, so the loop stays responsive and an in-flight presentation can be
//! cancelled by dropping the driver.

use std::time::{Duration, Instant};

use crate::note::NoteEvent;

/// Floor on the silence between notes so pads stay visually distinct
pub const NOTE_GAP_MS: u64 = 150;

/// Hold duration for in-round drills (every note the same length)
pub const DRILL_NOTE_MS: u64 = 1000;

/// How long a note is held on the pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Every note uses one constant duration in milliseconds
    Fixed(u64),
    /// Each note uses its authored duration class
    Authored,
}

/// What the loop should do in response to a tick
#[derive(Debug, Clone, PartialEq)]
pub enum PadAction {
    /// Light the pad and start its tone
    Activate { pad: usize, hold_ms: u64 },
    /// Clear the active pad
    Deactivate,
    /// The last note's gap has elapsed. Carries the sequence exactly as
    /// presented, and the session generation the driver was launched with.
    Finished {
        generation: u64,
        sequence: Vec<NoteEvent>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    LeadIn,
    Hold(usize),
    Gap(usize),
    Done,
}

/// One in-flight presentation
#[derive(Debug)]
pub struct PlaybackDriver {
    sequence: Vec<NoteEvent>,
    policy: DurationPolicy,
    generation: u64,
    step: Step,
    next_at: Instant,
}

impl PlaybackDriver {
    /// Start presenting `sequence`. The first note activates `lead_in_ms`
    /// after `now`. An empty sequence finishes on the first tick.
    pub fn new(
        sequence: Vec<NoteEvent>,
        policy: DurationPolicy,
        generation: u64,
        lead_in_ms: u64,
        now: Instant,
    ) -> Self {
        Self {
            sequence,
            policy,
            generation,
            step: Step::LeadIn,
            next_at: now + Duration::from_millis(lead_in_ms),
        }
    }

    fn hold_ms(&self, index: usize) -> u64 {
        match self.policy {
            DurationPolicy::Fixed(ms) => ms,
            DurationPolicy::Authored => self.sequence[index].duration.millis(),
        }
    }

    fn activate(&mut self, index: usize, now: Instant) -> PadAction {
        let hold_ms = self.hold_ms(index);
        self.step = Step::Hold(index);
        self.next_at = now + Duration::from_millis(hold_ms);
        PadAction::Activate {
            pad: self.sequence[index].pitch.pad(),
            hold_ms,
        }
    }

    /// Advance at most one step. Returns `None` while waiting on a deadline
    /// or after completion; `Finished` is produced exactly once.
    pub fn tick(&mut self, now: Instant) -> Option<PadAction> {
        if self.step == Step::Done || now < self.next_at {
            return None;
        }

        match self.step {
            Step::LeadIn => {
                if self.sequence.is_empty() {
                    self.step = Step::Done;
                    return Some(PadAction::Finished {
                        generation: self.generation,
                        sequence: Vec::new(),
                    });
                }
                Some(self.activate(0, now))
            }
            Step::Hold(i) => {
                self.step = Step::Gap(i);
                self.next_at = now + Duration::from_millis(NOTE_GAP_MS);
                Some(PadAction::Deactivate)
            }
            Step::Gap(i) => {
                if i + 1 < self.sequence.len() {
                    Some(self.activate(i + 1, now))
                } else {
                    self.step = Step::Done;
                    Some(PadAction::Finished {
                        generation: self.generation,
                        sequence: std::mem::take(&mut self.sequence),
                    })
                }
            }
            Step::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{DurationClass, Pitch};
    use std::time::Duration;

    fn seq(pitches: &[Pitch]) -> Vec<NoteEvent> {
        pitches
            .iter()
            .map(|&pitch| NoteEvent {
                pitch,
                duration: DurationClass::Quarter,
            })
            .collect()
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn test_waits_out_lead_in() {
        let t0 = Instant::now();
        let mut driver =
            PlaybackDriver::new(seq(&[Pitch::C]), DurationPolicy::Fixed(100), 1, 500, t0);
        assert_eq!(driver.tick(at(t0, 499)), None);
        assert_eq!(
            driver.tick(at(t0, 500)),
            Some(PadAction::Activate { pad: 0, hold_ms: 100 })
        );
    }

    #[test]
    fn test_full_presentation_order() {
        let t0 = Instant::now();
        let notes = seq(&[Pitch::C, Pitch::D]);
        let mut driver = PlaybackDriver::new(notes.clone(), DurationPolicy::Fixed(100), 7, 0, t0);

        assert_eq!(
            driver.tick(t0),
            Some(PadAction::Activate { pad: 0, hold_ms: 100 })
        );
        // Hold not yet elapsed
        assert_eq!(driver.tick(at(t0, 50)), None);
        assert_eq!(driver.tick(at(t0, 100)), Some(PadAction::Deactivate));
        // Gap floor before the next note
        assert_eq!(driver.tick(at(t0, 200)), None);
        assert_eq!(
            driver.tick(at(t0, 250)),
            Some(PadAction::Activate { pad: 1, hold_ms: 100 })
        );
        assert_eq!(driver.tick(at(t0, 350)), Some(PadAction::Deactivate));
        assert_eq!(
            driver.tick(at(t0, 500)),
            Some(PadAction::Finished {
                generation: 7,
                sequence: notes
            })
        );
        // Ticking past completion produces nothing further
        assert_eq!(driver.tick(at(t0, 10_000)), None);
    }

    #[test]
    fn test_finished_signaled_once() {
        let t0 = Instant::now();
        let mut driver =
            PlaybackDriver::new(seq(&[Pitch::E]), DurationPolicy::Fixed(10), 3, 0, t0);
        let mut finishes = 0;
        for ms in 0..2000 {
            if let Some(PadAction::Finished { .. }) = driver.tick(at(t0, ms)) {
                finishes += 1;
            }
        }
        assert_eq!(finishes, 1);
    }

    #[test]
    fn test_authored_durations() {
        let t0 = Instant::now();
        let notes = vec![
            NoteEvent {
                pitch: Pitch::G,
                duration: DurationClass::Half,
            },
            NoteEvent {
                pitch: Pitch::A,
                duration: DurationClass::Eighth,
            },
        ];
        let mut driver = PlaybackDriver::new(notes, DurationPolicy::Authored, 0, 0, t0);
        assert_eq!(
            driver.tick(t0),
            Some(PadAction::Activate { pad: 4, hold_ms: 1000 })
        );
        assert_eq!(driver.tick(at(t0, 1000)), Some(PadAction::Deactivate));
        assert_eq!(
            driver.tick(at(t0, 1150)),
            Some(PadAction::Activate { pad: 5, hold_ms: 250 })
        );
    }

    #[test]
    fn test_empty_sequence_finishes_immediately() {
        let t0 = Instant::now();
        let mut driver = PlaybackDriver::new(Vec::new(), DurationPolicy::Authored, 9, 0, t0);
        assert_eq!(
            driver.tick(t0),
            Some(PadAction::Finished {
                generation: 9,
                sequence: Vec::new()
            })
        );
    }
}
