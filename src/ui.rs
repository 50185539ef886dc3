//! Terminal presentation adapter and the game's event loop.
//!
//! One single-threaded loop: poll the keyboard with a short timeout, tick
//! the playback driver, check the response deadline, redraw. Every state
//! mutation runs to completion inside one loop iteration, so events can
//! never interleave mid-transition.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use thiserror::Error;

use crate::catalog::Category;
use crate::game::{Game, PadPress, Phase, Presentation};
use crate::note::Pitch;
use crate::playback::{PadAction, PlaybackDriver};
use crate::synth::AudioEngine;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Keyboard layout: home row left to right, one key per pad
const PAD_KEYS: [char; 7] = ['a', 's', 'd', 'f', 'g', 'h', 'j'];

/// Rainbow palette, pad 0..6 (red through violet)
const PAD_COLORS: [Color; 7] = [
    Color::Red,
    Color::Rgb { r: 255, g: 127, b: 0 },
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Rgb { r: 75, g: 0, b: 130 },
    Color::Rgb { r: 148, g: 0, b: 211 },
];

/// How long a player press lights its pad
const FEEDBACK_FLASH_MS: u64 = 300;

/// Tone length for a player press
const FEEDBACK_NOTE_MS: u64 = 500;

fn pad_for_key(c: char) -> Option<usize> {
    PAD_KEYS.iter().position(|&k| k == c)
}

struct App {
    game: Game,
    driver: Option<PlaybackDriver>,
    engine: Option<AudioEngine>,
    active_pad: Option<usize>,
    flash_until: Option<Instant>,
}

impl App {
    fn new(category: Category) -> Self {
        Self {
            game: Game::new(category),
            // Missing audio is not fatal: the game degrades to visual-only
            engine: AudioEngine::new().ok(),
            driver: None,
            active_pad: None,
            flash_until: None,
        }
    }

    fn start_presentation(&mut self, presentation: Presentation, now: Instant) {
        self.driver = Some(PlaybackDriver::new(
            presentation.sequence,
            presentation.policy,
            presentation.generation,
            presentation.lead_in_ms,
            now,
        ));
        // A pending press flash keeps its pad lit into the lead-in; the
        // driver takes the display over at its first activation
        if self.flash_until.is_none() {
            self.active_pad = None;
        }
    }

    fn play_pitch(&self, pitch: Pitch, duration_ms: u64) {
        if let Some(engine) = &self.engine {
            engine.play_note(pitch.to_freq(), duration_ms);
        }
    }

    /// Light a pad briefly for a player press
    fn flash_pad(&mut self, pitch: Pitch, now: Instant) {
        self.play_pitch(pitch, FEEDBACK_NOTE_MS);
        self.active_pad = Some(pitch.pad());
        self.flash_until = Some(now + Duration::from_millis(FEEDBACK_FLASH_MS));
    }

    fn tick_driver(&mut self, now: Instant) {
        let Some(driver) = &mut self.driver else {
            return;
        };
        match driver.tick(now) {
            Some(PadAction::Activate { pad, hold_ms }) => {
                // Any leftover press flash yields to the presentation
                self.flash_until = None;
                self.active_pad = Some(pad);
                if let Some(pitch) = Pitch::from_pad(pad) {
                    self.play_pitch(pitch, hold_ms);
                }
            }
            Some(PadAction::Deactivate) => {
                self.active_pad = None;
            }
            Some(PadAction::Finished {
                generation,
                sequence,
            }) => {
                self.driver = None;
                self.active_pad = None;
                self.game.playback_finished(generation, sequence, now);
            }
            None => {}
        }
    }

    fn handle_pad_key(&mut self, pad: usize, now: Instant) {
        match self.game.press_pad(pad, now) {
            PadPress::Ignored => {}
            PadPress::Continue { pitch } => self.flash_pad(pitch, now),
            PadPress::NextRound {
                pitch,
                presentation,
            }
            | PadPress::Finale {
                pitch,
                presentation,
            } => {
                self.flash_pad(pitch, now);
                self.start_presentation(presentation, now);
            }
            PadPress::Mismatch { pitch } => {
                self.flash_pad(pitch, now);
                let sweep = self.game.sweep();
                self.start_presentation(sweep, now);
            }
        }
    }
}

/// Run the interactive game until Esc or q
pub fn run(category: Category) -> Result<(), AppError> {
    let mut stdout = io::stdout();

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = game_loop(&mut stdout, category);

    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn game_loop(stdout: &mut io::Stdout, category: Category) -> Result<(), AppError> {
    let mut app = App::new(category);
    let mut rng = rand::rng();

    loop {
        let now = Instant::now();

        // Response clock first, so a stall is seen before new input
        if app.game.deadline_expired(now) {
            let sweep = app.game.sweep();
            app.start_presentation(sweep, now);
        }

        app.tick_driver(now);

        if let Some(until) = app.flash_until {
            if now >= until {
                app.flash_until = None;
                app.active_pad = None;
            }
        }

        draw(stdout, &app, now)?;

        if !event::poll(Duration::from_millis(25))? {
            continue;
        }

        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        let now = Instant::now();
        match code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('n') | KeyCode::Enter => {
                if let Some(presentation) = app.game.start_game(&mut rng) {
                    app.start_presentation(presentation, now);
                } else {
                    app.driver = None;
                    app.active_pad = None;
                }
            }
            KeyCode::Char('c') => {
                app.game.switch_category();
            }
            KeyCode::Char('m') => {
                if let Some(engine) = &mut app.engine {
                    engine.toggle_muted();
                }
            }
            KeyCode::Char(c) => {
                if let Some(pad) = pad_for_key(c) {
                    app.handle_pad_key(pad, now);
                }
            }
            _ => {}
        }
    }
}

fn status_line(app: &App, now: Instant) -> String {
    match app.game.phase() {
        Phase::Idle => "Press n to start a game".to_string(),
        Phase::Priming | Phase::Playing => "Listen...".to_string(),
        Phase::PlayerTurn => {
            let secs = app.game.countdown(now).unwrap_or(0);
            format!("Your turn! Repeat the sequence ({secs}s)")
        }
        Phase::Finale => "You got the whole tune! Enjoy the melody".to_string(),
        Phase::GameOver => format!(
            "Game over! Score {} - press n to play again",
            app.game.score()
        ),
    }
}

fn draw(stdout: &mut io::Stdout, app: &App, now: Instant) -> Result<(), AppError> {
    let muted = app.engine.as_ref().is_some_and(|e| e.is_muted());
    let audio_note = if app.engine.is_none() {
        "  (no audio device)"
    } else if muted {
        "  (muted)"
    } else {
        ""
    };

    queue!(stdout, MoveTo(0, 0), Clear(ClearType::UntilNewLine))?;
    queue!(
        stdout,
        Print("clisimon - musical memory"),
        Print(audio_note)
    )?;

    queue!(stdout, MoveTo(0, 2), Clear(ClearType::UntilNewLine))?;
    let song = app.game.song().unwrap_or("-");
    queue!(
        stdout,
        Print(format!(
            "Song: {}    Bank: {}",
            song,
            app.game.category().label()
        ))
    )?;

    queue!(stdout, MoveTo(0, 3), Clear(ClearType::UntilNewLine))?;
    queue!(
        stdout,
        Print(format!(
            "Score: {}    High score: {}",
            app.game.score(),
            app.game.high_score()
        ))
    )?;

    // Pad row: a block per pad, bright when active, dim otherwise
    for row in 0..2u16 {
        queue!(stdout, MoveTo(2, 5 + row), Clear(ClearType::UntilNewLine))?;
        for pad in 0..7 {
            let active = app.active_pad == Some(pad);
            queue!(stdout, SetForegroundColor(PAD_COLORS[pad]))?;
            if active {
                queue!(stdout, SetAttribute(Attribute::Bold))?;
            } else {
                queue!(stdout, SetAttribute(Attribute::Dim))?;
            }
            queue!(stdout, Print("██████"), SetAttribute(Attribute::Reset))?;
            queue!(stdout, ResetColor, Print("  "))?;
        }
    }

    queue!(stdout, MoveTo(2, 7), Clear(ClearType::UntilNewLine))?;
    for (pad, key) in PAD_KEYS.iter().enumerate() {
        let marker = if app.active_pad == Some(pad) { '▲' } else { ' ' };
        queue!(stdout, Print(format!("  {key}{marker}    ")))?;
    }

    queue!(stdout, MoveTo(0, 9), Clear(ClearType::UntilNewLine))?;
    queue!(stdout, Print(status_line(app, now)))?;

    queue!(stdout, MoveTo(0, 11), Clear(ClearType::UntilNewLine))?;
    queue!(
        stdout,
        SetAttribute(Attribute::Dim),
        Print("Keys: a s d f g h j pads | n new game | c switch bank | m mute | Esc quit"),
        SetAttribute(Attribute::Reset)
    )?;

    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_keys_cover_all_pads() {
        for pad in 0..7 {
            assert_eq!(pad_for_key(PAD_KEYS[pad]), Some(pad));
        }
        assert_eq!(pad_for_key('z'), None);
    }

    #[test]
    fn test_one_color_per_pad() {
        assert_eq!(PAD_COLORS.len(), PAD_KEYS.len());
    }

    #[test]
    fn test_press_flash_survives_into_lead_in() {
        let t0 = Instant::now();
        let mut app = App::new(Category::Children);

        // A round-completing press flashes its pad, then the next round's
        // presentation starts; the flash must stay lit through the lead-in
        app.flash_pad(Pitch::F, t0);
        app.start_presentation(app.game.sweep(), t0);
        assert_eq!(app.active_pad, Some(3));

        // The presentation's first activation takes the display over
        app.tick_driver(t0 + Duration::from_millis(100));
        assert_eq!(app.active_pad, Some(0));
        assert_eq!(app.flash_until, None);
    }

    #[test]
    fn test_presentation_without_flash_clears_pad() {
        let t0 = Instant::now();
        let mut app = App::new(Category::Children);
        app.active_pad = Some(2);
        app.start_presentation(app.game.sweep(), t0);
        assert_eq!(app.active_pad, None);
    }
}
