//! Sine-wave pad tones through cpal.
//!
//! The output callback owns all synthesis state and drains a command
//! channel non-blockingly; the game loop never touches the audio thread
//! directly. Audio is best effort: if no output device exists the engine
//! fails to construct and the game runs visual-only.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output audio device available")]
    NoDevice,
    #[error("failed to get default output config: {0}")]
    Config(String),
    #[error("failed to build output stream: {0}")]
    BuildStream(String),
    #[error("failed to start output stream: {0}")]
    Start(String),
}

/// A command sent to the audio thread
enum AudioCommand {
    /// Play a tone at a given frequency for a duration in seconds
    PlayNote { freq: f64, duration_secs: f64 },
    /// Cut whatever is sounding
    Silence,
}

/// Handle to the output stream. Dropping it stops audio.
pub struct AudioEngine {
    cmd_tx: mpsc::Sender<AudioCommand>,
    muted: bool,
    _stream: cpal::Stream,
}

impl AudioEngine {
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;

        let sample_rate = config.sample_rate() as f64;

        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();

        // Synthesis state, owned by the callback
        let mut phase: f64 = 0.0;
        let mut freq: f64 = 0.0;
        let mut samples_total: usize = 0;
        let mut samples_remaining: usize = 0;

        // Short linear ramps at note edges to avoid clicks
        let attack_samples = (sample_rate * 0.005) as usize;
        let release_samples = (sample_rate * 0.02) as usize;

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if let Ok(cmd) = cmd_rx.try_recv() {
                        match cmd {
                            AudioCommand::PlayNote {
                                freq: f,
                                duration_secs,
                            } => {
                                freq = f;
                                samples_total = (duration_secs * sample_rate) as usize;
                                samples_remaining = samples_total;
                                phase = 0.0;
                            }
                            AudioCommand::Silence => {
                                samples_remaining = 0;
                            }
                        }
                    }

                    for sample in data.iter_mut() {
                        if samples_remaining > 0 {
                            let value =
                                (phase * freq * 2.0 * std::f64::consts::PI / sample_rate).sin();
                            let elapsed = samples_total - samples_remaining;
                            let mut amp = 0.3;
                            if attack_samples > 0 && elapsed < attack_samples {
                                amp *= elapsed as f64 / attack_samples as f64;
                            }
                            if release_samples > 0 && samples_remaining < release_samples {
                                amp *= samples_remaining as f64 / release_samples as f64;
                            }
                            *sample = (value * amp) as f32;
                            phase += 1.0;
                            samples_remaining -= 1;
                        } else {
                            *sample = 0.0;
                        }
                    }
                },
                move |err| {
                    // Stream errors degrade to silence; gameplay pacing is
                    // wall-clock and does not depend on audio completing.
                    let _ = err;
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::Start(e.to_string()))?;

        Ok(Self {
            cmd_tx,
            muted: false,
            _stream: stream,
        })
    }

    /// Start a tone. A new note replaces whatever is sounding.
    pub fn play_note(&self, freq: f64, duration_ms: u64) {
        if self.muted {
            return;
        }
        let _ = self.cmd_tx.send(AudioCommand::PlayNote {
            freq,
            duration_secs: duration_ms as f64 / 1000.0,
        });
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_muted(&mut self) {
        self.muted = !self.muted;
        if self.muted {
            let _ = self.cmd_tx.send(AudioCommand::Silence);
        }
    }
}
