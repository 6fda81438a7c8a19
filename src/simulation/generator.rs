// src/simulation/generator.rs
//! Seeded generator of multichannel SSVEP responses

use std::f64::consts::PI;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use crate::signal::{SignalMatrix, TrialSet};
use crate::utils::validation::validate_frequencies;
use super::SimulatorConfig;

/// Produces trials of harmonic sinusoids at a stimulus frequency plus
/// Gaussian noise and optional power line interference.
///
/// The same seed always yields the same trials.
#[derive(Debug)]
pub struct SsvepSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    noise: Normal<f64>,
}

impl SsvepSimulator {
    pub fn new(config: SimulatorConfig) -> SsvepResult<Self> {
        config.validate()?;
        let noise = Normal::new(0.0, config.noise_std).map_err(|e| {
            SsvepError::parameter(error_context!("simulator", "new"), "noise_std", e.to_string())
        })?;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            noise,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Restart the random sequence from the configured seed
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
    }

    /// One (samples x channels) trial responding to `frequency_hz`
    pub fn generate_trial(&mut self, frequency_hz: f64) -> SsvepResult<SignalMatrix> {
        validate_frequencies(&[frequency_hz], "frequency_hz")?;

        let cfg = &self.config;
        let onset_phase = self.rng.gen_range(0.0..2.0 * PI);
        let mut data = Array2::<f64>::zeros((cfg.num_samples, cfg.num_channels));

        for ((k, c), value) in data.indexed_iter_mut() {
            let t = k as f64 / cfg.sampling_rate_hz;
            let phase = onset_phase + c as f64 * cfg.channel_phase_step;

            let mut amplitude = cfg.signal_amplitude;
            for harmonic in 1..=cfg.num_harmonics {
                *value += amplitude * (2.0 * PI * harmonic as f64 * frequency_hz * t + phase).sin();
                amplitude *= cfg.harmonic_decay;
            }

            *value += cfg.powerline_amplitude * (2.0 * PI * cfg.powerline_frequency_hz * t).sin();
            *value += self.noise.sample(&mut self.rng);
        }

        SignalMatrix::from_samples(data)
    }

    /// `trials_per_frequency` trials for every frequency, cycling through the
    /// frequencies; returns the trials and their labels (indices into `frequencies`)
    pub fn generate_trials(
        &mut self,
        frequencies: &[f64],
        trials_per_frequency: usize,
    ) -> SsvepResult<(TrialSet, Vec<usize>)> {
        validate_frequencies(frequencies, "frequencies")?;

        let mut trials = Vec::with_capacity(frequencies.len() * trials_per_frequency);
        let mut labels = Vec::with_capacity(trials.capacity());
        for _ in 0..trials_per_frequency {
            for (label, &freq) in frequencies.iter().enumerate() {
                trials.push(self.generate_trial(freq)?);
                labels.push(label);
            }
        }

        debug!(
            trials = trials.len(),
            frequencies = frequencies.len(),
            seed = self.config.seed,
            "generated synthetic trials"
        );

        Ok((TrialSet::from_trials(&trials)?, labels))
    }
}
