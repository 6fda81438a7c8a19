// src/filters/notch.rs
//! Second-order IIR notch for power line interference

use std::f64::consts::PI;
use super::{Biquad, FilterError, IirFilter};

/// Notch at `frequency_hz` with -3 dB bandwidth `frequency_hz / quality_factor`
#[derive(Debug, Clone, PartialEq)]
pub struct NotchFilter {
    frequency_hz: f64,
    quality_factor: f64,
    section: Biquad,
}

impl NotchFilter {
    pub fn new(frequency_hz: f64, quality_factor: f64, sample_rate: f64) -> Result<Self, FilterError> {
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(FilterError::InvalidParameters(format!("Invalid sample rate {}", sample_rate)));
        }
        if !(frequency_hz > 0.0) || frequency_hz >= sample_rate / 2.0 {
            return Err(FilterError::InvalidParameters(format!(
                "Notch frequency {} Hz must lie in (0, {}) Hz",
                frequency_hz,
                sample_rate / 2.0
            )));
        }
        if !(quality_factor > 0.0) || !quality_factor.is_finite() {
            return Err(FilterError::InvalidParameters(format!(
                "Quality factor must be positive, got {}",
                quality_factor
            )));
        }

        let omega = 2.0 * PI * frequency_hz / sample_rate;
        let bandwidth = omega / quality_factor;
        let gain = 1.0 / (1.0 + (bandwidth / 2.0).tan());
        let cos_omega = omega.cos();

        let section = Biquad::new(
            [gain, -2.0 * gain * cos_omega, gain],
            [1.0, -2.0 * gain * cos_omega, 2.0 * gain - 1.0],
        )?;

        Ok(Self {
            frequency_hz,
            quality_factor,
            section,
        })
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn quality_factor(&self) -> f64 {
        self.quality_factor
    }

    pub fn into_iir(self) -> IirFilter {
        IirFilter::from_sections(vec![self.section], 2)
    }
}
