// src/filters/iir.rs
//! Butterworth IIR filters built from second-order sections
//!
//! Sections use Direct Form II Transposed and a filter is a cascade of them.
//! Low- and high-pass designs come from the RBJ section formulas. Band-pass
//! and band-stop designs map the analog prototype poles through the band
//! transform and the bilinear transform, so `order` counts poles per band
//! edge and the resulting filter has `2 · order` poles.

use std::f64::consts::PI;
use nalgebra::Complex;
use super::{BandType, FilterError};
use crate::config::constants::filters::{MAX_FILTER_ORDER, MIN_FILTER_ORDER};

/// Second-order section with normalized `a0 = 1`
#[derive(Debug, Clone, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
    s1: f64,
    s2: f64,
}

impl Biquad {
    /// Section from raw coefficients, normalizing by `a0`
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Result<Self, FilterError> {
        let a0 = a[0];
        if a0 == 0.0 || !a0.is_finite() {
            return Err(FilterError::InvalidParameters("a0 must be finite and non-zero".to_string()));
        }
        Ok(Self {
            b0: b[0] / a0,
            b1: b[1] / a0,
            b2: b[2] / a0,
            a1: a[1] / a0,
            a2: a[2] / a0,
            s1: 0.0,
            s2: 0.0,
        })
    }

    fn lowpass(cutoff_hz: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * cutoff_hz / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * q);
        let norm = 1.0 + alpha;

        Self::normalized(
            [(1.0 - cos_omega) / 2.0, 1.0 - cos_omega, (1.0 - cos_omega) / 2.0],
            [-2.0 * cos_omega, 1.0 - alpha],
            norm,
        )
    }

    fn highpass(cutoff_hz: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * cutoff_hz / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * q);
        let norm = 1.0 + alpha;

        Self::normalized(
            [(1.0 + cos_omega) / 2.0, -(1.0 + cos_omega), (1.0 + cos_omega) / 2.0],
            [-2.0 * cos_omega, 1.0 - alpha],
            norm,
        )
    }

    /// First-order low-pass stored as a section with zero second-order terms
    fn first_order_lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let k = (PI * cutoff_hz / sample_rate).tan();
        let norm = 1.0 + k;
        Self::normalized([k, k, 0.0], [k - 1.0, 0.0], norm)
    }

    fn first_order_highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let k = (PI * cutoff_hz / sample_rate).tan();
        let norm = 1.0 + k;
        Self::normalized([1.0, -1.0, 0.0], [k - 1.0, 0.0], norm)
    }

    /// Section with real coefficients from a pair of digital poles, scaled to
    /// unit gain at `z_inv = e^(-jω)`
    fn from_poles(b: [f64; 3], poles: [Complex<f64>; 2], z_inv: Complex<f64>) -> Self {
        let a1 = -(poles[0] + poles[1]).re;
        let a2 = (poles[0] * poles[1]).re;
        let mut section = Self::normalized(b, [a1, a2], 1.0);

        let gain = section.response(z_inv).norm();
        section.b0 /= gain;
        section.b1 /= gain;
        section.b2 /= gain;
        section
    }

    fn normalized(b: [f64; 3], a: [f64; 2], norm: f64) -> Self {
        Self {
            b0: b[0] / norm,
            b1: b[1] / norm,
            b2: b[2] / norm,
            a1: a[0] / norm,
            a2: a[1] / norm,
            s1: 0.0,
            s2: 0.0,
        }
    }

    pub fn process_sample(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.s1;
        self.s1 = self.b1 * input - self.a1 * output + self.s2;
        self.s2 = self.b2 * input - self.a2 * output;
        output
    }

    /// DC gain `H(1)`
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Load the state a constant input `value` would settle into; returns the output level
    pub fn prime(&mut self, value: f64) -> f64 {
        let output = self.dc_gain() * value;
        self.s2 = self.b2 * value - self.a2 * output;
        self.s1 = self.b1 * value - self.a1 * output + self.s2;
        output
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    fn response(&self, z_inv: Complex<f64>) -> Complex<f64> {
        let z_inv2 = z_inv * z_inv;
        let num = Complex::new(self.b0, 0.0) + z_inv * self.b1 + z_inv2 * self.b2;
        let den = Complex::new(1.0, 0.0) + z_inv * self.a1 + z_inv2 * self.a2;
        num / den
    }
}

/// IIR filter made of cascaded second-order sections
#[derive(Debug, Clone, PartialEq)]
pub struct IirFilter {
    sections: Vec<Biquad>,
    order: usize,
}

impl IirFilter {
    /// Butterworth design. Low-pass uses `high_hz`, high-pass uses `low_hz`,
    /// band types use both edges.
    pub fn butterworth(
        order: usize,
        band_type: BandType,
        low_hz: f64,
        high_hz: f64,
        sample_rate: f64,
    ) -> Result<Self, FilterError> {
        match band_type {
            BandType::Lowpass => Self::lowpass(order, high_hz, sample_rate),
            BandType::Highpass => Self::highpass(order, low_hz, sample_rate),
            BandType::Bandpass => Self::bandpass(order, low_hz, high_hz, sample_rate),
            BandType::Bandstop => Self::bandstop(order, low_hz, high_hz, sample_rate),
        }
    }

    pub fn lowpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Self, FilterError> {
        validate_design(order, cutoff_hz, sample_rate)?;
        Ok(Self {
            sections: butterworth_sections(order, cutoff_hz, sample_rate, false),
            order,
        })
    }

    pub fn highpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Self, FilterError> {
        validate_design(order, cutoff_hz, sample_rate)?;
        Ok(Self {
            sections: butterworth_sections(order, cutoff_hz, sample_rate, true),
            order,
        })
    }

    /// Unit gain at the geometric band centre, half power at both edges
    pub fn bandpass(order: usize, low_hz: f64, high_hz: f64, sample_rate: f64) -> Result<Self, FilterError> {
        validate_band(order, low_hz, high_hz, sample_rate)?;
        Ok(Self {
            sections: band_sections(order, low_hz, high_hz, sample_rate, false),
            order: 2 * order,
        })
    }

    /// Unit gain at DC and Nyquist, a transmission zero at the geometric band centre
    pub fn bandstop(order: usize, low_hz: f64, high_hz: f64, sample_rate: f64) -> Result<Self, FilterError> {
        validate_band(order, low_hz, high_hz, sample_rate)?;
        Ok(Self {
            sections: band_sections(order, low_hz, high_hz, sample_rate, true),
            order: 2 * order,
        })
    }

    /// Filter from precomputed sections
    pub fn from_sections(sections: Vec<Biquad>, order: usize) -> Self {
        Self { sections, order }
    }

    /// Number of poles
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn process_sample(&mut self, input: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(input, |x, section| section.process_sample(x))
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Settle every section on a constant input
    pub fn prime(&mut self, value: f64) {
        self.sections
            .iter_mut()
            .fold(value, |x, section| section.prime(x));
    }

    /// Filter a block from the current state
    pub fn filter(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Zero-phase filtering: odd extension at both ends, steady-state priming,
    /// forward pass, backward pass
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        let n = input.len();
        if n < 2 {
            return input.to_vec();
        }

        let pad = (3 * (self.order + 1)).min(n - 1);
        let first = input[0];
        let last = input[n - 1];

        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
        extended.extend_from_slice(input);
        extended.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));

        let mut forward_filter = self.clone();
        forward_filter.prime(extended[0]);
        let mut forward = forward_filter.filter(&extended);

        forward.reverse();
        let mut backward_filter = self.clone();
        backward_filter.prime(forward[0]);
        let mut backward = backward_filter.filter(&forward);
        backward.reverse();

        backward[pad..pad + n].to_vec()
    }

    /// Magnitude of the frequency response at `frequency_hz`
    pub fn magnitude_response(&self, frequency_hz: f64, sample_rate: f64) -> f64 {
        let z_inv = Complex::from_polar(1.0, -2.0 * PI * frequency_hz / sample_rate);
        self.sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, section| acc * section.response(z_inv))
            .norm()
    }
}

fn validate_design(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<(), FilterError> {
    if !(MIN_FILTER_ORDER..=MAX_FILTER_ORDER).contains(&order) {
        return Err(FilterError::InvalidParameters(format!(
            "Order must be {}-{}, got {}",
            MIN_FILTER_ORDER, MAX_FILTER_ORDER, order
        )));
    }
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(FilterError::InvalidParameters(format!("Invalid sample rate {}", sample_rate)));
    }
    if !(cutoff_hz > 0.0) || cutoff_hz >= sample_rate / 2.0 {
        return Err(FilterError::InvalidParameters(format!(
            "Cutoff {} Hz must lie in (0, {}) Hz",
            cutoff_hz,
            sample_rate / 2.0
        )));
    }
    Ok(())
}

fn validate_band(order: usize, low_hz: f64, high_hz: f64, sample_rate: f64) -> Result<(), FilterError> {
    validate_design(order, low_hz, sample_rate)?;
    validate_design(order, high_hz, sample_rate)?;
    if low_hz >= high_hz {
        return Err(FilterError::InvalidParameters(format!(
            "Lower edge {} Hz must be below upper edge {} Hz",
            low_hz, high_hz
        )));
    }
    Ok(())
}

/// Sections of an order-`order` Butterworth low- or high-pass.
///
/// Pole pairs sit at angles `π(order - 1 - 2k) / (2·order)` from the negative
/// real axis, giving section quality factors `1 / (2·cos(angle))`; odd orders
/// add one first-order section.
fn butterworth_sections(order: usize, cutoff_hz: f64, sample_rate: f64, highpass: bool) -> Vec<Biquad> {
    let n = order as f64;
    let mut sections: Vec<Biquad> = (0..order / 2)
        .map(|k| {
            let angle = PI * (n - 1.0 - 2.0 * k as f64) / (2.0 * n);
            let q = 1.0 / (2.0 * angle.cos());
            if highpass {
                Biquad::highpass(cutoff_hz, q, sample_rate)
            } else {
                Biquad::lowpass(cutoff_hz, q, sample_rate)
            }
        })
        .collect();

    if order % 2 == 1 {
        sections.push(if highpass {
            Biquad::first_order_highpass(cutoff_hz, sample_rate)
        } else {
            Biquad::first_order_lowpass(cutoff_hz, sample_rate)
        });
    }

    sections
}

/// Sections of a Butterworth band-pass or band-stop with `order` poles per edge.
///
/// Edges are prewarped to `W = tan(π·f/fs)`. Each prototype pole `p` yields the
/// two analog poles solving `s² - p·B·s + W0² = 0` (band-pass) or
/// `s² - (B/p)·s + W0² = 0` (band-stop), with `B = W2 - W1` and `W0² = W1·W2`,
/// which the bilinear transform `z = (1 + s) / (1 - s)` maps to the unit disc.
/// Complex prototype poles are handled once per conjugate pair, so every
/// resulting pole pairs with its own conjugate; the real prototype pole of an
/// odd order gives one section holding both of its analog poles.
fn band_sections(order: usize, low_hz: f64, high_hz: f64, sample_rate: f64, stop: bool) -> Vec<Biquad> {
    let n = order as f64;
    let w1 = (PI * low_hz / sample_rate).tan();
    let w2 = (PI * high_hz / sample_rate).tan();
    let bandwidth = w2 - w1;
    let centre_sq = w1 * w2;
    // Digital angle of the geometric centre
    let centre = 2.0 * centre_sq.sqrt().atan();

    // Band-pass: zeros at z = ±1, unit gain at the centre.
    // Band-stop: zeros at e^(±jω0), unit gain at DC.
    let (numerator, gain_at) = if stop {
        ([1.0, -2.0 * centre.cos(), 1.0], Complex::new(1.0, 0.0))
    } else {
        ([1.0, 0.0, -1.0], Complex::from_polar(1.0, -centre))
    };

    let one = Complex::new(1.0, 0.0);
    let bilinear = |s: Complex<f64>| (one + s) / (one - s);

    let mut sections = Vec::with_capacity(order);
    for k in 0..(order + 1) / 2 {
        let prototype = Complex::from_polar(1.0, PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n));
        let linear = if stop {
            Complex::new(bandwidth, 0.0) / prototype
        } else {
            prototype * bandwidth
        };
        let root = (linear * linear - 4.0 * centre_sq).sqrt();
        let poles = [bilinear((linear + root) * 0.5), bilinear((linear - root) * 0.5)];

        if 2 * k + 1 == order {
            sections.push(Biquad::from_poles(numerator, poles, gain_at));
        } else {
            for pole in poles {
                sections.push(Biquad::from_poles(numerator, [pole, pole.conj()], gain_at));
            }
        }
    }

    sections
}
