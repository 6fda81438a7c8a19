//! Multi-trial EEG recordings with explicit axis layout

use ndarray::{Array3, Axis};
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use super::matrix::SignalMatrix;

/// Axis order of an incoming 3-D recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialLayout {
    /// (samples, channels, trials), the layout most SSVEP datasets ship in
    SamplesChannelsTrials,
    /// (trials, channels, samples)
    TrialsChannelsSamples,
    /// (trials, samples, channels), the internal layout
    TrialsSamplesChannels,
}

/// A set of equally sized trials stored as (trials, samples, channels)
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSet {
    data: Array3<f64>,
}

impl TrialSet {
    /// Wrap a 3-D recording given its layout
    pub fn new(data: Array3<f64>, layout: TrialLayout) -> SsvepResult<Self> {
        let data = match layout {
            TrialLayout::SamplesChannelsTrials => data.permuted_axes([2, 0, 1]),
            TrialLayout::TrialsChannelsSamples => data.permuted_axes([0, 2, 1]),
            TrialLayout::TrialsSamplesChannels => data,
        };

        let (trials, samples, channels) = data.dim();
        if trials == 0 || samples == 0 || channels == 0 {
            return Err(SsvepError::shape(
                error_context!("trial_set", "new"),
                "non-empty trials, samples and channels",
                format!("{} trials x {} samples x {} channels", trials, samples, channels),
            ));
        }

        Ok(Self { data: data.as_standard_layout().into_owned() })
    }

    /// Stack individual trials; all must share the same shape
    pub fn from_trials(trials: &[SignalMatrix]) -> SsvepResult<Self> {
        let first = trials.first().ok_or_else(|| {
            SsvepError::shape(
                error_context!("trial_set", "from_trials"),
                "at least one trial",
                "0 trials",
            )
        })?;

        let (samples, channels) = first.dim();
        let mut data = Array3::<f64>::zeros((trials.len(), samples, channels));
        for (idx, trial) in trials.iter().enumerate() {
            if trial.dim() != (samples, channels) {
                return Err(SsvepError::shape(
                    error_context!("trial_set", "from_trials"),
                    format!("{}x{} for every trial", samples, channels),
                    format!("{}x{} for trial {}", trial.samples(), trial.channels(), idx),
                ));
            }
            data.index_axis_mut(Axis(0), idx).assign(&trial.view());
        }

        Ok(Self { data })
    }

    pub fn num_trials(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_samples(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn num_channels(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// One trial as a (samples x channels) matrix
    pub fn trial(&self, index: usize) -> SsvepResult<SignalMatrix> {
        if index >= self.num_trials() {
            return Err(SsvepError::parameter(
                error_context!("trial_set", "trial"),
                "trial",
                format!("trial {} out of range for {} trials", index, self.num_trials()),
            ));
        }
        SignalMatrix::from_samples(self.data.index_axis(Axis(0), index).to_owned())
    }

    /// One trial restricted to the selected channels
    pub fn trial_channels(&self, index: usize, channels: &[usize]) -> SsvepResult<SignalMatrix> {
        self.trial(index)?.select_channels(channels)
    }

    /// Apply a per-trial transform (re-referencing, filtering) to every trial
    pub fn map_trials<F>(&self, mut f: F) -> SsvepResult<TrialSet>
    where
        F: FnMut(&SignalMatrix) -> SsvepResult<SignalMatrix>,
    {
        let mapped = (0..self.num_trials())
            .map(|idx| self.trial(idx).and_then(|trial| f(&trial)))
            .collect::<SsvepResult<Vec<_>>>()?;
        Self::from_trials(&mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_channels_trials_layout() {
        // value encodes (sample, channel, trial)
        let raw = Array3::from_shape_fn((50, 3, 4), |(s, c, t)| (s * 100 + c * 10 + t) as f64);
        let set = TrialSet::new(raw, TrialLayout::SamplesChannelsTrials).unwrap();

        assert_eq!(set.num_trials(), 4);
        assert_eq!(set.num_samples(), 50);
        assert_eq!(set.num_channels(), 3);

        let trial = set.trial(2).unwrap();
        assert_eq!(trial.view()[[7, 1]], 712.0);
    }

    #[test]
    fn test_trials_channels_samples_layout() {
        let raw = Array3::from_shape_fn((2, 3, 40), |(t, c, s)| (t * 1000 + c * 100 + s) as f64);
        let set = TrialSet::new(raw, TrialLayout::TrialsChannelsSamples).unwrap();

        assert_eq!(set.num_samples(), 40);
        assert_eq!(set.trial(1).unwrap().view()[[5, 2]], 1205.0);
    }

    #[test]
    fn test_from_trials_shape_mismatch() {
        let a = SignalMatrix::from_channel(&[0.0; 10]).unwrap();
        let b = SignalMatrix::from_channel(&[0.0; 11]).unwrap();
        assert!(TrialSet::from_trials(&[a, b]).unwrap_err().is_shape_error());
        assert!(TrialSet::from_trials(&[]).is_err());
    }

    #[test]
    fn test_trial_index_out_of_range() {
        let a = SignalMatrix::from_channel(&[0.0; 10]).unwrap();
        let set = TrialSet::from_trials(&[a]).unwrap();
        assert!(set.trial(1).is_err());
    }
}
