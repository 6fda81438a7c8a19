//! Labeled-axis signal matrix
//!
//! A [`SignalMatrix`] always stores samples along axis 0 and channels along
//! axis 1. Callers state the storage orientation of their data once, at
//! construction; nothing downstream re-guesses it.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;

/// Storage orientation of an incoming 2-D array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Rows are samples, columns are channels
    SamplesByChannels,
    /// Rows are channels, columns are samples
    ChannelsBySamples,
    /// The longer axis is taken as the sample axis; square input is rejected
    Infer,
}

/// Real-valued (samples x channels) matrix for one trial or one reference set
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    data: Array2<f64>,
}

impl SignalMatrix {
    /// Wrap `data` stored in the given orientation
    pub fn new(data: Array2<f64>, orientation: Orientation) -> SsvepResult<Self> {
        let (rows, cols) = data.dim();
        let data = match orientation {
            Orientation::SamplesByChannels => data,
            Orientation::ChannelsBySamples => data.reversed_axes(),
            Orientation::Infer => {
                if rows == cols {
                    return Err(SsvepError::shape(
                        error_context!("signal_matrix", "infer_orientation"),
                        "a non-square matrix (sample axis longer than channel axis)",
                        format!("{}x{}", rows, cols),
                    ));
                }
                if rows < cols { data.reversed_axes() } else { data }
            }
        };

        let (samples, channels) = data.dim();
        if samples == 0 || channels == 0 {
            return Err(SsvepError::shape(
                error_context!("signal_matrix", "new"),
                "at least one sample and one channel",
                format!("{} samples x {} channels", samples, channels),
            ));
        }

        // reversed_axes leaves Fortran order behind
        Ok(Self { data: data.as_standard_layout().into_owned() })
    }

    /// Wrap a (samples x channels) array
    pub fn from_samples(data: Array2<f64>) -> SsvepResult<Self> {
        Self::new(data, Orientation::SamplesByChannels)
    }

    /// Single-channel signal
    pub fn from_channel(samples: &[f64]) -> SsvepResult<Self> {
        let data = Array2::from_shape_fn((samples.len(), 1), |(i, _)| samples[i]);
        Self::from_samples(data)
    }

    /// Build from per-channel sample vectors of equal length
    pub fn from_channels(channels: &[Vec<f64>]) -> SsvepResult<Self> {
        let num_samples = channels.first().map(Vec::len).unwrap_or(0);
        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != num_samples) {
            return Err(SsvepError::shape(
                error_context!("signal_matrix", "from_channels"),
                format!("{} samples in every channel", num_samples),
                format!("{} samples in channel {}", ch.len(), idx),
            ));
        }

        let data = Array2::from_shape_fn((num_samples, channels.len()), |(s, c)| channels[c][s]);
        Self::from_samples(data)
    }

    /// Number of samples (time axis)
    pub fn samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of channels / variables
    pub fn channels(&self) -> usize {
        self.data.ncols()
    }

    /// (samples, channels)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.channels()).then(|| self.data.column(index))
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// Keep only the listed channels, in the listed order
    pub fn select_channels(&self, indices: &[usize]) -> SsvepResult<Self> {
        if indices.is_empty() {
            return Err(SsvepError::parameter(
                error_context!("signal_matrix", "select_channels"),
                "channels",
                "channel selection is empty",
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.channels()) {
            return Err(SsvepError::parameter(
                error_context!("signal_matrix", "select_channels"),
                "channels",
                format!("channel {} out of range for {} channels", bad, self.channels()),
            ));
        }

        Ok(Self { data: self.data.select(Axis(1), indices) })
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_channels_by_samples_is_transposed() {
        let raw = array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]];
        let m = SignalMatrix::new(raw, Orientation::ChannelsBySamples).unwrap();

        assert_eq!(m.dim(), (4, 2));
        assert_eq!(m.view()[[2, 1]], 7.0);
    }

    #[test]
    fn test_infer_uses_longer_axis() {
        let raw = Array2::<f64>::zeros((3, 100));
        let m = SignalMatrix::new(raw, Orientation::Infer).unwrap();
        assert_eq!(m.samples(), 100);
        assert_eq!(m.channels(), 3);
    }

    #[test]
    fn test_infer_rejects_square() {
        let raw = Array2::<f64>::zeros((4, 4));
        let err = SignalMatrix::new(raw, Orientation::Infer).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_explicit_square_is_accepted() {
        let raw = Array2::<f64>::zeros((4, 4));
        assert!(SignalMatrix::new(raw, Orientation::SamplesByChannels).is_ok());
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let raw = Array2::<f64>::zeros((10, 0));
        assert!(SignalMatrix::from_samples(raw).unwrap_err().is_shape_error());
    }

    #[test]
    fn test_from_channels_length_mismatch() {
        let err = SignalMatrix::from_channels(&[vec![0.0; 10], vec![0.0; 9]]).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_select_channels() {
        let m = SignalMatrix::from_channels(&[vec![1.0; 5], vec![2.0; 5], vec![3.0; 5]]).unwrap();
        let picked = m.select_channels(&[2, 0]).unwrap();

        assert_eq!(picked.channels(), 2);
        assert_eq!(picked.view()[[0, 0]], 3.0);
        assert_eq!(picked.view()[[0, 1]], 1.0);
        assert!(m.select_channels(&[3]).is_err());
        assert!(m.select_channels(&[]).is_err());
    }
}
