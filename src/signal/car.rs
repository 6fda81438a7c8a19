//! Common average reference (CAR) re-referencing

use ndarray::Axis;
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use super::matrix::SignalMatrix;

/// Re-reference a trial.
///
/// With `None`, the mean across channels is subtracted from every sample.
/// With `Some(c)`, channel `c` is subtracted from all other channels and is
/// itself left untouched.
pub fn common_average_reference(
    signal: &SignalMatrix,
    reference_channel: Option<usize>,
) -> SsvepResult<SignalMatrix> {
    let mut data = signal.view().to_owned();

    match reference_channel {
        Some(reference) => {
            if reference >= signal.channels() {
                return Err(SsvepError::parameter(
                    error_context!("car", "common_average_reference"),
                    "reference_channel",
                    format!("channel {} out of range for {} channels", reference, signal.channels()),
                ));
            }
            let reference_signal = data.column(reference).to_owned();
            for (idx, mut column) in data.axis_iter_mut(Axis(1)).enumerate() {
                if idx != reference {
                    column -= &reference_signal;
                }
            }
        }
        None => {
            // mean_axis only fails on an empty axis, which SignalMatrix rules out
            if let Some(average) = data.mean_axis(Axis(1)) {
                data -= &average.insert_axis(Axis(1));
            }
        }
    }

    SignalMatrix::from_samples(data)
}
