//! Classification accuracy

use crate::error::{SsvepError, SsvepResult};
use crate::error_context;

/// Percentage of predictions equal to their label
pub fn accuracy_percent(labels: &[usize], predictions: &[usize]) -> SsvepResult<f64> {
    if labels.len() != predictions.len() {
        return Err(SsvepError::shape(
            error_context!("metrics", "accuracy_percent"),
            format!("{} predictions", labels.len()),
            format!("{} predictions", predictions.len()),
        ));
    }
    if labels.is_empty() {
        return Err(SsvepError::parameter(
            error_context!("metrics", "accuracy_percent"),
            "labels",
            "cannot score an empty label set",
        ));
    }

    let correct = labels.iter().zip(predictions).filter(|(l, p)| l == p).count();
    Ok(100.0 * correct as f64 / labels.len() as f64)
}
