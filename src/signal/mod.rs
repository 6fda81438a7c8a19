// src/signal/mod.rs
//! Signal containers and reference generation
//!
//! - [`SignalMatrix`]: one trial (or reference set) with labeled sample/channel axes
//! - [`TrialSet`]: a stack of trials with an explicit layout
//! - [`ReferenceBank`]: sine/cosine harmonics per stimulus frequency
//! - [`common_average_reference`]: CAR re-referencing

pub mod car;
pub mod matrix;
pub mod reference;
pub mod trials;

pub use car::common_average_reference;
pub use matrix::{Orientation, SignalMatrix};
pub use reference::{build_reference_bank, reference_signal, ReferenceBank};
pub use trials::{TrialLayout, TrialSet};
