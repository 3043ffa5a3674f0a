//! Key and tempo estimation layer
//!
//! Estimation sits behind the [`Estimator`] trait so the pipeline can run
//! against stratum-dsp in production and a canned stub in tests.

mod stratum;
mod stub;
mod traits;

pub use stratum::{fold_bpm, StratumEstimator};
pub use stub::StubEstimator;
pub use traits::{Estimates, Estimator, RawKey, RawTempo};
