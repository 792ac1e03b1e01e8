//! Action classification module
//!
//! Scores candidate action labels from a landmark frame. The static classifier
//! works on a single image; the temporal classifier adds motion candidates, a
//! clap event detector and a hysteresis stabilizer for video and live input.
//!
//! Pipeline: Frame → Features → Candidate scorers → Selection → (Stabilizer)

pub mod candidates;
pub mod clap;
pub mod classifier;
pub mod features;
pub mod stabilizer;

pub use candidates::{ActionCandidate, CONFIDENCE_FLOOR, FALLBACK_CONFIDENCE};
pub use clap::ClapDetector;
pub use classifier::{ActionClassifier, StaticActionClassifier, TemporalActionClassifier};
pub use features::{ramp, StaticFeatures};
pub use stabilizer::{Stabilizer, StabilizerState};
