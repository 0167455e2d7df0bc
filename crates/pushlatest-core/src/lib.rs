//! # pushlatest-core
//!
//! Core library for pushlatest providing:
//! - Image reference parsing and validation
//! - Content fingerprints and the promotion decision type
//! - The typed error taxonomy shared by every crate
//! - Deterministic blob hashing

pub mod error;
pub mod hash;
pub mod types;
pub mod verbosity;

pub use error::{Error, Result};
pub use hash::digest;
pub use types::{ContentFingerprint, ImageReference, PromotionDecision, DEFAULT_TARGET_TAG};
pub use verbosity::Verbosity;
