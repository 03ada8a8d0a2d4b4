//! Genome and transcript reference model.
//!
//! This module contains the immutable description of transcripts together with the pure
//! functions that relate genome coordinates to transcript features.  All genome coordinates
//! are given on the forward strand; the strand is a property of the transcript only.

pub mod aa_change;
pub mod genome;
pub mod projector;
pub mod seq_change;
pub mod so;
pub mod transcript;
pub mod translator;

#[cfg(test)]
pub(crate) mod fixtures;
