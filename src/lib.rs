//! Transcript-aware variant effect annotation.

pub mod annotate;
pub mod common;
pub mod db;
pub mod error;
pub mod reference;
