//! # Archive Storage
//!
//! Disk persistence for root-entity document graphs.

pub mod archive;

pub use archive::Archive;
