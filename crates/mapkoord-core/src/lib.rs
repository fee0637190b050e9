//! # mapkoord-core
//!
//! Core crate for MapKoord. Contains configuration schemas, the persisted
//! user settings store, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MapKoord crates.

pub mod config;
pub mod error;
pub mod result;
pub mod settings;

pub use error::AppError;
pub use result::AppResult;
