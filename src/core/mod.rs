//! Core types and utilities shared by the growth and gallery layers

pub mod types;
pub mod error;
pub mod logging;
pub mod config;
pub mod time;
pub mod camera;
pub mod controls;

pub use types::*;
pub use error::Error;
pub use config::GalleryConfig;
