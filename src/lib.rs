//! Phototree - a procedurally grown 3D tree whose leaves are your photos

pub mod core;
pub mod math;
pub mod growth;
pub mod scene;
pub mod gallery;
