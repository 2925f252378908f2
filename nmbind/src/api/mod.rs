//! Public API module.
//!
//! The entry object, configuration, value types, errors and rendering.

pub mod config;
pub mod models;
pub mod network_manager;
pub mod render;
