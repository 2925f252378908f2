//! Type definitions and constants.
//!
//! This module contains the NetworkManager D-Bus schema as constant data.

pub mod constants;
