//! Configuration module for cyclebook
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - The validated static configuration of the accounting core

pub mod paths;
pub mod settings;

pub use paths::CyclePaths;
pub use settings::{BusinessDaysOverride, CapSettings, CycleSettings, Settings};
