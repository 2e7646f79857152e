//! Path management for cyclebook
//!
//! Provides XDG-compliant path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `CYCLEBOOK_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/cyclebook` or `~/.config/cyclebook`
//! 3. Windows: `%APPDATA%\cyclebook`

use std::path::PathBuf;

use crate::error::CycleError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "CYCLEBOOK_DATA_DIR";

/// Manages all paths used by cyclebook
#[derive(Debug, Clone)]
pub struct CyclePaths {
    /// Base directory for all cyclebook data
    base_dir: PathBuf,
}

impl CyclePaths {
    /// Create a new CyclePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CycleError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create CyclePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/cyclebook/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/cyclebook/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to transactions.json
    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    /// Get the path to holidays.json (holiday counts per calendar month)
    pub fn holidays_file(&self) -> PathBuf {
        self.data_dir().join("holidays.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), CycleError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CycleError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CycleError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if cyclebook has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CycleError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| CycleError::Io("HOME environment variable not set".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("cyclebook"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CycleError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CycleError::Io("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("cyclebook"))
}
