//! Global configuration (sqlite3_config, sqlite3_limit)
//!
//! Library-wide settings consulted by the extension functions. Values are
//! plain atomics so hosts may adjust them from any thread; a
//! `FunctionContext` snapshots them when a statement starts.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::OnceLock;

use crate::error::{Error, ErrorCode, Result};
use crate::types::SubLatinFlags;

/// Default SQLITE_MAX_LENGTH
pub const DEFAULT_MAX_LENGTH: i64 = 1_000_000_000;

/// Default SQLITE_MAX_LIKE_PATTERN_LENGTH
pub const DEFAULT_LIKE_PATTERN_LIMIT: i64 = 50_000;

// ============================================================================
// Global Configuration
// ============================================================================

/// Global extension configuration state
pub struct ExtConfig {
    /// Longest string or blob a function may build (SQLITE_LIMIT_LENGTH)
    pub max_length: AtomicI64,
    /// Longest LIKE pattern in bytes (SQLITE_LIMIT_LIKE_PATTERN_LENGTH)
    pub like_pattern_limit: AtomicI64,
    /// Overrides applied by `register_all`
    pub sublatin_flags: AtomicU32,
}

impl Default for ExtConfig {
    fn default() -> Self {
        Self {
            max_length: AtomicI64::new(DEFAULT_MAX_LENGTH),
            like_pattern_limit: AtomicI64::new(DEFAULT_LIKE_PATTERN_LIMIT),
            sublatin_flags: AtomicU32::new(0),
        }
    }
}

impl ExtConfig {
    pub fn max_length(&self) -> i64 {
        self.max_length.load(Ordering::SeqCst)
    }

    pub fn like_pattern_limit(&self) -> i64 {
        self.like_pattern_limit.load(Ordering::SeqCst)
    }

    pub fn sublatin_flags(&self) -> SubLatinFlags {
        SubLatinFlags::from_bits_truncate(self.sublatin_flags.load(Ordering::SeqCst))
    }
}

/// Global configuration singleton
static EXT_CONFIG: OnceLock<ExtConfig> = OnceLock::new();

/// Get the global configuration
pub fn ext_config_get() -> &'static ExtConfig {
    EXT_CONFIG.get_or_init(ExtConfig::default)
}

// ============================================================================
// Configuration Options
// ============================================================================

/// Option codes accepted by [`ext_config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ConfigOption {
    /// SQLITE_LIMIT_LENGTH
    MaxLength = 0,
    /// SQLITE_LIMIT_LIKE_PATTERN_LENGTH
    LikePatternLimit = 8,
    /// SubLatinFlags bits for `register_all`
    SubLatinFlags = 1000,
}

/// Set a configuration option.
pub fn ext_config(option: ConfigOption, value: i64) -> Result<()> {
    let config = ext_config_get();

    match option {
        ConfigOption::MaxLength | ConfigOption::LikePatternLimit if value < 0 => {
            return Err(Error::with_message(
                ErrorCode::Misuse,
                format!("negative limit for {:?}", option),
            ));
        }
        ConfigOption::MaxLength => config.max_length.store(value, Ordering::SeqCst),
        ConfigOption::LikePatternLimit => {
            config.like_pattern_limit.store(value, Ordering::SeqCst)
        }
        ConfigOption::SubLatinFlags => {
            let bits = u32::try_from(value)
                .ok()
                .and_then(SubLatinFlags::from_bits)
                .ok_or_else(|| {
                    Error::with_message(ErrorCode::Misuse, "unknown sublatin flags")
                })?;
            config.sublatin_flags.store(bits.bits(), Ordering::SeqCst);
        }
    }

    tracing::debug!(?option, value, "extension config updated");
    Ok(())
}

/// Restore every option to its default.
pub fn reset_config() {
    let config = ext_config_get();
    config.max_length.store(DEFAULT_MAX_LENGTH, Ordering::SeqCst);
    config
        .like_pattern_limit
        .store(DEFAULT_LIKE_PATTERN_LIMIT, Ordering::SeqCst);
    config.sublatin_flags.store(0, Ordering::SeqCst);
}

// ============================================================================
// Version Information
// ============================================================================

/// Library version string
pub fn libversion() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_limit_is_misuse() {
        let err = ext_config(ConfigOption::MaxLength, -1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Misuse);
        let err = ext_config(ConfigOption::LikePatternLimit, -5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Misuse);
    }

    #[test]
    fn test_unknown_sublatin_bits_rejected() {
        let err = ext_config(ConfigOption::SubLatinFlags, 0x1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Misuse);
    }

    #[test]
    fn test_defaults() {
        let config = ExtConfig::default();
        assert_eq!(config.max_length(), DEFAULT_MAX_LENGTH);
        assert_eq!(config.like_pattern_limit(), DEFAULT_LIKE_PATTERN_LIMIT);
        assert!(config.sublatin_flags().is_empty());
    }

    #[test]
    fn test_version() {
        assert!(!libversion().is_empty());
    }
}
