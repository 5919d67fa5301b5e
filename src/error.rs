//! Fatal error kinds. Configuration and setup errors abort before any
//! translation runs; per-request stalls are plain booleans elsewhere in
//! the crate and never go through `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trace file {0:?} does not exist")]
    MissingTraceFile(std::path::PathBuf),

    #[error("trace file {0:?} could not be opened: {1}")]
    UnreadableTraceFile(std::path::PathBuf, std::io::Error),

    #[error("trace {path:?} format invalid at line {line}: {raw:?}")]
    MalformedTraceLine {
        path: std::path::PathBuf,
        line: usize,
        raw: String,
    },

    #[error("missing required option {0:?}")]
    MissingOption(&'static str),

    #[error("invalid value for option {name:?}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("DRAM organization config {0:?} could not be read: {1}")]
    UnreadableDramConfig(std::path::PathBuf, std::io::Error),

    #[error("DRAM organization config {0:?} failed to parse: {1}")]
    MalformedDramConfig(std::path::PathBuf, toml::de::Error),
}

/// Raised at decoder setup when the organization descriptor can't support
/// linear address mapping.
#[derive(Debug, Error)]
pub enum OrganizationError {
    #[error("DRAM organization has no level named \"row\"; cannot use linear address mapping")]
    MissingRowLevel,

    #[error("DRAM organization has no levels")]
    EmptyOrganization,
}
