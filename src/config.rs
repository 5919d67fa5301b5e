//! CLI surface and DRAM organization config-file loading.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::decoder::AddrScheme;
use crate::error::ConfigError;
use crate::organization::DramOrganization;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Debug)]
#[clap(rename_all = "verbatim")]
pub enum SchemeChoice {
    ChRaBaRoCo,
    RoBaRaCoCh,
    Mop4Clxor,
}

impl From<SchemeChoice> for AddrScheme {
    fn from(choice: SchemeChoice) -> Self {
        match choice {
            SchemeChoice::ChRaBaRoCo => AddrScheme::ChRaBaRoCo,
            SchemeChoice::RoBaRaCoCh => AddrScheme::RoBaRaCoCh,
            SchemeChoice::Mop4Clxor => AddrScheme::Mop4Clxor,
        }
    }
}

/// Command-line options for the simulator frontend.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Trace file path.
    #[arg(long)]
    pub path: PathBuf,

    /// Frontend-to-memory clock ratio.
    #[arg(long)]
    pub clock_ratio: u64,

    /// Seed for the page allocator RNG.
    #[arg(long, default_value_t = 123)]
    pub seed: u64,

    /// Maximum physical byte address.
    #[arg(long)]
    pub max_addr: u64,

    /// Page size in KB.
    #[arg(long, default_value_t = 4)]
    pub pagesize_kb: u64,

    /// Window-local access count to mark a page hot.
    #[arg(long)]
    pub hot_page_threshold: u64,

    /// Translations between migration passes.
    #[arg(long)]
    pub window_size: u64,

    /// Windows a VPN must wait before re-migrating.
    #[arg(long, default_value_t = 2)]
    pub cooldown_windows: u64,

    /// Bandwidth used in the migration cost formula, in GB/s.
    #[arg(long, default_value_t = 153.0)]
    pub bandwidth_gbps: f64,

    /// Path to the TOML DRAM organization descriptor.
    #[arg(long)]
    pub dram_config: PathBuf,

    /// Address decoding scheme.
    #[arg(long, value_enum, default_value_t = SchemeChoice::ChRaBaRoCo)]
    pub scheme: SchemeChoice,
}

/// Loads the TOML DRAM organization descriptor directly into
/// [`DramOrganization`], which derives `Deserialize` for exactly this
/// purpose.
pub fn load_dram_organization(path: &Path) -> Result<DramOrganization, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ConfigError::UnreadableDramConfig(path.to_path_buf(), e))?;
    toml::from_str(&raw).map_err(|e| ConfigError::MalformedDramConfig(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_organization() {
        let toml_src = r#"
            internal_prefetch_size = 8
            channel_width_bits = 64

            [[levels]]
            name = "channel"
            count = 8

            [[levels]]
            name = "rank"
            count = 2

            [[levels]]
            name = "row"
            count = 32768

            [[levels]]
            name = "column"
            count = 32
        "#;
        let path = std::env::temp_dir().join(format!(
            "dram_migration_core_config_test_{}.toml",
            std::process::id()
        ));
        fs::write(&path, toml_src).unwrap();
        let org = load_dram_organization(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(org.levels.len(), 4);
        assert_eq!(org.level_index("row"), Some(2));
        assert_eq!(org.internal_prefetch_size, 8);
    }

    #[test]
    fn unreadable_config_is_reported() {
        let err = load_dram_organization(Path::new("/nonexistent/dram.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnreadableDramConfig(_, _)));
    }

    #[test]
    fn malformed_config_is_reported() {
        let path = std::env::temp_dir().join(format!(
            "dram_migration_core_bad_config_test_{}.toml",
            std::process::id()
        ));
        fs::write(&path, "not valid toml [[[").unwrap();
        let err = load_dram_organization(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::MalformedDramConfig(_, _)));
    }
}
