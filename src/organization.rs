//! The DRAM organization descriptor: an ordered level list with per-level
//! counts, a named-level lookup, and the internal prefetch size / channel
//! width used to compute the transaction offset.

use serde::Deserialize;

/// One level of the DRAM hierarchy (e.g. `channel`, `rank`, `row`, `column`).
#[derive(Debug, Clone, Deserialize)]
pub struct DramLevel {
    pub name: String,
    pub count: u64,
}

/// Ordered DRAM hierarchy plus the prefetch/channel-width parameters
/// needed to compute the transaction offset.
#[derive(Debug, Clone, Deserialize)]
pub struct DramOrganization {
    pub levels: Vec<DramLevel>,
    pub internal_prefetch_size: u64,
    pub channel_width_bits: u64,
}

impl DramOrganization {
    /// A representative ChRaBaRoCo organization: channel=8, rank=2, bg=2,
    /// bank=4, row=32768, col=32, prefetch=8, channel_width=64.
    pub fn canonical() -> Self {
        DramOrganization {
            levels: vec![
                DramLevel { name: "channel".into(), count: 8 },
                DramLevel { name: "rank".into(), count: 2 },
                DramLevel { name: "bankgroup".into(), count: 2 },
                DramLevel { name: "bank".into(), count: 4 },
                DramLevel { name: "row".into(), count: 32768 },
                DramLevel { name: "column".into(), count: 32 },
            ],
            internal_prefetch_size: 8,
            channel_width_bits: 64,
        }
    }

    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.name == name)
    }

    pub fn num_channels(&self) -> u64 {
        self.levels.first().map(|l| l.count).unwrap_or(1)
    }
}
