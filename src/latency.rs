//! Core↔channel latency table.
//!
//! Packaged as an owned struct built once by
//! [`Engine::new`](crate::engine::Engine::new) rather than a process-wide
//! global.

pub const NUM_CORES: usize = 8;
pub const NUM_CHANNELS: usize = 8;

const DISTANCE_PATTERN: [u32; 5] = [20, 30, 60, 100, 130];

/// Static 8x8 core-to-channel latency matrix plus the precomputed
/// argmin-per-row table used by `best_channel_for`.
#[derive(Debug, Clone)]
pub struct LatencyTable {
    matrix: [[u32; NUM_CHANNELS]; NUM_CORES],
    min_latency_channel: [usize; NUM_CORES],
}

impl LatencyTable {
    pub fn new() -> Self {
        let mut matrix = [[0u32; NUM_CHANNELS]; NUM_CORES];
        for core in 0..NUM_CORES {
            for ch in 0..NUM_CHANNELS {
                let offset = (core as i32 - ch as i32).unsigned_abs() as usize;
                matrix[core][ch] = if offset < 5 {
                    DISTANCE_PATTERN[offset]
                } else {
                    DISTANCE_PATTERN[8 - offset]
                };
            }
        }
        let mut min_latency_channel = [0usize; NUM_CORES];
        for core in 0..NUM_CORES {
            min_latency_channel[core] = Self::argmin_row(&matrix[core]);
        }
        LatencyTable { matrix, min_latency_channel }
    }

    fn argmin_row(row: &[u32; NUM_CHANNELS]) -> usize {
        let mut best = 0;
        let mut best_latency = row[0];
        for (ch, &latency) in row.iter().enumerate().skip(1) {
            if latency < best_latency {
                best_latency = latency;
                best = ch;
            }
        }
        best
    }

    pub fn latency(&self, core: usize, channel: usize) -> u32 {
        self.matrix[core][channel]
    }

    /// Index of the minimum-latency channel for `core`, ties broken by
    /// lowest channel id.
    pub fn best_channel_for(&self, core: usize) -> usize {
        self.min_latency_channel[core]
    }
}

impl Default for LatencyTable {
    fn default() -> Self {
        Self::new()
    }
}
