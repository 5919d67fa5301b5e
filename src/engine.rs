//! Engine façade: owns the decoder, translator, top-N cache and latency
//! table as named fields of one value, and drives request dispatch.

use log::{debug, trace};

use crate::decoder::Decoder;
use crate::request::{Op, Request};
use crate::topcache::TopCache;
use crate::translate::{MigrationParams, Translator};

/// Outcome of [`Engine::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Translated and forwarded to a channel; the trace cursor may advance.
    Accepted,
    /// The virtual page is in the top-N cache; accounted but not dispatched.
    CacheHit,
}

/// Counters reported at shutdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub read_requests: u64,
    pub write_requests: u64,
    pub other_requests: u64,
    pub cache_requests: u64,
    pub migrations: u64,
    pub windows_completed: u64,
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "read_requests: {}", self.read_requests)?;
        writeln!(f, "write_requests: {}", self.write_requests)?;
        writeln!(f, "other_requests: {}", self.other_requests)?;
        writeln!(f, "cache_requests: {}", self.cache_requests)?;
        writeln!(f, "migrations: {}", self.migrations)?;
        write!(f, "windows_completed: {}", self.windows_completed)
    }
}

pub struct Engine {
    decoder: Decoder,
    translator: Translator,
    top_cache: TopCache,
    stats: Stats,
}

/// Parameters needed to assemble an `Engine`, gathered from configuration.
pub struct EngineParams {
    pub offset_bits: u32,
    pub num_channels: u64,
    pub pages_per_channel: u64,
    pub migration: MigrationParams,
    pub seed: u64,
    pub top_cache_capacity: usize,
}

impl Engine {
    pub fn new(decoder: Decoder, params: EngineParams) -> Self {
        let translator = Translator::new(
            params.offset_bits,
            params.num_channels,
            params.pages_per_channel,
            params.migration,
            params.seed,
        );
        Engine {
            decoder,
            translator,
            top_cache: TopCache::new(params.top_cache_capacity),
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reserve(&mut self, kind: &str, addr: u64) -> bool {
        self.translator.reserve(kind, addr)
    }

    /// Translates, checks the top-N cache, and (on a miss) decodes the
    /// physical address into a hierarchy coordinate. Mirrors a
    /// translate-then-dispatch memory-system send: a cache hit is
    /// accounted but not "accepted" by a channel.
    pub fn dispatch(&mut self, req: &mut Request) -> DispatchOutcome {
        self.translator.translate(req);
        trace!(
            "translated vpn={} -> addr={:#x} (core {})",
            req.vpage,
            req.addr,
            req.source_id
        );

        match req.op {
            Op::Read => self.stats.read_requests += 1,
            Op::Write => self.stats.write_requests += 1,
            Op::Other => self.stats.other_requests += 1,
        }

        let hit = self.top_cache.contains(req.vpage);
        self.top_cache.record_access(req.vpage);
        if hit {
            self.stats.cache_requests += 1;
            return DispatchOutcome::CacheHit;
        }

        self.decoder.apply(req);

        self.stats.migrations = self.translator.migrations();
        self.stats.windows_completed = self.translator.windows_completed();
        if self.stats.migrations > 0 {
            debug!(
                "migrations so far: {}, windows completed: {}",
                self.stats.migrations, self.stats.windows_completed
            );
        }

        DispatchOutcome::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::AddrScheme;
    use crate::organization::DramOrganization;
    use crate::request::{Op, Request};

    fn test_engine() -> Engine {
        let org = DramOrganization::canonical();
        let decoder = Decoder::setup(&org, AddrScheme::ChRaBaRoCo).unwrap();
        let migration = MigrationParams {
            window_size: 1_000_000,
            hot_page_threshold: 1_000_000,
            cooldown_windows: 2,
            future_access_multiplier: 1,
            migration_cost_us: MigrationParams::migration_cost_us(4096, 153.0),
        };
        Engine::new(
            decoder,
            EngineParams {
                offset_bits: 12,
                num_channels: org.num_channels(),
                pages_per_channel: 1024,
                migration,
                seed: 1,
                top_cache_capacity: 4,
            },
        )
    }

    #[test]
    fn accepted_dispatch_decodes_and_counts() {
        let mut engine = test_engine();
        let mut req = Request::new(0x1234_5000, Op::Read, 0);
        let outcome = engine.dispatch(&mut req);
        assert_eq!(outcome, DispatchOutcome::Accepted);
        assert_eq!(engine.stats().read_requests, 1);
        assert!(req.addr_vec.iter().all(|&v| v != -1));
    }

    #[test]
    fn repeated_hot_page_becomes_cache_hit() {
        let mut engine = test_engine();
        let addr = 0xABCD_0000u64;
        let mut last_outcome = DispatchOutcome::Accepted;
        for core in 0..5 {
            let mut req = Request::new(addr, Op::Read, 0);
            last_outcome = engine.dispatch(&mut req);
            let _ = core;
        }
        assert_eq!(last_outcome, DispatchOutcome::CacheHit);
        assert!(engine.stats().cache_requests > 0);
        // op counters include cache-hit requests, not just accepted ones.
        assert_eq!(engine.stats().read_requests, 5);
    }
}
