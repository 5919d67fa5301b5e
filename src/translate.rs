//! Virtual-to-physical translator and the periodic hot-page migration pass.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::alloc::FreePagePool;
use crate::latency::LatencyTable;
use crate::request::Request;

/// Tunables driving migration decisions, assembled once from configuration.
#[derive(Debug, Clone, Copy)]
pub struct MigrationParams {
    pub window_size: u64,
    pub hot_page_threshold: u64,
    pub cooldown_windows: u64,
    /// Future-access multiplier applied to the benefit estimate.
    pub future_access_multiplier: u64,
    /// Precomputed migration cost in microseconds, from page size and bandwidth.
    pub migration_cost_us: f64,
}

impl MigrationParams {
    pub fn migration_cost_us(page_size_bytes: u64, bandwidth_gbps: f64) -> f64 {
        (page_size_bytes as f64 / (bandwidth_gbps * (1u64 << 30) as f64)) * 1e6
    }
}

/// Owns the page tables, access histogram, migration bookkeeping, free-page
/// pool, and latency table, and drives both the translate path and the
/// periodic migration pass.
pub struct Translator {
    offset_bits: u32,
    forward: HashMap<u64, u64>,
    reverse: HashMap<u64, u64>,
    channel_map: HashMap<u64, u64>,
    histogram: HashMap<u64, HashMap<usize, u64>>,
    last_migration_window: HashMap<u64, u64>,
    reserved_pages: HashSet<u64>,

    /// Counts translations since the last migration pass; triggers the
    /// next pass at `params.window_size` and resets to 0.
    tick_counter: u64,
    /// Monotonic window index. Used for cooldown bookkeeping; incremented
    /// once per completed pass, *after* that pass's cooldown checks have
    /// run against it (the checks see the window being completed, not the
    /// next one).
    window_index: u64,
    windows_completed: u64,
    migrations: u64,

    params: MigrationParams,
    alloc: FreePagePool,
    latency: LatencyTable,
    rng: StdRng,
}

impl Translator {
    pub fn new(
        offset_bits: u32,
        num_channels: u64,
        pages_per_channel: u64,
        params: MigrationParams,
        seed: u64,
    ) -> Self {
        Translator {
            offset_bits,
            forward: HashMap::new(),
            reverse: HashMap::new(),
            channel_map: HashMap::new(),
            histogram: HashMap::new(),
            last_migration_window: HashMap::new(),
            reserved_pages: HashSet::new(),
            tick_counter: 0,
            window_index: 0,
            windows_completed: 0,
            migrations: 0,
            params,
            alloc: FreePagePool::new(num_channels, pages_per_channel),
            latency: LatencyTable::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn migrations(&self) -> u64 {
        self.migrations
    }

    pub fn windows_completed(&self) -> u64 {
        self.windows_completed
    }

    pub fn channel_of(&self, vpn: u64) -> Option<u64> {
        self.channel_map.get(&vpn).copied()
    }

    /// Marks the page containing `addr` as reserved. Bookkeeping only;
    /// reserved pages are not treated specially by translate or migration.
    pub fn reserve(&mut self, _kind: &str, addr: u64) -> bool {
        let ppn = addr >> self.offset_bits;
        self.reserved_pages.insert(ppn);
        true
    }

    /// Translates `req.addr` (virtual) into a physical address, writing the
    /// result back into `req.addr`. Always returns `true`: the allocator
    /// cannot fail to produce a page given a positive total page pool.
    pub fn translate(&mut self, req: &mut Request) -> bool {
        req.v_addr = req.addr;
        let vpn = req.v_addr >> self.offset_bits;
        req.vpage = vpn;

        *self
            .histogram
            .entry(vpn)
            .or_default()
            .entry(req.source_id)
            .or_insert(0) += 1;

        self.tick_counter += 1;
        if self.tick_counter == self.params.window_size {
            self.run_migration_pass();
            self.tick_counter = 0;
        }

        let offset_mask = (1u64 << self.offset_bits) - 1;
        if let Some(&ppn) = self.forward.get(&vpn) {
            req.addr = (ppn << self.offset_bits) | (req.v_addr & offset_mask);
            return true;
        }

        let channel = self.latency.best_channel_for(req.source_id) as u64;
        let ppn = self.allocate_with_eviction(channel);
        self.forward.insert(vpn, ppn);
        self.reverse.insert(ppn, vpn);
        self.channel_map.insert(vpn, channel);
        req.addr = (ppn << self.offset_bits) | (req.v_addr & offset_mask);
        true
    }

    fn allocate_with_eviction(&mut self, channel: u64) -> u64 {
        if let Some(ppn) = self.alloc.allocate_on(channel, &mut self.rng) {
            return ppn;
        }
        let victim_ppn = self.alloc.random_victim(channel, &mut self.rng);
        if let Some(victim_vpn) = self.reverse.remove(&victim_ppn) {
            self.forward.remove(&victim_vpn);
            self.channel_map.remove(&victim_vpn);
        }
        self.alloc.free(victim_ppn);
        self.alloc
            .allocate_on(channel, &mut self.rng)
            .expect("page just freed in this partition")
    }

    /// Scans every mapped VPN, migrating hot pages toward the channel that
    /// minimizes their dominant core's latency, subject to a cost/benefit
    /// test and a cooldown window. The PPN a page is migrated away from is
    /// deliberately not freed and its reverse-table entry is left stale —
    /// this leaks a free page and a dangling reverse entry, matching a
    /// known quirk rather than silently correcting it.
    fn run_migration_pass(&mut self) {
        let vpns: Vec<u64> = self.forward.keys().copied().collect();

        for vpn in vpns {
            if vpn == 0 {
                continue;
            }
            let Some(core_counts) = self.histogram.get(&vpn) else {
                continue;
            };
            let total: u64 = core_counts.values().sum();
            if total < self.params.hot_page_threshold {
                continue;
            }

            let mut core_ids: Vec<usize> = core_counts.keys().copied().collect();
            core_ids.sort_unstable();
            // fold ascending, keeping strictly-greater only, so ties resolve
            // to the lowest core id rather than the last one visited.
            let core_star = core_ids
                .iter()
                .copied()
                .fold(None, |acc: Option<usize>, c| match acc {
                    Some(b) if core_counts[&b] >= core_counts[&c] => Some(b),
                    _ => Some(c),
                })
                .expect("histogram entry has at least one core");
            let accesses_at_core_star = core_counts[&core_star];

            let best_channel = self.latency.best_channel_for(core_star) as u64;
            let current_channel = self.channel_map[&vpn];
            if best_channel == current_channel {
                continue;
            }

            if let Some(&last) = self.last_migration_window.get(&vpn) {
                if self.window_index.saturating_sub(last) < self.params.cooldown_windows {
                    continue;
                }
            }

            let current_latency = self.latency.latency(core_star, current_channel as usize) as f64;
            let best_latency = self.latency.latency(core_star, best_channel as usize) as f64;
            let predicted_accesses =
                accesses_at_core_star as f64 * self.params.future_access_multiplier as f64;
            let gain = (current_latency - best_latency) * 2.0 * predicted_accesses / 1000.0;

            if gain > self.params.migration_cost_us {
                let new_ppn = self.allocate_with_eviction(best_channel);
                self.forward.insert(vpn, new_ppn);
                self.reverse.insert(new_ppn, vpn);
                self.channel_map.insert(vpn, best_channel);
                self.last_migration_window.insert(vpn, self.window_index);
                self.migrations += 1;
            }
        }

        self.window_index += 1;
        self.histogram.clear();
        self.windows_completed += 1;
    }
}
