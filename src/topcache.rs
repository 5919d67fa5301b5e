//! Top-N access cache: a small set of the hottest virtual pages whose
//! requests bypass the decoder/controller path entirely.

/// Tracks at most `capacity` VPNs, each with its lifetime access count.
/// Membership test is a linear scan; eviction replaces the
/// lowest-lifetime-count entry only if the candidate strictly exceeds it.
#[derive(Debug, Clone)]
pub struct TopCache {
    capacity: usize,
    entries: Vec<(u64, u64)>,
    lifetime_counts: std::collections::HashMap<u64, u64>,
}

impl TopCache {
    pub fn new(capacity: usize) -> Self {
        TopCache {
            capacity,
            entries: Vec::with_capacity(capacity),
            lifetime_counts: std::collections::HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, vpn: u64) -> bool {
        self.entries.iter().any(|&(v, _)| v == vpn)
    }

    /// Records one lifetime access to `vpn` and reconsiders cache membership.
    pub fn record_access(&mut self, vpn: u64) {
        let count = self.lifetime_counts.entry(vpn).or_insert(0);
        *count += 1;
        let count = *count;
        self.update(vpn, count);
    }

    /// No-op if `vpn` is already cached. Otherwise appends if under
    /// capacity; else replaces the entry with the lowest lifetime count,
    /// but only if `lifetime_count` strictly exceeds it.
    fn update(&mut self, vpn: u64, lifetime_count: u64) {
        if self.capacity == 0 || self.contains(vpn) {
            return;
        }
        if self.entries.len() < self.capacity {
            self.entries.push((vpn, lifetime_count));
            return;
        }
        let (min_idx, &(_, min_count)) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, &(_, count))| count)
            .expect("capacity > 0 implies non-empty once full");
        if lifetime_count > min_count {
            self.entries[min_idx] = (vpn, lifetime_count);
        }
    }
}
