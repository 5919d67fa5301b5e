//! Partitioned free-page allocator.
//!
//! This module owns only the per-channel bitmaps and free counts;
//! eviction also needs to touch the forward/reverse/channel-id page
//! tables, which live alongside it in
//! [`crate::translate::Translator`], so eviction of an existing mapping
//! is orchestrated there while this module only ever mutates its own
//! bitmaps.

use fixedbitset::FixedBitSet;
use rand::RngCore;

/// Number of random draws attempted before falling back to a sequential
/// scan, bounding worst-case allocation cost on a nearly-full partition.
const MAX_RANDOM_PROBES: u32 = 64;

pub struct FreePagePool {
    pages_per_channel: u64,
    num_channels: u64,
    /// One bitmap per channel; `true` means the page at that offset is free.
    bitmaps: Vec<FixedBitSet>,
    free_counts: Vec<u64>,
}

impl FreePagePool {
    pub fn new(num_channels: u64, pages_per_channel: u64) -> Self {
        let bitmaps = (0..num_channels)
            .map(|_| {
                let mut bs = FixedBitSet::with_capacity(pages_per_channel as usize);
                bs.insert_range(..);
                bs
            })
            .collect();
        let free_counts = vec![pages_per_channel; num_channels as usize];
        FreePagePool {
            pages_per_channel,
            num_channels,
            bitmaps,
            free_counts,
        }
    }

    pub fn pages_per_channel(&self) -> u64 {
        self.pages_per_channel
    }

    pub fn free_count(&self, channel: u64) -> u64 {
        self.free_counts[channel as usize]
    }

    /// Attempts to draw a free page from `channel`'s partition. Returns
    /// `None` if the partition has no free pages (caller must evict).
    ///
    /// Draws a uniformly random offset up to [`MAX_RANDOM_PROBES`] times;
    /// if none land on a free bit (only possible when the partition is
    /// nearly full), falls back to a sequential scan from a random
    /// starting offset. Marks the chosen offset in-use and decrements the
    /// free count before returning.
    pub fn allocate_on<R: RngCore>(&mut self, channel: u64, rng: &mut R) -> Option<u64> {
        if self.free_counts[channel as usize] == 0 {
            return None;
        }
        let bitmap = &mut self.bitmaps[channel as usize];
        let ppc = self.pages_per_channel;

        for _ in 0..MAX_RANDOM_PROBES {
            let offset = (rng.next_u64() % ppc) as usize;
            if bitmap[offset] {
                bitmap.set(offset, false);
                self.free_counts[channel as usize] -= 1;
                return Some(channel * ppc + offset as u64);
            }
        }

        let start = (rng.next_u64() % ppc) as usize;
        for i in 0..ppc as usize {
            let offset = (start + i) % ppc as usize;
            if bitmap[offset] {
                bitmap.set(offset, false);
                self.free_counts[channel as usize] -= 1;
                return Some(channel * ppc + offset as u64);
            }
        }
        unreachable!("free_count > 0 but no free bit found in partition {channel}");
    }

    /// Draws a uniformly random PPN inside `channel`'s partition,
    /// regardless of whether it is currently free. Used by eviction to
    /// pick a victim.
    pub fn random_victim<R: RngCore>(&self, channel: u64, rng: &mut R) -> u64 {
        let offset = rng.next_u64() % self.pages_per_channel;
        channel * self.pages_per_channel + offset
    }

    /// Marks `ppn` as free again, incrementing its channel's free count.
    pub fn free(&mut self, ppn: u64) {
        let channel = ppn / self.pages_per_channel;
        let offset = (ppn % self.pages_per_channel) as usize;
        let bitmap = &mut self.bitmaps[channel as usize];
        debug_assert!(!bitmap[offset], "double free of ppn {ppn}");
        bitmap.set(offset, true);
        self.free_counts[channel as usize] += 1;
    }

    #[cfg(test)]
    pub fn is_free(&self, ppn: u64) -> bool {
        let channel = ppn / self.pages_per_channel;
        let offset = (ppn % self.pages_per_channel) as usize;
        self.bitmaps[channel as usize][offset]
    }

    pub fn num_channels(&self) -> u64 {
        self.num_channels
    }
}
