//! The three pluggable bit-slicing schemes that decompose a physical byte
//! address into a DRAM hierarchy coordinate.

use crate::bits::{log2_floor, slice_low};
use crate::error::OrganizationError;
use crate::organization::DramOrganization;
use crate::request::Request;

/// Which of the three named schemes to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrScheme {
    /// The "trivial" scheme: descending-index slices, column low, channel high.
    ChRaBaRoCo,
    /// Channel low, then column, then successive levels up to row; row high.
    RoBaRaCoCh,
    /// Hybrid scheme with a row-buffer-conflict-reducing XOR hash.
    Mop4Clxor,
}

/// A configured decoder: per-level bit widths, the transaction offset, and
/// which scheme to apply, computed once from a [`DramOrganization`].
#[derive(Debug, Clone)]
pub struct Decoder {
    scheme: AddrScheme,
    num_levels: usize,
    addr_bits: Vec<u32>,
    tx_offset: u32,
    row_idx: usize,
    col_idx: usize,
}

impl Decoder {
    pub fn setup(org: &DramOrganization, scheme: AddrScheme) -> Result<Self, OrganizationError> {
        if org.levels.is_empty() {
            return Err(OrganizationError::EmptyOrganization);
        }
        let num_levels = org.levels.len();
        let mut addr_bits: Vec<u32> = org.levels.iter().map(|l| log2_floor(l.count)).collect();
        let col_idx = num_levels - 1;
        addr_bits[col_idx] -= log2_floor(org.internal_prefetch_size);

        let tx_bytes = org.internal_prefetch_size * org.channel_width_bits / 8;
        let tx_offset = log2_floor(tx_bytes);

        let row_idx = org
            .level_index("row")
            .ok_or(OrganizationError::MissingRowLevel)?;

        Ok(Decoder {
            scheme,
            num_levels,
            addr_bits,
            tx_offset,
            row_idx,
            col_idx,
        })
    }

    /// Per-level bit widths, read-only view.
    pub fn level_bits(&self) -> &[u32] {
        &self.addr_bits
    }

    pub fn tx_offset(&self) -> u32 {
        self.tx_offset
    }

    /// Decodes `req.addr` into `req.addr_vec`, one entry per DRAM level.
    pub fn apply(&self, req: &mut Request) {
        req.addr_vec = vec![-1; self.num_levels];
        let mut addr = req.addr >> self.tx_offset;

        match self.scheme {
            AddrScheme::ChRaBaRoCo => {
                for i in (0..self.num_levels).rev() {
                    req.addr_vec[i] = slice_low(&mut addr, self.addr_bits[i]) as i64;
                }
            }
            AddrScheme::RoBaRaCoCh => {
                req.addr_vec[0] = slice_low(&mut addr, self.addr_bits[0]) as i64;
                req.addr_vec[self.col_idx] =
                    slice_low(&mut addr, self.addr_bits[self.col_idx]) as i64;
                for i in 1..=self.row_idx {
                    req.addr_vec[i] = slice_low(&mut addr, self.addr_bits[i]) as i64;
                }
            }
            AddrScheme::Mop4Clxor => {
                req.addr_vec[self.col_idx] = slice_low(&mut addr, 2) as i64;
                for lvl in 0..self.row_idx {
                    req.addr_vec[lvl] = slice_low(&mut addr, self.addr_bits[lvl]) as i64;
                }
                let col_high_bits = self.addr_bits[self.col_idx].saturating_sub(2);
                req.addr_vec[self.col_idx] += (slice_low(&mut addr, col_high_bits) as i64) << 2;
                req.addr_vec[self.row_idx] = addr as i64;

                let mut row_xor_offset = 0u32;
                let col_val = req.addr_vec[self.col_idx];
                for lvl in 0..self.col_idx {
                    let width = self.addr_bits[lvl];
                    if width > 0 {
                        let mask = (col_val >> row_xor_offset) & ((1i64 << width) - 1);
                        req.addr_vec[lvl] ^= mask;
                        row_xor_offset += width;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Op, Request};

    fn canonical_decoder(scheme: AddrScheme) -> Decoder {
        Decoder::setup(&DramOrganization::canonical(), scheme).unwrap()
    }

    #[test]
    fn setup_fails_without_row_level() {
        let org = DramOrganization {
            levels: vec![crate::organization::DramLevel { name: "channel".into(), count: 8 }],
            internal_prefetch_size: 1,
            channel_width_bits: 64,
        };
        let err = Decoder::setup(&org, AddrScheme::ChRaBaRoCo).unwrap_err();
        assert!(matches!(err, OrganizationError::MissingRowLevel));
    }

    #[test]
    fn tx_offset_matches_worked_example() {
        // prefetch=8, channel_width=64 -> tx_offset = 6.
        let d = canonical_decoder(AddrScheme::ChRaBaRoCo);
        assert_eq!(d.tx_offset(), 6);
        // column bits = log2(32) - log2(8) = 5 - 3 = 2.
        assert_eq!(d.level_bits()[5], 2);
        assert_eq!(d.level_bits()[0], 3); // channel: log2(8)
        assert_eq!(d.level_bits()[4], 15); // row: log2(32768)
    }

    #[test]
    fn ch_ra_ba_ro_co_worked_example() {
        let d = canonical_decoder(AddrScheme::ChRaBaRoCo);
        let mut req = Request::new(0xDEADBEEF, Op::Read, 0);
        d.apply(&mut req);
        // shifted = 0xDEADBEEF >> 6 = 0x3AB6FB
        let shifted = 0xDEADBEEFu64 >> 6;
        assert_eq!(req.addr_vec[5], (shifted & 0x3) as i64); // low 2 bits -> column
        // Reassembling low-to-high with the known bit widths reproduces the
        // shifted address.
        let widths = d.level_bits().to_vec();
        let mut rebuilt = 0u64;
        for i in (0..widths.len()).rev() {
            rebuilt = (rebuilt << widths[i]) | (req.addr_vec[i] as u64);
        }
        assert_eq!(rebuilt, shifted);
    }

    #[test]
    fn ro_ba_ra_co_ch_round_trip() {
        let d = canonical_decoder(AddrScheme::RoBaRaCoCh);
        let mut req = Request::new(0x1234_5678_9ABC, Op::Write, 1);
        d.apply(&mut req);
        let shifted = 0x1234_5678_9ABCu64 >> d.tx_offset();
        // Reconstruct in extraction order: channel, column, then levels 1..=row.
        let mut rebuilt = req.addr_vec[0] as u64;
        let mut shift = d.level_bits()[0];
        rebuilt |= (req.addr_vec[d.col_idx] as u64) << shift;
        shift += d.level_bits()[d.col_idx];
        for i in 1..=d.row_idx {
            rebuilt |= (req.addr_vec[i] as u64) << shift;
            shift += d.level_bits()[i];
        }
        assert_eq!(rebuilt, shifted);
    }

    #[test]
    fn mop4clxor_column_low_bits_match_tx_offset_shift() {
        let d = canonical_decoder(AddrScheme::Mop4Clxor);
        let addr = 0x0BAD_F00D_1234u64;
        let mut req = Request::new(addr, Op::Read, 2);
        d.apply(&mut req);
        let shifted = addr >> d.tx_offset();
        let col = req.addr_vec[d.col_idx];
        assert_eq!((col as u64) & 0x3, shifted & 0x3);
    }

    #[test]
    fn all_levels_populated() {
        for scheme in [AddrScheme::ChRaBaRoCo, AddrScheme::RoBaRaCoCh, AddrScheme::Mop4Clxor] {
            let d = canonical_decoder(scheme);
            let mut req = Request::new(0xABCDEF, Op::Other, 0);
            d.apply(&mut req);
            assert_eq!(req.addr_vec.len(), 6);
            assert!(req.addr_vec.iter().all(|&v| v != -1));
        }
    }
}
