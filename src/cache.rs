use std::{fmt, iter, marker::PhantomData};

use serde::Serialize;

use crate::{
    config::Mapping,
    mapping::{AccessResult, MakeS, MapPolicy},
};

/// Size of one cache line in bytes.
pub const BLOCK_SIZE: u32 = 64;
/// Width of a traced address in bits.
pub const ADDRESS_BITS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr {
    pub offset: u32,
    pub index: u32,
    pub tag: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSection {
    shift: u32,
    mask: u32,
}

impl BitSection {
    fn new(shift: u32, bits: u32) -> Self {
        BitSection {
            shift,
            mask: low_mask(bits),
        }
    }

    fn apply(&self, num: u32) -> u32 {
        num.checked_shr(self.shift).unwrap_or(0) & self.mask
    }
}

fn low_mask(bits: u32) -> u32 {
    1u32.checked_shl(bits).map_or(u32::MAX, |bit| bit - 1)
}

/// Field layout of an address for one cache geometry.
///
/// From least to most significant bit: `offset`, `index` (direct-mapped
/// only) and `tag`. A line count that is not a power of two rounds the index
/// width down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    pub num_lines: usize,
    pub offset_bits: u32,
    pub index_bits: u32,
    pub tag_bits: u32,
    offset_sec: BitSection,
    index_sec: BitSection,
    tag_sec: BitSection,
}

impl AddressDecoder {
    pub fn new(cache_size: u32, mapping: Mapping) -> Self {
        let num_lines = cache_size / BLOCK_SIZE;
        let offset_bits = BLOCK_SIZE.ilog2();
        let index_bits = match mapping {
            Mapping::DirectMapped => num_lines.checked_ilog2().unwrap_or(0),
            Mapping::FullyAssociative => 0,
        };
        let tag_bits = ADDRESS_BITS - offset_bits - index_bits;

        AddressDecoder {
            num_lines: num_lines as usize,
            offset_bits,
            index_bits,
            tag_bits,
            offset_sec: BitSection::new(0, offset_bits),
            index_sec: BitSection::new(offset_bits, index_bits),
            tag_sec: BitSection::new(offset_bits + index_bits, tag_bits),
        }
    }

    pub fn index_mask(&self) -> u32 {
        self.index_sec.mask
    }

    pub fn tag_mask(&self) -> u32 {
        self.tag_sec.mask
    }

    pub fn split_addr(&self, address: u32) -> Addr {
        Addr {
            offset: self.offset_sec.apply(address),
            index: self.index_sec.apply(address),
            tag: self.tag_sec.apply(address),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub name: String,
    pub lines: usize,
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// A single line store driven by the mapping policy `M`.
///
/// `S` is the policy's per-store state, so two stores never share a FIFO
/// cursor.
#[derive(Debug)]
pub struct Cache<S: MakeS, M: MapPolicy<S>> {
    name: String,
    pub lines: Vec<Line>,
    pub state: S,
    decoder: AddressDecoder,
    hits: u64,
    misses: u64,
    _policy: PhantomData<M>,
}

impl<S: MakeS, M: MapPolicy<S>> Cache<S, M> {
    pub fn new(name: impl Into<String>, cache_size: u32) -> Self {
        let decoder = AddressDecoder::new(cache_size, M::MAPPING);
        let name = name.into();
        tracing::debug!(
            cache = %name,
            lines = decoder.num_lines,
            offset_bits = decoder.offset_bits,
            index_bits = decoder.index_bits,
            tag_bits = decoder.tag_bits,
            "allocated line store"
        );

        Cache {
            name,
            lines: iter::repeat_with(Line::default)
                .take(decoder.num_lines)
                .collect(),
            state: S::new(decoder.num_lines),
            decoder,
            hits: 0,
            misses: 0,
            _policy: PhantomData,
        }
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }
}

pub trait IsCache: fmt::Debug {
    fn access(&mut self, address: u32) -> AccessResult;
    fn split_addr(&self, address: u32) -> Addr;
    fn name(&self) -> &str;
    fn num_lines(&self) -> usize;
    fn make_stats(&self) -> CacheStats;
}

impl<S: MakeS, M: MapPolicy<S>> IsCache for Cache<S, M> {
    fn access(&mut self, address: u32) -> AccessResult {
        let addr = self.split_addr(address);
        let result = M::access(self, addr);
        match result {
            AccessResult::Hit => self.hits += 1,
            AccessResult::Miss => self.misses += 1,
        }
        result
    }

    fn split_addr(&self, address: u32) -> Addr {
        self.decoder.split_addr(address)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn num_lines(&self) -> usize {
        self.lines.len()
    }

    fn make_stats(&self) -> CacheStats {
        let accesses = self.hits + self.misses;
        CacheStats {
            name: self.name.clone(),
            lines: self.lines.len(),
            accesses,
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hits as f64 / accesses as f64,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub valid: bool,
    pub tag: u32,
}

impl Line {
    pub fn apply(&mut self, addr: Addr) {
        self.valid = true;
        self.tag = addr.tag;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{direct::DirectMapped, fully::FifoState, fully::FullyAssociative};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(64, 1, 0)]
    #[case(128, 2, 1)]
    #[case(1024, 16, 4)]
    #[case(4096, 64, 6)]
    fn direct_mapped_geometry(#[case] size: u32, #[case] lines: usize, #[case] index_bits: u32) {
        let dec = AddressDecoder::new(size, Mapping::DirectMapped);
        assert_eq!(dec.num_lines, lines);
        assert_eq!(dec.offset_bits, 6);
        assert_eq!(dec.index_bits, index_bits);
        assert_eq!(dec.offset_bits + dec.index_bits + dec.tag_bits, ADDRESS_BITS);
        assert_eq!(dec.index_mask(), (1 << index_bits) - 1);
        assert_eq!(dec.tag_mask(), (1 << dec.tag_bits) - 1);
    }

    #[test]
    fn fully_associative_has_no_index() {
        let dec = AddressDecoder::new(4096, Mapping::FullyAssociative);
        assert_eq!(dec.num_lines, 64);
        assert_eq!(dec.index_bits, 0);
        assert_eq!(dec.tag_bits, 26);
        assert_eq!(dec.index_mask(), 0);
        assert_eq!(
            dec.split_addr(0xdead_beef),
            Addr {
                offset: 0x2f,
                index: 0,
                tag: 0xdead_beef >> 6,
            }
        );
    }

    #[test]
    fn split_direct_mapped_address() {
        // 16 lines: 6 offset bits, 4 index bits, 22 tag bits
        let dec = AddressDecoder::new(1024, Mapping::DirectMapped);
        let addr = dec.split_addr(0x8cda_3fa8);
        assert_eq!(addr.offset, 0x8cda_3fa8 & 0x3f);
        assert_eq!(addr.index, (0x8cda_3fa8 >> 6) & 0xf);
        assert_eq!(addr.tag, 0x8cda_3fa8 >> 10);
    }

    #[test]
    fn non_power_of_two_rounds_index_down() {
        // 3 lines -> floor(log2(3)) = 1 index bit
        let dec = AddressDecoder::new(192, Mapping::DirectMapped);
        assert_eq!(dec.num_lines, 3);
        assert_eq!(dec.index_bits, 1);
        assert_eq!(dec.tag_bits, 25);
    }

    #[test]
    fn new_cache_lines_are_invalid() {
        let cache = Cache::<(), DirectMapped>::new("unified", 256);
        assert_eq!(cache.num_lines(), 4);
        assert_eq!(cache.num_lines(), cache.decoder().num_lines);
        assert_eq!(cache.decoder().index_bits, 2);
        assert!(cache.lines.iter().all(|l| *l == Line::default()));
        assert!(cache.lines.iter().all(|l| !l.valid && l.tag == 0));
    }

    #[test]
    fn per_store_stats_follow_accesses() {
        let mut cache = Cache::<FifoState, FullyAssociative>::new("data", 128);
        assert_eq!(cache.access(0x1000), AccessResult::Miss);
        assert_eq!(cache.access(0x1004), AccessResult::Hit);
        assert_eq!(cache.access(0x2000), AccessResult::Miss);

        let stats = cache.make_stats();
        assert_eq!(stats.name, "data");
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.accesses, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }
}
