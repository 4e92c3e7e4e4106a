use crate::{
    cache::{Addr, Cache},
    config::Mapping,
};

use super::{AccessResult, MakeS, MapPolicy};

/// Any line may hold any block; misses fill lines in FIFO order.
///
/// Lookup scans from line 0 and stops at the first line whose tag either
/// matches or is zero. A zero tag marks the end of the filled region, so the
/// valid bit is never consulted. Replacement always targets the FIFO cursor,
/// wherever the scan stopped.
#[derive(Debug)]
pub struct FullyAssociative;

impl MapPolicy<FifoState> for FullyAssociative {
    const MAPPING: Mapping = Mapping::FullyAssociative;

    fn access(cache: &mut Cache<FifoState, Self>, addr: Addr) -> AccessResult {
        let hit = cache
            .lines
            .iter()
            .find(|line| line.tag == addr.tag || line.tag == 0)
            .is_some_and(|line| line.tag == addr.tag);

        if hit {
            return AccessResult::Hit;
        }

        let fifo = &mut cache.state;
        cache.lines[fifo.cursor].apply(addr);
        fifo.cursor = (fifo.cursor + 1) % cache.lines.len();
        AccessResult::Miss
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FifoState {
    pub cursor: usize,
}

impl MakeS for FifoState {
    fn new(_n_lines: usize) -> Self {
        FifoState { cursor: 0 }
    }
}
