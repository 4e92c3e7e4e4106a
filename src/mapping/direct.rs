use crate::{
    cache::{Addr, Cache},
    config::Mapping,
};

use super::{AccessResult, MapPolicy};

/// One candidate line per index; a miss always evicts it.
#[derive(Debug)]
pub struct DirectMapped;

impl MapPolicy<()> for DirectMapped {
    const MAPPING: Mapping = Mapping::DirectMapped;

    fn access(cache: &mut Cache<(), Self>, addr: Addr) -> AccessResult {
        let line = &mut cache.lines[addr.index as usize];
        if line.valid && line.tag == addr.tag {
            AccessResult::Hit
        } else {
            line.apply(addr);
            AccessResult::Miss
        }
    }
}
