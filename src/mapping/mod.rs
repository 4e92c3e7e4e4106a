pub mod direct;
pub mod fully;

use std::fmt;

use crate::{
    cache::{Addr, Cache},
    config::Mapping,
};

/// Per-store state a mapping policy keeps next to the lines.
pub trait MakeS: fmt::Debug {
    fn new(n_lines: usize) -> Self;
}

impl MakeS for () {
    fn new(_n_lines: usize) -> Self {}
}

pub trait MapPolicy<S: MakeS>: Sized + fmt::Debug {
    const MAPPING: Mapping;

    fn access(cache: &mut Cache<S, Self>, addr: Addr) -> AccessResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
}

impl AccessResult {
    pub fn is_hit(self) -> bool {
        self == AccessResult::Hit
    }
}
