use crate::{cache::CacheStats, cache::IsCache, trace::AccessKind};

/// Line stores for one run, picked per access by its kind.
#[derive(Debug)]
pub enum Caches {
    Unified(Box<dyn IsCache>),
    Split {
        instruction: Box<dyn IsCache>,
        data: Box<dyn IsCache>,
    },
}

impl Caches {
    pub fn select(&mut self, kind: AccessKind) -> &mut dyn IsCache {
        match (self, kind) {
            (Caches::Unified(cache), _) => cache.as_mut(),
            (Caches::Split { instruction, .. }, AccessKind::Instruction) => instruction.as_mut(),
            (Caches::Split { data, .. }, AccessKind::Data) => data.as_mut(),
        }
    }

    pub fn stats(&self) -> Vec<CacheStats> {
        match self {
            Caches::Unified(cache) => vec![cache.make_stats()],
            Caches::Split { instruction, data } => {
                vec![instruction.make_stats(), data.make_stats()]
            }
        }
    }
}
