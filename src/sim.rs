use serde::Serialize;

use crate::{
    cache::CacheStats,
    config::Config,
    error::ConfigError,
    mapping::AccessResult,
    organization::Caches,
    stats::{Report, Statistics},
    trace::Access,
};

/// One simulation run over a single access stream.
#[derive(Debug)]
pub struct Simulator {
    config: Config,
    caches: Caches,
    stats: Statistics,
    finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimSummary {
    pub config: Config,
    #[serde(flatten)]
    pub report: Report,
    pub caches: Vec<CacheStats>,
}

impl Simulator {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let caches = config.build_caches()?;
        tracing::debug!(
            cache_size = config.cache_size,
            mapping = %config.mapping,
            organization = %config.organization,
            "simulator ready"
        );
        Ok(Simulator {
            config: *config,
            caches,
            stats: Statistics::new(),
            finished: false,
        })
    }

    /// Simulates one record. The sentinel and anything after it are not
    /// counted and return `None`.
    pub fn access(&mut self, access: Access) -> Option<AccessResult> {
        if self.finished || access.is_sentinel() {
            self.finished = true;
            return None;
        }
        let result = self.caches.select(access.kind).access(access.address);
        self.stats.record(result.is_hit());
        tracing::trace!(kind = ?access.kind, address = format_args!("{:#x}", access.address), ?result);
        Some(result)
    }

    /// Feeds records until the stream or the sentinel ends. Returns how many
    /// were counted.
    pub fn run<I: IntoIterator<Item = Access>>(&mut self, accesses: I) -> usize {
        let mut counted = 0;
        for access in accesses {
            if self.access(access).is_none() {
                break;
            }
            counted += 1;
        }
        counted
    }

    /// Whether the sentinel has been seen.
    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn report(&self) -> Report {
        self.stats.report()
    }

    pub fn summary(&self) -> SimSummary {
        SimSummary {
            config: self.config,
            report: self.report(),
            caches: self.caches.stats(),
        }
    }
}
