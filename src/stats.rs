use std::fmt;

use serde::Serialize;

/// Run-wide access counters. `hits <= accesses` always holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    accesses: u64,
    hits: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, hit: bool) {
        self.accesses += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// `hit_rate` is NaN when nothing was accessed.
    pub fn report(&self) -> Report {
        Report {
            accesses: self.accesses,
            hits: self.hits,
            hit_rate: self.hits as f64 / self.accesses as f64,
        }
    }
}

/// Final numbers handed to the reporter. A NaN `hit_rate` serialises as
/// `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Report {
    pub accesses: u64,
    pub hits: u64,
    pub hit_rate: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Cache Statistics")?;
        writeln!(f, "-----------------")?;
        writeln!(f)?;
        writeln!(f, "Accesses: {}", self.accesses)?;
        writeln!(f, "Hits:     {}", self.hits)?;
        writeln!(f, "Hit Rate: {:.4}", self.hit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_hits_and_misses() {
        let mut stats = Statistics::new();
        for hit in [false, true, true, false] {
            stats.record(hit);
        }
        let report = stats.report();
        assert_eq!(report.accesses, 4);
        assert_eq!(report.hits, 2);
        assert_eq!(report.hit_rate, 0.5);
    }

    #[test]
    fn zero_accesses_is_nan() {
        let report = Statistics::new().report();
        assert_eq!(report.accesses, 0);
        assert_eq!(report.hits, 0);
        assert!(report.hit_rate.is_nan());
        assert!(report.to_string().ends_with("Hit Rate: NaN\n"));
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"accesses":0,"hits":0,"hit_rate":null}"#
        );
    }

    #[test]
    fn display_matches_report_layout() {
        let report = Report {
            accesses: 3,
            hits: 1,
            hit_rate: 1.0 / 3.0,
        };
        assert_eq!(
            report.to_string(),
            "\nCache Statistics\n-----------------\n\nAccesses: 3\nHits:     1\nHit Rate: 0.3333\n"
        );
    }
}
