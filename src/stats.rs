//! Observable metrics of one h2-mutex computation.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Stats {
    pub num_literals: usize,
    pub num_pairs: usize,
    pub num_rules: usize,
    pub num_watch_entries: usize,
    /// Pairs proven co-reachable.
    pub reachable_pairs: usize,
    pub mutex_pairs: usize,
    pub compile_time: Duration,
    pub solve_time: Duration,
}

impl Stats {
    pub fn total_time(&self) -> Duration {
        self.compile_time + self.solve_time
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "h2 literals: {}", self.num_literals)?;
        writeln!(f, "h2 pairs: {}", self.num_pairs)?;
        writeln!(f, "h2 rules: {} ({} watch entries)", self.num_rules, self.num_watch_entries)?;
        writeln!(f, "h2 reachable pairs: {}", self.reachable_pairs)?;
        writeln!(f, "h2 mutex pairs: {}", self.mutex_pairs)?;
        writeln!(f, "h2 rule compilation time: {:.3}s", self.compile_time.as_secs_f64())?;
        write!(f, "h2 fixpoint solving time: {:.3}s", self.solve_time.as_secs_f64())
    }
}
