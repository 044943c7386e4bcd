//! Engine configuration.

use std::time::{Duration, Instant};

use crate::error::{Error, Phase, Result};

/// Order in which the solver pops pairs from its worklist.
///
/// The fixpoint is confluent, so both orders produce the same closed set.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum QueueOrder {
    /// Breadth-first: pairs are processed in the order they were closed.
    #[default]
    Fifo,
    /// Depth-first: the most recently closed pair is processed next.
    Lifo,
}

/// Configuration options for the h2-mutex computation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use h2_mutexes::config::Config;
///
/// let config = Config::default()
///     .with_only_positive_literals(true)
///     .with_max_pairs(50_000_000)
///     .with_time_limit(Duration::from_secs(60));
/// assert!(config.only_positive_literals);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Leave negative literals out of the pair universe (default: false).
    ///
    /// Halves the literal universe and gives a cheaper, coarser relaxation.
    pub only_positive_literals: bool,
    /// Upper bound on the number of pairs in the universe (default: no bound
    /// beyond the 32-bit pair id space).
    pub max_pairs: Option<u64>,
    /// Upper bound on the number of compiled rules (default: none).
    pub max_rules: Option<usize>,
    /// Wall-clock budget for compilation and solving together (default: none).
    pub time_limit: Option<Duration>,
    /// Worklist discipline of the solver (default: FIFO).
    pub queue_order: QueueOrder,
}

impl Config {
    pub fn with_only_positive_literals(mut self, only_positive_literals: bool) -> Self {
        self.only_positive_literals = only_positive_literals;
        self
    }

    pub fn with_max_pairs(mut self, max_pairs: u64) -> Self {
        self.max_pairs = Some(max_pairs);
        self
    }

    pub fn with_max_rules(mut self, max_rules: usize) -> Self {
        self.max_rules = Some(max_rules);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_queue_order(mut self, queue_order: QueueOrder) -> Self {
        self.queue_order = queue_order;
        self
    }

    /// Starts the wall-clock budget now.
    pub fn deadline(&self) -> Deadline {
        Deadline {
            limit: self.time_limit,
            expires: self.time_limit.and_then(|limit| Instant::now().checked_add(limit)),
        }
    }
}

/// Point in time after which the computation is abandoned.
#[derive(Debug, Copy, Clone)]
pub struct Deadline {
    limit: Option<Duration>,
    expires: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn never() -> Self {
        Self {
            limit: None,
            expires: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires, Some(t) if Instant::now() >= t)
    }

    /// Fails with [`Error::Timeout`] once the deadline has passed.
    pub fn check(&self, phase: Phase) -> Result<()> {
        match self.limit {
            Some(limit) if self.is_expired() => Err(Error::Timeout { phase, limit }),
            _ => Ok(()),
        }
    }
}
