//! Recoverable failures of the engine.
//!
//! Malformed input from the grounding collaborator is not represented here:
//! it is a contract violation and panics. What remains are resource limits,
//! which the caller can react to, e.g. by retrying with
//! [`Config::only_positive_literals`][crate::config::Config::only_positive_literals]
//! or by skipping the h2-mutex computation.

use std::fmt;
use std::time::Duration;

use num_bigint::BigUint;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The two timed phases of the computation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Compilation,
    Solving,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Compilation => write!(f, "rule compilation"),
            Phase::Solving => write!(f, "fixpoint solving"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The pair universe does not fit into the configured budget.
    #[error("pair universe over {literals} literals needs {required} pairs, limit is {limit}")]
    PairUniverseTooLarge {
        literals: usize,
        required: BigUint,
        limit: u64,
    },

    /// Rule compilation produced more rules than the configured budget.
    #[error("rule table exceeds the limit of {limit} rules")]
    TooManyRules { limit: usize },

    /// The time limit was reached.
    #[error("time limit of {limit:?} reached during {phase}")]
    Timeout { phase: Phase, limit: Duration },

    /// An allocation for the rule table or the solver state failed.
    #[error("out of memory during {phase} ({requested} more elements of {size} bytes)")]
    OutOfMemory {
        phase: Phase,
        requested: usize,
        size: usize,
    },
}

/// Reserves room for `additional` more elements, failing with
/// [`Error::OutOfMemory`] instead of aborting.
pub(crate) fn try_reserve<T>(vec: &mut Vec<T>, additional: usize, phase: Phase) -> Result<()> {
    vec.try_reserve(additional).map_err(|_| Error::OutOfMemory {
        phase,
        requested: additional,
        size: std::mem::size_of::<T>(),
    })
}

/// A vector of `len` copies of `value`, failing with [`Error::OutOfMemory`]
/// instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T, phase: Phase) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len).map_err(|_| Error::OutOfMemory {
        phase,
        requested: len,
        size: std::mem::size_of::<T>(),
    })?;
    vec.resize(len, value);
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_messages() {
        let err = Error::PairUniverseTooLarge {
            literals: 4,
            required: BigUint::from(10u32),
            limit: 5,
        };
        assert_eq!(err.to_string(), "pair universe over 4 literals needs 10 pairs, limit is 5");

        let err = Error::Timeout {
            phase: Phase::Solving,
            limit: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "time limit of 2s reached during fixpoint solving");

        let err = Error::TooManyRules { limit: 7 };
        assert_eq!(err.to_string(), "rule table exceeds the limit of 7 rules");

        let err = Error::OutOfMemory {
            phase: Phase::Compilation,
            requested: 3,
            size: 4,
        };
        assert_eq!(err.to_string(), "out of memory during rule compilation (3 more elements of 4 bytes)");
    }

    #[test]
    fn test_failed_allocation_is_an_error() {
        let mut vec: Vec<u64> = vec![1, 2, 3];
        let err = try_reserve(&mut vec, usize::MAX, Phase::Compilation).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfMemory {
                phase: Phase::Compilation,
                size: 8,
                ..
            }
        ));
        assert_eq!(vec, vec![1, 2, 3]);

        let err = try_filled(usize::MAX, 0u32, Phase::Solving).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { phase: Phase::Solving, .. }));

        assert!(try_reserve(&mut vec, 10, Phase::Compilation).is_ok());
        assert_eq!(try_filled(4, 7u32, Phase::Solving).unwrap(), vec![7; 4]);
    }
}
