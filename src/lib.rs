//! # h2-mutexes: pairwise reachability analysis for grounded planning tasks
//!
//! **`h2-mutexes`** computes the **h2 mutexes** of a grounded planning task: pairs of literals that can never be true at the same time in any reachable state.
//! The analysis is the classic h^2 relaxation, phrased as a monotone fixpoint over pairs and solved with a counting (Dowling-Gallier style) propagation.
//!
//! ## What is an h2 mutex?
//!
//! A pair `{l, l'}` is **co-reachable** if some state reachable from the initial state makes both literals true.
//! Deciding this exactly is as hard as planning itself, so the h2 relaxation over-approximates it: it assumes that any two pairs reachable on their own can be combined.
//! Every pair the relaxation fails to reach is a **mutex** and is guaranteed unreachable.
//! A mutex self-pair `{l}` means `l` is never true at all.
//!
//! ## Key Features
//!
//! - **Dense Pair Universe**: Every unordered pair of literals gets a dense [`PairId`][crate::pairs::PairId] through a triangular pairing function, so reachability is a plain bitset.
//! - **Rule Compilation**: Operators (with conditional effects) and axioms are compiled once into propagation rules `head <- body` in the [`rules`] module.
//! - **Linear-Time Fixpoint**: Every rule keeps a counter of unmet body pairs; each rule fires at most once and each pair is processed at most once.
//! - **Budgets**: Pair universe size, rule count, and wall-clock time are bounded by [`Config`][crate::config::Config] and reported as typed [`Error`][crate::error::Error]s.
//!
//! ## Basic Usage
//!
//! ```rust
//! use h2_mutexes::config::Config;
//! use h2_mutexes::h2::compute_mutex_pairs;
//! use h2_mutexes::task::{Effect, GroundedTask, Operator};
//! use h2_mutexes::types::Atom;
//!
//! // 1. Describe the grounded task: one ball, two rooms.
//! let at_a = Atom::new("at", ["ball", "a"]);
//! let at_b = Atom::new("at", ["ball", "b"]);
//! let task = GroundedTask::new(vec![at_a.clone(), at_b.clone()], vec![at_a.clone()])
//!     .with_operator(
//!         Operator::new("move(a, b)", vec![at_a.pos()])
//!             .with_add(Effect::unconditional(at_b.clone()))
//!             .with_del(Effect::unconditional(at_a.clone())),
//!     )
//!     .with_operator(
//!         Operator::new("move(b, a)", vec![at_b.pos()])
//!             .with_add(Effect::unconditional(at_a.clone()))
//!             .with_del(Effect::unconditional(at_b.clone())),
//!     );
//!
//! // 2. Run the analysis
//! let report = compute_mutex_pairs(&task, &Config::default()).unwrap();
//!
//! // 3. The ball is never in both rooms
//! assert!(report.mutexes.is_mutex(&at_a.pos(), &at_b.pos()));
//! assert!(!report.mutexes.is_mutex(&at_a.pos(), &at_b.neg()));
//! println!("{}", report.stats);
//! ```
//!
//! ## Core Components
//!
//! - **[`pairs`]**: The literal universe and the pair-to-id bijection.
//! - **[`rules`]**: Compilation of operators and axioms into propagation rules, plus the watch list.
//! - **[`solver`]**: The counting fixpoint.
//! - **[`mutex`]**: Extraction and queries over the resulting mutex pairs.
//! - **[`h2`]**: The one-call entry point [`compute_mutex_pairs`][crate::h2::compute_mutex_pairs].
//!
//! The remaining modules hold the task model ([`types`], [`task`]), compact literal handles ([`lit`]), and supporting pieces ([`bitset`], [`config`], [`error`], [`stats`], [`debug`], [`utils`]).

pub mod bitset;
pub mod config;
pub mod debug;
pub mod error;
pub mod h2;
pub mod lit;
pub mod mutex;
pub mod pairs;
pub mod rules;
pub mod solver;
pub mod stats;
pub mod task;
pub mod types;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use h2::{compute_mutex_pairs, MutexReport};
