//! Public entry point: grounded task in, mutex pairs out.

use std::time::Instant;

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::mutex::MutexSet;
use crate::rules::ReachabilityProgram;
use crate::solver::Solver;
use crate::stats::Stats;
use crate::task::GroundedTask;

/// Result of [`compute_mutex_pairs`].
#[derive(Debug, Clone)]
pub struct MutexReport {
    pub mutexes: MutexSet,
    pub stats: Stats,
}

/// Computes the h2-mutex pairs of a grounded task.
///
/// Compiles the task into propagation rules, runs the counting fixpoint from
/// the initial state, and returns every pair of the universe that was not
/// proven co-reachable. The reachable-action-parameter table of the task is
/// not consulted.
///
/// # Errors
///
/// Fails if the pair universe or the rule table exceed the budgets of
/// `config`, if its time limit runs out, or if the rule table or the solver
/// state cannot be allocated. No partial result is returned.
///
/// # Examples
///
/// ```
/// use h2_mutexes::config::Config;
/// use h2_mutexes::h2::compute_mutex_pairs;
/// use h2_mutexes::task::{Effect, GroundedTask, Operator};
/// use h2_mutexes::types::Atom;
///
/// let at_a = Atom::new("at", ["a"]);
/// let at_b = Atom::new("at", ["b"]);
/// let task = GroundedTask::new(vec![at_a.clone(), at_b.clone()], vec![at_a.clone()]).with_operator(
///     Operator::new("move-a-b", vec![at_a.pos()])
///         .with_add(Effect::unconditional(at_b.clone()))
///         .with_del(Effect::unconditional(at_a.clone())),
/// );
///
/// let report = compute_mutex_pairs(&task, &Config::default()).unwrap();
/// assert!(report.mutexes.is_mutex(&at_a.pos(), &at_b.pos()));
/// ```
pub fn compute_mutex_pairs(task: &GroundedTask, config: &Config) -> Result<MutexReport> {
    let deadline = config.deadline();

    let time_compile = Instant::now();
    let program = ReachabilityProgram::compile_with_deadline(task, config, deadline)?;
    let compile_time = time_compile.elapsed();
    info!(
        "h2: compiled {} rules over {} pairs in {:.3}s",
        program.num_rules(),
        program.universe().num_pairs(),
        compile_time.as_secs_f64()
    );

    let time_solve = Instant::now();
    let mut solver = Solver::new(&program, config.queue_order)?;
    solver.seed_state(&task.init);
    solver.run(&deadline)?;
    let closed = solver.into_closed();
    let solve_time = time_solve.elapsed();
    info!(
        "h2: {} reachable pairs after {:.3}s",
        closed.len(),
        solve_time.as_secs_f64()
    );

    let mutexes = MutexSet::extract(program.universe(), &closed);
    let stats = Stats {
        num_literals: program.universe().num_literals(),
        num_pairs: program.universe().num_pairs(),
        num_rules: program.num_rules(),
        num_watch_entries: program.watches().num_entries(),
        reachable_pairs: closed.len(),
        mutex_pairs: mutexes.len(),
        compile_time,
        solve_time,
    };
    info!("h2: {} mutex pairs", stats.mutex_pairs);

    Ok(MutexReport { mutexes, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use test_log::test;

    use crate::error::Error;
    use crate::task::{Effect, Operator};
    use crate::types::Atom;

    fn switch_task() -> GroundedTask {
        let (on, off) = (Atom::new("on", ["l"]), Atom::new("off", ["l"]));
        GroundedTask::new(vec![on.clone(), off.clone()], vec![off.clone()])
            .with_operator(
                Operator::new("switch-on", vec![off.pos()])
                    .with_add(Effect::unconditional(on.clone()))
                    .with_del(Effect::unconditional(off.clone())),
            )
            .with_operator(
                Operator::new("switch-off", vec![on.pos()])
                    .with_add(Effect::unconditional(off.clone()))
                    .with_del(Effect::unconditional(on.clone())),
            )
    }

    #[test]
    fn test_stats_are_consistent() {
        let report = compute_mutex_pairs(&switch_task(), &Config::default()).unwrap();
        let stats = &report.stats;
        assert_eq!(stats.num_literals, 4);
        assert_eq!(stats.num_pairs, 10);
        assert_eq!(stats.reachable_pairs + stats.mutex_pairs, stats.num_pairs);
        assert_eq!(stats.mutex_pairs, report.mutexes.len());
        assert!(stats.num_rules > 0);
    }

    #[test]
    fn test_switch_mutexes() {
        let report = compute_mutex_pairs(&switch_task(), &Config::default()).unwrap();
        let (on, off) = (Atom::new("on", ["l"]), Atom::new("off", ["l"]));
        let m = &report.mutexes;
        assert!(m.is_mutex(&on.pos(), &off.pos()));
        assert!(m.is_mutex(&on.neg(), &off.neg()));
        assert!(!m.is_mutex(&on.pos(), &off.neg()));
        assert!(!m.is_mutex(&on.neg(), &off.pos()));
        assert_eq!(m.dead_literals().count(), 0);
        // {on, off}, {~on, ~off}, and the two complementary pairs.
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn test_only_positive_literals() {
        let config = Config::default().with_only_positive_literals(true);
        let report = compute_mutex_pairs(&switch_task(), &config).unwrap();
        assert_eq!(report.stats.num_literals, 2);
        assert_eq!(report.stats.num_pairs, 3);
        let (on, off) = (Atom::new("on", ["l"]), Atom::new("off", ["l"]));
        assert!(report.mutexes.is_mutex(&on.pos(), &off.pos()));
        assert!(report.mutexes.iter().all(|p| p.literals().all(|l| l.is_positive())));
    }

    #[test]
    fn test_budget_errors() {
        let err = compute_mutex_pairs(&switch_task(), &Config::default().with_max_pairs(9)).unwrap_err();
        assert!(matches!(err, Error::PairUniverseTooLarge { .. }));

        let err = compute_mutex_pairs(&switch_task(), &Config::default().with_time_limit(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
