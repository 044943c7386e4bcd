//! Debug utilities for inspecting compiled rules and solver state.
//!
//! These are primarily useful in tests and during development.

use std::fmt::Write;

use crate::bitset::BitSet;
use crate::pairs::{LiteralPair, PairId};
use crate::rules::ReachabilityProgram;
use crate::solver::Solver;

/// Detailed information about a single rule.
#[derive(Debug, Clone)]
pub struct RuleInfo {
    pub id: u32,
    pub head: LiteralPair,
    pub body: Vec<LiteralPair>,
}

impl std::fmt::Display for RuleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}: {} <- [", self.id, self.head)?;
        for (i, pair) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pair)?;
        }
        write!(f, "]")
    }
}

impl ReachabilityProgram {
    /// Get detailed information about a single rule.
    pub fn rule_info(&self, id: u32) -> RuleInfo {
        let rule = self.rule(id);
        let universe = self.universe();
        RuleInfo {
            id,
            head: universe.literal_pair(rule.head),
            body: self.body(rule).iter().map(|&p| universe.literal_pair(p)).collect(),
        }
    }

    /// All rules concluding `head`, one per line.
    pub fn debug_rules_for(&self, head: PairId) -> String {
        let mut result = String::new();
        for id in self.rules_for(head) {
            writeln!(&mut result, "{}", self.rule_info(id)).unwrap();
        }
        result
    }

    /// Heads outside `closed` whose whole body is in `closed`.
    ///
    /// Empty iff `closed` is a fixpoint of the rules.
    pub fn unsupported_heads(&self, closed: &BitSet) -> Vec<PairId> {
        let mut result: Vec<PairId> = self
            .rules()
            .iter()
            .filter(|rule| !closed.contains(rule.head.index()))
            .filter(|rule| self.body(rule).iter().all(|p| closed.contains(p.index())))
            .map(|rule| rule.head)
            .collect();
        result.sort();
        result.dedup();
        result
    }

    /// Dump the complete rule table.
    pub fn dump_rules(&self) -> String {
        let mut result = String::new();

        writeln!(&mut result, "=== Rules ===").unwrap();
        writeln!(
            &mut result,
            "literals={} pairs={} rules={} watches={}",
            self.universe().num_literals(),
            self.universe().num_pairs(),
            self.num_rules(),
            self.watches().num_entries()
        )
        .unwrap();
        for id in 0..self.num_rules() as u32 {
            writeln!(&mut result, "  {}", self.rule_info(id)).unwrap();
        }

        result
    }
}

impl Solver<'_> {
    /// Dump the closed pairs and the counters of pending rules.
    pub fn dump_state(&self) -> String {
        let program = self.program();
        let universe = program.universe();
        let mut result = String::new();

        writeln!(&mut result, "=== Solver State ===").unwrap();
        writeln!(&mut result, "Closed: count={}", self.closed().len()).unwrap();
        for index in self.closed().iter() {
            writeln!(&mut result, "  {}", universe.literal_pair(PairId::new(index as u32))).unwrap();
        }
        writeln!(&mut result, "Pending rules:").unwrap();
        for id in 0..program.num_rules() as u32 {
            let remaining = self.remaining(id);
            if remaining > 0 {
                writeln!(&mut result, "  {} (waiting on {})", program.rule_info(id), remaining).unwrap();
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::config::{Config, Deadline, QueueOrder};
    use crate::task::{Effect, GroundedTask, Operator};
    use crate::types::Atom;

    fn task() -> GroundedTask {
        let (p, q) = (Atom::new("p", ["a"]), Atom::new("q", ["a"]));
        GroundedTask::new(vec![p.clone(), q.clone()], vec![p.clone()])
            .with_operator(Operator::new("o", vec![p.pos()]).with_add(Effect::unconditional(q.clone())))
    }

    #[test]
    fn test_rule_info() {
        let program = ReachabilityProgram::compile(&task(), &Config::default()).unwrap();
        let q = program.universe().lit(&Atom::new("q", ["a"]).pos()).unwrap();
        let head = program.universe().self_pair(q).unwrap();

        let text = program.debug_rules_for(head);
        assert_eq!(text, "r0: {q(a)} <- [{p(a)}]\n");

        let info = program.rule_info(0);
        assert_eq!(info.head, LiteralPair::single(Atom::new("q", ["a"]).pos()));
        assert_eq!(info.body, vec![LiteralPair::single(Atom::new("p", ["a"]).pos())]);
    }

    #[test]
    fn test_unsupported_heads() {
        let program = ReachabilityProgram::compile(&task(), &Config::default()).unwrap();
        let mut solver = Solver::new(&program, QueueOrder::Fifo).unwrap();
        solver.seed_state(&[Atom::new("p", ["a"])]);
        let q = program.universe().lit(&Atom::new("q", ["a"]).pos()).unwrap();
        let q_self = program.universe().self_pair(q).unwrap();
        // Derivable but not yet derived, so not in the closed set.
        assert!(program.unsupported_heads(solver.closed()).contains(&q_self));
        assert!(!solver.is_closed(q_self));

        solver.run(&Deadline::never()).unwrap();
        assert!(program.unsupported_heads(solver.closed()).is_empty());
    }

    #[test]
    fn test_dumps() {
        let program = ReachabilityProgram::compile(&task(), &Config::default()).unwrap();
        let dump = program.dump_rules();
        assert!(dump.starts_with("=== Rules ===\n"));
        assert_eq!(dump.lines().count(), program.num_rules() + 2);

        let solver = Solver::new(&program, QueueOrder::Fifo).unwrap();
        let state = solver.dump_state();
        assert!(state.contains("Closed: count=0"));
        assert!(state.contains("(waiting on 1)"));
    }
}
