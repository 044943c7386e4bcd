//! Counting fixpoint over a [`ReachabilityProgram`].
//!
//! Every rule keeps a counter of body pairs not yet proven co-reachable. When
//! a pair is closed it is queued; processing it decrements the counter of
//! every rule watching it, and a rule whose counter drops to zero closes its
//! head. Each pair is queued at most once and each counter is decremented at
//! most once per body pair, so every rule fires at most once and the loop
//! terminates. The final closed set does not depend on the processing order.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::bitset::BitSet;
use crate::config::{Deadline, QueueOrder};
use crate::error::{try_reserve, Error, Phase, Result};
use crate::lit::Lit;
use crate::pairs::{PairId, PairUniverse};
use crate::rules::ReachabilityProgram;
use crate::types::Atom;

/// How many worklist pops happen between two deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 4096;

/// Literals true in the initial state: the listed atoms, and (unless only
/// positive literals are considered) the negation of every other atom.
///
/// Atoms outside the universe are ignored.
pub fn initial_literals(universe: &PairUniverse, init: &[Atom]) -> Vec<Lit> {
    let mut is_true = vec![false; universe.num_atoms()];
    for atom in init {
        match universe.atom_id(atom) {
            Some(id) => is_true[id as usize] = true,
            None => debug!("initial atom {} is not in the universe, ignored", atom),
        }
    }
    let mut lits = Vec::with_capacity(universe.num_atoms());
    for (id, &t) in is_true.iter().enumerate() {
        let lit = Lit::new(id as u32, !t);
        if universe.contains_lit(lit) {
            lits.push(lit);
        }
    }
    lits
}

pub struct Solver<'a> {
    program: &'a ReachabilityProgram,
    remaining: Vec<u32>,
    closed: BitSet,
    queue: VecDeque<PairId>,
    order: QueueOrder,
    fired: usize,
    processed: usize,
}

impl<'a> Solver<'a> {
    /// Creates a solver with an empty closed set. Rules with an empty body
    /// fire immediately.
    ///
    /// Fails with [`Error::OutOfMemory`] if the counters or the closed set
    /// cannot be allocated.
    pub fn new(program: &'a ReachabilityProgram, order: QueueOrder) -> Result<Self> {
        let mut remaining = Vec::new();
        try_reserve(&mut remaining, program.num_rules(), Phase::Solving)?;
        remaining.extend(program.rules().iter().map(|r| r.body_len()));
        let num_pairs = program.universe().num_pairs();
        let closed = BitSet::try_new(num_pairs).map_err(|_| Error::OutOfMemory {
            phase: Phase::Solving,
            requested: num_pairs.div_ceil(64),
            size: std::mem::size_of::<u64>(),
        })?;
        let mut solver = Self {
            program,
            remaining,
            closed,
            queue: VecDeque::new(),
            order,
            fired: 0,
            processed: 0,
        };
        for rule in program.rules() {
            if rule.body_len() == 0 {
                solver.fired += 1;
                solver.close(rule.head);
            }
        }
        Ok(solver)
    }

    pub fn program(&self) -> &ReachabilityProgram {
        self.program
    }

    /// Marks `pair` as co-reachable. Returns false if it already was.
    pub(crate) fn close(&mut self, pair: PairId) -> bool {
        if self.closed.insert(pair.index()) {
            self.queue.push_back(pair);
            true
        } else {
            false
        }
    }

    /// Closes every pair over the given literals. Literals outside the pair
    /// universe are skipped.
    pub fn seed(&mut self, lits: &[Lit]) {
        let program = self.program;
        let universe = program.universe();
        let lits: Vec<Lit> = lits.iter().copied().filter(|&l| universe.contains_lit(l)).collect();
        for (i, &a) in lits.iter().enumerate() {
            for &b in &lits[i..] {
                if let Some(pair) = universe.pair_id(a, b) {
                    self.close(pair);
                }
            }
        }
    }

    /// Seeds the solver with the literals of the initial state.
    pub fn seed_state(&mut self, init: &[Atom]) {
        let lits = initial_literals(self.program.universe(), init);
        self.seed(&lits);
        debug!("seeded {} pairs from {} initial literals", self.closed.len(), lits.len());
    }

    /// Processes one queued pair. Returns `None` once the fixpoint is reached.
    pub fn step(&mut self) -> Option<PairId> {
        let pair = match self.order {
            QueueOrder::Fifo => self.queue.pop_front(),
            QueueOrder::Lifo => self.queue.pop_back(),
        }?;
        self.processed += 1;

        let program = self.program;
        for &rule_id in program.watches().watchers(pair) {
            let count = &mut self.remaining[rule_id as usize];
            debug_assert!(*count > 0, "rule {} decremented below zero", rule_id);
            *count -= 1;
            if *count == 0 {
                let head = program.rule(rule_id).head;
                trace!("rule {} fired by {}: closing {}", rule_id, pair, head);
                self.fired += 1;
                self.close(head);
            }
        }
        Some(pair)
    }

    /// Runs to the fixpoint.
    pub fn run(&mut self, deadline: &Deadline) -> Result<()> {
        while self.step().is_some() {
            if self.processed % DEADLINE_CHECK_INTERVAL == 0 {
                deadline.check(Phase::Solving)?;
            }
        }
        debug!(
            "fixpoint: {} pairs closed, {} of {} rules fired",
            self.closed.len(),
            self.fired,
            self.remaining.len()
        );
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_closed(&self, pair: PairId) -> bool {
        self.closed.contains(pair.index())
    }

    pub fn closed(&self) -> &BitSet {
        &self.closed
    }

    /// Number of rules that have fired so far.
    pub fn num_fired(&self) -> usize {
        self.fired
    }

    /// Unmet body pairs of a rule.
    pub fn remaining(&self, rule_id: u32) -> u32 {
        self.remaining[rule_id as usize]
    }

    pub fn into_closed(self) -> BitSet {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::config::Config;
    use crate::task::{Effect, GroundedTask, Operator};
    use crate::types::Condition;

    fn atom(name: &str) -> Atom {
        Atom::new(name, Vec::<String>::new())
    }

    /// p -> q -> r, each step consuming its precondition.
    fn chain() -> GroundedTask {
        let (p, q, r) = (atom("p"), atom("q"), atom("r"));
        GroundedTask::new(vec![p.clone(), q.clone(), r.clone()], vec![p.clone()])
            .with_operator(
                Operator::new("o1", vec![p.pos()])
                    .with_add(Effect::unconditional(q.clone()))
                    .with_del(Effect::unconditional(p.clone())),
            )
            .with_operator(
                Operator::new("o2", vec![q.pos()])
                    .with_add(Effect::unconditional(r.clone()))
                    .with_del(Effect::unconditional(q.clone())),
            )
    }

    fn solve(program: &ReachabilityProgram, init: &[Atom], order: QueueOrder) -> BitSet {
        let mut solver = Solver::new(program, order).unwrap();
        solver.seed_state(init);
        solver.run(&Deadline::never()).unwrap();
        solver.into_closed()
    }

    #[test]
    fn test_initial_literals() {
        let task = chain();
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let lits = initial_literals(program.universe(), &[atom("q"), atom("ghost")]);
        assert_eq!(lits, vec![Lit::negative(0), Lit::positive(1), Lit::negative(2)]);

        let program =
            ReachabilityProgram::compile(&task, &Config::default().with_only_positive_literals(true)).unwrap();
        let lits = initial_literals(program.universe(), &[atom("q")]);
        assert_eq!(lits, vec![Lit::positive(1)]);
    }

    #[test]
    fn test_seed_closes_all_initial_pairs() {
        let task = chain();
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let mut solver = Solver::new(&program, QueueOrder::Fifo).unwrap();
        solver.seed_state(&task.init);
        // Three true literals: 3 self-pairs and 3 proper pairs.
        assert_eq!(solver.closed().len(), 6);
        assert!(!solver.is_done());
    }

    #[test]
    fn test_chain_reachability() {
        let task = chain();
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let closed = solve(&program, &task.init, QueueOrder::Fifo);
        let u = program.universe();
        let pair = |a: Lit, b: Lit| u.pair_id(a, b).unwrap().index();
        let (p, q, r) = (Lit::positive(0), Lit::positive(1), Lit::positive(2));

        assert!(closed.contains(pair(q, q)));
        assert!(closed.contains(pair(r, r)));
        assert!(closed.contains(pair(-p, -p)));
        assert!(closed.contains(pair(r, -p)));
        assert!(closed.contains(pair(q, -r)));
        // Exactly one of p, q, r holds in every reachable state.
        assert!(!closed.contains(pair(p, q)));
        assert!(!closed.contains(pair(p, r)));
        assert!(!closed.contains(pair(q, r)));
    }

    #[test]
    fn test_order_independence() {
        let task = chain();
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let fifo = solve(&program, &task.init, QueueOrder::Fifo);
        let lifo = solve(&program, &task.init, QueueOrder::Lifo);
        assert_eq!(fifo, lifo);
    }

    #[test]
    fn test_monotone_and_single_fire() {
        let task = chain();
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let final_closed = solve(&program, &task.init, QueueOrder::Fifo);

        let mut solver = Solver::new(&program, QueueOrder::Fifo).unwrap();
        solver.seed_state(&task.init);
        let mut previous = solver.closed().clone();
        while solver.step().is_some() {
            assert!(previous.is_subset(solver.closed()));
            assert!(solver.closed().is_subset(&final_closed));
            previous = solver.closed().clone();
        }
        assert_eq!(solver.closed(), &final_closed);

        let zero = (0..program.num_rules() as u32).filter(|&r| solver.remaining(r) == 0).count();
        assert_eq!(solver.num_fired(), zero);
        assert!(solver.num_fired() <= program.num_rules());

        // Re-closing an already closed pair does nothing.
        let closed_pair = PairId::new(solver.closed().iter().next().unwrap() as u32);
        assert!(!solver.close(closed_pair));
        assert_eq!(solver.step(), None);
        assert_eq!(solver.num_fired(), zero);
    }

    #[test]
    fn test_empty_body_fires_without_seed() {
        let q = atom("q");
        let task = GroundedTask::new(vec![q.clone()], vec![])
            .with_operator(Operator::new("o", Condition::empty()).with_add(Effect::unconditional(q.clone())));
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let solver = Solver::new(&program, QueueOrder::Fifo).unwrap();
        assert!(solver.is_closed(program.universe().self_pair(Lit::positive(0)).unwrap()));
        assert_eq!(solver.num_fired(), 1);
    }

    #[test]
    fn test_deadline_checked_periodically() {
        let task = chain();
        let program = ReachabilityProgram::compile(&task, &Config::default()).unwrap();
        let mut solver = Solver::new(&program, QueueOrder::Fifo).unwrap();
        solver.seed_state(&task.init);
        // The fixpoint is reached long before the first deadline check.
        let deadline = Config::default().with_time_limit(std::time::Duration::ZERO).deadline();
        assert!(solver.run(&deadline).is_ok());
    }
}
