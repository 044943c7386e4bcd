//! Rule compilation: operators and axioms to propagation rules over pairs.
//!
//! A propagation rule reads "the head pair becomes co-reachable once every
//! pair of the body is co-reachable". The body of a rule is the set of all
//! self-pairs and 2-combinations over a set of literals that must hold
//! together before the operator is applied (or, for axioms, in the same
//! state); the head is the pair the operator (or axiom) then makes true.
//!
//! # Operators
//!
//! An *effect option* of an operator is a conditional effect seen as "makes
//! literal `x` true": an add effect on `a` makes `a` true, a delete effect on
//! `a` makes `¬a` true. For every option making `l` true, with body
//! `B = pre ∪ cond`:
//!
//! - **self-pair** `{l}`: body `B`;
//! - **both made true** `{l, l'}`: for every option of `l'`, body
//!   `B ∪ cond'`;
//! - **preserved** `{l, l'}`: for every other literal `l'` of the universe,
//!   body `B ∪ {l'}`.
//!
//! Every literal the rule claims true afterwards (a *leg*: `l`, and `l'` in
//! the two pair cases) must not be falsified by the same operator within the
//! body. `x = ¬a` is falsified when an add effect on `a` fires whenever the
//! body holds (add effects overwrite delete effects); `x = a` is falsified
//! when a delete effect on `a` fires within the body and no add effect on `a`
//! does. "Fires within the body" means the effect condition is a subset of
//! the body, checked with bitsets over an operator-local literal index.
//!
//! # Axioms
//!
//! An axiom `cond → d` gives `{d}` with body `cond` and, for every literal
//! `l'` consistent with `cond` and `d`, `{d, l'}` with body `cond ∪ {l'}`.
//!
//! # Derived atoms
//!
//! Operators never touch derived atoms directly, but every derived atom `d`
//! is re-evaluated after an operator and may turn false. Each operator
//! therefore also gives `{¬d}` and `{¬d, ¬d'}` with body `pre`, `{l, ¬d}`
//! with the body of every option making `l` true, and `{¬d, l'}` with body
//! `pre ∪ {l'}` for every `l'` the operator leaves true. `¬d` is never
//! required before the operator in these rules.
//!
//! Bodies requiring a literal and its negation can never hold; such rules are
//! silently dropped, as are rules whose head is a complementary pair.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::bitset::BitSet;
use crate::config::{Config, Deadline};
use crate::error::{try_filled, try_reserve, Error, Phase, Result};
use crate::lit::Lit;
use crate::pairs::{PairId, PairUniverse};
use crate::task::{Axiom, GroundedTask, Operator};
use crate::types::Condition;

/// A propagation rule. Its body lives in [`ReachabilityProgram::body`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rule {
    pub head: PairId,
    start: usize,
    len: u32,
}

impl Rule {
    /// Number of pairs in the body.
    pub fn body_len(&self) -> u32 {
        self.len
    }
}

/// Reverse index from a pair to the rules whose body contains it.
///
/// Stored in compressed form: the watchers of pair `p` are
/// `rules[offsets[p]..offsets[p + 1]]`.
#[derive(Debug, Clone)]
pub struct WatchList {
    offsets: Vec<usize>,
    rules: Vec<u32>,
}

impl WatchList {
    fn build(num_pairs: usize, rules: &[Rule], bodies: &[PairId]) -> Result<Self> {
        let mut offsets = try_filled(num_pairs + 1, 0usize, Phase::Compilation)?;
        for pair in bodies {
            offsets[pair.index() + 1] += 1;
        }
        for i in 0..num_pairs {
            offsets[i + 1] += offsets[i];
        }

        let mut fill = try_filled(num_pairs + 1, 0usize, Phase::Compilation)?;
        fill.copy_from_slice(&offsets);
        let mut watchers = try_filled(bodies.len(), 0u32, Phase::Compilation)?;
        for (rule_id, rule) in rules.iter().enumerate() {
            for pair in &bodies[rule.start..rule.start + rule.len as usize] {
                let slot = &mut fill[pair.index()];
                watchers[*slot] = rule_id as u32;
                *slot += 1;
            }
        }

        Ok(Self {
            offsets,
            rules: watchers,
        })
    }

    /// Rules whose body contains `pair`.
    #[inline]
    pub fn watchers(&self, pair: PairId) -> &[u32] {
        let i = pair.index();
        &self.rules[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Total number of (pair, rule) entries.
    pub fn num_entries(&self) -> usize {
        self.rules.len()
    }
}

/// The compiled program: the pair universe, the rule table and the watch list.
///
/// Immutable once built; the solver keeps its own counters.
#[derive(Debug, Clone)]
pub struct ReachabilityProgram {
    universe: PairUniverse,
    rules: Vec<Rule>,
    bodies: Vec<PairId>,
    watches: WatchList,
}

impl ReachabilityProgram {
    /// Builds the pair universe for `task` and compiles all its operators and axioms.
    pub fn compile(task: &GroundedTask, config: &Config) -> Result<Self> {
        Self::compile_with_deadline(task, config, config.deadline())
    }

    pub fn compile_with_deadline(task: &GroundedTask, config: &Config, deadline: Deadline) -> Result<Self> {
        let universe = PairUniverse::build(&task.atoms, config)?;
        let mut compiler = RuleCompiler::new(universe, config, deadline);
        compiler.mark_derived(&task.axioms);
        for op in &task.operators {
            compiler.add_operator(op)?;
        }
        for axiom in &task.axioms {
            compiler.add_axiom(axiom)?;
        }
        compiler.finish()
    }

    pub fn universe(&self) -> &PairUniverse {
        &self.universe
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, id: u32) -> &Rule {
        &self.rules[id as usize]
    }

    /// Body pairs of a rule.
    pub fn body(&self, rule: &Rule) -> &[PairId] {
        &self.bodies[rule.start..rule.start + rule.len as usize]
    }

    pub fn watches(&self) -> &WatchList {
        &self.watches
    }

    /// Ids of the rules with the given head.
    pub fn rules_for(&self, head: PairId) -> impl Iterator<Item = u32> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.head == head)
            .map(|(i, _)| i as u32)
    }
}

/// Sorts literals by atom (positive before negative), removes duplicates,
/// and returns whether no atom occurs with both polarities.
fn normalize(lits: &mut Vec<Lit>) -> bool {
    lits.sort_unstable_by_key(|l| (l.atom(), l.is_negated()));
    lits.dedup();
    lits.windows(2).all(|w| w[0].atom() != w[1].atom())
}

/// Membership test on a normalized literal list.
fn holds(lits: &[Lit], lit: Lit) -> bool {
    lits.binary_search_by_key(&(lit.atom(), lit.is_negated()), |l| (l.atom(), l.is_negated()))
        .is_ok()
}

/// Resolves a condition into literal handles.
///
/// Returns `None` if the condition requires an atom outside the universe,
/// which never holds. Negative literals on such atoms always hold and are
/// dropped.
fn resolve_condition(universe: &PairUniverse, condition: &Condition) -> Option<Vec<Lit>> {
    let mut lits = Vec::with_capacity(condition.len());
    for literal in condition {
        match universe.lit(literal) {
            Some(lit) => lits.push(lit),
            None if literal.negated => {}
            None => return None,
        }
    }
    Some(lits)
}

/// A conditional effect seen as "makes `lit` true when `cond` holds".
#[derive(Debug)]
struct EffectOption {
    cond: Vec<Lit>,
    cond_set: BitSet,
    lit: Lit,
}

/// An operator with resolved literals and its effect conditions as bitsets
/// over a local literal index.
#[derive(Debug)]
struct OperatorView {
    pre: Vec<Lit>,
    options: Vec<EffectOption>,
    /// Local index of every literal occurring in an effect condition.
    locals: HashMap<Lit, usize>,
    /// Atoms with at least one effect option.
    touched: HashSet<u32>,
}

impl OperatorView {
    /// Returns `None` if the precondition can never hold.
    fn new(op: &Operator, universe: &PairUniverse) -> Option<Self> {
        let mut pre = resolve_condition(universe, &op.precondition)?;
        if !normalize(&mut pre) {
            return None;
        }

        let mut raw = Vec::new();
        for eff in &op.add_effects {
            let atom = universe.atom_id(&eff.atom).unwrap_or_else(|| {
                panic!(
                    "contract violation: operator {} adds {} outside the atom universe",
                    op.name, eff.atom
                )
            });
            if let Some(cond) = resolve_condition(universe, &eff.condition) {
                raw.push((cond, Lit::positive(atom)));
            }
        }
        for eff in &op.del_effects {
            // Deleting an atom that is never true changes nothing.
            let Some(atom) = universe.atom_id(&eff.atom) else {
                continue;
            };
            if let Some(cond) = resolve_condition(universe, &eff.condition) {
                raw.push((cond, Lit::negative(atom)));
            }
        }

        // An effect whose condition contradicts itself never fires.
        raw.retain_mut(|(cond, _)| normalize(cond));

        let mut locals = HashMap::new();
        for (cond, _) in &raw {
            for &lit in cond {
                let next = locals.len();
                locals.entry(lit).or_insert(next);
            }
        }

        let options = raw
            .into_iter()
            .map(|(cond, lit)| {
                let cond_set = cond.iter().map(|l| locals[l]).collect();
                EffectOption { cond, cond_set, lit }
            })
            .collect::<Vec<_>>();
        let touched = options.iter().map(|o| o.lit.atom()).collect();

        Some(Self {
            pre,
            options,
            locals,
            touched,
        })
    }

    fn options_for(&self, lit: Lit) -> impl Iterator<Item = &EffectOption> {
        self.options.iter().filter(move |o| o.lit == lit)
    }

    /// Distinct literals made true by some option, in a deterministic order.
    fn targets(&self) -> Vec<Lit> {
        let mut targets: Vec<Lit> = self.options.iter().map(|o| o.lit).collect();
        // Both polarities of an atom may be targets, so the result is ignored.
        normalize(&mut targets);
        targets
    }

    fn local_set(&self, lits: &[Lit]) -> BitSet {
        lits.iter().filter_map(|l| self.locals.get(l).copied()).collect()
    }

    /// Whether some option making `lit` true fires whenever `body` holds.
    fn fires(&self, lit: Lit, body: &BitSet) -> bool {
        self.options_for(lit).any(|o| o.cond_set.is_subset(body))
    }

    /// Whether applying the operator in a state satisfying `body` leaves `lit` false.
    fn falsifies(&self, lit: Lit, body: &BitSet) -> bool {
        if !self.touched.contains(&lit.atom()) {
            return false;
        }
        if lit.is_negated() {
            // Add effects win over delete effects.
            self.fires(-lit, body)
        } else {
            self.fires(-lit, body) && !self.fires(lit, body)
        }
    }
}

/// Compiles operators and axioms into a [`ReachabilityProgram`].
pub struct RuleCompiler {
    universe: PairUniverse,
    rules: Vec<Rule>,
    bodies: Vec<PairId>,
    max_rules: usize,
    deadline: Deadline,
    /// Atoms derived by some axiom.
    derived: Vec<bool>,
    scratch: Vec<Lit>,
}

impl RuleCompiler {
    pub fn new(universe: PairUniverse, config: &Config, deadline: Deadline) -> Self {
        Self {
            derived: vec![false; universe.num_atoms()],
            universe,
            rules: Vec::new(),
            bodies: Vec::new(),
            max_rules: config.max_rules.map_or(u32::MAX as usize, |max| max.min(u32::MAX as usize)),
            deadline,
            scratch: Vec::new(),
        }
    }

    pub fn universe(&self) -> &PairUniverse {
        &self.universe
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Marks the atoms derived by `axioms`. Must precede [`add_operator`][Self::add_operator].
    pub fn mark_derived(&mut self, axioms: &[Axiom]) {
        for axiom in axioms {
            if let Some(id) = self.universe.atom_id(&axiom.effect.atom) {
                self.derived[id as usize] = true;
            }
        }
        debug!("{} derived atoms", self.derived.iter().filter(|&&d| d).count());
    }

    fn is_derived_negation(&self, lit: Lit) -> bool {
        lit.is_negated() && self.derived[lit.atom() as usize]
    }

    /// Negations of derived atoms that are part of the universe.
    fn derived_negations(&self) -> Vec<Lit> {
        (0..self.universe.num_atoms() as u32)
            .filter(|&id| self.derived[id as usize])
            .map(Lit::negative)
            .filter(|&lit| self.universe.contains_lit(lit))
            .collect()
    }

    fn require_pair(&self, a: Lit, b: Lit) -> PairId {
        match self.universe.pair_id(a, b) {
            Some(id) => id,
            None => panic!("contract violation: pair {{{}, {}}} is not in the pair universe", a, b),
        }
    }

    /// Registers a rule with the given head whose body consists of all pairs
    /// over the universe literals of `lits`.
    fn emit(&mut self, head: PairId, lits: &[Lit]) -> Result<()> {
        if self.rules.len() >= self.max_rules {
            return Err(Error::TooManyRules { limit: self.max_rules });
        }
        let k = lits.len();
        try_reserve(&mut self.bodies, k * (k + 1) / 2, Phase::Compilation)?;
        try_reserve(&mut self.rules, 1, Phase::Compilation)?;
        let start = self.bodies.len();
        for (i, &a) in lits.iter().enumerate() {
            if !self.universe.contains_lit(a) {
                continue;
            }
            for &b in &lits[i..] {
                if self.universe.contains_lit(b) {
                    let pair = self.require_pair(a, b);
                    self.bodies.push(pair);
                }
            }
        }
        let len = (self.bodies.len() - start) as u32;
        trace!("rule {}: {} <- {} pairs", self.rules.len(), head, len);
        self.rules.push(Rule { head, start, len });
        Ok(())
    }

    /// Emits `head <- lits ∪ {extra}`.
    fn emit_with(&mut self, head: PairId, lits: &[Lit], extra: Lit) -> Result<()> {
        if holds(lits, extra) {
            return self.emit(head, lits);
        }
        let mut body = std::mem::take(&mut self.scratch);
        body.clear();
        body.extend_from_slice(lits);
        body.push(extra);
        let res = self.emit(head, &body);
        self.scratch = body;
        res
    }

    pub fn add_operator(&mut self, op: &Operator) -> Result<()> {
        self.deadline.check(Phase::Compilation)?;
        let Some(view) = OperatorView::new(op, &self.universe) else {
            trace!("operator {}: precondition never holds", op.name);
            return Ok(());
        };
        let before = self.rules.len();

        let targets: Vec<Lit> = view
            .targets()
            .into_iter()
            .filter(|&l| self.universe.contains_lit(l))
            .collect();
        let literals: Vec<Lit> = self.universe.literals().collect();
        let derived_negs = self.derived_negations();

        for (ti, &l) in targets.iter().enumerate() {
            for opt in view.options_for(l) {
                let mut base = view.pre.clone();
                base.extend_from_slice(&opt.cond);
                if !normalize(&mut base) {
                    continue;
                }
                let base_set = view.local_set(&base);
                let l_falsified = view.falsifies(l, &base_set);

                // {l}
                if !l_falsified {
                    let head = self.require_pair(l, l);
                    self.emit(head, &base)?;

                    // {l, ¬d}: ¬d may hold after the axioms are re-evaluated,
                    // whatever held before.
                    for &n in &derived_negs {
                        if n != l && n != -l {
                            let head = self.require_pair(l, n);
                            self.emit(head, &base)?;
                        }
                    }
                }

                // {l, l'}, both made true by the operator.
                for &l2 in &targets[ti + 1..] {
                    if l2 == -l {
                        continue;
                    }
                    for opt2 in view.options_for(l2) {
                        let mut body = base.clone();
                        body.extend_from_slice(&opt2.cond);
                        if !normalize(&mut body) {
                            continue;
                        }
                        let body_set = view.local_set(&body);
                        if view.falsifies(l, &body_set) || view.falsifies(l2, &body_set) {
                            continue;
                        }
                        let head = self.require_pair(l, l2);
                        self.emit(head, &body)?;
                    }
                }

                // {l, l'}, l' true before and preserved.
                for &l2 in &literals {
                    if l2 == l || l2 == -l || holds(&base, -l2) || self.is_derived_negation(l2) {
                        continue;
                    }
                    let falsified = match view.locals.get(&l2) {
                        Some(&k) => {
                            let body_set = base_set.with(k);
                            view.falsifies(l, &body_set) || view.falsifies(l2, &body_set)
                        }
                        None => l_falsified || view.falsifies(l2, &base_set),
                    };
                    if falsified {
                        continue;
                    }
                    let head = self.require_pair(l, l2);
                    self.emit_with(head, &base, l2)?;
                }
            }
        }

        self.add_derived_resets(&view, &literals, &derived_negs)?;

        trace!("operator {}: {} rules", op.name, self.rules.len() - before);
        Ok(())
    }

    /// Rules for derived atoms turning false after the operator: `{¬d}` and
    /// `{¬d, ¬d'}` need only the precondition, `{¬d, l'}` needs `l'` before
    /// and not falsified by the operator.
    fn add_derived_resets(&mut self, view: &OperatorView, literals: &[Lit], derived_negs: &[Lit]) -> Result<()> {
        if derived_negs.is_empty() {
            return Ok(());
        }
        let pre = &view.pre;
        let pre_set = view.local_set(pre);

        for (i, &n) in derived_negs.iter().enumerate() {
            for &n2 in &derived_negs[i..] {
                let head = self.require_pair(n, n2);
                self.emit(head, pre)?;
            }

            for &l2 in literals {
                if l2 == n || l2 == -n || holds(pre, -l2) || self.is_derived_negation(l2) {
                    continue;
                }
                let falsified = match view.locals.get(&l2) {
                    Some(&k) => view.falsifies(l2, &pre_set.with(k)),
                    None => view.falsifies(l2, &pre_set),
                };
                if falsified {
                    continue;
                }
                let head = self.require_pair(n, l2);
                self.emit_with(head, pre, l2)?;
            }
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the axiom's effect is not a positive literal over an atom of the universe.
    pub fn add_axiom(&mut self, axiom: &Axiom) -> Result<()> {
        self.deadline.check(Phase::Compilation)?;
        assert!(
            axiom.effect.is_positive(),
            "contract violation: axiom effect {} is not a positive literal",
            axiom.effect
        );
        let d = match self.universe.lit(&axiom.effect) {
            Some(d) => d,
            None => panic!(
                "contract violation: axiom derives {} outside the atom universe",
                axiom.effect
            ),
        };

        let Some(mut cond) = resolve_condition(&self.universe, &axiom.condition) else {
            return Ok(());
        };
        if !normalize(&mut cond) || holds(&cond, -d) {
            return Ok(());
        }

        let head = self.require_pair(d, d);
        self.emit(head, &cond)?;

        let literals: Vec<Lit> = self.universe.literals().collect();
        for l2 in literals {
            if l2 == d || l2 == -d || holds(&cond, -l2) {
                continue;
            }
            let head = self.require_pair(d, l2);
            self.emit_with(head, &cond, l2)?;
        }
        Ok(())
    }

    /// Freezes the rule table and builds the watch list.
    pub fn finish(self) -> Result<ReachabilityProgram> {
        let watches = WatchList::build(self.universe.num_pairs(), &self.rules, &self.bodies)?;
        debug!(
            "compiled {} rules with {} watch entries over {} pairs",
            self.rules.len(),
            watches.num_entries(),
            self.universe.num_pairs()
        );
        Ok(ReachabilityProgram {
            universe: self.universe,
            rules: self.rules,
            bodies: self.bodies,
            watches,
        })
    }
}
