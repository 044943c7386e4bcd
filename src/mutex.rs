//! Mutex extraction: the complement of the closed set.

use std::collections::BTreeSet;

use log::debug;

use crate::bitset::BitSet;
use crate::pairs::{LiteralPair, PairUniverse};
use crate::types::{Atom, Literal};

/// The pairs proven unreachable under the h2 relaxation.
///
/// A mutex self-pair `{l}` is a dead literal: `l` is never true. A mutex
/// proper pair `{l, l'}` is never true together.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MutexSet {
    pairs: BTreeSet<LiteralPair>,
}

impl MutexSet {
    /// Collects every pair of the universe that is not in `closed`.
    pub fn extract(universe: &PairUniverse, closed: &BitSet) -> Self {
        let pairs: BTreeSet<LiteralPair> = universe
            .ids()
            .filter(|id| !closed.contains(id.index()))
            .map(|id| universe.literal_pair(id))
            .collect();
        debug!(
            "{} of {} pairs are mutex ({} reachable)",
            pairs.len(),
            universe.num_pairs(),
            closed.len()
        );
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All mutex pairs, in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &LiteralPair> {
        self.pairs.iter()
    }

    pub fn contains(&self, pair: &LiteralPair) -> bool {
        self.pairs.contains(pair)
    }

    /// Whether `a` and `b` are proven never true together (or, for `a == b`,
    /// whether `a` is never true).
    pub fn is_mutex(&self, a: &Literal, b: &Literal) -> bool {
        self.contains(&LiteralPair::new(a.clone(), b.clone()))
    }

    /// Literals that are never true.
    pub fn dead_literals(&self) -> impl Iterator<Item = &Literal> {
        self.pairs.iter().filter(|p| p.is_self_pair()).map(|p| p.first())
    }

    /// Pairs of atoms that are never true together.
    pub fn atom_mutexes(&self) -> impl Iterator<Item = (&Atom, &Atom)> {
        self.pairs.iter().filter_map(|p| match p.second() {
            Some(second) if p.first().is_positive() && second.is_positive() => Some((&p.first().atom, &second.atom)),
            _ => None,
        })
    }

    pub fn into_pairs(self) -> BTreeSet<LiteralPair> {
        self.pairs
    }
}

impl<'a> IntoIterator for &'a MutexSet {
    type Item = &'a LiteralPair;
    type IntoIter = std::collections::btree_set::Iter<'a, LiteralPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::config::Config;

    fn atoms() -> Vec<Atom> {
        vec![Atom::new("p", ["a"]), Atom::new("q", ["a"])]
    }

    #[test]
    fn test_complement() {
        let universe = PairUniverse::build(&atoms(), &Config::default()).unwrap();
        let p = universe.lit(&atoms()[0].pos()).unwrap();
        let not_q = universe.lit(&atoms()[1].neg()).unwrap();

        let closed: BitSet = [
            universe.self_pair(p).unwrap().index(),
            universe.self_pair(not_q).unwrap().index(),
            universe.pair_id(p, not_q).unwrap().index(),
        ]
        .into_iter()
        .collect();
        let mutexes = MutexSet::extract(&universe, &closed);

        assert_eq!(mutexes.len() + closed.len(), universe.num_pairs());
        for id in universe.ids() {
            let pair = universe.literal_pair(id);
            assert_ne!(mutexes.contains(&pair), closed.contains(id.index()), "pair {}", pair);
        }
    }

    #[test]
    fn test_queries() {
        let [p, q] = [atoms()[0].clone(), atoms()[1].clone()];
        let universe = PairUniverse::build(&atoms(), &Config::default()).unwrap();
        let (lp, lq) = (universe.lit(&p.pos()).unwrap(), universe.lit(&q.pos()).unwrap());

        // Only {p}, {q}, {~p}, {~q}, {p, ~q}, {~p, q}, {~p, ~q} are reachable.
        let reachable = [
            (lp, lp),
            (lq, lq),
            (-lp, -lp),
            (-lq, -lq),
            (lp, -lq),
            (-lp, lq),
            (-lp, -lq),
        ];
        let closed: BitSet = reachable
            .iter()
            .map(|&(a, b)| universe.pair_id(a, b).unwrap().index())
            .collect();
        let mutexes = MutexSet::extract(&universe, &closed);

        assert!(mutexes.is_mutex(&p.pos(), &q.pos()));
        assert!(mutexes.is_mutex(&q.pos(), &p.pos()));
        assert!(mutexes.is_mutex(&p.pos(), &p.neg()));
        assert!(!mutexes.is_mutex(&p.pos(), &q.neg()));
        assert_eq!(mutexes.dead_literals().count(), 0);
        assert_eq!(mutexes.atom_mutexes().collect::<Vec<_>>(), vec![(&p, &q)]);
        // {p, q}, {p, ~p}, {q, ~q}
        assert_eq!(mutexes.len(), 3);
        assert_eq!((&mutexes).into_iter().count(), 3);
    }

    #[test]
    fn test_dead_literals() {
        let universe = PairUniverse::build(&atoms(), &Config::default().with_only_positive_literals(true)).unwrap();
        let p = universe.lit(&atoms()[0].pos()).unwrap();
        let closed: BitSet = [universe.self_pair(p).unwrap().index()].into_iter().collect();
        let mutexes = MutexSet::extract(&universe, &closed);
        assert_eq!(mutexes.dead_literals().cloned().collect::<Vec<_>>(), vec![atoms()[1].pos()]);
        assert_eq!(mutexes.len(), 2);
    }
}
