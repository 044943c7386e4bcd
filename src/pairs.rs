//! The pair universe: every self-pair and every 2-combination of literals,
//! each with a dense index.
//!
//! # Layout
//!
//! Literals are laid out with all positive literals first, followed (unless
//! only positive literals are considered) by all negative ones, so a universe
//! over `m` atoms has `n = m` or `n = 2m` literals. The pair `{l, l'}` with
//! literal positions `i <= j` gets the triangular index
//! [`pairing_triangular(i, j, n)`][crate::utils::pairing_triangular]. A pair id
//! is therefore a pure function of the two literal handles: lookup is a couple
//! of arithmetic operations, with no hashing and no per-pair storage.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use num_bigint::BigUint;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lit::Lit;
use crate::types::{Atom, Literal};
use crate::utils::{pair_universe_size, pairing_triangular, triangle_size, unpairing_triangular};

/// Dense index of a pair in the [`PairUniverse`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PairId(u32);

impl PairId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An unordered set of one or two literals.
///
/// A self-pair `{l}` asks whether `l` is ever true; a proper pair `{l, l'}`
/// asks whether `l` and `l'` are ever true together. The two members of a
/// proper pair are kept sorted, so equal sets compare and hash equal.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LiteralPair {
    first: Literal,
    second: Option<Literal>,
}

impl LiteralPair {
    pub fn single(literal: Literal) -> Self {
        Self {
            first: literal,
            second: None,
        }
    }

    /// The set `{a, b}`; collapses to a self-pair when `a == b`.
    pub fn new(a: Literal, b: Literal) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => Self::single(a),
            std::cmp::Ordering::Less => Self {
                first: a,
                second: Some(b),
            },
            std::cmp::Ordering::Greater => Self {
                first: b,
                second: Some(a),
            },
        }
    }

    pub fn first(&self) -> &Literal {
        &self.first
    }

    pub fn second(&self) -> Option<&Literal> {
        self.second.as_ref()
    }

    pub fn is_self_pair(&self) -> bool {
        self.second.is_none()
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        &self.first == literal || self.second.as_ref() == Some(literal)
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        std::iter::once(&self.first).chain(self.second.iter())
    }
}

impl fmt::Display for LiteralPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.second {
            None => write!(f, "{{{}}}", self.first),
            Some(second) => write!(f, "{{{}, {}}}", self.first, second),
        }
    }
}

/// The atom universe, its literals, and the bijection between literal pairs
/// and dense [`PairId`]s.
///
/// Built once from the grounded atoms and read-only afterwards.
#[derive(Debug, Clone)]
pub struct PairUniverse {
    atoms: Vec<Atom>,
    atom_ids: HashMap<Atom, u32>,
    only_positive_literals: bool,
    num_literals: usize,
    num_pairs: usize,
}

impl PairUniverse {
    /// Builds the universe over the given atoms.
    ///
    /// Fails if the universe exceeds [`Config::max_pairs`] or the 32-bit pair
    /// id space. Nothing quadratic is allocated here.
    ///
    /// # Panics
    ///
    /// Panics if `atoms` contains duplicates.
    pub fn build(atoms: &[Atom], config: &Config) -> Result<Self> {
        let num_literals = if config.only_positive_literals {
            atoms.len()
        } else {
            2 * atoms.len()
        };

        let limit = config.max_pairs.map_or(u32::MAX as u64, |max| max.min(u32::MAX as u64));
        let required = pair_universe_size(num_literals);
        if required > BigUint::from(limit) {
            return Err(Error::PairUniverseTooLarge {
                literals: num_literals,
                required,
                limit,
            });
        }

        // Within the 32-bit pair budget, atom ids comfortably fit into a `Lit`.
        let mut atom_ids = HashMap::with_capacity(atoms.len());
        for (i, atom) in atoms.iter().enumerate() {
            let prev = atom_ids.insert(atom.clone(), i as u32);
            assert!(prev.is_none(), "contract violation: duplicate atom {} in the universe", atom);
        }
        let num_pairs = triangle_size(num_literals as u64) as usize;

        debug!(
            "pair universe: {} atoms, {} literals, {} pairs (only positive: {})",
            atoms.len(),
            num_literals,
            num_pairs,
            config.only_positive_literals
        );

        Ok(Self {
            atoms: atoms.to_vec(),
            atom_ids,
            only_positive_literals: config.only_positive_literals,
            num_literals,
            num_pairs,
        })
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_literals(&self) -> usize {
        self.num_literals
    }

    pub fn num_pairs(&self) -> usize {
        self.num_pairs
    }

    pub fn only_positive_literals(&self) -> bool {
        self.only_positive_literals
    }

    pub fn atom(&self, id: u32) -> &Atom {
        &self.atoms[id as usize]
    }

    pub fn atom_id(&self, atom: &Atom) -> Option<u32> {
        self.atom_ids.get(atom).copied()
    }

    /// Handle for a literal on a known atom.
    ///
    /// Negative literals get a handle even when they are not part of the
    /// pair universe; use [`position`][Self::position] to tell them apart.
    pub fn lit(&self, literal: &Literal) -> Option<Lit> {
        self.atom_id(&literal.atom).map(|id| Lit::new(id, literal.negated))
    }

    /// Value form of a literal handle.
    pub fn literal(&self, lit: Lit) -> Literal {
        Literal {
            atom: self.atom(lit.atom()).clone(),
            negated: lit.is_negated(),
        }
    }

    /// Position of the literal in the universe, or `None` if the literal is
    /// not part of it.
    pub fn position(&self, lit: Lit) -> Option<usize> {
        if lit.atom() as usize >= self.atoms.len() {
            return None;
        }
        if lit.is_negated() && self.only_positive_literals {
            return None;
        }
        Some(lit.position(self.atoms.len()))
    }

    pub fn contains_lit(&self, lit: Lit) -> bool {
        self.position(lit).is_some()
    }

    /// All literals of the universe, in position order.
    pub fn literals(&self) -> impl Iterator<Item = Lit> + '_ {
        let m = self.atoms.len();
        (0..self.num_literals).map(move |pos| Lit::from_position(pos, m))
    }

    /// Id of the pair `{a, b}` (a self-pair when `a == b`).
    pub fn pair_id(&self, a: Lit, b: Lit) -> Option<PairId> {
        let i = self.position(a)? as u64;
        let j = self.position(b)? as u64;
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        let k = pairing_triangular(i, j, self.num_literals as u64);
        Some(PairId(k as u32))
    }

    pub fn self_pair(&self, a: Lit) -> Option<PairId> {
        self.pair_id(a, a)
    }

    /// The two literals of a pair; both are equal for a self-pair.
    pub fn pair(&self, id: PairId) -> (Lit, Lit) {
        let (i, j) = unpairing_triangular(id.0 as u64, self.num_literals as u64);
        let m = self.atoms.len();
        (Lit::from_position(i as usize, m), Lit::from_position(j as usize, m))
    }

    pub fn literal_pair(&self, id: PairId) -> LiteralPair {
        let (a, b) = self.pair(id);
        LiteralPair::new(self.literal(a), self.literal(b))
    }

    /// Id of a value-typed pair, if both its literals are in the universe.
    pub fn find(&self, pair: &LiteralPair) -> Option<PairId> {
        let a = self.lit(pair.first())?;
        let b = match pair.second() {
            Some(second) => self.lit(second)?,
            None => a,
        };
        self.pair_id(a, b)
    }

    /// All pair ids, in index order.
    pub fn ids(&self) -> impl Iterator<Item = PairId> {
        (0..self.num_pairs as u32).map(PairId)
    }
}
