//! Value types for ground atoms, literals and conditions.
//!
//! These are the types exchanged with the grounding collaborator and handed
//! back in the mutex output. Inside the engine, literals are replaced by dense
//! [`Lit`][crate::lit::Lit] handles; see [`PairUniverse`][crate::pairs::PairUniverse].
use std::fmt;
use std::ops::Neg;

/// A ground atom: a predicate symbol applied to an ordered tuple of objects.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<String>,
}

impl Atom {
    /// Creates a new atom from a predicate symbol and its arguments.
    pub fn new<S: Into<String>>(predicate: impl Into<String>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The positive literal on this atom.
    pub fn pos(&self) -> Literal {
        Literal::positive(self.clone())
    }

    /// The negative literal on this atom.
    pub fn neg(&self) -> Literal {
        Literal::negative(self.clone())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// An atom together with a polarity.
///
/// Ordering puts the positive literal of an atom right before its negation,
/// so sorted collections keep both polarities of an atom adjacent.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Literal {
    pub atom: Atom,
    pub negated: bool,
}

impl Literal {
    pub fn positive(atom: Atom) -> Self {
        Self { atom, negated: false }
    }

    pub fn negative(atom: Atom) -> Self {
        Self { atom, negated: true }
    }

    pub fn is_positive(&self) -> bool {
        !self.negated
    }

    /// Returns the literal on the same atom with flipped polarity.
    pub fn negate(&self) -> Self {
        Self {
            atom: self.atom.clone(),
            negated: !self.negated,
        }
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            atom: self.atom,
            negated: !self.negated,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        write!(f, "{}", self.atom)
    }
}

/// A conjunction of literals. The empty condition is trivially true.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Condition(pub Vec<Literal>);

impl Condition {
    /// The trivially true condition.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn literals(&self) -> &[Literal] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Literal> {
        self.0.iter()
    }
}

impl FromIterator<Literal> for Condition {
    fn from_iter<I: IntoIterator<Item = Literal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Literal>> for Condition {
    fn from(literals: Vec<Literal>) -> Self {
        Self(literals)
    }
}

impl<'a> IntoIterator for &'a Condition {
    type Item = &'a Literal;
    type IntoIter = std::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "true");
        }
        for (i, lit) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", lit)?;
        }
        Ok(())
    }
}
