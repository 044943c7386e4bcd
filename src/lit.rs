use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Dense handle for a literal over the atom universe.
///
/// Atom `k` (0-based position in the universe) is encoded as `+(k+1)`, its
/// negation as `-(k+1)`, so negation is a sign flip and `0` is never used.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    pub const fn positive(atom: u32) -> Self {
        assert!(atom < i32::MAX as u32, "Atom index out of range");
        Self(atom as i32 + 1)
    }

    pub const fn negative(atom: u32) -> Self {
        Self::positive(atom).negate()
    }

    pub const fn new(atom: u32, negated: bool) -> Self {
        if negated {
            Self::negative(atom)
        } else {
            Self::positive(atom)
        }
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Return the internal representation of the literal.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Return the 0-based index of the underlying atom.
    pub const fn atom(self) -> u32 {
        self.0.unsigned_abs() - 1
    }

    /// Position of this literal in the literal list of a universe with
    /// `num_atoms` atoms: all positive literals first, then all negative ones.
    pub const fn position(self, num_atoms: usize) -> usize {
        if self.is_negated() {
            num_atoms + self.atom() as usize
        } else {
            self.atom() as usize
        }
    }

    /// Inverse of [`position`][Lit::position].
    pub const fn from_position(position: usize, num_atoms: usize) -> Self {
        if position < num_atoms {
            Self::positive(position as u32)
        } else {
            Self::negative((position - num_atoms) as u32)
        }
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.atom())
    }
}
