//! Word-packed bit set.
//!
//! Used for two things: the set of pair ids proven co-reachable during
//! solving, and per-operator condition sets over an operator-local literal
//! index, where containment of one condition in another is a handful of word
//! operations.

use std::collections::TryReserveError;

/// A bit set backed by a vector of u64 words.
///
/// The set grows as needed when inserting beyond the current capacity.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl BitSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates a new empty bit set with room for `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    /// Like [`new`][Self::new], but reports a failed allocation instead of aborting.
    pub fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        let num_words = capacity.div_ceil(Self::BITS_PER_WORD);
        let mut words = Vec::new();
        words.try_reserve_exact(num_words)?;
        words.resize(num_words, 0);
        Ok(Self { words, count: 0 })
    }

    /// Creates an empty bit set with no pre-allocated capacity.
    pub fn empty() -> Self {
        Self {
            words: Vec::new(),
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the capacity in bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * Self::BITS_PER_WORD
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        match self.words.get(word_idx) {
            Some(word) => word & (1u64 << bit_idx) != 0,
            None => false,
        }
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Returns a copy of this set with one more bit set.
    pub fn with(&self, index: usize) -> Self {
        let mut res = self.clone();
        res.insert(index);
        res
    }

    /// Sets every bit that is set in `other`.
    pub fn union_with(&mut self, other: &BitSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, &o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Returns true if every bit set in `self` is also set in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        if self.count > other.count {
            return false;
        }
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    pub fn extend(&mut self, iter: impl IntoIterator<Item = usize>) {
        for index in iter {
            self.insert(index);
        }
    }

    /// Returns an iterator over all set bit indices, in increasing order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.is_subset(other)
    }
}

impl Eq for BitSet {}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bs = BitSet::empty();
        bs.extend(iter);
        bs
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }
            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_insert_contains() {
        let mut bs = BitSet::new(100);
        assert!(bs.is_empty());
        assert!(!bs.contains(42));
        assert!(bs.insert(42));
        assert!(bs.contains(42));
        assert!(!bs.insert(42)); // Already set
        assert_eq!(bs.len(), 1);
        assert!(!bs.contains(1000));
    }

    #[test]
    fn test_try_new() {
        let bs = BitSet::try_new(130).unwrap();
        assert_eq!(bs.capacity(), 192);
        assert!(bs.is_empty());
        assert!(BitSet::try_new(usize::MAX).is_err());
    }

    #[test]
    fn test_auto_grow() {
        let mut bs = BitSet::empty();
        assert_eq!(bs.capacity(), 0);
        bs.insert(1000);
        assert!(bs.contains(1000));
        assert!(bs.capacity() >= 1001);
    }

    #[test]
    fn test_iter_across_words() {
        let bs: BitSet = [65, 3, 64, 10, 5].into_iter().collect();
        let indices: Vec<_> = bs.iter().collect();
        assert_eq!(indices, vec![3, 5, 10, 64, 65]);
    }

    #[test]
    fn test_subset() {
        let small: BitSet = [1, 70].into_iter().collect();
        let big: BitSet = [1, 2, 70, 130].into_iter().collect();
        assert!(small.is_subset(&big));
        assert!(!big.is_subset(&small));
        assert!(BitSet::empty().is_subset(&small));
        assert!(small.is_subset(&small));

        // Trailing words of the larger operand must be zero to be a subset.
        let far: BitSet = [200].into_iter().collect();
        assert!(!far.is_subset(&big));
    }

    #[test]
    fn test_union_and_with() {
        let mut a: BitSet = [1, 2].into_iter().collect();
        let b: BitSet = [2, 100].into_iter().collect();
        a.union_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 2, 100]);
        assert_eq!(a.len(), 3);

        let c = a.with(7);
        assert!(c.contains(7));
        assert!(!a.contains(7));
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn test_eq_ignores_capacity() {
        let mut a = BitSet::new(1000);
        a.insert(3);
        let b: BitSet = [3].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, BitSet::empty());
    }
}
