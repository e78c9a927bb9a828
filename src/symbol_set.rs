//! Sets of symbols in the form of bit vectors.

use bit_vec::BitVec;
use std::{iter, ops};

use crate::symbol::Symbol;

/// A set of symbols in the form of a bit vector.
#[derive(Clone, Debug)]
pub struct SymbolBitSet {
    bit_vec: BitVec,
}

impl Default for SymbolBitSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolBitSet {
    /// Constructs an empty `SymbolBitSet`.
    pub fn new() -> Self {
        SymbolBitSet {
            bit_vec: BitVec::new(),
        }
    }

    /// Constructs a `SymbolBitSet` over a symbol space of the given size.
    pub fn from_elem(num_syms: usize, elem: bool) -> Self {
        SymbolBitSet {
            bit_vec: BitVec::from_elem(num_syms, elem),
        }
    }

    /// Empties the set and resizes it to the given symbol space.
    pub fn reset(&mut self, num_syms: usize) {
        self.bit_vec = BitVec::new();
        self.bit_vec.extend(iter::repeat(false).take(num_syms));
    }

    /// Includes or excludes a symbol.
    pub fn set(&mut self, sym: Symbol, elem: bool) {
        self.bit_vec.set(sym.usize(), elem);
    }

    /// Iterates over symbols in the set.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.bit_vec
            .iter()
            .enumerate()
            .filter_map(|(id, present)| if present { Some(id.into()) } else { None })
    }

    /// Returns the size of the symbol space.
    pub fn len(&self) -> usize {
        self.bit_vec.len()
    }

    /// Checks whether the symbol space is empty.
    pub fn is_empty(&self) -> bool {
        self.bit_vec.is_empty()
    }

    /// Counts the symbols in the set.
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl ops::Index<Symbol> for SymbolBitSet {
    type Output = bool;

    fn index(&self, index: Symbol) -> &Self::Output {
        if self.bit_vec.get(index.usize()).unwrap_or(false) {
            &TRUE
        } else {
            &FALSE
        }
    }
}
