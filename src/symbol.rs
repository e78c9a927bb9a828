//! Grammar symbol type, and the source that mints symbols.
//!
//! A symbol can be thought of as simply an integer, which only means
//! something to the grammar whose `SymbolSource` minted it. Best to be
//! careful not to mix symbols between different grammars.

use std::borrow::Cow;
use std::num::NonZeroU32;
use std::rc::Rc;

/// Numeric representation of a symbol.
pub type SymbolRepr = u32;

/// A common grammar symbol type.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol(NonZeroU32);

impl From<SymbolRepr> for Symbol {
    #[inline]
    fn from(id: SymbolRepr) -> Self {
        debug_assert_ne!(id, !0, "invalid conversion from a null id to a Symbol");
        Symbol(NonZeroU32::new(id.wrapping_add(1)).unwrap())
    }
}

impl From<Symbol> for SymbolRepr {
    #[inline]
    fn from(sym: Symbol) -> Self {
        sym.0.get().wrapping_sub(1)
    }
}

impl From<usize> for Symbol {
    #[inline]
    fn from(id: usize) -> Self {
        Symbol::from(id as SymbolRepr)
    }
}

impl Symbol {
    /// Cast the symbol's numeric value to `usize`.
    #[inline]
    pub fn usize(self) -> usize {
        let id: SymbolRepr = self.into();
        id as usize
    }
}

/// A source of numeric symbols.
///
/// Tracks the number of symbols minted so far, and optionally a name for
/// each of them.
#[derive(Clone, Debug, Default)]
pub struct SymbolSource {
    next_id: SymbolRepr,
    names: Vec<Option<Rc<str>>>,
}

impl SymbolSource {
    /// Creates a source of numeric symbols with an empty symbol space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an array of freshly minted symbols.
    pub fn sym<const N: usize>(&mut self) -> [Symbol; N] {
        let mut result = [Symbol::from(0u32); N];
        for dest in result.iter_mut() {
            *dest = self.next_sym();
        }
        result
    }

    /// Returns an array of freshly minted symbols carrying the given names.
    pub fn with_names<const N: usize>(&mut self, names: [&str; N]) -> [Symbol; N] {
        let mut result = [Symbol::from(0u32); N];
        for (dest, name) in result.iter_mut().zip(names.iter()) {
            *dest = self.named_sym(name);
        }
        result
    }

    /// Mints a new unique symbol.
    pub fn next_sym(&mut self) -> Symbol {
        let ret = Symbol::from(self.next_id);
        self.next_id += 1;
        self.names.push(None);
        ret
    }

    /// Mints a new unique symbol, recording its name.
    pub fn named_sym(&mut self, name: &str) -> Symbol {
        let ret = Symbol::from(self.next_id);
        self.next_id += 1;
        self.names.push(Some(Rc::from(name)));
        ret
    }

    /// Returns either the symbol's recorded name, or a formatted gensym name.
    ///
    /// Gensyms have no names, so we format one with the letter `g` followed
    /// by the symbol's numeric value.
    pub fn name_of(&self, sym: Symbol) -> Cow<'_, str> {
        match self.names.get(sym.usize()) {
            Some(Some(name)) => Cow::Borrowed(&name[..]),
            Some(None) | None => Cow::Owned(format!("g{}", sym.usize())),
        }
    }

    /// Returns the number of symbols in use.
    pub fn num_syms(&self) -> usize {
        self.next_id as usize
    }

    /// Iterator over all possible symbols, in order, starting with the
    /// lowest numeric value. Does not mint anything.
    pub fn generate_fresh() -> impl Iterator<Item = Symbol> {
        (0u32..).map(Symbol::from)
    }
}
