//! Definitions of the grammar type and its packed rule storage.
//!
//! All rules live end-to-end in a single array of `i32` slots. A rule with
//! RHS `A B C` and LHS `S` occupies four consecutive slots `A B C S'`, where
//! the last slot has its sign bit set to mark it as holding the LHS. A
//! *grammar position* is an index into this array; the rule containing a
//! position, and the symbols around it, are recovered by binary search and
//! sign tests.

use std::fmt::{self, Write};

use crate::symbol::{Symbol, SymbolSource};

/// Number of bits available for a symbol id in the packed item encoding.
pub(crate) const SYMBOL_BITS: u32 = 14;
/// One past the highest symbol id that fits the packed item encoding.
pub(crate) const SYMBOL_LIMIT: u32 = 1 << SYMBOL_BITS;
/// One past the highest grammar position that fits a packed item's dot field.
pub(crate) const POSITION_LIMIT: u32 = 1 << 16;

/// Marks the rule slot that holds the LHS.
const LHS_MARK: i32 = i32::MIN;

/// Rules are densely numbered in the order they were added.
pub type RuleId = u32;
/// An index into the grammar's rule storage.
pub type Position = u32;

/// Errors reported while building or rewriting a grammar.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GrammarError {
    /// A symbol's numeric value does not fit the packed item encoding.
    InvalidSymbol(Symbol),
    /// The rule storage outgrew the packed item encoding's dot field.
    StoreOverflow,
    /// The grammar has no designated start symbol.
    NoStartSymbol,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GrammarError::InvalidSymbol(sym) => {
                write!(f, "symbol {} does not fit {} bits", sym.usize(), SYMBOL_BITS)
            }
            GrammarError::StoreOverflow => write!(f, "rule storage outgrew the dot field"),
            GrammarError::NoStartSymbol => write!(f, "no start symbol was designated"),
        }
    }
}

impl std::error::Error for GrammarError {}

/// A context-free grammar with packed rule storage.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    /// The symbol source.
    sym_source: SymbolSource,
    /// Rules laid out end-to-end; each rule's last slot holds the marked LHS.
    rule_store: Vec<i32>,
    /// The starting position of each rule, plus one past the last slot.
    rule_start: Vec<Position>,
    /// The designated start symbol.
    start: Option<Symbol>,
}

impl Grammar {
    /// Creates an empty grammar.
    pub fn new() -> Self {
        Self::with_sym_source(SymbolSource::new())
    }

    /// Creates an empty grammar with the given symbol source.
    pub fn with_sym_source(sym_source: SymbolSource) -> Self {
        Grammar {
            sym_source,
            rule_store: vec![],
            rule_start: vec![0],
            start: None,
        }
    }

    /// Returns an array of freshly minted symbols.
    pub fn sym<const N: usize>(&mut self) -> [Symbol; N] {
        self.sym_source.sym()
    }

    /// Returns an array of freshly minted symbols carrying the given names.
    pub fn with_names<const N: usize>(&mut self, names: [&str; N]) -> [Symbol; N] {
        self.sym_source.with_names(names)
    }

    /// Allows access to the symbol source through a reference.
    pub fn sym_source(&self) -> &SymbolSource {
        &self.sym_source
    }

    /// Allows mutable access to the symbol source through a reference.
    pub fn sym_source_mut(&mut self) -> &mut SymbolSource {
        &mut self.sym_source
    }

    /// Returns the number of symbols in use.
    pub fn num_syms(&self) -> usize {
        self.sym_source.num_syms()
    }

    /// Designates the start symbol.
    pub fn set_start(&mut self, start: Symbol) {
        self.start = Some(start);
    }

    /// Returns the designated start symbol, if any.
    pub fn start(&self) -> Option<Symbol> {
        self.start
    }

    /// Appends a rule to the storage and returns its ordinal.
    pub fn add_rule(&mut self, lhs: Symbol, rhs: &[Symbol]) -> Result<RuleId, GrammarError> {
        for &sym in rhs.iter().chain(Some(&lhs)) {
            if sym.usize() as u32 >= SYMBOL_LIMIT {
                return Err(GrammarError::InvalidSymbol(sym));
            }
        }
        if self.rule_store.len() + rhs.len() + 1 > POSITION_LIMIT as usize {
            return Err(GrammarError::StoreOverflow);
        }
        self.rule_store
            .extend(rhs.iter().map(|&sym| sym.usize() as i32));
        self.rule_store.push(lhs.usize() as i32 | LHS_MARK);
        self.rule_start.push(self.rule_store.len() as Position);
        Ok(self.rule_start.len() as RuleId - 2)
    }

    /// Starts building rules with the given LHS.
    pub fn rule(&mut self, lhs: Symbol) -> RuleBuilder<'_> {
        RuleBuilder { grammar: self, lhs }
    }

    /// Returns the number of rules.
    pub fn num_rules(&self) -> usize {
        self.rule_start.len() - 1
    }

    /// Iterates over rule ordinals.
    pub fn rules(&self) -> impl Iterator<Item = RuleId> {
        0..self.num_rules() as RuleId
    }

    /// Returns the number of slots in the rule storage.
    pub fn store_len(&self) -> Position {
        self.rule_store.len() as Position
    }

    /// Returns the ordinal of the rule containing the given position.
    pub fn rule_containing(&self, position: Position) -> RuleId {
        debug_assert!(position < self.store_len(), "position out of range");
        self.rule_start.partition_point(|&start| start <= position) as RuleId - 1
    }

    /// Returns the position of a rule's first RHS slot.
    pub fn rhs_start(&self, rule: RuleId) -> Position {
        self.rule_start[rule as usize]
    }

    /// Returns the position of a rule's LHS slot.
    pub fn lhs_position(&self, rule: RuleId) -> Position {
        self.rule_start[rule as usize + 1] - 1
    }

    /// Returns a rule's LHS symbol.
    pub fn lhs(&self, rule: RuleId) -> Symbol {
        let slot = self.rule_store[self.lhs_position(rule) as usize];
        debug_assert!(slot < 0, "LHS slot lost its mark");
        Symbol::from((slot & i32::MAX) as u32)
    }

    /// Returns the length of a rule's RHS.
    pub fn rhs_len(&self, rule: RuleId) -> usize {
        (self.lhs_position(rule) - self.rhs_start(rule)) as usize
    }

    /// Iterates over a rule's RHS symbols.
    pub fn rhs(&self, rule: RuleId) -> impl Iterator<Item = Symbol> + '_ {
        let range = self.rhs_start(rule) as usize..self.lhs_position(rule) as usize;
        self.rule_store[range]
            .iter()
            .map(|&slot| Symbol::from(slot as u32))
    }

    /// Returns the symbol at the given position, unless the slot holds an
    /// LHS, in which case the rule is complete there.
    pub fn postdot(&self, position: Position) -> Option<Symbol> {
        let slot = self.rule_store[position as usize];
        if slot >= 0 {
            Some(Symbol::from(slot as u32))
        } else {
            None
        }
    }

    /// Returns the symbol before the given position, unless the position is
    /// at its rule's RHS start.
    pub fn predot(&self, position: Position) -> Option<Symbol> {
        if position == 0 {
            return None;
        }
        let slot = self.rule_store[position as usize - 1];
        if slot >= 0 {
            Some(Symbol::from(slot as u32))
        } else {
            None
        }
    }

    /// Returns the LHS symbol recognized at the given position, if the
    /// position is its rule's LHS slot.
    pub fn recognized(&self, position: Position) -> Option<Symbol> {
        let slot = self.rule_store[position as usize];
        if slot < 0 {
            Some(Symbol::from((slot & i32::MAX) as u32))
        } else {
            None
        }
    }

    /// Formats the grammar to a `String`. The output looks like this:
    ///
    /// ```ignore
    /// sum(0) ::= sum(0) additive(5) product(1);
    /// ```
    pub fn stringify_to_bnf(&self) -> String {
        let mut result = String::new();
        let stringify_sym =
            |sym: Symbol| format!("{}({})", self.sym_source.name_of(sym), sym.usize());
        for rule in self.rules() {
            let lhs = stringify_sym(self.lhs(rule));
            let rhs = if self.rhs_len(rule) == 0 {
                "()".into()
            } else {
                self.rhs(rule)
                    .map(stringify_sym)
                    .collect::<Vec<_>>()
                    .join(" ~ ")
            };
            writeln!(&mut result, "{} ::= {};", lhs, rhs).expect("writing to String failed");
        }
        result
    }
}

/// The rule builder. Adds rule alternatives that share one LHS.
pub struct RuleBuilder<'a> {
    grammar: &'a mut Grammar,
    lhs: Symbol,
}

impl<'a> RuleBuilder<'a> {
    /// Adds a rule alternative with the given RHS to the grammar.
    pub fn rhs(self, syms: impl AsRef<[Symbol]>) -> Result<Self, GrammarError> {
        self.grammar.add_rule(self.lhs, syms.as_ref())?;
        Ok(self)
    }

    /// Switches to building rules with another LHS.
    pub fn rule(self, lhs: Symbol) -> Self {
        RuleBuilder {
            grammar: self.grammar,
            lhs,
        }
    }
}
