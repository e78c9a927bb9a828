//! The bit-packed Earley/Leo item.
//!
//! An item packs into 64 bits, split into two 32-bit halves so that a chart
//! entry (item plus one more 32-bit word) stays free of 64-bit alignment
//! padding:
//!
//! ```text
//! hi: [ sym_key:15 | is_earley:1 | origin_hi:16 ]
//! lo: [ origin_lo:16 | dot:16 ]              Earley
//! lo: [ memoized penult entry index:32 ]     Leo
//! ```
//!
//! `sym_key` holds the transition symbol for non-completions and Leo items,
//! and the 15-bit complement of the LHS for completions. The complement's
//! top bit doubles as the completion flag and makes completions sort after
//! every transition group; within a transition group, Leo items
//! (`is_earley` clear) sort before Earley items. The `(hi, lo)` pair is the
//! chart's sort key.

use std::fmt;

use crate::grammar::{Grammar, Position, RuleId};
use crate::symbol::Symbol;

const SYM_SHIFT: u32 = 17;
const SYM_KEY_MASK: u32 = 0x7FFF;
const EARLEY_BIT: u32 = 1 << 16;
const COMPLETION_BIT: u32 = 1 << 31;
const LOW_MASK: u32 = 0xFFFF;

/// A bit-packed Earley or Leo item. Plain value, copied freely; comparisons
/// and equality use the packed 64-bit key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    hi: u32,
    lo: u32,
}

impl Item {
    fn earley(sym_key: u32, origin: u32, dot: Position) -> Item {
        debug_assert!(sym_key <= SYM_KEY_MASK && dot <= LOW_MASK);
        Item {
            hi: (sym_key << SYM_SHIFT) | EARLEY_BIT | (origin >> 16),
            lo: (origin << 16) | dot,
        }
    }

    fn completion_key(lhs: Symbol) -> u32 {
        SYM_KEY_MASK ^ lhs.usize() as u32
    }

    /// The Earley item predicting the given rule: dot at the rule's RHS
    /// start, transition on the rule's first RHS symbol.
    pub fn predicting(rule: RuleId, grammar: &Grammar, origin: u32) -> Item {
        let dot = grammar.rhs_start(rule);
        let sym = grammar.postdot(dot).expect("rewritten rules have a nonempty RHS");
        Item::earley(sym.usize() as u32, origin, dot)
    }

    /// The successor item, with the dot moved one position forward. Becomes
    /// a completion when the new dot lands on the rule's LHS slot.
    pub fn advanced(&self, grammar: &Grammar) -> Item {
        debug_assert!(
            self.is_earley() && !self.is_completion(),
            "cannot advance a completion"
        );
        let dot = self.dot() + 1;
        match grammar.recognized(dot) {
            Some(lhs) => Item::earley(Item::completion_key(lhs), self.origin(), dot),
            None => {
                let sym = grammar.postdot(dot).expect("slot holds a symbol");
                Item::earley(sym.usize() as u32, self.origin(), dot)
            }
        }
    }

    /// The predecessor item on a derivation path: same rule and origin, dot
    /// moved one position back. `None` for predictions.
    pub fn mainstem(&self, grammar: &Grammar) -> Option<Item> {
        debug_assert!(self.is_earley());
        let dot = self.dot();
        if dot == grammar.rhs_start(grammar.rule_containing(dot)) {
            return None;
        }
        let sym = grammar.postdot(dot - 1).expect("RHS slot before the dot");
        Some(Item::earley(sym.usize() as u32, self.origin(), dot - 1))
    }

    /// The Leo item memoizing the chart entry at `penult`, transitioning on
    /// the LHS of the right-recursive rule whose penult it is.
    pub fn memoizing(penult: u32, transition: Symbol) -> Item {
        Item {
            hi: (transition.usize() as u32) << SYM_SHIFT,
            lo: penult,
        }
    }

    /// Checks whether this is an Earley item.
    pub fn is_earley(&self) -> bool {
        self.hi & EARLEY_BIT != 0
    }

    /// Checks whether this is a Leo item.
    pub fn is_leo(&self) -> bool {
        !self.is_earley()
    }

    /// Checks whether this is a completion. Leo items never are.
    pub fn is_completion(&self) -> bool {
        self.hi & COMPLETION_BIT != 0
    }

    /// The transition symbol, or `None` for completions.
    pub fn transition_symbol(&self) -> Option<Symbol> {
        if self.is_completion() {
            None
        } else {
            Some(Symbol::from((self.hi >> SYM_SHIFT) & SYM_KEY_MASK))
        }
    }

    /// The recognized LHS symbol. `Some` only for completions.
    pub fn lhs(&self) -> Option<Symbol> {
        if self.is_completion() {
            Some(Symbol::from(SYM_KEY_MASK ^ ((self.hi >> SYM_SHIFT) & SYM_KEY_MASK)))
        } else {
            None
        }
    }

    /// The earleme where this item's partial parse started. Earley only.
    pub fn origin(&self) -> u32 {
        debug_assert!(self.is_earley(), "Leo items carry no origin");
        ((self.hi & LOW_MASK) << 16) | (self.lo >> 16)
    }

    /// The grammar position immediately after the dot. Earley only.
    pub fn dot(&self) -> Position {
        debug_assert!(self.is_earley(), "Leo items carry no dot");
        self.lo & LOW_MASK
    }

    /// The chart entry index of the penultimate Earley item this Leo item
    /// memoizes. Leo only.
    pub fn memoized_penult(&self) -> u32 {
        debug_assert!(self.is_leo());
        self.lo
    }

    /// The least item whose key sorts into the transition group of `sym`.
    /// A binary-search lower bound.
    pub(crate) fn transition_bound(sym: Symbol) -> Item {
        Item {
            hi: (sym.usize() as u32) << SYM_SHIFT,
            lo: 0,
        }
    }

    /// A lower bound for the completions of `lhs` starting at `origin`.
    pub(crate) fn completion_bound(lhs: Symbol, origin: u32) -> Item {
        Item::earley(Item::completion_key(lhs), origin, 0)
    }

    /// A lower bound for all completions in an earleme.
    pub(crate) fn any_completion_bound() -> Item {
        Item {
            hi: COMPLETION_BIT,
            lo: 0,
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_leo() {
            write!(
                f,
                "Leo(transition: {}, penult: {})",
                self.transition_symbol().expect("Leo items transition").usize(),
                self.memoized_penult()
            )
        } else if self.is_completion() {
            write!(
                f,
                "Completion(lhs: {}, origin: {}, dot: {})",
                self.lhs().expect("completions have a LHS").usize(),
                self.origin(),
                self.dot()
            )
        } else {
            write!(
                f,
                "Earley(transition: {}, origin: {}, dot: {})",
                self.transition_symbol().expect("has a transition").usize(),
                self.origin(),
                self.dot()
            )
        }
    }
}
