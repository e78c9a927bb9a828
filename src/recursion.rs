//! Detection of right-recursive rules.

use bit_matrix::BitMatrix;
use bit_vec::BitVec;

use crate::grammar::Grammar;
use crate::symbol_set::SymbolBitSet;

/// Returns the set of right-recursive rules, as a bit per rule ordinal.
///
/// A rule is right-recursive iff its last RHS symbol derives a string
/// ending in the rule's LHS. Equivalently, iff the last-symbol relation,
/// closed transitively, leads from the last RHS symbol back to the LHS.
/// Rules whose LHS is in `skip` (and empty rules) are never marked.
pub fn right_recursive_rules(grammar: &Grammar, skip: &SymbolBitSet) -> BitVec {
    let num_syms = grammar.num_syms();
    let mut derivation = BitMatrix::new(num_syms, num_syms);
    for rule in grammar.rules() {
        if skip[grammar.lhs(rule)] || grammar.rhs_len(rule) == 0 {
            continue;
        }
        let last = grammar.rhs(rule).last().expect("nonempty RHS");
        derivation.set(grammar.lhs(rule).usize(), last.usize(), true);
    }
    derivation.transitive_closure();

    let mut result = BitVec::from_elem(grammar.num_rules(), false);
    for rule in grammar.rules() {
        let lhs = grammar.lhs(rule);
        if skip[lhs] || grammar.rhs_len(rule) == 0 {
            continue;
        }
        let last = grammar.rhs(rule).last().expect("nonempty RHS");
        if last == lhs || derivation[(last.usize(), lhs.usize())] {
            result.set(rule as usize, true);
        }
    }
    result
}
