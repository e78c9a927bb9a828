//! Null-symbol analysis.
//!
//! *Nullable* symbols sometimes derive the empty string; *nulling* symbols
//! always do. Both sets are closures over the grammar computed by a
//! work-list that decrements per-rule counters exactly once per discovery,
//! so the whole analysis is linear in the size of the grammar.

use crate::grammar::{Grammar, RuleId};
use crate::symbol::Symbol;
use crate::symbol_set::SymbolBitSet;

/// The two null-symbol sets. `nulling` is a subset of `nullable`.
pub struct NullSets {
    /// Symbols that sometimes derive ε.
    pub nullable: SymbolBitSet,
    /// Symbols that always derive ε.
    pub nulling: SymbolBitSet,
}

/// For each symbol, the rules in whose RHS it occurs, once per occurrence.
struct RhsOccurrences {
    offsets: Vec<u32>,
    rules: Vec<RuleId>,
}

impl RhsOccurrences {
    fn new(grammar: &Grammar) -> Self {
        let num_syms = grammar.num_syms();
        let mut counts = vec![0u32; num_syms + 1];
        for rule in grammar.rules() {
            for sym in grammar.rhs(rule) {
                counts[sym.usize() + 1] += 1;
            }
        }
        for i in 1..counts.len() {
            counts[i] += counts[i - 1];
        }
        let offsets = counts.clone();
        let mut fill = counts;
        let mut rules: Vec<RuleId> = vec![0; offsets[num_syms] as usize];
        for rule in grammar.rules() {
            for sym in grammar.rhs(rule) {
                rules[fill[sym.usize()] as usize] = rule;
                fill[sym.usize()] += 1;
            }
        }
        RhsOccurrences { offsets, rules }
    }

    fn of(&self, sym: Symbol) -> &[RuleId] {
        let range =
            self.offsets[sym.usize()] as usize..self.offsets[sym.usize() + 1] as usize;
        &self.rules[range]
    }
}

/// Computes the nullable and nulling symbol sets.
pub fn null_symbol_sets(grammar: &Grammar) -> NullSets {
    let occurrences = RhsOccurrences::new(grammar);
    NullSets {
        nullable: nullable_set(grammar, &occurrences),
        nulling: nulling_set(grammar, &occurrences),
    }
}

/// A symbol is nullable iff any of its rules has an all-nullable RHS.
fn nullable_set(grammar: &Grammar, occurrences: &RhsOccurrences) -> SymbolBitSet {
    let mut nullable = SymbolBitSet::from_elem(grammar.num_syms(), false);
    // Per rule, the number of RHS symbols not yet known nullable.
    let mut remaining: Vec<u32> = grammar
        .rules()
        .map(|rule| grammar.rhs_len(rule) as u32)
        .collect();
    let mut work: Vec<Symbol> = vec![];

    for rule in grammar.rules() {
        if grammar.rhs_len(rule) == 0 {
            let lhs = grammar.lhs(rule);
            if !nullable[lhs] {
                nullable.set(lhs, true);
                work.push(lhs);
            }
        }
    }
    while let Some(work_sym) = work.pop() {
        for &rule in occurrences.of(work_sym) {
            remaining[rule as usize] -= 1;
            if remaining[rule as usize] == 0 {
                let lhs = grammar.lhs(rule);
                if !nullable[lhs] {
                    nullable.set(lhs, true);
                    work.push(lhs);
                }
            }
        }
    }
    nullable
}

/// A symbol is nulling iff it has at least one rule and every one of its
/// rules has an all-nulling RHS.
fn nulling_set(grammar: &Grammar, occurrences: &RhsOccurrences) -> SymbolBitSet {
    let num_syms = grammar.num_syms();
    let mut nulling = SymbolBitSet::from_elem(num_syms, false);
    // Per rule, the number of RHS symbols not yet known nulling.
    let mut rule_remaining: Vec<u32> = grammar
        .rules()
        .map(|rule| grammar.rhs_len(rule) as u32)
        .collect();
    // Per symbol, the number of its rules whose RHS is not yet all-nulling.
    let mut lhs_remaining = vec![0u32; num_syms];
    for rule in grammar.rules() {
        lhs_remaining[grammar.lhs(rule).usize()] += 1;
    }
    let mut work: Vec<Symbol> = vec![];

    for rule in grammar.rules() {
        if grammar.rhs_len(rule) == 0 {
            let lhs = grammar.lhs(rule);
            lhs_remaining[lhs.usize()] -= 1;
            if lhs_remaining[lhs.usize()] == 0 && !nulling[lhs] {
                nulling.set(lhs, true);
                work.push(lhs);
            }
        }
    }
    while let Some(work_sym) = work.pop() {
        for &rule in occurrences.of(work_sym) {
            rule_remaining[rule as usize] -= 1;
            if rule_remaining[rule as usize] == 0 {
                let lhs = grammar.lhs(rule);
                lhs_remaining[lhs.usize()] -= 1;
                if lhs_remaining[lhs.usize()] == 0 && !nulling[lhs] {
                    nulling.set(lhs, true);
                    work.push(lhs);
                }
            }
        }
    }
    nulling
}
