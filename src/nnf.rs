//! The preprocessor: rewrites a grammar into nihilist normal form.
//!
//! In NNF, every nullable symbol has two incarnations: a *proper* one that
//! never derives ε, and a *nulling* one that always does. Every rule's
//! RHS is either wholly non-nulling or wholly nulling. No rule has an empty
//! RHS; ε-derivation is represented by the nulling incarnations themselves.
//! An occurrence chosen to derive ε is elided from the proper rule's RHS,
//! and the position map records where the elisions happened, so a position
//! in the rewritten storage can be translated back to the user's rule.

use bit_vec::BitVec;
use log::debug;
use std::ops::Deref;

use crate::discrete_map::DiscreteMap;
use crate::grammar::{Grammar, GrammarError, Position, RuleId, SYMBOL_LIMIT};
use crate::nulling::{null_symbol_sets, NullSets};
use crate::recursion::right_recursive_rules;
use crate::symbol::Symbol;
use crate::symbol_set::SymbolBitSet;

/// A grammar rewritten into nihilist normal form, together with everything
/// the recognizer and the forest need to know about the rewrite.
///
/// Immutable after construction; may be shared by reference across any
/// number of recognizers.
pub struct NnfGrammar {
    /// The grammar as the user built it.
    external: Grammar,
    /// The rewritten grammar. Its start symbol is the accept symbol.
    internal: Grammar,
    /// Translates internal storage positions to external ones.
    external_positions: DiscreteMap,
    /// CSR index: for each internal symbol, the proper rules it predicts.
    prediction_offsets: Vec<u32>,
    prediction_rules: Vec<RuleId>,
    /// Internal positions that are the penult of a right-recursive rule.
    leo_positions: BitVec,
    /// Right recursion, cached as a bit per internal rule.
    right_recursive: BitVec,
    /// Internal symbols that always derive ε.
    nulling_symbols: SymbolBitSet,
    /// For each internal symbol, the external symbol it incarnates.
    external_origin: Vec<Symbol>,
    /// The fresh wrapping symbol, recognized from earleme 0.
    accept: Symbol,
    /// Whether the external start symbol was nullable.
    accepts_null: bool,
}

/// Rewrites a grammar into nihilist normal form. Pure and deterministic.
pub fn preprocess(external: Grammar) -> Result<NnfGrammar, GrammarError> {
    let start = external.start().ok_or(GrammarError::NoStartSymbol)?;
    let NullSets { nullable, nulling } = null_symbol_sets(&external);
    let accepts_null = nullable[start];

    let mut internal = Grammar::with_sym_source(external.sym_source().clone());
    let mut external_origin: Vec<Symbol> =
        (0..external.num_syms()).map(Symbol::from).collect();

    // Mint a nulling incarnation for every nullable symbol that is not
    // already wholly nulling. Wholly nulling symbols are their own nulling
    // incarnation and keep their external id.
    let mut incarnation: Vec<Option<Symbol>> = vec![None; external.num_syms()];
    for id in 0..external.num_syms() {
        let sym = Symbol::from(id);
        if nulling[sym] {
            incarnation[id] = Some(sym);
        } else if nullable[sym] {
            let fresh = internal.sym_source_mut().next_sym();
            if fresh.usize() as u32 >= SYMBOL_LIMIT {
                return Err(GrammarError::InvalidSymbol(fresh));
            }
            incarnation[id] = Some(fresh);
            external_origin.push(sym);
        }
    }
    let accept = internal.sym_source_mut().named_sym("accept");
    if accept.usize() as u32 >= SYMBOL_LIMIT {
        return Err(GrammarError::InvalidSymbol(accept));
    }
    external_origin.push(start);

    // Rewrite each external rule.
    let mut external_positions = DiscreteMap::new();
    let mut rhs = vec![];
    let mut kept = vec![];
    for rule in external.rules() {
        let lhs = external.lhs(rule);
        let rhs_start = external.rhs_start(rule);
        let lhs_slot = external.lhs_position(rule);
        rhs.clear();
        rhs.extend(external.rhs(rule));

        if nulling[lhs] {
            // The nulling incarnation itself stands for "derives ε", so an
            // empty rule emits nothing. A nonempty one becomes a wholly
            // nulling internal rule; its RHS symbols are all nulling and
            // keep their ids.
            if rhs.is_empty() {
                continue;
            }
            let at = internal.store_len();
            internal.add_rule(lhs, &rhs)?;
            external_positions.append_mapping(at, rhs_start);
            continue;
        }

        // Emit one proper rule per subset of the nullable-but-not-nulling
        // occurrences, eliding the chosen occurrences along with every
        // wholly nulling occurrence. A rule whose RHS would come out empty
        // would make the LHS nulling, which it is not, so drop it.
        let choices: Vec<usize> = (0..rhs.len())
            .filter(|&i| nullable[rhs[i]] && !nulling[rhs[i]])
            .collect();
        assert!(choices.len() < 32, "too many nullable symbols in one rule");
        for mask in 0u32..1 << choices.len() {
            kept.clear();
            let mut choice = 0;
            for (i, &sym) in rhs.iter().enumerate() {
                if nulling[sym] {
                    continue;
                }
                if nullable[sym] {
                    let elide = mask & (1 << choice) != 0;
                    choice += 1;
                    if elide {
                        continue;
                    }
                }
                kept.push(i);
            }
            if kept.is_empty() {
                continue;
            }
            let at = internal.store_len();
            let new_rhs: Vec<Symbol> = kept.iter().map(|&i| rhs[i]).collect();
            internal.add_rule(lhs, &new_rhs)?;
            for (offset, &i) in kept.iter().enumerate() {
                external_positions.append_mapping(at + offset as Position, rhs_start + i as Position);
            }
            external_positions.append_mapping(at + kept.len() as Position, lhs_slot);
        }
    }

    // Wrap the start symbol: accept ::= start, and if the start symbol is
    // nullable, also accept ::= start's nulling incarnation. The wrapping
    // rules have no external counterpart; their positions map one past the
    // external storage.
    let sentinel = external.store_len();
    if !nulling[start] {
        let at = internal.store_len();
        internal.add_rule(accept, &[start])?;
        external_positions.append_mapping(at, sentinel);
    }
    if accepts_null {
        let start_nulling = incarnation[start.usize()].expect("nullable start has an incarnation");
        let at = internal.store_len();
        internal.add_rule(accept, &[start_nulling])?;
        external_positions.append_mapping(at, sentinel);
    }
    internal.set_start(accept);

    // The nulling incarnations, in the internal symbol space.
    let mut nulling_symbols = SymbolBitSet::from_elem(internal.num_syms(), false);
    for id in 0..external.num_syms() {
        let sym = Symbol::from(id);
        if nulling[sym] {
            nulling_symbols.set(sym, true);
        } else if let Some(fresh) = incarnation[id] {
            nulling_symbols.set(fresh, true);
        }
    }

    // Proper rules are wholly non-nulling; only they take part in
    // recognition, so only they enter the prediction index.
    let proper = |rule: RuleId| {
        internal
            .rhs(rule)
            .all(|sym| !nulling_symbols[sym])
    };
    let mut prediction_offsets = vec![0u32; internal.num_syms() + 1];
    for rule in internal.rules() {
        if proper(rule) {
            prediction_offsets[internal.lhs(rule).usize() + 1] += 1;
        }
    }
    for i in 1..prediction_offsets.len() {
        prediction_offsets[i] += prediction_offsets[i - 1];
    }
    let mut fill = prediction_offsets.clone();
    let mut prediction_rules: Vec<RuleId> = vec![0; *prediction_offsets.last().unwrap() as usize];
    for rule in internal.rules() {
        if proper(rule) {
            let lhs = internal.lhs(rule).usize();
            prediction_rules[fill[lhs] as usize] = rule;
            fill[lhs] += 1;
        }
    }

    // Leo positions: the penult of every right-recursive proper rule. In
    // NNF the penult is the slot just before the LHS marker.
    let right_recursive = right_recursive_rules(&internal, &nulling_symbols);
    let mut leo_positions = BitVec::from_elem(internal.store_len() as usize, false);
    for rule in internal.rules() {
        if right_recursive[rule as usize] && proper(rule) {
            leo_positions.set(internal.lhs_position(rule) as usize - 1, true);
        }
    }

    debug!(
        "rewrote {} external rules into {} internal rules, {} leo positions, accepts_null: {}",
        external.num_rules(),
        internal.num_rules(),
        leo_positions.iter().filter(|&b| b).count(),
        accepts_null,
    );

    Ok(NnfGrammar {
        external,
        internal,
        external_positions,
        prediction_offsets,
        prediction_rules,
        leo_positions,
        right_recursive,
        nulling_symbols,
        external_origin,
        accept,
        accepts_null,
    })
}

impl NnfGrammar {
    /// The grammar as the user built it.
    pub fn external(&self) -> &Grammar {
        &self.external
    }

    /// The fresh symbol wrapping the start symbol.
    pub fn accept(&self) -> Symbol {
        self.accept
    }

    /// Whether the external start symbol was nullable.
    pub fn accepts_null(&self) -> bool {
        self.accepts_null
    }

    /// Translates an internal storage position to an external one. Wrapping
    /// rules translate one past the external storage.
    pub fn to_external(&self, position: Position) -> Position {
        self.external_positions.get(position)
    }

    /// The external symbol an internal symbol incarnates.
    pub fn external_sym(&self, sym: Symbol) -> Symbol {
        self.external_origin[sym.usize()]
    }

    /// Checks whether an internal symbol always derives ε.
    pub fn is_nulling(&self, sym: Symbol) -> bool {
        self.nulling_symbols[sym]
    }

    /// The proper rules predicting the given symbol.
    pub fn predictions(&self, sym: Symbol) -> &[RuleId] {
        let range = self.prediction_offsets[sym.usize()] as usize
            ..self.prediction_offsets[sym.usize() + 1] as usize;
        &self.prediction_rules[range]
    }

    /// Checks whether the given position is the penult of a right-recursive
    /// rule.
    pub fn leo_position(&self, position: Position) -> bool {
        self.leo_positions.get(position as usize).unwrap_or(false)
    }

    /// Checks whether an internal rule is right-recursive, directly or
    /// through the transitive last-symbol relation.
    pub fn right_recursive(&self, rule: RuleId) -> bool {
        self.right_recursive.get(rule as usize).unwrap_or(false)
    }

    /// Formats the internal dotted rule at `position` to a `String`, in the
    /// manner of:
    ///
    /// ```ignore
    /// sum ::= sum additive . product
    /// ```
    ///
    /// The annotation `@7` gives the external position of the dot, or `@-`
    /// for slots of the wrapping rules, which have none.
    pub fn stringify_dotted(&self, position: Position) -> String {
        let names = self.internal.sym_source();
        let rule = self.internal.rule_containing(position);
        let rhs_start = self.internal.rhs_start(rule);
        let mut rhs = String::new();
        for (i, sym) in self.internal.rhs(rule).enumerate() {
            if rhs_start + i as u32 == position {
                rhs.push_str(". ");
            }
            rhs.push_str(&names.name_of(sym));
            rhs.push(' ');
        }
        if self.internal.recognized(position).is_some() {
            rhs.push('.');
        }
        let external = self.to_external(position);
        let external = if external < self.external.store_len() {
            format!("{}", external)
        } else {
            "-".into()
        };
        format!(
            "{} ::= {} @{}",
            names.name_of(self.internal.lhs(rule)),
            rhs.trim_end(),
            external
        )
    }

    /// Empties the Leo-position set, turning off the right-recursion
    /// memoization. Recognition results are unaffected; memory use for
    /// right-recursive inputs degrades from linear to quadratic. Meant for
    /// comparison runs and tests.
    pub fn disable_leo(&mut self) {
        self.leo_positions.clear();
    }
}

impl Deref for NnfGrammar {
    type Target = Grammar;

    /// The rewritten grammar. Positions, rules and symbols read through
    /// this are internal; translate through [`NnfGrammar::to_external`]
    /// and [`NnfGrammar::external_sym`] to present them to the user.
    fn deref(&self) -> &Self::Target {
        &self.internal
    }
}
