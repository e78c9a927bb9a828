//! General context-free parsing: Earley's algorithm with Joop Leo's
//! right-recursion memoization over grammars preprocessed into nihilist
//! normal form.
//!
//! Any context-free grammar is accepted; LR-regular grammars, including
//! right-recursive ones, are recognized in linear time, ambiguous
//! grammars are handled, and the chart doubles as a compact shared parse
//! forest from which every tree for any symbol over any span can be
//! enumerated.
//!
//! The pipeline: build a [`Grammar`], [`preprocess`] it, drive a
//! [`Recognizer`] with [`Recognizer::discover`] and
//! [`Recognizer::finish_earleme`] as tokens arrive, then read parses
//! through [`Recognizer::forest`].
//!
//! ```
//! use earleo::{preprocess, Grammar, Recognizer};
//!
//! // A ::= a A | a
//! let mut grammar = Grammar::new();
//! let [a, ta] = grammar.with_names(["A", "a"]);
//! grammar.rule(a).rhs([ta, a]).unwrap().rhs([ta]).unwrap();
//! grammar.set_start(a);
//! let grammar = preprocess(grammar).unwrap();
//!
//! let mut recognizer = Recognizer::new(&grammar);
//! for earleme in 0..3 {
//!     recognizer.discover(ta, earleme);
//!     assert!(recognizer.finish_earleme());
//! }
//! assert!(recognizer.has_complete_parse());
//!
//! let forest = recognizer.forest();
//! let derivations = forest.derivations(a, 0..3);
//! let derivation = forest.first(&derivations).unwrap();
//! assert_eq!(derivation.rhs, vec![ta, a]);
//! assert_eq!(derivation.rhs_origins, vec![0, 1]);
//! ```

#![deny(unsafe_code)]
#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![cfg_attr(test, deny(warnings))]

mod chart;
mod discrete_map;
mod forest;
mod grammar;
mod item;
mod nnf;
mod nulling;
mod recognizer;
mod recursion;
mod symbol;
mod symbol_set;

pub use crate::chart::{Chart, Entry};
pub use crate::discrete_map::DiscreteMap;
pub use crate::forest::{Derivation, DerivationSet, Forest};
pub use crate::grammar::{Grammar, GrammarError, Position, RuleBuilder, RuleId};
pub use crate::item::Item;
pub use crate::nnf::{preprocess, NnfGrammar};
pub use crate::nulling::{null_symbol_sets, NullSets};
pub use crate::recognizer::Recognizer;
pub use crate::symbol::{Symbol, SymbolRepr, SymbolSource};
pub use crate::symbol_set::SymbolBitSet;
