//! The forest: lazy enumeration of derivations over a finished chart.
//!
//! No second arena is built. A derivation set is a stack of ranges into the
//! chart's entry array: the outermost range holds the completions of the
//! queried (symbol, span), and each further range holds the mainstem
//! entries of the first entry of the range before it. The first entry of
//! every range together identify the "current" derivation; popping
//! enumerates the alternatives in order.
//!
//! Completions elided by the Leo optimization are reconstructed on the fly
//! from the memoizing chain and exist only inside the enumeration; the
//! chart is never grown.

use std::fmt;
use std::ops::Range;

use crate::chart::{Chart, Entry};
use crate::grammar::{Position, RuleId};
use crate::item::Item;
use crate::nnf::NnfGrammar;
use crate::symbol::Symbol;

/// Borrows a chart and its grammar for read-only enumeration. Multiple
/// forests over the same chart may coexist.
#[derive(Clone, Copy)]
pub struct Forest<'a> {
    grammar: &'a NnfGrammar,
    chart: &'a Chart,
}

/// One parse of a span: the external rule applied at the top, and the
/// earleme where each of its RHS symbols starts. RHS occurrences that
/// derived ε in this parse get the zero-width origin of the boundary they
/// were elided at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Derivation {
    /// The derived symbol.
    pub lhs: Symbol,
    /// The external rule applied at the top of this derivation.
    pub rule: RuleId,
    /// The external rule's RHS.
    pub rhs: Vec<Symbol>,
    /// Start earleme of each RHS symbol's sub-parse.
    pub rhs_origins: Vec<u32>,
}

impl fmt::Display for Derivation {
    /// Formats like `2 ::= 1 5 0 @ 0 2 3`: the external rule with the RHS
    /// origins appended. Symbols print as their numeric values; callers
    /// with a symbol source at hand can do better.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ::=", self.lhs.usize())?;
        for sym in &self.rhs {
            write!(f, " {}", sym.usize())?;
        }
        write!(f, " @")?;
        for origin in &self.rhs_origins {
            write!(f, " {}", origin)?;
        }
        Ok(())
    }
}

/// Enumerator over the derivations of one (symbol, span) query. Cloning is
/// cheap and the clones enumerate independently, since nothing in the chart
/// is ever mutated.
#[derive(Clone)]
pub struct DerivationSet {
    start: u32,
    end: u32,
    summit: Summit,
    ranges: Vec<Range<u32>>,
}

#[derive(Clone)]
enum Summit {
    /// Exhausted.
    None,
    /// Alternatives are the chart's completion entries in this range.
    Completions(Range<u32>),
    /// A completion the Leo optimization elided, reconstructed from the
    /// memoizing chain: the materialized item, and the run of its
    /// penultimate's entries serving as its mainstems.
    Elided { item: Item, penult: Range<u32> },
    /// The ε-derivation of a nullable symbol over an empty span.
    Empty { lhs: Symbol, rule: RuleId },
}

impl DerivationSet {
    /// Checks whether every derivation was enumerated.
    pub fn is_empty(&self) -> bool {
        matches!(self.summit, Summit::None)
    }

    /// The queried span.
    pub fn span(&self) -> Range<u32> {
        self.start..self.end
    }
}

impl<'a> Forest<'a> {
    pub(crate) fn new(grammar: &'a NnfGrammar, chart: &'a Chart) -> Self {
        Forest { grammar, chart }
    }

    /// The derivations of `lhs` over `span`.
    ///
    /// An empty span yields the ε-derivation through the symbol's external
    /// empty rule, when it has one; deeper ε-structure is not enumerated.
    pub fn derivations(&self, lhs: Symbol, span: Range<u32>) -> DerivationSet {
        let mut set = DerivationSet {
            start: span.start,
            end: span.end,
            summit: Summit::None,
            ranges: vec![],
        };
        if span.start == span.end {
            if let Some(rule) = self.external_empty_rule(lhs) {
                set.summit = Summit::Empty { lhs, rule };
            }
            return set;
        }
        if span.end > self.chart.finished_earlemes() {
            return set;
        }
        let completions = self.chart.completions(lhs, span.start, span.end);
        if !completions.is_empty() {
            set.summit = Summit::Completions(completions.start as u32..completions.end as u32);
        } else if let Some((item, penult)) = self.reconstruct_elided(lhs, span.start, span.end) {
            set.summit = Summit::Elided { item, penult };
        } else {
            return set;
        }
        self.extend(&mut set);
        set
    }

    /// Reads the derivation currently designated by the set, or `None` when
    /// the set is exhausted.
    pub fn first(&self, set: &DerivationSet) -> Option<Derivation> {
        match &set.summit {
            Summit::None => None,
            Summit::Empty { lhs, rule } => Some(Derivation {
                lhs: *lhs,
                rule: *rule,
                rhs: vec![],
                rhs_origins: vec![],
            }),
            Summit::Completions(range) => {
                let entry = self.chart.entry(range.start);
                Some(self.build(entry.item, self.head_predot(entry), set))
            }
            Summit::Elided { item, penult } => {
                let head_predot = self.chart.earleme_of(penult.start);
                Some(self.build(*item, head_predot, set))
            }
        }
    }

    /// Removes the first derivation, advancing to the next alternative:
    /// pops the first element of the innermost range, popping exhausted
    /// ranges outward, then re-extends.
    pub fn remove_first(&self, set: &mut DerivationSet) {
        while let Some(mut range) = set.ranges.pop() {
            range.start += 1;
            if range.start < range.end {
                set.ranges.push(range);
                self.extend(set);
                return;
            }
        }
        match &mut set.summit {
            Summit::None => {}
            Summit::Empty { .. } | Summit::Elided { .. } => set.summit = Summit::None,
            Summit::Completions(range) => {
                range.start += 1;
                if range.start < range.end {
                    self.extend(set);
                } else {
                    set.summit = Summit::None;
                }
            }
        }
    }

    /// The effective predot origin of a completion entry. For a completion
    /// that took the Leo shortcut it is the earleme holding the memoized
    /// penultimate, since the overloaded second word links to the Leo entry
    /// instead.
    fn head_predot(&self, entry: Entry) -> u32 {
        match entry.leo_source() {
            Some(leo) => self
                .chart
                .earleme_of(self.chart.entry(leo).item.memoized_penult()),
            None => entry.predot_origin(),
        }
    }

    /// Appends mainstem ranges until the deepest path item's predot origin
    /// equals its origin, the point where the first RHS symbol starts.
    fn extend(&self, set: &mut DerivationSet) {
        loop {
            let step = if let Some(range) = set.ranges.last() {
                let entry = self.chart.entry(range.start);
                if entry.predot_origin() == entry.item.origin() {
                    return;
                }
                self.chart.mainstems(entry, self.grammar)
            } else {
                match &set.summit {
                    Summit::None | Summit::Empty { .. } => return,
                    Summit::Completions(range) => {
                        let entry = self.chart.entry(range.start);
                        if self.head_predot(entry) == entry.item.origin() {
                            return;
                        }
                        match entry.leo_source() {
                            Some(leo) => self
                                .chart
                                .item_run(self.chart.entry(leo).item.memoized_penult()),
                            None => self.chart.mainstems(entry, self.grammar),
                        }
                    }
                    Summit::Elided { item, penult } => {
                        if self.chart.earleme_of(penult.start) == item.origin() {
                            return;
                        }
                        penult.start as usize..penult.end as usize
                    }
                }
            };
            debug_assert!(!step.is_empty(), "a derivation path always has mainstems");
            if step.is_empty() {
                return;
            }
            set.ranges.push(step.start as u32..step.end as u32);
        }
    }

    /// Reads the derivation identified by a completion item, the effective
    /// predot origin of its entry, and the set's mainstem ranges.
    fn build(&self, completion: Item, head_predot: u32, set: &DerivationSet) -> Derivation {
        let grammar = self.grammar;
        let dot = completion.dot();
        let rule = grammar.rule_containing(dot);
        let rhs_start = grammar.rhs_start(rule);
        let len = (dot - rhs_start) as usize;

        // The origin of RHS slot j is the predot origin of the path item
        // with its dot after slot j. The head covers the last slot; the
        // stored ranges cover the rest, outermost first.
        let mut internal_origins = vec![0u32; len];
        internal_origins[len - 1] = head_predot;
        for j in 0..len - 1 {
            let entry = self.chart.entry(set.ranges[len - 2 - j].start);
            internal_origins[j] = entry.predot_origin();
        }

        let external = grammar.external();
        let ext_rule = external.rule_containing(grammar.to_external(dot));
        let ext_rhs: Vec<Symbol> = external.rhs(ext_rule).collect();
        let ext_start = external.rhs_start(ext_rule);
        let mut kept_origins: Vec<Option<u32>> = vec![None; ext_rhs.len()];
        for (j, &origin) in internal_origins.iter().enumerate() {
            let ext_offset = grammar.to_external(rhs_start + j as Position) - ext_start;
            kept_origins[ext_offset as usize] = Some(origin);
        }
        let mut rhs_origins = vec![0u32; ext_rhs.len()];
        let mut boundary = set.end;
        for j in (0..ext_rhs.len()).rev() {
            match kept_origins[j] {
                Some(origin) => {
                    rhs_origins[j] = origin;
                    boundary = origin;
                }
                None => rhs_origins[j] = boundary,
            }
        }

        Derivation {
            lhs: external.lhs(ext_rule),
            rule: ext_rule,
            rhs: ext_rhs,
            rhs_origins,
        }
    }

    /// Finds the single derivation of a span whose completions the Leo
    /// optimization left out of the chart. Walks the memoizing chains
    /// hanging off the Leo-sourced completions of the ending earleme; each
    /// chain link's own penultimate is the entry right after the Leo entry.
    fn reconstruct_elided(&self, lhs: Symbol, start: u32, end: u32) -> Option<(Item, Range<u32>)> {
        for idx in self.chart.completion_range(end) {
            let Some(source) = self.chart.entries()[idx].leo_source() else {
                continue;
            };
            let mut leo_idx = source;
            loop {
                let penult_idx = leo_idx + 1;
                let penult = self.chart.entry(penult_idx).item;
                if penult.origin() == start
                    && self.grammar.recognized(penult.dot() + 1) == Some(lhs)
                {
                    let run = self.chart.item_run(penult_idx);
                    return Some((
                        penult.advanced(self.grammar),
                        run.start as u32..run.end as u32,
                    ));
                }
                match self.chart.entry(leo_idx).leo_predecessor() {
                    Some(next) => leo_idx = next,
                    None => break,
                }
            }
        }
        None
    }

    fn external_empty_rule(&self, lhs: Symbol) -> Option<RuleId> {
        let external = self.grammar.external();
        external
            .rules()
            .find(|&rule| external.lhs(rule) == lhs && external.rhs_len(rule) == 0)
    }
}
