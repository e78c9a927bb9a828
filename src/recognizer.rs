//! The recognizer: the Earley + Leo control loop.
//!
//! A driver reports each recognized token with [`Recognizer::discover`] and
//! closes the earleme with [`Recognizer::finish_earleme`]. Everything else
//! (prediction, completion cascades, Leo memoization) happens inside. The
//! `derive`/`discover` recursion is bounded by the grammar size per
//! earleme, because the chart's set-insert idempotence cuts every repeated
//! branch.

use log::{debug, trace};

use crate::chart::{Chart, Entry};
use crate::forest::Forest;
use crate::item::Item;
use crate::nnf::NnfGrammar;
use crate::symbol::Symbol;

/// Recognizes token streams against a preprocessed grammar.
pub struct Recognizer<'g> {
    grammar: &'g NnfGrammar,
    chart: Chart,
    /// Whether the open earleme received an item at a Leo position.
    leo_candidate_found: bool,
}

impl<'g> Recognizer<'g> {
    /// Creates a recognizer with earleme 0 already finished: it holds the
    /// predictions of the accept symbol's rules and their closure.
    pub fn new(grammar: &'g NnfGrammar) -> Self {
        let mut recognizer = Recognizer {
            grammar,
            chart: Chart::new(),
            leo_candidate_found: false,
        };
        recognizer.reset();
        recognizer
    }

    /// Rewinds to the state right after construction, reusing the chart's
    /// storage. Call between inputs to amortize allocation.
    pub fn reset(&mut self) {
        self.chart.remove_all();
        self.leo_candidate_found = false;
        self.predict(self.grammar.accept());
        self.finish_earleme();
    }

    /// Reports that `sym` was recognized from `origin` up to the current
    /// (open) earleme.
    ///
    /// When the first mainstem on `sym` at `origin` is a Leo item, exactly
    /// one completion is derived: the memoized penultimate item, advanced.
    /// This collapses the whole chain of completions the memoization
    /// elided. Otherwise every distinct mainstem item is advanced.
    pub fn discover(&mut self, sym: Symbol, origin: u32) {
        let range = self.chart.transition_entries(sym, origin);
        if range.is_empty() {
            trace!("nothing transitions on {} at earleme {}", sym.usize(), origin);
            return;
        }
        let head = self.chart.entry(range.start as u32);
        if head.item.is_leo() {
            let penult = self.chart.entry(head.item.memoized_penult()).item;
            let completion = penult.advanced(self.grammar);
            self.derive(Entry::leo_sourced(completion, range.start as u32));
        } else {
            let mut advanced = Vec::with_capacity(range.len());
            let mut previous = None;
            for idx in range {
                let item = self.chart.entries()[idx].item;
                if previous == Some(item) {
                    continue;
                }
                previous = Some(item);
                advanced.push(item.advanced(self.grammar));
            }
            for item in advanced {
                self.derive(Entry::earley(item, origin));
            }
        }
    }

    /// Inserts an entry; when its item is new to the earleme, follows up by
    /// predicting from the postdot symbol, or by recursively discovering
    /// the recognized LHS.
    fn derive(&mut self, entry: Entry) {
        if self.chart.insert(entry) {
            let item = entry.item;
            if let Some(lhs) = item.lhs() {
                trace!("completed {} over {}..", lhs.usize(), item.origin());
                self.discover(lhs, item.origin());
            } else {
                if self.grammar.leo_position(item.dot()) {
                    self.leo_candidate_found = true;
                }
                let transition = item.transition_symbol().expect("non-completions transition");
                self.predict(transition);
            }
        }
    }

    /// Predicts every rule of `sym` at the open earleme. Idempotent per
    /// earleme through the chart's set invariant on items.
    fn predict(&mut self, sym: Symbol) {
        let origin = self.chart.finished_earlemes();
        let grammar = self.grammar;
        for &rule in grammar.predictions(sym) {
            let item = Item::predicting(rule, grammar, origin);
            self.derive(Entry::earley(item, origin));
        }
    }

    /// Closes the current earleme, creating Leo items first if any item
    /// reached a Leo position. Returns `false` iff the closed earleme was
    /// empty. Nothing would ever carry the parse forward, which makes this
    /// the recognizer's sole failure channel.
    pub fn finish_earleme(&mut self) -> bool {
        if self.leo_candidate_found {
            self.create_leo_items();
            self.leo_candidate_found = false;
        }
        let progress = self.chart.finish_earleme();
        let closed = self.chart.finished_earlemes() - 1;
        debug!(
            "finished earleme {} with {} entries",
            closed,
            self.chart.earleme_range(closed).len()
        );
        progress
    }

    /// For each distinct penultimate item of a right-recursive rule whose
    /// transition symbol is unique in the open earleme, inserts a Leo item
    /// memoizing the topmost penultimate of its completion chain.
    fn create_leo_items(&mut self) {
        let grammar = self.grammar;
        let current = self.chart.finished_earlemes();
        let range = self.chart.earleme_range(current);

        let mut candidates = vec![];
        let mut idx = range.start;
        while idx < range.end {
            let item = self.chart.entries()[idx].item;
            if item.is_completion() {
                break;
            }
            let sym = item.transition_symbol().expect("non-completion");
            let group_start = idx;
            let mut distinct = item;
            let mut unique = true;
            idx += 1;
            while idx < range.end {
                let next = self.chart.entries()[idx].item;
                if next.is_completion() || next.transition_symbol() != Some(sym) {
                    break;
                }
                if next != distinct {
                    distinct = next;
                    unique = false;
                }
                idx += 1;
            }
            if unique && grammar.leo_position(item.dot()) {
                candidates.push((group_start as u32, item, sym));
            }
        }

        // Each insertion shifts the groups to its right; candidates are in
        // ascending group order, so a running offset keeps memo indices
        // valid for earlier insertions and for lookups of them.
        for (shift, &(group_start, item, transition)) in candidates.iter().enumerate() {
            let lhs = grammar
                .recognized(item.dot() + 1)
                .expect("the penult precedes the LHS slot");
            let predecessors = self.chart.transition_entries(lhs, item.origin());
            let mut memo = group_start + shift as u32 + 1;
            let mut predecessor = None;
            if !predecessors.is_empty() {
                let head = self.chart.entry(predecessors.start as u32);
                if head.item.is_leo() {
                    memo = head.item.memoized_penult();
                    predecessor = Some(predecessors.start as u32);
                }
            }
            trace!(
                "leo item on {} at earleme {} memoizing entry {}",
                transition.usize(),
                current,
                memo
            );
            let inserted = self.chart.insert(Entry::leo(Item::memoizing(memo, transition), predecessor));
            debug_assert!(inserted, "a Leo item heads its transition group");
        }
    }

    /// Whether a completion of the accept symbol spans every token seen so
    /// far, or, before any token, whether the grammar accepts the empty
    /// string.
    pub fn has_complete_parse(&self) -> bool {
        if self.current_earleme() == 1 {
            return self.grammar.accepts_null();
        }
        let last = self.current_earleme() - 1;
        !self
            .chart
            .completions(self.grammar.accept(), 0, last)
            .is_empty()
    }

    /// The index of the earleme currently being built.
    pub fn current_earleme(&self) -> u32 {
        self.chart.finished_earlemes()
    }

    /// The distinct symbols some item of the given earleme is waiting on.
    /// After a failed earleme, the expectations of the preceding one tell
    /// the driver what would have been accepted instead of the offending
    /// token.
    pub fn expected_symbols(&self, earleme: u32) -> Vec<Symbol> {
        let mut expected = vec![];
        for idx in self.chart.earleme_range(earleme) {
            let item = self.chart.entries()[idx].item;
            if item.is_completion() {
                break;
            }
            let sym = item.transition_symbol().expect("non-completion");
            if expected.last() != Some(&sym) {
                expected.push(sym);
            }
        }
        expected
    }

    /// Read-only access to the chart, including after a failed earleme.
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// A forest enumerating the parses recorded in the chart.
    pub fn forest(&self) -> Forest<'_> {
        Forest::new(self.grammar, &self.chart)
    }
}
