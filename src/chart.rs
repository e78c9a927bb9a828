//! The chart: a flat, sorted arena of Earley and Leo items per earleme.
//!
//! Entries of every finished earleme are in ascending `(item key, second
//! word)` order, and the distinct items of an earleme form a set: the same
//! item may appear in consecutive entries with distinct predot origins,
//! which represents ambiguity, not duplication. The currently open earleme
//! is kept sorted at all times by inserting at a binary-searched index, so
//! keyed lookups work mid-earleme too.

use std::fmt::Write;
use std::ops::Range;

use crate::grammar::Grammar;
use crate::item::Item;
use crate::nnf::NnfGrammar;
use crate::symbol::Symbol;

/// Sentinel for a Leo entry without a predecessor Leo entry.
const NO_PREDECESSOR: u32 = !0;
/// Tags a completion entry whose second word links to the Leo entry that
/// produced it instead of carrying a predot origin. Origins and chart sizes
/// fit 31 bits, so the top bit is free to disambiguate the overload.
const LEO_SOURCED: u32 = 1 << 31;

/// An item together with one more 32-bit word: the predot origin for Earley
/// entries, the predecessor link for Leo entries, or the producing Leo
/// entry's index for completions that took the Leo shortcut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entry {
    /// The Earley or Leo item.
    pub item: Item,
    origin_or_link: u32,
}

impl Entry {
    /// An Earley entry. `predot_origin` is the earleme where the predot
    /// symbol's derivation began; for predictions it equals the item's
    /// origin.
    pub fn earley(item: Item, predot_origin: u32) -> Entry {
        debug_assert!(item.is_earley() && predot_origin & LEO_SOURCED == 0);
        Entry {
            item,
            origin_or_link: predot_origin,
        }
    }

    /// A Leo entry, optionally linking to its predecessor Leo entry.
    pub fn leo(item: Item, predecessor: Option<u32>) -> Entry {
        debug_assert!(item.is_leo());
        Entry {
            item,
            origin_or_link: predecessor.unwrap_or(NO_PREDECESSOR),
        }
    }

    /// A completion produced through the Leo entry at `leo_index`.
    pub fn leo_sourced(item: Item, leo_index: u32) -> Entry {
        debug_assert!(item.is_earley() && item.is_completion());
        Entry {
            item,
            origin_or_link: LEO_SOURCED | leo_index,
        }
    }

    /// The predot origin of an Earley entry.
    pub fn predot_origin(&self) -> u32 {
        debug_assert!(self.item.is_earley() && self.leo_source().is_none());
        self.origin_or_link
    }

    /// For a completion that took the Leo shortcut, the index of the Leo
    /// entry that produced it.
    pub fn leo_source(&self) -> Option<u32> {
        if self.item.is_earley()
            && self.item.is_completion()
            && self.origin_or_link & LEO_SOURCED != 0
        {
            Some(self.origin_or_link & !LEO_SOURCED)
        } else {
            None
        }
    }

    /// For a Leo entry, the index of its predecessor Leo entry.
    pub fn leo_predecessor(&self) -> Option<u32> {
        debug_assert!(self.item.is_leo());
        if self.origin_or_link == NO_PREDECESSOR {
            None
        } else {
            Some(self.origin_or_link)
        }
    }
}

/// The flat arena of entries, indexed by earleme.
#[derive(Clone, Debug)]
pub struct Chart {
    entries: Vec<Entry>,
    /// The entry index where each earleme begins; the last element is the
    /// start of the currently open earleme.
    set_start: Vec<u32>,
}

impl Default for Chart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart {
    /// Creates an empty chart with earleme 0 open.
    pub fn new() -> Self {
        Chart {
            entries: vec![],
            set_start: vec![0],
        }
    }

    /// Clears lengths without deallocating, so the storage can be reused.
    pub fn remove_all(&mut self) {
        self.entries.clear();
        self.set_start.clear();
        self.set_start.push(0);
    }

    /// The number of finished earlemes; also the index of the open one.
    pub fn finished_earlemes(&self) -> u32 {
        self.set_start.len() as u32 - 1
    }

    /// All entries, laid out in earleme-ascending order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The entry at the given index.
    pub fn entry(&self, index: u32) -> Entry {
        self.entries[index as usize]
    }

    /// The entry-index range of the given earleme. The open earleme may be
    /// addressed as well.
    pub fn earleme_range(&self, earleme: u32) -> Range<usize> {
        let start = self.set_start[earleme as usize] as usize;
        let end = self
            .set_start
            .get(earleme as usize + 1)
            .map(|&e| e as usize)
            .unwrap_or(self.entries.len());
        start..end
    }

    /// The earleme holding the entry at the given index.
    pub fn earleme_of(&self, index: u32) -> u32 {
        self.set_start.partition_point(|&start| start <= index) as u32 - 1
    }

    /// Inserts an entry into the open earleme, keeping it sorted. Exact
    /// duplicates are dropped. Returns whether the entry's *item* was new
    /// to the earleme. An insert that only adds another predot origin for
    /// a known item reports `false`, since it is a new derivation but not a
    /// new item.
    pub fn insert(&mut self, entry: Entry) -> bool {
        let current = *self.set_start.last().expect("open earleme") as usize;
        let idx = current + self.entries[current..].partition_point(|e| *e < entry);
        if idx < self.entries.len() && self.entries[idx] == entry {
            return false;
        }
        let item_known = (idx > current && self.entries[idx - 1].item == entry.item)
            || (idx < self.entries.len() && self.entries[idx].item == entry.item);
        self.entries.insert(idx, entry);
        !item_known
    }

    /// Closes the open earleme and opens the next one. Returns whether the
    /// just-closed earleme was non-empty.
    pub fn finish_earleme(&mut self) -> bool {
        let progress = self.entries.len() as u32 > *self.set_start.last().expect("open earleme");
        self.set_start.push(self.entries.len() as u32);
        progress
    }

    /// The entries of the given earleme whose items transition on `sym`,
    /// with the Leo entry first if there is one.
    pub fn transition_entries(&self, sym: Symbol, earleme: u32) -> Range<usize> {
        let set = self.earleme_range(earleme);
        let bound = Item::transition_bound(sym);
        let first = set.start + self.entries[set.clone()].partition_point(|e| e.item < bound);
        let mut last = first;
        while last < set.end {
            let item = self.entries[last].item;
            if item.is_completion() || item.transition_symbol() != Some(sym) {
                break;
            }
            last += 1;
        }
        first..last
    }

    /// The completions of `lhs` over `[origin, earleme)`.
    pub fn completions(&self, lhs: Symbol, origin: u32, earleme: u32) -> Range<usize> {
        let set = self.earleme_range(earleme);
        let bound = Item::completion_bound(lhs, origin);
        let first = set.start + self.entries[set.clone()].partition_point(|e| e.item < bound);
        let mut last = first;
        while last < set.end {
            let item = self.entries[last].item;
            if !item.is_completion() || item.lhs() != Some(lhs) || item.origin() != origin {
                break;
            }
            last += 1;
        }
        first..last
    }

    /// All completion entries of the given earleme.
    pub fn completion_range(&self, earleme: u32) -> Range<usize> {
        let set = self.earleme_range(earleme);
        let bound = Item::any_completion_bound();
        let first = set.start + self.entries[set.clone()].partition_point(|e| e.item < bound);
        first..set.end
    }

    /// The mainstem entries of an Earley entry: the entries in the predot
    /// origin's earleme whose item is this item with the dot moved back
    /// one. Empty for predictions.
    pub fn mainstems(&self, entry: Entry, grammar: &Grammar) -> Range<usize> {
        debug_assert!(entry.leo_source().is_none(), "Leo-sourced mainstems are memoized");
        match entry.item.mainstem(grammar) {
            Some(stem) => self.find_item(stem, entry.predot_origin()),
            None => 0..0,
        }
    }

    /// The run of consecutive entries sharing the item of the entry at
    /// `start`, within that entry's earleme.
    pub fn item_run(&self, start: u32) -> Range<usize> {
        let set = self.earleme_range(self.earleme_of(start));
        let item = self.entries[start as usize].item;
        let mut last = start as usize;
        while last < set.end && self.entries[last].item == item {
            last += 1;
        }
        start as usize..last
    }

    fn find_item(&self, item: Item, earleme: u32) -> Range<usize> {
        let set = self.earleme_range(earleme);
        let first = set.start + self.entries[set.clone()].partition_point(|e| e.item < item);
        let mut last = first;
        while last < set.end && self.entries[last].item == item {
            last += 1;
        }
        first..last
    }

    /// Formats the chart to a `String`, one line per entry: the item's
    /// kind, origin and dot (translated to an external position where one
    /// exists), and the predot origin or memoization link.
    pub fn stringify(&self, grammar: &NnfGrammar) -> String {
        let mut result = String::new();
        for earleme in 0..self.set_start.len() as u32 {
            writeln!(&mut result, "earleme {}:", earleme).expect("writing to String failed");
            for idx in self.earleme_range(earleme) {
                let entry = self.entries[idx];
                let line = self.stringify_entry(idx as u32, entry, grammar);
                writeln!(&mut result, "  {}", line).expect("writing to String failed");
            }
        }
        result
    }

    fn stringify_entry(&self, idx: u32, entry: Entry, grammar: &NnfGrammar) -> String {
        let names = grammar.sym_source();
        let item = entry.item;
        if item.is_leo() {
            let transition = item.transition_symbol().expect("Leo items transition");
            let predecessor = match entry.leo_predecessor() {
                Some(p) => format!(" predecessor {}", p),
                None => String::new(),
            };
            return format!(
                "{}: leo {} memo {}{}",
                idx,
                names.name_of(transition),
                item.memoized_penult(),
                predecessor
            );
        }
        let link = match entry.leo_source() {
            Some(leo) => format!("leo {}", leo),
            None => format!("predot {}", entry.predot_origin()),
        };
        format!(
            "{}: [{}] origin {} {}",
            idx,
            grammar.stringify_dotted(item.dot()),
            item.origin(),
            link
        )
    }
}
