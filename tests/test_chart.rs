use earleo::{preprocess, Chart, Entry, Grammar, Item, NnfGrammar, Recognizer, Symbol};

mod support;

fn small_grammar() -> (NnfGrammar, [Symbol; 4]) {
    // S ::= A b;  A ::= a
    let mut grammar = Grammar::new();
    let [s, a, ta, tb] = grammar.with_names(["S", "A", "a", "b"]);
    grammar
        .rule(s)
        .rhs([a, tb])
        .unwrap()
        .rule(a)
        .rhs([ta])
        .unwrap();
    grammar.set_start(s);
    (preprocess(grammar).unwrap(), [s, a, ta, tb])
}

#[test]
fn test_item_round_trip() {
    let (nnf, [s, a, ta, tb]) = small_grammar();
    let rule = nnf.predictions(a)[0];

    let predicted = Item::predicting(rule, &nnf, 7);
    assert!(predicted.is_earley() && !predicted.is_completion());
    assert_eq!(predicted.transition_symbol(), Some(ta));
    assert_eq!(predicted.origin(), 7);
    assert_eq!(predicted.dot(), nnf.rhs_start(rule));
    assert_eq!(predicted.mainstem(&nnf), None);

    let completed = predicted.advanced(&nnf);
    assert!(completed.is_completion());
    assert_eq!(completed.transition_symbol(), None);
    assert_eq!(completed.lhs(), Some(a));
    assert_eq!(completed.origin(), 7);
    assert_eq!(completed.dot(), predicted.dot() + 1);
    assert_eq!(completed.mainstem(&nnf), Some(predicted));

    // a two-symbol rule advances through a transition item first
    let s_rule = nnf.predictions(s)[0];
    let mid = Item::predicting(s_rule, &nnf, 0).advanced(&nnf);
    assert!(!mid.is_completion());
    assert_eq!(mid.transition_symbol(), Some(tb));
    assert_eq!(mid.mainstem(&nnf), Some(Item::predicting(s_rule, &nnf, 0)));
}

#[test]
fn test_item_origin_width() {
    let (nnf, [_s, a, ..]) = small_grammar();
    let rule = nnf.predictions(a)[0];
    // origins cross the 16-bit halfword boundary intact
    for origin in [0, 1, 0xFFFF, 0x10000, 0x12345678] {
        let item = Item::predicting(rule, &nnf, origin);
        assert_eq!(item.origin(), origin);
        assert_eq!(item.advanced(&nnf).origin(), origin);
    }
}

#[test]
fn test_item_sort_order() {
    let (nnf, [s, a, ta, _tb]) = small_grammar();
    let a_rule = nnf.predictions(a)[0];
    let s_rule = nnf.predictions(s)[0];

    let earley_on_a = Item::predicting(s_rule, &nnf, 0);
    assert_eq!(earley_on_a.transition_symbol(), Some(a));
    let leo_on_a = Item::memoizing(3, a);
    let earley_on_ta = Item::predicting(a_rule, &nnf, 0);
    assert_eq!(earley_on_ta.transition_symbol(), Some(ta));
    let completion = Item::predicting(a_rule, &nnf, 0).advanced(&nnf);

    // a Leo item sorts strictly before Earley items sharing its transition
    assert!(leo_on_a < earley_on_a);
    // non-completions group by transition symbol (a precedes ta here)
    assert!(earley_on_a < earley_on_ta);
    assert!(a < ta);
    // completions sort after every transition group
    assert!(earley_on_ta < completion);
    assert!(leo_on_a < completion);

    // within one item, origins order the entries
    assert!(Item::predicting(s_rule, &nnf, 0) < Item::predicting(s_rule, &nnf, 1));
}

#[test]
fn test_chart_insert_keeps_order_and_reports_new_items() {
    let (nnf, [s, _a, _ta, _tb]) = small_grammar();
    let s_rule = nnf.predictions(s)[0];
    let mut chart = Chart::new();

    let item = Item::predicting(s_rule, &nnf, 0);
    assert!(chart.insert(Entry::earley(item.advanced(&nnf), 1)));
    // a fresh item, inserted before the existing one
    assert!(chart.insert(Entry::earley(item, 0)));
    // an exact duplicate changes nothing
    assert!(!chart.insert(Entry::earley(item, 0)));
    assert_eq!(chart.entries().len(), 2);
    // a new predot origin of a known item is recorded, but the item is
    // not new
    assert!(!chart.insert(Entry::earley(item.advanced(&nnf), 2)));
    assert_eq!(chart.entries().len(), 3);

    for pair in chart.entries().windows(2) {
        assert!(pair[0] < pair[1]);
    }

    assert!(chart.finish_earleme());
    assert!(!chart.finish_earleme());
    assert_eq!(chart.finished_earlemes(), 2);
    assert_eq!(chart.earleme_range(0), 0..3);
    assert_eq!(chart.earleme_of(0), 0);
    assert_eq!(chart.earleme_of(2), 0);

    chart.remove_all();
    assert_eq!(chart.finished_earlemes(), 0);
    assert!(chart.entries().is_empty());
}

#[test]
fn test_chart_keyed_searches() {
    let arith = support::left_arith();
    let tokens = arith.tokens("12");
    let nnf = preprocess(arith.grammar).unwrap();
    let (recognizer, _) = support::recognize(&nnf, tokens);
    let chart = recognizer.chart();

    // "12" parses as number ::= number digit over [0, 2)
    let completions = chart.completions(arith.number, 0, 2);
    assert_eq!(completions.len(), 1);
    let completion = chart.entry(completions.start as u32);
    assert_eq!(completion.item.lhs(), Some(arith.number));
    assert_eq!(completion.predot_origin(), 1);

    // its mainstem lives in earleme 1 with the dot before the digit
    let mainstems = chart.mainstems(completion, &nnf);
    assert_eq!(mainstems.len(), 1);
    let mainstem = chart.entry(mainstems.start as u32);
    assert_eq!(chart.earleme_of(mainstems.start as u32), 1);
    assert_eq!(mainstem.item.transition_symbol(), Some(arith.digit));

    // transition search: only `number ::= digit` awaits a digit at earleme 0
    let on_digit = chart.transition_entries(arith.digit, 0);
    assert_eq!(on_digit.len(), 1);
    for idx in on_digit {
        let entry = chart.entry(idx as u32);
        assert_eq!(entry.item.transition_symbol(), Some(arith.digit));
        assert!(!entry.item.is_completion());
    }

    // nothing transitions on a symbol nobody awaits
    assert!(chart.transition_entries(arith.multiplicative, 0).is_empty());
    assert!(chart.completions(arith.sum, 1, 1).is_empty());
}

#[test]
fn test_tokens_longer_than_one_earleme() {
    // X ::= L | S R, where L is an alternative lexing of S R's two tokens.
    // The driver reports L spanning two earlemes; both parses coexist.
    let mut grammar = Grammar::new();
    let [x, long, short, rest] = grammar.with_names(["X", "L", "S", "R"]);
    grammar
        .rule(x)
        .rhs([long])
        .unwrap()
        .rhs([short, rest])
        .unwrap();
    grammar.set_start(x);
    let nnf = preprocess(grammar).unwrap();

    let mut recognizer = Recognizer::new(&nnf);
    recognizer.discover(short, 0);
    assert!(recognizer.finish_earleme());
    recognizer.discover(rest, 1);
    recognizer.discover(long, 0);
    assert!(recognizer.finish_earleme());
    assert!(recognizer.has_complete_parse());

    let forest = recognizer.forest();
    let mut set = forest.derivations(x, 0..2);
    let mut seen = vec![];
    while let Some(derivation) = forest.first(&set) {
        seen.push(derivation.rhs.clone());
        forest.remove_first(&mut set);
    }
    seen.sort();
    assert_eq!(seen, vec![vec![long], vec![short, rest]]);
}
