//! Runs the chart invariant checks over every scenario grammar and a
//! spread of inputs, accepted and rejected alike.

use earleo::{preprocess, Grammar, NnfGrammar, Symbol};
use test_case::test_case;

mod support;

#[test_case("42+(9/3-20)")]
#[test_case("42")]
#[test_case("((((1))))"; "nested_parens")]
#[test_case("1++2")]
#[test_case("1+"; "trailing_plus")]
#[test_case(")"; "close_paren")]
#[test_case(""; "empty_input")]
fn test_left_arith_chart_invariants(input: &str) {
    let arith = support::left_arith();
    let tokens = arith.tokens(input);
    let nnf = preprocess(arith.grammar).unwrap();
    let (recognizer, _) = support::recognize(&nnf, tokens);
    support::check_chart_invariants(&nnf, recognizer.chart());
}

#[test_case("42+(9/3-20)")]
#[test_case("1+2+3+4+5+6")]
#[test_case("1*2/3*4")]
#[test_case("12345")]
#[test_case("1**2")]
fn test_right_arith_chart_invariants(input: &str) {
    let arith = support::right_arith();
    let tokens = arith.tokens(input);
    let nnf = preprocess(arith.grammar).unwrap();
    let (recognizer, _) = support::recognize(&nnf, tokens);
    support::check_chart_invariants(&nnf, recognizer.chart());
}

#[test_case(1)]
#[test_case(4)]
#[test_case(16)]
fn test_pure_recursion_chart_invariants(length: usize) {
    let mut grammar = Grammar::new();
    let [a, ta] = grammar.with_names(["A", "a"]);
    grammar
        .rule(a)
        .rhs([ta, a])
        .unwrap()
        .rhs([ta])
        .unwrap();
    grammar.set_start(a);
    let nnf = preprocess(grammar).unwrap();
    let (recognizer, stuck_at) = support::recognize(&nnf, vec![ta; length]);
    assert_eq!(stuck_at, None);
    support::check_chart_invariants(&nnf, recognizer.chart());
}

fn ambiguous_nullable() -> (NnfGrammar, Symbol, Symbol) {
    // S ::= A S a | a;  A ::= () | a
    // Nullable A combines with ambiguity: "aaa" parses several ways.
    let mut grammar = Grammar::new();
    let [s, a, ta] = grammar.with_names(["S", "A", "a"]);
    grammar
        .rule(s)
        .rhs([a, s, ta])
        .unwrap()
        .rhs([ta])
        .unwrap()
        .rule(a)
        .rhs([])
        .unwrap()
        .rhs([ta])
        .unwrap();
    grammar.set_start(s);
    (preprocess(grammar).unwrap(), s, ta)
}

#[test_case(1, true)]
#[test_case(2, true)]
#[test_case(3, true)]
#[test_case(5, true)]
fn test_ambiguous_nullable_grammar(length: usize, expected: bool) {
    let (nnf, s, ta) = ambiguous_nullable();
    let (recognizer, _) = support::recognize(&nnf, vec![ta; length]);
    assert_eq!(recognizer.has_complete_parse(), expected);
    support::check_chart_invariants(&nnf, recognizer.chart());

    // agreement with the forest, and clean enumeration to exhaustion
    let forest = recognizer.forest();
    let mut set = forest.derivations(s, 0..length as u32);
    assert_eq!(forest.first(&set).is_some(), expected);
    let mut steps = 0;
    while forest.first(&set).is_some() {
        forest.remove_first(&mut set);
        steps += 1;
        assert!(steps < 64, "enumeration terminates");
    }
    assert!(set.is_empty());
}

#[test]
fn test_shared_grammar_across_recognizers() {
    // one preprocessed grammar, several concurrent recognitions
    let arith = support::left_arith();
    let inputs = ["42", "(1+2)*3", "7/7"];
    let token_streams: Vec<Vec<Symbol>> =
        inputs.iter().map(|input| arith.tokens(input)).collect();
    let nnf = preprocess(arith.grammar).unwrap();

    let mut recognizers: Vec<_> = token_streams
        .iter()
        .map(|_| earleo::Recognizer::new(&nnf))
        .collect();
    // interleave the inputs to show the recognizers are independent
    let longest = token_streams.iter().map(Vec::len).max().unwrap();
    for step in 0..longest {
        for (recognizer, tokens) in recognizers.iter_mut().zip(&token_streams) {
            if let Some(&token) = tokens.get(step) {
                recognizer.discover(token, step as u32);
                assert!(recognizer.finish_earleme());
            }
        }
    }
    for recognizer in &recognizers {
        assert!(recognizer.has_complete_parse());
        support::check_chart_invariants(&nnf, recognizer.chart());
    }
}
