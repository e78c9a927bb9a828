//! Generates random sentences of the arithmetic grammar and checks that
//! every one is recognized with at least one derivation, and that random
//! corruptions of them are never mis-recognized into a crash.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use earleo::preprocess;

mod support;

/// Builds a random well-formed arithmetic expression, recursive-descent
/// style, bounded in depth.
fn random_sum(rng: &mut SmallRng, depth: usize, out: &mut String) {
    if depth > 0 && rng.gen_ratio(1, 3) {
        random_sum(rng, depth - 1, out);
        out.push(if rng.gen() { '+' } else { '-' });
        random_product(rng, depth - 1, out);
    } else {
        random_product(rng, depth, out);
    }
}

fn random_product(rng: &mut SmallRng, depth: usize, out: &mut String) {
    if depth > 0 && rng.gen_ratio(1, 3) {
        random_product(rng, depth - 1, out);
        out.push(if rng.gen() { '*' } else { '/' });
        random_factor(rng, depth - 1, out);
    } else {
        random_factor(rng, depth, out);
    }
}

fn random_factor(rng: &mut SmallRng, depth: usize, out: &mut String) {
    if depth > 0 && rng.gen_ratio(1, 4) {
        out.push('(');
        random_sum(rng, depth - 1, out);
        out.push(')');
    } else {
        let digits = rng.gen_range(1..4);
        for _ in 0..digits {
            out.push(char::from(b'0' + rng.gen_range(0..10)));
        }
    }
}

#[test]
fn test_random_expressions_recognized() {
    support::init_logging();
    let arith = support::left_arith();
    let sum = arith.sum;
    let nnf = preprocess(arith.grammar.clone()).unwrap();
    let mut rng = SmallRng::seed_from_u64(2);

    for _ in 0..120 {
        let mut input = String::new();
        random_sum(&mut rng, 4, &mut input);
        let tokens = arith.tokens(&input);
        let count = tokens.len() as u32;

        let (recognizer, stuck_at) = support::recognize(&nnf, tokens);
        assert_eq!(stuck_at, None, "input {:?}", input);
        assert!(recognizer.has_complete_parse(), "input {:?}", input);
        support::check_chart_invariants(&nnf, recognizer.chart());

        let forest = recognizer.forest();
        let set = forest.derivations(sum, 0..count);
        assert!(forest.first(&set).is_some(), "input {:?}", input);
    }
}

#[test]
fn test_random_corruptions_never_panic() {
    let arith = support::left_arith();
    let nnf = preprocess(arith.grammar.clone()).unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    let alphabet: Vec<char> = "0123456789+-*/()".chars().collect();

    for _ in 0..120 {
        let mut input = String::new();
        random_sum(&mut rng, 3, &mut input);
        // corrupt one position
        let mut chars: Vec<char> = input.chars().collect();
        let at = rng.gen_range(0..chars.len());
        chars[at] = alphabet[rng.gen_range(0..alphabet.len())];

        let tokens: Vec<_> = chars.iter().map(|&ch| arith.token(ch)).collect();
        let count = tokens.len() as u32;
        let (recognizer, stuck_at) = support::recognize(&nnf, tokens);
        // whatever happened, the recognizer and the forest stay coherent
        support::check_chart_invariants(&nnf, recognizer.chart());
        let complete = stuck_at.is_none() && recognizer.has_complete_parse();
        let forest = recognizer.forest();
        let set = forest.derivations(arith.sum, 0..count);
        assert_eq!(forest.first(&set).is_some(), complete);
    }
}

#[test]
fn test_random_right_recursive_expressions() {
    let arith = support::right_arith();
    let sum = arith.sum;
    let nnf = preprocess(arith.grammar.clone()).unwrap();
    let mut rng = SmallRng::seed_from_u64(5);

    for _ in 0..60 {
        let mut input = String::new();
        random_sum(&mut rng, 4, &mut input);
        let tokens = arith.tokens(&input);
        let count = tokens.len() as u32;

        let (recognizer, stuck_at) = support::recognize(&nnf, tokens);
        assert_eq!(stuck_at, None, "input {:?}", input);
        assert!(recognizer.has_complete_parse(), "input {:?}", input);
        support::check_chart_invariants(&nnf, recognizer.chart());

        let forest = recognizer.forest();
        let set = forest.derivations(sum, 0..count);
        assert!(forest.first(&set).is_some(), "input {:?}", input);
    }
}
