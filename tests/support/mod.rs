#![allow(dead_code)]

use earleo::{Chart, Grammar, NnfGrammar, Recognizer, Symbol};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The arithmetic grammar of the recognition scenarios, with terminals one
/// per character.
pub struct Arith {
    pub grammar: Grammar,
    pub sum: Symbol,
    pub product: Symbol,
    pub factor: Symbol,
    pub number: Symbol,
    pub digit: Symbol,
    pub additive: Symbol,
    pub multiplicative: Symbol,
    terminals: Vec<(char, Symbol)>,
}

impl Arith {
    pub fn token(&self, ch: char) -> Symbol {
        self.terminals
            .iter()
            .find(|&&(c, _)| c == ch)
            .map(|&(_, sym)| sym)
            .expect("unknown character")
    }

    pub fn tokens(&self, input: &str) -> Vec<Symbol> {
        input.chars().map(|ch| self.token(ch)).collect()
    }
}

fn arith_symbols() -> Arith {
    let mut grammar = Grammar::new();
    let [sum, product, factor, number, digit, additive, multiplicative] = grammar.with_names([
        "sum",
        "product",
        "factor",
        "number",
        "digit",
        "additive",
        "multiplicative",
    ]);
    let mut terminals = vec![];
    for ch in "0123456789+-*/()".chars() {
        let [sym] = grammar.with_names([&ch.to_string()[..]]);
        terminals.push((ch, sym));
    }
    Arith {
        grammar,
        sum,
        product,
        factor,
        number,
        digit,
        additive,
        multiplicative,
        terminals,
    }
}

/// `sum ::= sum additive product | product` and friends, with the
/// recursion on the left.
pub fn left_arith() -> Arith {
    let mut arith = arith_symbols();
    let Arith {
        sum,
        product,
        factor,
        number,
        digit,
        additive,
        multiplicative,
        ..
    } = arith;
    let lparen = arith.token('(');
    let rparen = arith.token(')');
    arith
        .grammar
        .rule(sum)
        .rhs([sum, additive, product])
        .unwrap()
        .rhs([product])
        .unwrap()
        .rule(product)
        .rhs([product, multiplicative, factor])
        .unwrap()
        .rhs([factor])
        .unwrap()
        .rule(factor)
        .rhs([lparen, sum, rparen])
        .unwrap()
        .rhs([number])
        .unwrap()
        .rule(number)
        .rhs([number, digit])
        .unwrap()
        .rhs([digit])
        .unwrap();
    finish_arith(arith)
}

/// The same language with the recursive productions flipped to the right:
/// `sum ::= product additive sum | product` and friends.
pub fn right_arith() -> Arith {
    let mut arith = arith_symbols();
    let Arith {
        sum,
        product,
        factor,
        number,
        digit,
        additive,
        multiplicative,
        ..
    } = arith;
    let lparen = arith.token('(');
    let rparen = arith.token(')');
    arith
        .grammar
        .rule(sum)
        .rhs([product, additive, sum])
        .unwrap()
        .rhs([product])
        .unwrap()
        .rule(product)
        .rhs([factor, multiplicative, product])
        .unwrap()
        .rhs([factor])
        .unwrap()
        .rule(factor)
        .rhs([lparen, sum, rparen])
        .unwrap()
        .rhs([number])
        .unwrap()
        .rule(number)
        .rhs([digit, number])
        .unwrap()
        .rhs([digit])
        .unwrap();
    finish_arith(arith)
}

fn finish_arith(mut arith: Arith) -> Arith {
    let digit = arith.digit;
    let additive = arith.additive;
    let multiplicative = arith.multiplicative;
    for ch in "0123456789".chars() {
        let sym = arith.token(ch);
        arith.grammar.rule(digit).rhs([sym]).unwrap();
    }
    let plus = arith.token('+');
    let minus = arith.token('-');
    let star = arith.token('*');
    let slash = arith.token('/');
    arith
        .grammar
        .rule(additive)
        .rhs([plus])
        .unwrap()
        .rhs([minus])
        .unwrap()
        .rule(multiplicative)
        .rhs([star])
        .unwrap()
        .rhs([slash])
        .unwrap();
    arith.grammar.set_start(arith.sum);
    arith
}

/// Drives a recognizer over the token stream, one earleme per token.
/// Returns the recognizer together with the earleme index at which
/// recognition got stuck, if it did.
pub fn recognize<'g>(
    grammar: &'g NnfGrammar,
    tokens: impl IntoIterator<Item = Symbol>,
) -> (Recognizer<'g>, Option<u32>) {
    let mut recognizer = Recognizer::new(grammar);
    for (i, token) in tokens.into_iter().enumerate() {
        recognizer.discover(token, i as u32);
        if !recognizer.finish_earleme() {
            return (recognizer, Some(i as u32));
        }
    }
    (recognizer, None)
}

/// Checks the chart invariants that must hold after every finished earleme.
pub fn check_chart_invariants(grammar: &NnfGrammar, chart: &Chart) {
    for earleme in 0..chart.finished_earlemes() {
        let range = chart.earleme_range(earleme);
        let entries = &chart.entries()[range];

        for pair in entries.windows(2) {
            assert!(
                pair[0] < pair[1],
                "entries of earleme {} out of order: {:?} then {:?}",
                earleme,
                pair[0],
                pair[1]
            );
        }

        for entry in entries {
            if entry.item.is_leo() {
                let transition = entry.item.transition_symbol().unwrap();
                let mut sharing = entries
                    .iter()
                    .filter(|e| {
                        e.item.is_earley() && e.item.transition_symbol() == Some(transition)
                    })
                    .map(|e| e.item)
                    .collect::<Vec<_>>();
                sharing.dedup();
                assert_eq!(
                    sharing.len(),
                    1,
                    "Leo transition {} not unique in earleme {}",
                    transition.usize(),
                    earleme
                );
            }
            if entry.item.is_completion() && entry.item.lhs() != Some(grammar.accept()) {
                let lhs = entry.item.lhs().unwrap();
                let origin = entry.item.origin();
                assert!(
                    !chart.transition_entries(lhs, origin).is_empty(),
                    "completion of {} from {} in earleme {} has no trigger",
                    lhs.usize(),
                    origin,
                    earleme
                );
            }
        }
    }
}
