//! Recognizes arithmetic expressions given on the command line and prints
//! every parse of each one, plus the chart when recognition fails.
//!
//! ```text
//! cargo run --example calculator -- '42+(9/3-20)'
//! ```

use earleo::{preprocess, Grammar, NnfGrammar, Recognizer, Symbol};

struct Calculator {
    grammar: NnfGrammar,
    sum: Symbol,
    terminals: Vec<(char, Symbol)>,
}

fn calculator() -> Calculator {
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
    let token = |ch: char| {
        terminals
            .iter()
            .find(|&&(c, _)| c == ch)
            .map(|&(_, sym)| sym)
            .unwrap()
    };

    grammar
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
        .rhs([token('('), sum, token(')')])
        .unwrap()
        .rhs([number])
        .unwrap()
        .rule(number)
        .rhs([number, digit])
        .unwrap()
        .rhs([digit])
        .unwrap()
        .rule(additive)
        .rhs([token('+')])
        .unwrap()
        .rhs([token('-')])
        .unwrap()
        .rule(multiplicative)
        .rhs([token('*')])
        .unwrap()
        .rhs([token('/')])
        .unwrap();
    for ch in "0123456789".chars() {
        let sym = token(ch);
        grammar.rule(digit).rhs([sym]).unwrap();
    }
    grammar.set_start(sum);

    let grammar = preprocess(grammar).expect("the calculator grammar fits");
    Calculator {
        grammar,
        sum,
        terminals,
    }
}

impl Calculator {
    fn token(&self, ch: char) -> Option<Symbol> {
        self.terminals
            .iter()
            .find(|&&(c, _)| c == ch)
            .map(|&(_, sym)| sym)
    }
}

fn main() {
    env_logger::init();
    let calculator = calculator();

    for input in std::env::args().skip(1) {
        println!("{}", input);
        let mut recognizer = Recognizer::new(&calculator.grammar);
        let mut failed = None;
        for (i, ch) in input.chars().enumerate() {
            match calculator.token(ch) {
                Some(sym) => recognizer.discover(sym, i as u32),
                None => {
                    failed = Some(i);
                    break;
                }
            }
            if !recognizer.finish_earleme() {
                failed = Some(i);
                break;
            }
        }
        if let Some(at) = failed {
            let names = calculator.grammar.sym_source();
            let expected = recognizer
                .expected_symbols(at as u32)
                .into_iter()
                .map(|sym| names.name_of(sym).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  no parse past position {}; expected one of: {}", at, expected);
            continue;
        }
        if !recognizer.has_complete_parse() {
            println!("  incomplete expression");
            continue;
        }
        let forest = recognizer.forest();
        let n = input.chars().count() as u32;
        let set = forest.derivations(calculator.sum, 0..n);
        let derivation = forest.first(&set).expect("a complete parse has a tree");
        println!("  {}", derivation);
    }
}
