//! Printing a parsed file and parsing the output again must give back the
//! same tree.

use proptest::prelude::*;
use silt_syntax::parse;
use silt_syntax::pretty::{dump_file, print_file};

const FIXTURES: &[(&str, &str)] = &[
    ("nat", include_str!("fixtures/nat.silt")),
    ("vec", include_str!("fixtures/vec.silt")),
];

const SAMPLES: &[&str] = &[
    "id : (A : Type) -> A -> A\nid A x = x\n",
    "infixr 5 ::\nxs = a :: b :: c\n",
    "infixl 6 +\ninfixl 7 *\nx = (a + b) * c + d\n",
    "infix 4 ==\nx = (a == b) == c\n",
    "f = \\x -> x -> y\n",
    "f = g \\(x : A) {y : B} -> h x y\n",
    "T = forall A B -> A -> B\n",
    "data Void : Type\n",
    "data Empty : Type where\nx = y\n",
    "record Unit : Type where\n  constructor tt\n",
    "f x = g x\n  where\n    g y = h y\n      where\n        h z = z\n",
    "f x | p x | q = r\nf x with g x\n",
    "x = let a = b\n        c = d in a c\n",
    "x = let infixr 6 +\n        y = a + b + c in y\n",
    "infixl 6 +\nx = let z = w\n          where\n            w = a + b in z\n",
    "v = record Pair { fst = let a = b in a ; snd = _ }\n",
    "module M (A : Type) where\n  module N where\n    import Data.Nat\n    open Data.Nat\n  t = Type\n",
    "m = f () 42 _ Type\n",
    "k = λ x → ∀ y → x\n",
];

// ===== Helpers =====

/// Print, reparse, print again; both printed texts and both dumps must agree.
fn assert_round_trip(name: &str, source: &str) {
    let first = parse(source);
    assert!(
        first.diagnostics.is_empty(),
        "{}: source has diagnostics: {:?}",
        name,
        first.diagnostics
    );
    let printed = print_file(&first.file);

    let second = parse(&printed);
    assert!(
        second.diagnostics.is_empty(),
        "{}: printed text has diagnostics: {:?}\n{}",
        name,
        second.diagnostics,
        printed
    );
    assert_eq!(
        dump_file(&first.file),
        dump_file(&second.file),
        "{}: tree changed after printing:\n{}",
        name,
        printed
    );
    assert_eq!(printed, print_file(&second.file), "{}: printing is not stable", name);
}

// ===== Fixed inputs =====

#[test]
fn fixtures_round_trip() {
    for (name, source) in FIXTURES {
        assert_round_trip(name, source);
    }
}

#[test]
fn samples_round_trip() {
    for (i, source) in SAMPLES.iter().enumerate() {
        assert_round_trip(&format!("sample {}", i), source);
    }
}

// ===== Generated operator chains =====

const OPERATORS: &[(&str, &str)] = &[
    ("+", "infixl 6"),
    ("-", "infixl 6"),
    ("*", "infixl 7"),
    ("::", "infixr 5"),
    ("++", "infixr 5"),
    ("<>", "infixr 9"),
];

const RESERVED: &[&str] = &[
    "data", "record", "module", "where", "import", "open", "infix", "infixl", "infixr", "let",
    "in", "forall", "with", "field", "constructor",
];

fn arb_operand() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z][a-z0-9']{0,4}")
            .unwrap()
            .prop_filter("reserved word", |s| !RESERVED.contains(&s.as_str())),
        (0u32..1000).prop_map(|n| n.to_string()),
        Just("_".to_string()),
        Just("(f x)".to_string()),
    ]
}

fn arb_chain() -> impl Strategy<Value = String> {
    (
        arb_operand(),
        prop::collection::vec((0..OPERATORS.len(), arb_operand()), 1..8),
    )
        .prop_map(|(first, rest)| {
            let mut source = first;
            for (op, operand) in rest {
                source.push(' ');
                source.push_str(OPERATORS[op].0);
                source.push(' ');
                source.push_str(&operand);
            }
            source
        })
}

fn fixity_header() -> String {
    OPERATORS
        .iter()
        .map(|(op, fixity)| format!("{} {}\n", fixity, op))
        .collect()
}

proptest! {
    #[test]
    fn prop_operator_chains_round_trip(chain in arb_chain()) {
        let source = format!("{}x = {}\n", fixity_header(), chain);
        let first = parse(&source);
        prop_assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);

        let printed = print_file(&first.file);
        let second = parse(&printed);
        prop_assert!(second.diagnostics.is_empty(), "{:?}", second.diagnostics);
        prop_assert_eq!(dump_file(&first.file), dump_file(&second.file));
    }

    #[test]
    fn prop_left_chains_nest_left(
        prec in 0u8..=9,
        operands in prop::collection::vec(prop::string::string_regex("[a-h]").unwrap(), 2..8),
    ) {
        let source = format!("infixl {} %\nx = {}\n", prec, operands.join(" % "));
        let parsed = parse(&source);
        prop_assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

        let expected = operands[1..]
            .iter()
            .fold(operands[0].clone(), |acc, next| format!("(% {} {})", acc, next));
        prop_assert_eq!(
            dump_file(&parsed.file),
            format!("(infixl {} %)\n(clause (x) (= {}))\n", prec, expected)
        );
    }

    #[test]
    fn prop_right_chains_nest_right(
        prec in 0u8..=9,
        operands in prop::collection::vec(prop::string::string_regex("[a-h]").unwrap(), 2..8),
    ) {
        let source = format!("infixr {} %\nx = {}\n", prec, operands.join(" % "));
        let parsed = parse(&source);
        prop_assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

        let last = operands[operands.len() - 1].clone();
        let expected = operands[..operands.len() - 1]
            .iter()
            .rev()
            .fold(last, |acc, prev| format!("(% {} {})", prev, acc));
        prop_assert_eq!(
            dump_file(&parsed.file),
            format!("(infixr {} %)\n(clause (x) (= {}))\n", prec, expected)
        );
    }
}
