//! Snapshot tests using insta.
//!
//! These capture the S-expression dumps, the printed surface syntax and the
//! rendered diagnostics of the fixture files, so changes to either the tree
//! shape or the output format are caught and reviewed explicitly.

use silt_syntax::ast::Decl;
use silt_syntax::lexer::tokenize;
use silt_syntax::pretty::{dump_decl, dump_expr, dump_tokens, print_file};
use silt_syntax::{parse, parse_expr, ParseOptions};

const NAT: &str = include_str!("fixtures/nat.silt");
const VEC: &str = include_str!("fixtures/vec.silt");
const BROKEN: &str = include_str!("fixtures/broken.silt");

// ===== Helpers =====

/// One line per declaration inside the file's single module
fn format_module_items(source: &str) -> String {
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    match &parsed.file.decls[..] {
        [Decl::Module { decls, .. }] => decls.iter().map(dump_decl).collect::<Vec<_>>().join("\n"),
        other => panic!("expected a single module, got {:?}", other),
    }
}

fn format_expr(source: &str, context: &str) -> String {
    match parse_expr(source, context) {
        Ok(expr) => dump_expr(&expr),
        Err(errors) => errors
            .iter()
            .map(|e| format!("ERROR: {}", e))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_diagnostics(source: &str) -> String {
    let parsed = parse(source);
    parsed
        .diagnostics
        .iter()
        .map(|d| d.render(source))
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Expression snapshots =====

#[test]
fn snap_expr_precedence_levels() {
    insta::assert_snapshot!(
        format_expr("a + b * c - d", "infixl 6 + -\ninfixl 7 *"),
        @"(- (+ a (* b c)) d)"
    );
}

#[test]
fn snap_expr_application_and_operator() {
    insta::assert_snapshot!(format_expr("f a + g b c", "infixl 6 +"), @"(+ (f a) (g b c))");
}

#[test]
fn snap_expr_right_chain_with_lambda() {
    insta::assert_snapshot!(
        format_expr("x :: \\y -> y :: ys", "infixr 5 ::"),
        @r"(:: x (\ (y) (:: y ys)))"
    );
}

#[test]
fn snap_expr_telescope() {
    insta::assert_snapshot!(
        format_expr("(A : Type) {n : Nat} -> Vec A n -> Vec A (suc n)", ""),
        @"(-> [(A : Type) {n : Nat}] (-> (Vec A n) (Vec A (suc n))))"
    );
}

#[test]
fn snap_expr_non_associative_error() {
    insta::assert_snapshot!(
        format_expr("a == b == c", "infix 4 =="),
        @"ERROR: fixity error at 7..9: ambiguous non-associative operator chain: `==` cannot follow `==` at precedence 4 without parentheses"
    );
}

#[test]
fn snap_expr_missing_operand_error() {
    insta::assert_snapshot!(
        format_expr("a *", "infixl 7 *"),
        @"ERROR: syntax error at 2..3: operator `*` is missing its right operand"
    );
}

// ===== Fixture snapshots =====

#[test]
fn snap_nat_module() {
    insta::assert_snapshot!(format_module_items(NAT), @r"
    (infixl 6 +)
    (infixl 7 *)
    (data Nat (: Type) (where (zero : Nat) (suc : (-> Nat Nat))))
    (sig _+_ : (-> Nat (-> Nat Nat)))
    (clause-infix (+ zero n) (= n))
    (clause-infix (+ (suc m) n) (= (suc (+ m n))))
    (sig _*_ : (-> Nat (-> Nat Nat)))
    (clause-infix (* zero n) (= zero))
    (clause-infix (* (suc m) n) (= (+ n (* m n))))
    (sig double : (-> Nat Nat))
    (clause (double n) (= (+ n n)))
    ");
}

#[test]
fn snap_vec_module() {
    insta::assert_snapshot!(format_module_items(VEC), @r"
    (open import Data.Nat)
    (infixr 5 ::)
    (data Vec (: (-> Nat Type)) (where (nil : (Vec zero)) (_::_ : (-> [{n : Nat}] (-> A (-> (Vec n) (Vec (suc n))))))))
    (record Pair (B C : Type) (: Type) (where (constructor pair) (field fst : B) (field snd : C)))
    (sig head : (-> [{n : Nat}] (-> (Vec (suc n)) A)))
    (clause (head (:: x xs)) (= x))
    (sig map : (forall (B) (-> (-> A B) (-> [{n : Nat}] (-> (Vec n) (Vec n))))))
    (clause (map f nil) (= nil))
    (clause (map f (:: x xs)) (= (:: (f x) (map f xs))))
    (sig swap : (forall (B C) (-> (Pair B C) (Pair C B))))
    (clause (swap p) (= (record pair (fst (Pair.snd p)) (snd (Pair.fst p)))))
    (sig first : (-> [{n : Nat}] (-> (Vec n) (-> (Vec n) (Vec n)))))
    (clause (first xs ys) (= (let ((clause (go) (= (\ (a b) a)))) (go xs ys))))
    ");
}

#[test]
fn snap_vec_printed() {
    let parsed = parse(VEC);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    insta::assert_snapshot!(print_file(&parsed.file).trim_end(), @r"
    module Data.Vec (A : Type) where
      open import Data.Nat
      infixr 5 ::
      data Vec : Nat -> Type where
        nil : Vec zero
        _::_ : {n : Nat} -> A -> Vec n -> Vec (suc n)
      record Pair (B C : Type) : Type where
        constructor pair
        field fst : B
        field snd : C
      head : {n : Nat} -> Vec (suc n) -> A
      head (x :: xs) = x
      map : forall B -> (A -> B) -> {n : Nat} -> Vec n -> Vec n
      map f nil = nil
      map f (x :: xs) = f x :: map f xs
      swap : forall B C -> Pair B C -> Pair C B
      swap p = record pair { fst = Pair.snd p ; snd = Pair.fst p }
      first : {n : Nat} -> Vec n -> Vec n -> Vec n
      first xs ys = let { go = \a b -> a } in go xs ys
    ");
}

#[test]
fn snap_broken_diagnostics() {
    insta::assert_snapshot!(format_diagnostics(BROKEN), @r"
    3:8: SyntaxError: expected a name after `data`, found `where`
    5:16: FixityError: ambiguous non-associative operator chain: `==` cannot follow `==` at precedence 4 without parentheses
    6:10: SyntaxError: operator `==` is missing its left operand
    ");
}

// ===== Token stream snapshots =====

#[test]
fn snap_layout_tokens() {
    let (tokens, errors) = tokenize("f = g\n  where\n    g = h\n", &ParseOptions::default());
    assert!(errors.is_empty(), "{:?}", errors);
    insta::assert_snapshot!(dump_tokens(&tokens).trim_end(), @r"
    1:1 {layout
    1:1 f
    1:3 =
    1:5 g
    2:3 where
    3:5 {layout
    3:5 g
    3:7 =
    3:9 h
    4:1 layout}
    4:1 layout}
    4:1 end of file
    ");
}
