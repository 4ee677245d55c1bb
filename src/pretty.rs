//! Renderers for parse results.
//!
//! `print_file` produces surface syntax that parses back to the same tree:
//! declarations use layout, blocks nested inside expressions use explicit
//! braces. `dump_file` and `dump_expr` give a compact S-expression view for
//! tests and the dump binary, and `dump_tokens` shows the post-layout
//! token stream.

use crate::ast::decl::{Constructor, Decl, Field, ImportKind};
use crate::ast::expr::{ArrowDomain, Binding, Expr, Name, TypedParam};
use crate::ast::SourceFile;
use crate::interner::resolve;
use crate::lexer::SpannedToken;

fn name_text(name: &Name) -> String {
    resolve(name.node).unwrap_or_default()
}

fn names_text(names: &[Name]) -> String {
    names.iter().map(name_text).collect::<Vec<_>>().join(" ")
}

pub fn print_file(file: &SourceFile) -> String {
    let mut p = Printer::new();
    for decl in &file.decls {
        p.print_decl(decl);
    }
    p.output
}

pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::new();
    p.print_expr(expr);
    p.output
}

struct Printer {
    output: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    fn print_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    /// A declaration on its own line, nested blocks indented below it
    fn print_decl(&mut self, decl: &Decl) {
        self.print_indent();
        self.print_decl_head(decl);
        match decl {
            Decl::Data { constructors, .. } => {
                self.write(" where");
                self.newline();
                self.indent += 1;
                for ctor in constructors {
                    self.print_indent();
                    self.print_constructor(ctor);
                    self.newline();
                }
                self.indent -= 1;
            }
            Decl::Record {
                constructor,
                fields,
                decls,
                ..
            } => {
                self.write(" where");
                self.newline();
                self.indent += 1;
                if let Some(ctor) = constructor {
                    self.print_indent();
                    self.write("constructor ");
                    self.write(&name_text(ctor));
                    self.newline();
                }
                for field in fields {
                    self.print_indent();
                    self.print_field(field);
                    self.newline();
                }
                for decl in decls {
                    self.print_decl(decl);
                }
                self.indent -= 1;
            }
            Decl::Module { decls, .. } => {
                self.write(" where");
                self.newline();
                self.indent += 1;
                for decl in decls {
                    self.print_decl(decl);
                }
                self.indent -= 1;
            }
            Decl::FunctionClause { where_decls, .. } if !where_decls.is_empty() => {
                self.write(" where");
                self.newline();
                self.indent += 1;
                for decl in where_decls {
                    self.print_decl(decl);
                }
                self.indent -= 1;
            }
            _ => self.newline(),
        }
    }

    /// A declaration inside braces, nested blocks braced as well
    fn print_decl_inline(&mut self, decl: &Decl) {
        self.print_decl_head(decl);
        match decl {
            Decl::Data { constructors, .. } => {
                self.write(" where {");
                for (i, ctor) in constructors.iter().enumerate() {
                    self.write(if i == 0 { " " } else { " ; " });
                    self.print_constructor(ctor);
                }
                self.write(" }");
            }
            Decl::Record {
                constructor,
                fields,
                decls,
                ..
            } => {
                self.write(" where {");
                let mut first = true;
                let mut sep = |p: &mut Self| {
                    p.write(if first { " " } else { " ; " });
                    first = false;
                };
                if let Some(ctor) = constructor {
                    sep(self);
                    self.write("constructor ");
                    self.write(&name_text(ctor));
                }
                for field in fields {
                    sep(self);
                    self.print_field(field);
                }
                for decl in decls {
                    sep(self);
                    self.print_decl_inline(decl);
                }
                self.write(" }");
            }
            Decl::Module { decls, .. } => {
                self.write(" where");
                self.print_block_inline(decls);
            }
            Decl::FunctionClause { where_decls, .. } if !where_decls.is_empty() => {
                self.write(" where");
                self.print_block_inline(where_decls);
            }
            _ => {}
        }
    }

    fn print_block_inline(&mut self, decls: &[Decl]) {
        self.write(" {");
        for (i, decl) in decls.iter().enumerate() {
            self.write(if i == 0 { " " } else { " ; " });
            self.print_decl_inline(decl);
        }
        self.write(" }");
    }

    /// Everything of a declaration up to its nested block
    fn print_decl_head(&mut self, decl: &Decl) {
        match decl {
            Decl::Data {
                name, params, ty, ..
            }
            | Decl::EmptyData {
                name, params, ty, ..
            } => {
                self.write("data ");
                self.write(&name_text(name));
                self.print_header_rest(params, ty.as_ref());
            }
            Decl::Record {
                name, params, ty, ..
            } => {
                self.write("record ");
                self.write(&name_text(name));
                self.print_header_rest(params, ty.as_ref());
            }
            Decl::Module { name, params, .. } => {
                self.write("module ");
                self.write(&name.to_string());
                self.print_header_rest(params, None);
            }
            Decl::Import { kind, module, .. } => {
                self.write(match kind {
                    ImportKind::Import => "import ",
                    ImportKind::Open => "open ",
                    ImportKind::OpenImport => "open import ",
                });
                self.write(&module.to_string());
            }
            Decl::Function { names, ty, .. } => {
                self.write(&names_text(names));
                self.write(" : ");
                self.print_expr(ty);
            }
            Decl::FunctionClause {
                patterns,
                infix,
                with_patterns,
                with_expr,
                rhs,
                ..
            } => {
                match (infix, patterns.as_slice()) {
                    (true, [op, left, right]) => {
                        self.print_expr(left);
                        self.write(" ");
                        self.print_expr(op);
                        self.write(" ");
                        self.print_expr(right);
                    }
                    _ => {
                        for (i, pattern) in patterns.iter().enumerate() {
                            if i > 0 {
                                self.write(" ");
                            }
                            self.print_expr(pattern);
                        }
                    }
                }
                for pattern in with_patterns {
                    self.write(" | ");
                    self.print_expr(pattern);
                }
                if let Some(expr) = with_expr {
                    self.write(" with ");
                    self.print_expr(expr);
                }
                if let Some(expr) = rhs {
                    self.write(" = ");
                    self.print_expr(expr);
                }
            }
            Decl::Fixity {
                assoc,
                precedence,
                operators,
                ..
            } => {
                self.write(&format!(
                    "{} {} {}",
                    assoc.keyword(),
                    precedence,
                    names_text(operators)
                ));
            }
        }
    }

    fn print_header_rest(&mut self, params: &[TypedParam], ty: Option<&Expr>) {
        for param in params {
            self.write(" ");
            self.print_typed_param(param);
        }
        if let Some(ty) = ty {
            self.write(" : ");
            self.print_expr(ty);
        }
    }

    fn print_constructor(&mut self, ctor: &Constructor) {
        self.write(&names_text(&ctor.names));
        self.write(" : ");
        self.print_expr(&ctor.ty);
    }

    fn print_field(&mut self, field: &Field) {
        self.write("field ");
        self.write(&names_text(&field.names));
        self.write(" : ");
        self.print_expr(&field.ty);
    }

    fn print_typed_param(&mut self, param: &TypedParam) {
        self.write(if param.implicit { "{" } else { "(" });
        self.write(&names_text(&param.names));
        self.write(" : ");
        self.print_expr(&param.ty);
        self.write(if param.implicit { "}" } else { ")" });
    }

    fn print_bindings(&mut self, bindings: &[Binding]) {
        for (i, binding) in bindings.iter().enumerate() {
            if i > 0 {
                self.write(" ");
            }
            match binding {
                Binding::Name(name) => self.write(&name_text(name)),
                Binding::Typed(param) => self.print_typed_param(param),
            }
        }
    }

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name { name, .. } => self.write(&name.to_string()),
            Expr::Hole { .. } => self.write("_"),
            Expr::Unit { .. } => self.write("()"),
            Expr::TypeUniverse { .. } => self.write("Type"),
            Expr::IntLit { value, .. } => self.write(&value.to_string()),
            Expr::Paren { expr, .. } => {
                self.write("(");
                self.print_expr(expr);
                self.write(")");
            }
            Expr::RecordConstruction {
                constructor,
                fields,
                ..
            } => {
                self.write("record ");
                if let Some(ctor) = constructor {
                    self.write(&ctor.to_string());
                    self.write(" ");
                }
                self.write("{");
                for (i, field) in fields.iter().enumerate() {
                    self.write(if i == 0 { " " } else { " ; " });
                    self.write(&name_text(&field.name));
                    self.write(" = ");
                    self.print_expr(&field.value);
                }
                self.write(" }");
            }
            Expr::Arrow {
                domain, codomain, ..
            } => {
                match domain {
                    ArrowDomain::Params(params) => {
                        for (i, param) in params.iter().enumerate() {
                            if i > 0 {
                                self.write(" ");
                            }
                            self.print_typed_param(param);
                        }
                    }
                    ArrowDomain::Expr(domain) => self.print_expr(domain),
                }
                self.write(" -> ");
                self.print_expr(codomain);
            }
            Expr::Lambda { bindings, body, .. } => {
                self.write("\\");
                self.print_bindings(bindings);
                self.write(" -> ");
                self.print_expr(body);
            }
            Expr::Forall { params, body, .. } => {
                self.write("forall ");
                self.print_bindings(params);
                self.write(" -> ");
                self.print_expr(body);
            }
            Expr::LetIn { decls, body, .. } => {
                self.write("let");
                self.print_block_inline(decls);
                self.write(" in ");
                self.print_expr(body);
            }
            Expr::App { func, arg, .. } => {
                self.print_expr(func);
                self.write(" ");
                self.print_expr(arg);
            }
            Expr::Infix {
                op, left, right, ..
            } => {
                self.print_expr(left);
                self.write(" ");
                self.write(&name_text(op));
                self.write(" ");
                self.print_expr(right);
            }
        }
    }
}

/// S-expression view of an expression: `(+ a (f b))`
pub fn dump_expr(expr: &Expr) -> String {
    match expr {
        Expr::Name { name, .. } => name.to_string(),
        Expr::Hole { .. } => "_".to_string(),
        Expr::Unit { .. } => "()".to_string(),
        Expr::TypeUniverse { .. } => "Type".to_string(),
        Expr::IntLit { value, .. } => value.to_string(),
        Expr::Paren { expr, .. } => dump_expr(expr),
        Expr::RecordConstruction {
            constructor,
            fields,
            ..
        } => {
            let mut parts = vec!["record".to_string()];
            if let Some(ctor) = constructor {
                parts.push(ctor.to_string());
            }
            for field in fields {
                parts.push(format!("({} {})", name_text(&field.name), dump_expr(&field.value)));
            }
            format!("({})", parts.join(" "))
        }
        Expr::Arrow {
            domain, codomain, ..
        } => {
            let domain = match domain {
                ArrowDomain::Params(params) => format!(
                    "[{}]",
                    params.iter().map(dump_param).collect::<Vec<_>>().join(" ")
                ),
                ArrowDomain::Expr(expr) => dump_expr(expr),
            };
            format!("(-> {} {})", domain, dump_expr(codomain))
        }
        Expr::Lambda { bindings, body, .. } => {
            format!("(\\ ({}) {})", dump_bindings(bindings), dump_expr(body))
        }
        Expr::Forall { params, body, .. } => {
            format!("(forall ({}) {})", dump_bindings(params), dump_expr(body))
        }
        Expr::LetIn { decls, body, .. } => {
            format!("(let ({}) {})", dump_decls(decls), dump_expr(body))
        }
        Expr::App { .. } => {
            let mut spine = Vec::new();
            let mut head = expr;
            while let Expr::App { func, arg, .. } = head {
                spine.push(dump_expr(arg));
                head = func;
            }
            spine.push(dump_expr(head));
            spine.reverse();
            format!("({})", spine.join(" "))
        }
        Expr::Infix {
            op, left, right, ..
        } => format!(
            "({} {} {})",
            name_text(op),
            dump_expr(left),
            dump_expr(right)
        ),
    }
}

fn dump_param(param: &TypedParam) -> String {
    let (open, close) = if param.implicit { ("{", "}") } else { ("(", ")") };
    format!(
        "{}{} : {}{}",
        open,
        names_text(&param.names),
        dump_expr(&param.ty),
        close
    )
}

fn dump_bindings(bindings: &[Binding]) -> String {
    bindings
        .iter()
        .map(|b| match b {
            Binding::Name(name) => name_text(name),
            Binding::Typed(param) => dump_param(param),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn dump_decls(decls: &[Decl]) -> String {
    decls.iter().map(dump_decl).collect::<Vec<_>>().join(" ")
}

fn dump_header(head: &str, name: String, params: &[TypedParam], ty: Option<&Expr>) -> Vec<String> {
    let mut parts = vec![head.to_string(), name];
    parts.extend(params.iter().map(dump_param));
    if let Some(ty) = ty {
        parts.push(format!("(: {})", dump_expr(ty)));
    }
    parts
}

/// S-expression view of a declaration
pub fn dump_decl(decl: &Decl) -> String {
    let parts = match decl {
        Decl::Data {
            name,
            params,
            ty,
            constructors,
            ..
        } => {
            let mut parts = dump_header("data", name_text(name), params, ty.as_ref());
            let ctors: Vec<String> = constructors
                .iter()
                .map(|c| format!("({} : {})", names_text(&c.names), dump_expr(&c.ty)))
                .collect();
            parts.push(format!("(where{})", prefixed(&ctors)));
            parts
        }
        Decl::EmptyData {
            name, params, ty, ..
        } => dump_header("data", name_text(name), params, ty.as_ref()),
        Decl::Record {
            name,
            params,
            ty,
            constructor,
            fields,
            decls,
            ..
        } => {
            let mut parts = dump_header("record", name_text(name), params, ty.as_ref());
            let mut items = Vec::new();
            if let Some(ctor) = constructor {
                items.push(format!("(constructor {})", name_text(ctor)));
            }
            items.extend(
                fields
                    .iter()
                    .map(|f| format!("(field {} : {})", names_text(&f.names), dump_expr(&f.ty))),
            );
            items.extend(decls.iter().map(dump_decl));
            parts.push(format!("(where{})", prefixed(&items)));
            parts
        }
        Decl::Module {
            name,
            params,
            decls,
            ..
        } => {
            let mut parts = dump_header("module", name.to_string(), params, None);
            let items: Vec<String> = decls.iter().map(dump_decl).collect();
            parts.push(format!("(where{})", prefixed(&items)));
            parts
        }
        Decl::Import { kind, module, .. } => {
            let head = match kind {
                ImportKind::Import => "import",
                ImportKind::Open => "open",
                ImportKind::OpenImport => "open import",
            };
            vec![head.to_string(), module.to_string()]
        }
        Decl::Function { names, ty, .. } => {
            vec![
                "sig".to_string(),
                names_text(names),
                ":".to_string(),
                dump_expr(ty),
            ]
        }
        Decl::FunctionClause {
            patterns,
            infix,
            with_patterns,
            with_expr,
            rhs,
            where_decls,
            ..
        } => {
            let head = if *infix { "clause-infix" } else { "clause" };
            let pats: Vec<String> = patterns.iter().map(dump_expr).collect();
            let mut parts = vec![head.to_string(), format!("({})", pats.join(" "))];
            parts.extend(with_patterns.iter().map(|p| format!("(| {})", dump_expr(p))));
            if let Some(expr) = with_expr {
                parts.push(format!("(with {})", dump_expr(expr)));
            }
            if let Some(expr) = rhs {
                parts.push(format!("(= {})", dump_expr(expr)));
            }
            if !where_decls.is_empty() {
                parts.push(format!("(where {})", dump_decls(where_decls)));
            }
            parts
        }
        Decl::Fixity {
            assoc,
            precedence,
            operators,
            ..
        } => vec![
            assoc.keyword().to_string(),
            precedence.to_string(),
            names_text(operators),
        ],
    };
    format!("({})", parts.join(" "))
}

fn prefixed(items: &[String]) -> String {
    items.iter().map(|item| format!(" {}", item)).collect()
}

/// One line per top-level declaration
pub fn dump_file(file: &SourceFile) -> String {
    let mut out = String::new();
    for decl in &file.decls {
        out.push_str(&dump_decl(decl));
        out.push('\n');
    }
    out
}

/// One line per token: position, then the token
pub fn dump_tokens(tokens: &[SpannedToken]) -> String {
    let mut out = String::new();
    for tok in tokens {
        out.push_str(&format!("{}:{} {}\n", tok.line, tok.column, tok.token));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn reprint(source: &str) -> String {
        let parsed = parse(source);
        assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
        print_file(&parsed.file)
    }

    #[test]
    fn test_print_simple_decls() {
        assert_eq!(reprint("id : (A : Type) -> A -> A"), "id : (A : Type) -> A -> A\n");
        assert_eq!(reprint("open import  Data.Nat"), "open import Data.Nat\n");
        assert_eq!(reprint("infixl 6 + -"), "infixl 6 + -\n");
    }

    #[test]
    fn test_print_nested_layout() {
        let source = "module M where\n  data Nat : Type where\n    zero : Nat\n    suc : Nat -> Nat\n  f x = g x\n    where\n      g y = y\n";
        assert_eq!(
            reprint(source),
            "module M where\n  data Nat : Type where\n    zero : Nat\n    suc : Nat -> Nat\n  f x = g x where\n    g y = y\n"
        );
    }

    #[test]
    fn test_print_let_uses_braces() {
        assert_eq!(
            reprint("f = let x = a\n        y = b in g x y"),
            "f = let { x = a ; y = b } in g x y\n"
        );
    }

    #[test]
    fn test_dump_expr_shapes() {
        let parsed = parse("infixl 6 +\nx = f (a + b) c + record P { y = _ }");
        assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
        let dumped = dump_file(&parsed.file);
        assert_eq!(
            dumped,
            "(infixl 6 +)\n(clause (x) (= (+ (f (+ a b) c) (record P (y _)))))\n"
        );
    }

    #[test]
    fn test_dump_tokens_shows_layout() {
        let (tokens, _) = crate::lexer::tokenize("a = b", &Default::default());
        let dumped = dump_tokens(&tokens);
        assert!(dumped.starts_with("1:1 {layout\n1:1 a\n"));
        assert!(dumped.ends_with("1:6 layout}\n1:6 end of file\n"), "{}", dumped);
    }
}
