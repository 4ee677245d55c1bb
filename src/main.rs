use silt_syntax::lexer::{lex_recovering, tokenize};
use silt_syntax::options::ParseOptions;
use silt_syntax::parser::parse_bytes;
use silt_syntax::pretty::{dump_file, dump_tokens, print_file};

const MODES: &[&str] = &["check", "tokens", "layout", "ast", "sexpr"];

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} [{}] <source-file>", program, MODES.join("|"));
    eprintln!("\nOr pipe source to stdin:");
    eprintln!("  echo 'id x = x' | {} sexpr -", program);
    std::process::exit(1);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("silt-syntax");

    let (mode, input) = match args.len() {
        2 => ("check", args[1].as_str()),
        3 if MODES.contains(&args[1].as_str()) => (args[1].as_str(), args[2].as_str()),
        _ => usage(program),
    };

    // Read from file or stdin
    let bytes = if input == "-" {
        use std::io::Read;
        let mut buffer = Vec::new();
        if let Err(e) = std::io::stdin().read_to_end(&mut buffer) {
            eprintln!("Error reading stdin: {}", e);
            std::process::exit(1);
        }
        buffer
    } else {
        std::fs::read(input).unwrap_or_else(|e| {
            eprintln!("Error reading file '{}': {}", input, e);
            std::process::exit(1);
        })
    };

    let options = ParseOptions::default();
    let parsed = match parse_bytes(&bytes, &options) {
        Ok(parsed) => parsed,
        Err(diagnostic) => {
            eprintln!("{}: {}", input, diagnostic);
            std::process::exit(1);
        }
    };
    // parse_bytes succeeded, so the input is valid UTF-8
    let source = String::from_utf8_lossy(&bytes);

    match mode {
        "tokens" => {
            let (tokens, _) = lex_recovering(&source, options.tab_width);
            print!("{}", dump_tokens(&tokens));
        }
        "layout" => {
            let (tokens, _) = tokenize(&source, &options);
            print!("{}", dump_tokens(&tokens));
        }
        "ast" => print!("{}", print_file(&parsed.file)),
        "sexpr" => print!("{}", dump_file(&parsed.file)),
        _ => {}
    }

    for diagnostic in &parsed.diagnostics {
        eprintln!("{}:{}", input, diagnostic.render(&source));
    }
    if parsed.has_errors() {
        std::process::exit(1);
    }
}
