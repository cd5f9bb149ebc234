//! Demo command-line tokenizer built on the `relex` crate.
//!
//! Mirrors the reference system's own `lexer_test`: one positional file
//! argument, exit 0 on success, non-zero on a usage or I/O error.

mod rules;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use relex::{Lexer, EOF_TOKEN_ID};

#[derive(Parser)]
#[command(about = "Tokenize a file with a regex-driven lexer")]
struct Args {
    /// File to tokenize.
    path: PathBuf,

    /// Optional rule file: lines of `<token-id> <token-name> <regex>`.
    /// Falls back to a built-in C-like rule set when omitted.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Raise the log verbosity (equivalent to RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

struct Rule {
    token_id: i32,
    name: String,
    regex: Vec<u8>,
}

fn parse_rule_file(text: &str) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(3, char::is_whitespace);
        let id_str = parts.next().context("missing token id")?;
        let name = parts.next().context("missing token name")?;
        let regex = parts
            .next()
            .with_context(|| format!("missing regex on line {}", lineno + 1))?;
        let token_id: i32 = id_str
            .parse()
            .with_context(|| format!("invalid token id on line {}", lineno + 1))?;
        rules.push(Rule {
            token_id,
            name: name.to_string(),
            regex: regex.as_bytes().to_vec(),
        });
    }
    Ok(rules)
}

fn built_in_rules() -> Vec<Rule> {
    rules::BUILT_IN
        .iter()
        .map(|&(token_id, name, regex)| Rule {
            token_id,
            name: name.to_string(),
            regex: regex.to_vec(),
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let rule_set = match &args.rules {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading rule file {}", path.display()))?;
            parse_rule_file(&text)?
        }
        None => built_in_rules(),
    };

    let names: std::collections::HashMap<i32, String> = rule_set
        .iter()
        .map(|r| (r.token_id, r.name.clone()))
        .collect();

    let mut lexer = Lexer::new();
    for rule in &rule_set {
        if let Err(e) = lexer.add_rule(&rule.regex, rule.token_id) {
            log::warn!("rule {} ({}) rejected: {}", rule.name, rule.token_id, e);
        }
    }

    let input = fs::read(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    lexer.set_stream(&input);
    lexer.build();

    let mut count = 0u64;
    loop {
        let token = lexer.next_token();
        if token.id == EOF_TOKEN_ID {
            println!("EOF reached");
            break;
        }
        count += 1;

        let name = names.get(&token.id).map(String::as_str).unwrap_or("?");
        let text = String::from_utf8_lossy(
            &input[token.index as usize..token.index as usize + token.length as usize],
        );
        println!("Token found.");
        println!("Index:\t{}", token.index);
        println!("Length:\t{}", token.length);
        println!("Id:\t{} ({})", token.id, name);
        println!("Line:\t{}", token.line);
        println!("Column:\t{}", token.column);
        println!("Contents:\n{}\n", text);
    }
    log::debug!("Total occurrences: {}", count);

    Ok(())
}
