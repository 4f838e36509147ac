use clap::{Parser, Subcommand};
use smartscript_parser::Document;
use std::path::Path;

#[derive(Parser)]
#[command(name = "smartscript")]
#[command(about = "SmartScript template parser and formatter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a template for errors
    Check {
        /// Input template file
        path: String,
    },

    /// Print the template as reconstructed from its syntax tree
    Fmt {
        /// Input template file
        path: String,

        /// Overwrite the file instead of printing to stdout
        #[arg(long)]
        write: bool,
    },

    /// Print the token stream, one token per line
    Tokens {
        /// Input template file
        path: String,
    },

    /// Print the parsed syntax tree
    Tree {
        /// Input template file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { path } => cmd_check(&path),
        Command::Fmt { path, write } => cmd_fmt(&path, write),
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Tree { path } => cmd_tree(&path),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_or_exit(path: &str) -> Document {
    let source = read_source(path);
    match smartscript_parser::Parser::parse(&source) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(path: &str) {
    let doc = parse_or_exit(path);

    // Also render, so a tree the formatter cannot handle is reported here
    if let Err(e) = smartscript_codegen::render(&doc) {
        eprintln!("{path}: {e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}

fn cmd_fmt(path: &str, write: bool) {
    let doc = parse_or_exit(path);

    let output = match smartscript_codegen::render(&doc) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };

    if !write {
        print!("{output}");
        return;
    }

    if let Err(e) = std::fs::write(path, &output) {
        eprintln!("Error writing {path}: {e}");
        std::process::exit(1);
    }
    eprintln!("Wrote: {path}");
}

fn cmd_tokens(path: &str) {
    let source = read_source(path);

    let tokens = match smartscript_lexer::Scanner::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };

    for token in tokens {
        println!("{}:{}\t{}", token.span.line, token.span.column, token.kind);
    }
}

fn cmd_tree(path: &str) {
    let doc = parse_or_exit(path);

    match smartscript_codegen::outline(&doc) {
        Ok(tree) => print!("{tree}"),
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    }
}
