//! fungll CLI - interactive generalized LL parsing.
//!
//! `fungll [grammar.bnf]` starts the REPL, loading the grammar first if given.

use std::io::{stdin, stdout, BufReader, Write};

use fungll::cli::Repl;

fn main() {
    fungll::trace::init_subscriber();

    let mut repl = Repl::new();
    let mut output = stdout().lock();

    if let Some(path) = std::env::args().nth(1) {
        match repl.load(&path) {
            Ok(msg) => {
                let _ = writeln!(output, "{}", msg);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut input = BufReader::new(stdin().lock());
    if let Err(e) = repl.run(&mut input, &mut output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
