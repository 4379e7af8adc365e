//! `avl-range` — replay a query script against the AVL tree.
//!
//! Usage:
//!   avl-range [--compare] [SCRIPT]
//!
//! The script is read from the file `SCRIPT`, or from stdin when no path is given. Each range
//! count's answer is printed on its own line. With `--compare` the script is also replayed
//! against `std::collections::BTreeSet`; timings go to stderr and any disagreement makes the
//! process exit with status 1.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use avl_range::script::{self, Script, ScriptError};
use avl_range::Tree;

fn main() {
    let mut compare = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--compare" {
            compare = true;
        } else if arg == "-h" || arg == "--help" {
            println!("Usage: avl-range [--compare] [SCRIPT]");
            return;
        } else if path.is_none() {
            path = Some(arg);
        } else {
            eprintln!("Unexpected argument `{arg}`.");
            process::exit(1);
        }
    }

    let script = match read_script(path.as_deref()) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let answers = if compare {
        let comparison = script::compare(&script);
        eprintln!("tree:      {:.3} ms", comparison.tree.elapsed_milliseconds());
        eprintln!("reference: {:.3} ms", comparison.reference.elapsed_milliseconds());
        eprintln!("tree is {:.2}x slower than BTreeSet", comparison.slowdown());

        let mismatches = comparison.mismatches();
        for mismatch in &mismatches {
            eprintln!(
                "answer {} differs: tree {:?}, reference {:?}",
                mismatch.index, mismatch.tree, mismatch.reference
            );
        }
        if !mismatches.is_empty() {
            process::exit(1);
        }
        comparison.tree.answers
    } else {
        script.run(&mut Tree::<i64>::new()).answers
    };

    if let Err(e) = write_answers(&answers) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn read_script(path: Option<&str>) -> Result<Script, ScriptError> {
    match path {
        Some(path) => Script::read(File::open(path)?),
        None => Script::read(io::stdin().lock()),
    }
}

fn write_answers(answers: &[i64]) -> io::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for answer in answers {
        writeln!(out, "{answer}")?;
    }
    out.flush()
}
