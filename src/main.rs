use std::fs;

use clap::Parser;
use quill::Script;

/// quill is an easy to embed scripting language for expressions, templates,
/// and small host-driven scripts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells quill to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode is a feature that automatically prints out the final value
    /// of a quill script.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Limits the run to this many operations (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    max_ops: u64,

    /// Limits the run to this many milliseconds (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,

    contents: String,
}

fn main() {
    let args = Args::parse();

    let script = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        })
    } else {
        args.contents
    };

    let result = Script::new(script).max_ops(args.max_ops)
                                    .timeout_ms(args.timeout_ms)
                                    .run();

    for error in &result.errors {
        eprintln!("{error}");
    }
    if args.pipe_mode && result.errors.is_empty() {
        println!("{}", result.value);
    }
    if !result.errors.is_empty() {
        std::process::exit(1);
    }
}
