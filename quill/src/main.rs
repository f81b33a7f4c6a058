//! Quill Interpreter CLI

use clap::{Parser, Subcommand};
use quill::interp::{Interpreter, StdConsole};
use quill::program::Program;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quill", version, about = "Quill - a small teaching language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Quill source file
    Run {
        /// Source file to run
        file: PathBuf,
        /// Echo each statement to stderr before executing it
        #[arg(long)]
        trace: bool,
    },
    /// Tokenize and dump statements (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Dump the discovered functions as JSON (debug)
    Funcs {
        /// Source file to inspect
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { file, trace } => run_file(&file, trace),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Funcs { file } => dump_funcs(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_file(path: &PathBuf, trace: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let mut console = StdConsole;
    let result = Program::parse(&source)
        .and_then(|program| Ok(Interpreter::new(program, &mut console)?.with_trace(trace)))
        .and_then(|mut interp| interp.run());

    if let Err(e) = result {
        quill::error::report_error(&filename, &source, &e);
        std::process::exit(1);
    }
    Ok(())
}

fn tokenize_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let program = Program::parse(&source)?;
    for (line, tokens) in program.statements.iter().enumerate() {
        println!("{:4}  {:?}", line + 1, tokens);
    }
    Ok(())
}

fn dump_funcs(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let program = Program::parse(&source)?;
    let funcs = quill::interp::FunctionTable::build(&program)?;
    println!("{}", serde_json::to_string_pretty(&funcs.summaries())?);
    Ok(())
}
