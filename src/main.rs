use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::lox::{Lox, Status, EXIT_STATIC_ERROR};
use rox::scanner::Layout;
use rox::token::Token;

/// Process status for a malformed command line.
const EXIT_USAGE: i32 = 64;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,

    /// Delimit blocks by indentation instead of braces
    #[arg(long, global = true)]
    indent: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a Lox program from a file and prints its AST
    Parse { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Reads and runs programs line by line from stdin
    Repl,
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let source: String = fs::read_to_string(filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Write every recorded diagnostic to stderr.
fn print_errors(lox: &Lox) {
    for err in lox.diagnostics().errors() {
        eprintln!("{}", err);
    }
}

fn tokenize(lox: &mut Lox, filename: &Path, json: bool) -> Result<i32> {
    let source: String = read_file(filename)?;
    let tokens: Vec<Token> = lox.tokenize(&source);

    print_errors(lox);

    if json {
        let rendered = serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
        println!("{}", rendered);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if lox.diagnostics().had_error() {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC_ERROR);
        return Ok(EXIT_STATIC_ERROR);
    }

    info!("Tokenization completed successfully");
    Ok(0)
}

fn parse(lox: &mut Lox, filename: &Path) -> Result<i32> {
    let source: String = read_file(filename)?;

    match lox.parse(&source) {
        Some(statements) => {
            let ast: String = AstPrinter::print_program(&statements);
            debug!("AST: {}", ast);
            println!("{}", ast);
            Ok(0)
        }
        None => {
            print_errors(lox);
            Ok(EXIT_STATIC_ERROR)
        }
    }
}

fn run(lox: &mut Lox, filename: &Path) -> Result<i32> {
    let source: String = read_file(filename)?;

    let status: Status = lox.run(&source);
    print_errors(lox);

    info!("Program finished: {:?}", status);
    Ok(status.exit_code())
}

fn repl(lox: &mut Lox) -> Result<i32> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(0);
        }

        match lox.run(&line) {
            Status::Completed(value) => println!("{}", value),
            Status::Exit(code) => return Ok(code),
            Status::StaticError | Status::RuntimeError => print_errors(lox),
        }

        lox.reset();
    }
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code: i32 = if err.use_stderr() { EXIT_USAGE } else { 0 };
            err.print()?;
            process::exit(code);
        }
    };

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let layout: Layout = if args.indent {
        Layout::Indentation
    } else {
        Layout::Braces
    };
    let mut lox = Lox::new(layout);

    let code: i32 = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(&mut lox, filename, *json)?,
        Commands::Parse { filename } => parse(&mut lox, filename)?,
        Commands::Run { filename } => run(&mut lox, filename)?,
        Commands::Repl => repl(&mut lox)?,
    };

    if code != 0 {
        process::exit(code);
    }

    Ok(())
}
