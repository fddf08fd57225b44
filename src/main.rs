use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::{Builder, Env};
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::scan;
use rox::{parse, resolve, Interpreter, LoxError};

/// Exit status for scan, parse and resolve errors.
const EXIT_STATIC_ERROR: i32 = 65;
/// Exit status for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token stream as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt (the default)
    Repl,
}

/// Reads a whole source file as UTF‑8 text.
fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::from_env(Env::default().default_filter_or("debug"))
        .format(|buf, record| {
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
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        debug!("Reporting: {:?}", e);
        eprintln!("{}", e);
    }
}

fn tokenize(filename: PathBuf, json: bool) -> Result<()> {
    let source = read_file(&filename)?;
    let (tokens, errors) = scan(&source);

    report(&errors);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if !errors.is_empty() {
        process::exit(EXIT_STATIC_ERROR);
    }

    Ok(())
}

fn parse_expression(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;
    let (tokens, errors) = scan(&source);

    if !errors.is_empty() {
        report(&errors);
        process::exit(EXIT_STATIC_ERROR);
    }

    match Parser::new(&tokens).parse_expression() {
        Ok(expr) => println!("{}", AstPrinter::print(&expr)),
        Err(errors) => {
            report(&errors);
            process::exit(EXIT_STATIC_ERROR);
        }
    }

    Ok(())
}

fn evaluate(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;
    let (tokens, errors) = scan(&source);

    if !errors.is_empty() {
        report(&errors);
        process::exit(EXIT_STATIC_ERROR);
    }

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) => expr,
        Err(errors) => {
            report(&errors);
            process::exit(EXIT_STATIC_ERROR);
        }
    };

    let mut interpreter = Interpreter::new();
    match interpreter.evaluate(&expr) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            report(&[e]);
            process::exit(EXIT_RUNTIME_ERROR);
        }
    }

    Ok(())
}

fn run_file(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;

    let (tokens, mut errors) = scan(&source);
    let (statements, parse_errors) = parse(&tokens);
    errors.extend(parse_errors);

    if !errors.is_empty() {
        report(&errors);
        process::exit(EXIT_STATIC_ERROR);
    }

    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::new();

    let errors = resolve(&statements, &mut interpreter);
    if !errors.is_empty() {
        report(&errors);
        process::exit(EXIT_STATIC_ERROR);
    }

    if let Err(e) = interpreter.interpret(&statements) {
        report(&[e]);
        process::exit(EXIT_RUNTIME_ERROR);
    }

    info!("Program executed successfully");
    Ok(())
}

fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if lines.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        // Each line starts clean; earlier globals survive failed lines.
        if let Err(errors) = rox::run(&line, &mut interpreter) {
            report(&errors);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // RUST_LOG still works; otherwise stay silent.
        Builder::from_env(Env::default().default_filter_or("off")).init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(filename, json),
        Commands::Parse { filename } => parse_expression(filename),
        Commands::Evaluate { filename } => evaluate(filename),
        Commands::Run { filename } => run_file(filename),
        Commands::Repl => repl(),
    }
}
