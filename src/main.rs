//! clox CLI: evaluate expressions from a file, the command line or the REPL.

use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::process;

use cloxvm::repl::Repl;
use cloxvm::{interpret_with, Config};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI command to execute.
enum Command {
    /// Run a script file
    Run { file: String },
    /// Evaluate a string
    Eval { code: String },
    /// Start the REPL
    Repl,
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    print_code: bool,
    trace: bool,
    verbose: bool,
}

fn print_usage() {
    eprintln!("clox {} - bytecode expression evaluator", VERSION);
    eprintln!();
    eprintln!("Usage: clox [options] [script]");
    eprintln!("       clox [options] -e <expression>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>       Evaluate an expression and print the result");
    eprintln!("  --print-code    Print the compiled chunk before running it");
    eprintln!("  --trace         Trace the stack and each instruction while running");
    eprintln!("  --verbose, -v   Enable debug logging");
    eprintln!("  --help, -h      Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CLOX_PRINT_CODE, CLOX_TRACE   Same as the flags (1/true/yes/on)");
    eprintln!("  CLOX_LOG                      Log filter (falls back to RUST_LOG)");
    eprintln!();
    eprintln!("With no script, starts an interactive REPL.");
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options {
        command: Command::Repl,
        print_code: false,
        trace: false,
        verbose: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--print-code" => options.print_code = true,
            "--trace" => options.trace = true,
            "--verbose" | "-v" => options.verbose = true,
            "-e" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("-e requires a code argument");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Eval {
                    code: args[i].clone(),
                };
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(64);
            }
            _ => {
                if !matches!(options.command, Command::Repl) {
                    eprintln!("Only one script file or expression can be specified");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Run { file: arg.clone() };
            }
        }
        i += 1;
    }

    options
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cloxvm=debug")
    } else {
        EnvFilter::try_from_env("CLOX_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let options = parse_args();
    init_logging(options.verbose);
    colored::control::set_override(io::stderr().is_terminal());

    let mut config = Config::from_env();
    if options.print_code {
        config = config.with_print_code(true);
    }
    if options.trace {
        config = config.with_trace_execution(true);
    }

    match &options.command {
        Command::Repl => run_repl(config),
        Command::Run { file } => run_file(file, &config),
        Command::Eval { code } => run_source(code, &config),
    }
}

fn run_repl(config: Config) {
    if let Err(e) = Repl::new(config).run() {
        eprintln!("Error: {}", e);
        process::exit(74);
    }
}

fn run_file(path: &str, config: &Config) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read file \"{}\": {}", path, e);
            process::exit(74);
        }
    };
    tracing::debug!(path, bytes = source.len(), "loaded script");
    run_source(&source, config);
}

fn run_source(source: &str, config: &Config) {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = interpret_with(source, config, &mut stdout.lock(), &mut stderr.lock());
    let code = result.exit_code();
    if code != 0 {
        process::exit(code);
    }
}
