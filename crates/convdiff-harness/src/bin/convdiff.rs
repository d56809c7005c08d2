#![forbid(unsafe_code)]

use convdiff_core::HarnessSettings;
use convdiff_harness::phase::CommandPhases;
use convdiff_harness::suite::Orchestrator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process::ExitCode;

#[derive(Debug, Clone)]
struct CliArgs {
    test_index: Option<usize>,
}

#[derive(Debug, Clone)]
enum CliParseError {
    Help,
    Message(String),
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, CliParseError> {
    let mut test_index = None;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Err(CliParseError::Help),
            "-t" | "--test" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --test",
                    )));
                };
                let parsed = value.parse::<usize>().map_err(|_| {
                    CliParseError::Message(format!("--test expects a positive integer, got `{value}`"))
                })?;
                test_index = Some(parsed);
                index += 2;
            }
            unknown => {
                return Err(CliParseError::Message(format!(
                    "unrecognized argument `{unknown}`"
                )));
            }
        }
    }

    Ok(CliArgs { test_index })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [-t|--test <index>]");
    eprintln!("  -t, --test <index>  run one 1-based test case verbosely");
    eprintln!("                      (default: run the full configured suite)");
    eprintln!();
    eprintln!("Settings are read from config.txt in the working directory.");
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| String::from("convdiff"));

    let args = match parse_cli_args(&argv[1..]) {
        Ok(args) => args,
        Err(CliParseError::Help) => {
            print_usage(&program);
            return ExitCode::SUCCESS;
        }
        Err(CliParseError::Message(message)) => {
            eprintln!("{message}");
            print_usage(&program);
            return ExitCode::from(2);
        }
    };

    let workdir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(error) => {
            eprintln!("cannot determine working directory: {error}");
            return ExitCode::from(2);
        }
    };

    let settings = HarnessSettings::load(&workdir.join("config.txt"));
    let phases = CommandPhases::new(workdir.clone());
    let mut orchestrator =
        Orchestrator::new(&settings, workdir, phases, StdRng::from_os_rng());

    println!("Running...");
    match args.test_index {
        Some(index) => {
            if let Err(error) = orchestrator.run_single(index) {
                eprintln!("{error}");
            }
        }
        None => {
            let summary = orchestrator.run_all();
            match orchestrator.write_run_report(&summary) {
                Ok(path) => println!("Run report written to {}", path.display()),
                Err(error) => eprintln!("{error}"),
            }
        }
    }

    // Verdicts are reported as text; the process exit code stays at the
    // default success for test failures.
    ExitCode::SUCCESS
}
