//! Command-line entry point of the LWB constant generator.
//!
//! # Usage
//!
//! ```bash
//! # Built-in configuration, write into the current directory
//! lwb-constgen
//!
//! # Custom configuration and output directory
//! lwb-constgen --config lwb.json --out firmware/protocol
//!
//! # Print the effective configuration
//! lwb-constgen --dump-config > lwb.json
//! ```

use log::{error, info};
use lwb_constgen::{generate, generate_to, LwbConfig, Sx1262Timing};
use std::path::PathBuf;
use std::process::exit;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    config: Option<PathBuf>,
    out: PathBuf,
    stdout: bool,
    dump_config: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Run(Options),
    Help,
}

fn usage(program: &str) -> String {
    format!(
        "LWB constant generator\n\n\
         Usage:\n  {} [OPTIONS]\n\n\
         Options:\n  \
         --config <file>  JSON configuration (built-in default if omitted)\n  \
         --out <dir>      Output directory (default: .)\n  \
         --stdout         Print the artifacts instead of writing them\n  \
         --dump-config    Print the effective configuration as JSON\n  \
         --help           Show this help",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = Options {
        config: None,
        out: PathBuf::from("."),
        stdout: false,
        dump_config: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config needs a file")?;
                options.config = Some(PathBuf::from(path));
            }
            "--out" | "-o" => {
                let dir = iter.next().ok_or("--out needs a directory")?;
                options.out = PathBuf::from(dir);
            }
            "--stdout" => options.stdout = true,
            "--dump-config" => options.dump_config = true,
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    Ok(Command::Run(options))
}

fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &options.config {
        Some(path) => LwbConfig::from_file(path)?,
        None => LwbConfig::default(),
    };

    if options.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    if options.stdout {
        let generated = generate(&config, &Sx1262Timing)?;
        print!("{}", generated.pair.header);
        println!();
        print!("{}", generated.pair.source);
        return Ok(());
    }

    let written = generate_to(&config, &Sx1262Timing, &options.out)?;
    info!(
        "Generated {} and {}",
        written.header.display(),
        written.source.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("lwb-constgen");

    let options = match parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            println!("{}", usage(program));
            return;
        }
        Err(e) => {
            eprintln!("{}\n\n{}", e, usage(program));
            exit(1);
        }
    };

    if let Err(e) = run(&options) {
        error!("{}", e);
        exit(1);
    }
}
