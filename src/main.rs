use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use intcode::{max_signal, parse_image, search_noun_verb, Program, Value, VmError};

#[derive(Parser)]
#[command(name = "intcode", version, about = "Runs Intcode programs")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a program, printing every value it emits on its own line.
  Run {
    /// File holding the comma separated program image.
    file: PathBuf,
    /// Input values, consumed in order.
    #[arg(short, long = "input", allow_negative_numbers = true)]
    inputs: Vec<Value>,
    /// Print the registers and memory after the run.
    #[arg(long)]
    dump: bool,
  },
  /// Find the phase setting ordering producing the largest signal.
  Amplify {
    file: PathBuf,
    /// Phase setting values to permute.
    #[arg(long, value_delimiter = ',', default_value = "5,6,7,8,9")]
    phases: Vec<Value>,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    signal: Value,
  },
  /// Find the noun and verb that leave `target` at address 0.
  Search {
    file: PathBuf,
    #[arg(long, allow_negative_numbers = true)]
    target: Value,
    /// Nouns and verbs are tried in `0..limit`.
    #[arg(long, default_value_t = 100)]
    limit: Value,
  },
}

fn load(file: &Path) -> Result<Vec<Value>, String> {
  let text = fs::read_to_string(file)
    .map_err(|e| format!("could not read {}: {}", file.display(), e))?;
  parse_image(&text).map_err(|e: VmError| format!("{}: {}", file.display(), e))
}

fn execute(command: Command) -> Result<(), String> {
  match command {

    Command::Run{ file, inputs, dump } => {
      let image = load(&file)?;
      let mut program = Program::with_io(&image);
      program.input().extend(inputs);
      let result = program.run();
      for value in program.drain_output() {
        println!("{}", value);
      }
      if dump {
        println!("{}", program);
      }
      let state = result.map_err(|e| e.to_string())?;
      info!("program stopped: {}", state);
    }

    Command::Amplify{ file, phases, signal } => {
      let image = load(&file)?;
      let (best, signal) = max_signal(&image, &phases, signal).map_err(|e| e.to_string())?;
      println!(
        "{} {}",
        best.iter().map(Value::to_string).collect::<Vec<String>>().join(","),
        signal
      );
    }

    Command::Search{ file, target, limit } => {
      let image = load(&file)?;
      match search_noun_verb(&image, target, 0..limit) {
        Some((noun, verb)) => println!("{}", 100 * noun + verb),
        None => return Err(format!("no noun and verb below {} produce {}", limit, target)),
      }
    }

  }
  Ok(())
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

  let cli = Cli::parse();
  if let Err(message) = execute(cli.command) {
    eprintln!("Error: {}", message);
    process::exit(1);
  }
}
