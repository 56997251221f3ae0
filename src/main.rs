use anyhow::Result;
use chainlog::config::{self, Settings};
use chainlog::generate::{GeminiFromEnv, Generator};
use chainlog::{infer, pipeline, Error};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Forward-chaining deduction with a generative fallback", long_about = None)]
struct Cli {
    /// Print the reference problem list and exit
    #[arg(long)]
    list: bool,

    /// Rule file, one `premise => conclusion` rule per line
    #[arg(long, default_value = "data/physics_rules.txt")]
    rules: PathBuf,

    /// Reference problem list shown by --list
    #[arg(long, default_value = "data/physics_problems.txt")]
    problems: PathBuf,

    /// System instruction sent to the generative service
    #[arg(long, default_value = "data/system_instruction.txt")]
    instruction: PathBuf,

    /// Round cap for forward chaining
    #[arg(long, default_value_t = infer::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Generative model id
    #[arg(long, default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Skip the generative stage
    #[arg(long)]
    offline: bool,

    /// Problem statement (words are joined by spaces)
    problem: Vec<String>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            rules_path: self.rules.clone(),
            problems_path: self.problems.clone(),
            instruction_path: self.instruction.clone(),
            model: self.model.clone(),
            run: infer::Config { max_depth: self.max_depth },
        }
    }

    fn problem(&self) -> String {
        if self.problem.is_empty() {
            config::DEFAULT_PROBLEM.to_owned()
        } else {
            self.problem.join(" ")
        }
    }
}

fn timed<R>(func: impl FnOnce() -> R) -> (Duration, R) {
    let start = Instant::now();
    let r = func();
    (start.elapsed(), r)
}

fn list_problems(path: &Path) {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            println!("\n=== Pre-defined Physics Problems ===\n");
            println!("{text}");
            println!("===================================\n");
        }
        Err(e) => tracing::error!("{}", Error::io(path, e)),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();
    if cli.list {
        list_problems(&settings.problems_path);
        return Ok(());
    }

    let problem = cli.problem();
    let gemini = GeminiFromEnv::new(&settings);
    let generator: Option<&dyn Generator> = if cli.offline {
        None
    } else {
        config::check_env();
        Some(&gemini)
    };

    let (dur, outcome) = timed(|| pipeline::run(&problem, &settings, generator));
    let outcome = outcome?;
    tracing::debug!("pipeline took {dur:?}, {} atom(s) known", outcome.store.len());

    if let Some(response) = outcome.response {
        println!("\n=== ALPHA-PHYSICS OUTPUT ===\n");
        println!("{response}");
        println!("\n============================\n");
    }
    Ok(())
}
