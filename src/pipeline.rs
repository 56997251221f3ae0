use crate::config::Settings;
use crate::generate::Generator;
use crate::{infer, parse, Atom, FactStore, Result};

pub const TARGET_PREDICATE: &str = "explained_constant";
pub const SEED_KEYWORD: &str = "Fine Structure Constant";

pub struct Outcome {
    pub report: infer::Report,
    pub explained: Vec<Atom>,
    pub store: FactStore,
    pub response: Option<String>,
}

/// Ground atoms implied by keywords in the problem text.
pub fn seed(store: &mut FactStore, problem: &str) {
    if problem.contains(SEED_KEYWORD) {
        store.add(Atom::ground("lattice_structure", &["L1", "D4"]));
        store.add(Atom::ground("degree_of_freedom", &["L1", "137"]));
    }
}

pub fn compose_prompt(store: &FactStore, problem: &str) -> String {
    format!(
        "\nCurrent Symbolic State: {store}\n\
         Problem Statement: {problem}\n\n\
         Based on the Hyper-Literal Reverse Engineering (HLRE) methodology, provide a mechanical \
         reconstruction and perform a Meta-Theoretical Validation.\n"
    )
}

/// Only an unreadable rule file is fatal; generative failures are logged.
pub fn run(problem: &str, settings: &Settings, generator: Option<&dyn Generator>) -> Result<Outcome> {
    tracing::info!("solving problem: {problem}");
    let rules = parse::parse_rules_file(&settings.rules_path)?;

    let mut store = FactStore::new();
    seed(&mut store, problem);

    tracing::info!("attempting symbolic deduction");
    let report = infer::solve_with(&mut store, &rules, &settings.run);
    tracing::info!("symbolic deduction reached depth {}", report.rounds);
    if !report.saturated {
        tracing::warn!("round cap {} hit before saturation", settings.run.max_depth);
    }

    let explained: Vec<Atom> = store.query(Some(TARGET_PREDICATE)).into_iter().cloned().collect();
    if explained.is_empty() {
        tracing::info!("symbolic engine saturated without a full explanation");
    } else {
        let shown: Vec<String> = explained.iter().map(Atom::to_string).collect();
        tracing::info!("symbolic engine explained: {}", shown.join(", "));
    }

    let response = generator.and_then(|generator| {
        match generator.generate(&compose_prompt(&store, problem)) {
            Ok(text) => Some(text),
            Err(e) if e.is_configuration() => {
                tracing::warn!("skipping generative stage due to configuration error: {e}");
                None
            }
            Err(e) => {
                tracing::error!("generative stage failed: {e}");
                None
            }
        }
    });

    Ok(Outcome { report, explained, store, response })
}
