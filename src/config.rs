use crate::infer;
use std::path::PathBuf;

pub const DEFAULT_PROBLEM: &str =
    "Explain the mechanical origin of the Fine Structure Constant (approx. 1/137) using HLRE.";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Checked in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "JULES_API_KEY"];

#[derive(Debug, Clone)]
pub struct Settings {
    pub rules_path: PathBuf,
    pub problems_path: PathBuf,
    pub instruction_path: PathBuf,
    pub model: String,
    pub run: infer::Config,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_path: "data/physics_rules.txt".into(),
            problems_path: "data/physics_problems.txt".into(),
            instruction_path: "data/system_instruction.txt".into(),
            model: DEFAULT_MODEL.to_owned(),
            run: infer::Config::default(),
        }
    }
}

/// First non-empty key among `API_KEY_VARS`.
pub fn api_key() -> Option<String> {
    api_key_from(|var| std::env::var(var).ok())
}

pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|key| !key.trim().is_empty())
}

/// Warns when no credential is set; deduction still runs without one.
pub fn check_env() -> bool {
    if api_key().is_some() {
        return true;
    }
    tracing::warn!("no API key found in environment ({})", API_KEY_VARS.join(" or "));
    tracing::warn!("symbolic deduction will still run, but the generative stage will be skipped");
    false
}
