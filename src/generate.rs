//! The generative collaborator: a text-in, text-out service consulted after
//! symbolic deduction. Only the boundary lives here.

use crate::config::{self, Settings};
use crate::{Error, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TIMEOUT: Duration = Duration::from_secs(300);

pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    system_instruction: String,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, system_instruction: String) -> Result<Self> {
        let http = HttpClient::builder().timeout(TIMEOUT).build()?;
        Ok(Self { api_key, model, system_instruction, http })
    }

    pub fn from_env(settings: &Settings) -> Result<Self> {
        Self::from_lookup(settings, |var| std::env::var(var).ok())
    }

    /// Fails with `Error::MissingCredential` before touching the instruction file.
    pub fn from_lookup(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = config::api_key_from(lookup)
            .ok_or(Error::MissingCredential { vars: config::API_KEY_VARS.to_vec() })?;
        let system_instruction = read_instruction(&settings.instruction_path)?;
        Self::new(api_key, settings.model.clone(), system_instruction)
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", ENDPOINT, self.model)
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content { role: None, parts: vec![Part { text: &self.system_instruction }] },
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig {
                temperature: 0.97,
                top_p: 0.97,
                thinking_config: ThinkingConfig { thinking_level: "HIGH" },
                media_resolution: "MEDIA_RESOLUTION_HIGH",
            },
            tools: vec![
                Tool::UrlContext {},
                Tool::CodeExecution {},
                Tool::GoogleSearch {},
            ],
        }
    }
}

impl Generator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, chars = prompt.len(), "sending prompt");
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&self.request(prompt))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response.text().unwrap_or_default()));
        }

        response.json::<GenerateResponse>()?.text()
    }
}

fn rejected(status: StatusCode, body: String) -> Error {
    Error::Collaborator(format!("{status}: {body}"))
}

/// Builds a `GeminiClient` from the environment on each call.
pub struct GeminiFromEnv<'a> {
    settings: &'a Settings,
}

impl<'a> GeminiFromEnv<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

impl Generator for GeminiFromEnv<'_> {
    fn generate(&self, prompt: &str) -> Result<String> {
        GeminiClient::from_env(self.settings)?.generate(prompt)
    }
}

pub fn read_instruction(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    thinking_config: ThinkingConfig,
    media_resolution: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_level: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Tool {
    UrlContext {},
    CodeExecution {},
    GoogleSearch {},
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Result<String> {
        let content = self
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .ok_or_else(|| Error::Collaborator("response has no candidates".to_owned()))?;
        let text: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
        Ok(text.join(""))
    }
}
