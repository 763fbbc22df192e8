use std::env;

use crate::bracket::DEFAULT_ROOT_COUNT;
use crate::store::sheets::DEFAULT_API_BASE;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://rigsketball.onarchival.dev";

/// How the range store authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Service-account key file contents, exchanged for short-lived tokens
    ServiceAccount(String),
    /// A pre-issued access token, used as is
    Token(String),
}

/// Runtime settings, read once from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub sheet_id: String,
    pub credential: Credential,
    pub api_base: String,
    pub allowed_origins: Vec<String>,
    /// Skips origin enforcement for local development
    pub dev: bool,
    pub bracket_roots: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(non_empty_var)
    }

    /// Builds the config from any key lookup that returns trimmed, non-empty values
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| format!("{key} is not set; set it in the shell environment."))
        };

        let bracket_roots = match lookup("BRACKET_ROOTS") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("BRACKET_ROOTS must be a positive number, got '{raw}'"))?,
            None => DEFAULT_ROOT_COUNT,
        };

        let credential = match (lookup("GOOGLE_AUTH"), lookup("SHEETS_TOKEN")) {
            (Some(blob), _) => Credential::ServiceAccount(blob),
            (None, Some(token)) => Credential::Token(token),
            (None, None) => return Err("GOOGLE_AUTH is not set; set it to the service account JSON.".to_string()),
        };

        Ok(AppConfig {
            sheet_id: required("SHEET_ID")?,
            credential,
            api_base: lookup("SHEETS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]),
            dev: lookup("SIGNUP_DEV").map(|raw| is_truthy(&raw)).unwrap_or(false),
            bracket_roots,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

/// Comma-separated origins, trailing slashes removed
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
