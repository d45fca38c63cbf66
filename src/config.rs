use std::env;

use crate::cli::Cli;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub instructions: String,
    pub role_marker: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_cli_with(cli, |key| env::var(key).ok())
    }

    fn from_cli_with(cli: &Cli, mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            api_key: parse_api_key(get_var(API_KEY_ENV).as_deref()),
            base_url: parse_base_url(get_var("GEMINI_BASE_URL").as_deref()),
            model: cli.model.clone(),
            instructions: cli.instructions.clone(),
            role_marker: cli
                .role_marker
                .clone()
                .filter(|marker| !marker.is_empty()),
        }
    }
}

fn parse_api_key(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_base_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}
