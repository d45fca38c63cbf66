pub mod agent;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod inputs;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, error};

use agent::Agent;
use cli::Cli;
use config::Config;
use logging::LogSettings;
use model::GenerateResult;
use model_gateway::HostModelGateway;

pub async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init(&LogSettings::from_env(cli.debug));

    let cfg = Config::from_cli(&cli);
    debug!(
        model = %cfg.model,
        base_url = %cfg.base_url,
        api_key_present = cfg.api_key.is_some(),
        message_count = cli.messages.len(),
        input_count = cli.inputs.len(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let mut messages = cli.messages.clone();
    let bundle = inputs::process_input_files(&cli.inputs);
    messages.extend(bundle.text_content);

    let agent = Agent::new(HostModelGateway::new(&client, &cfg), &cfg);
    let outcome = agent.respond(&messages, &bundle.upload_files).await;

    let stdout = io::stdout();
    let printed = present(&outcome, &mut stdout.lock()).context("Failed to write response")?;
    Ok(if printed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Writes the response and reports whether there was one to write.
pub fn present(outcome: &GenerateResult<Vec<String>>, out: &mut impl Write) -> io::Result<bool> {
    match outcome {
        Ok(parts) => {
            writeln!(out, "{}", parts.concat())?;
            out.flush()?;
            Ok(true)
        }
        Err(err) => {
            error!(kind = err.kind(), error = %err, "No response received from Gemini API");
            Ok(false)
        }
    }
}
