//! CLI for one-shot prompts.

use crate::config::Config;
use crate::driver::GigaChatDriver;
use crate::provider::format_api_error;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// Prompt sent when none is given; any reply means the setup works.
pub const SMOKE_TEST_PROMPT: &str =
    "Привет! Я тестирую твой API и если ты пришлешь ответ это значит что все сработало!";

/// Send a prompt to GigaChat and print the reply
#[derive(Parser, Debug)]
#[command(name = "gigachat", version, about)]
pub struct Cli {
    /// The prompt to send (use "-" to read from stdin)
    pub prompt: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model to use (e.g., "GigaChat-Pro")
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum tokens in the reply
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Include file content as context
    #[arg(short = 'f', long = "file")]
    pub context_file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, default_value = "text", value_enum)]
    pub output_format: OutputFormat,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    model: &'a str,
    response: &'a str,
}

impl Cli {
    /// Resolve effective config.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Built-in defaults
    pub fn resolve_config(&self) -> Result<Config> {
        let path = self.config.clone().unwrap_or_else(Config::default_path);
        let mut config = Config::load_from(&path)?;

        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if self.insecure {
            config.insecure_skip_verify = true;
        }

        Ok(config)
    }

    /// Read the prompt from args or stdin, prepending any context file.
    pub fn read_prompt(&self) -> Result<String> {
        let prompt = match self.prompt.as_deref() {
            Some("-") => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read prompt from stdin")?;
                buffer.trim().to_string()
            }
            Some(prompt) => prompt.to_string(),
            None => SMOKE_TEST_PROMPT.to_string(),
        };

        let Some(file_path) = &self.context_file else {
            return Ok(prompt);
        };
        let content = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        Ok(format!(
            "Context from {}:\n```\n{}\n```\n\n{}",
            file_path.display(),
            content,
            prompt
        ))
    }
}

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity picks the level.
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "gigachat=debug",
        _ => "gigachat=trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub async fn run(cli: Cli) -> ExitCode {
    match run_inner(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", format_api_error(&format!("{e:#}")));
            ExitCode::from(1)
        }
    }
}

async fn run_inner(cli: Cli) -> Result<ExitCode> {
    let config = cli.resolve_config()?;
    let prompt = cli.read_prompt()?;
    if prompt.trim().is_empty() {
        anyhow::bail!("Prompt is empty");
    }

    let driver = GigaChatDriver::new(&config).await?;
    let result = driver.send_request(&prompt).await;
    driver.shutdown().await;
    let response = result?;

    match cli.output_format {
        OutputFormat::Text => println!("{response}"),
        OutputFormat::Json => {
            let json = serde_json::to_string(&JsonOutput {
                model: &config.model,
                response: &response,
            })?;
            println!("{json}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
