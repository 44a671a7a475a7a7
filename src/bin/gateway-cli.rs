use std::path::PathBuf;

use base64::Engine;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use submission_gateway::config;
use submission_gateway::validation::check_resume;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator tooling for the submission gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a configuration file
    CheckConfig {
        path: PathBuf,
    },
    /// Run the resume checks against a local file
    CheckResume {
        file: PathBuf,
        /// Declared MIME type, as a browser would send it
        #[arg(short = 't', long = "type")]
        mime: Option<String>,
    },
    /// Query a running gateway's health endpoint
    Health {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig { path } => match config::load_config(&path) {
            Ok(config) => {
                println!("{}: OK", path.display());
                println!("  bind address:   {}", config.listener.bind_address);
                println!("  mail provider:  {:?}", config.mail.provider);
                println!("  cors origins:   {}", config.cors.allowed_origins.join(", "));
            }
            Err(config::ConfigError::Validation(errors)) => {
                eprintln!("{}: {} problem(s)", path.display(), errors.len());
                for error in errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        Commands::CheckResume { file, mime } => {
            let bytes = std::fs::read(&file)?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut upload = json!({
                "content": base64::engine::general_purpose::STANDARD.encode(&bytes),
                "filename": filename,
            });
            if let Some(mime) = mime {
                upload["type"] = Value::String(mime);
            }

            let verdict = match check_resume(&upload) {
                Ok(accepted) => json!({
                    "accepted": true,
                    "filename": accepted.filename,
                    "type": accepted.mime(),
                    "size": accepted.size,
                }),
                Err(e) => json!({ "accepted": false, "errors": e.to_field_errors() }),
            };
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            if verdict["accepted"] != Value::Bool(true) {
                std::process::exit(2);
            }
        }
        Commands::Health { url } => {
            let res = reqwest::get(format!("{}/health", url.trim_end_matches('/'))).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
