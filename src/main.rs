//! bridge-auth command line
//!
//! Manages the stored bridge secret and performs one-off intercepted
//! requests from a terminal.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderName, HeaderValue};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use bridge_auth::auth::{CredentialPrompt, NonInteractivePrompt, TerminalPrompt};
use bridge_auth::transport::{Body, MultipartForm, Request};
use bridge_auth::BridgeConfig;

#[derive(Parser)]
#[command(name = "bridge-auth")]
#[command(about = "Manage the bridge API secret and send authenticated requests", long_about = None)]
struct Cli {
    /// Config file (defaults to config.json in the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or change the stored secret
    #[command(subcommand)]
    Secret(SecretCommand),
    /// Send one request with the secret attached
    Request(RequestArgs),
}

#[derive(Subcommand)]
enum SecretCommand {
    /// Print the stored secret (empty line if none)
    Get,
    /// Store a secret; a blank value clears it
    Set { value: String },
    /// Remove the stored secret
    Clear,
}

#[derive(Args)]
struct RequestArgs {
    /// Target URL
    url: String,

    /// HTTP method
    #[arg(short = 'X', long)]
    method: Option<String>,

    /// Header as "Name: value"; may be repeated
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long, conflicts_with = "form")]
    data: Option<String>,

    /// Multipart field as name=value, or name=@path for a file; may be repeated
    #[arg(short = 'F', long = "form")]
    form: Vec<String>,

    /// Never prompt; a rejected secret is simply reported
    #[arg(long)]
    no_prompt: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so response bodies on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bridge_auth=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BridgeConfig::load_from(path),
        None => BridgeConfig::load(),
    }
    .context("Failed to load configuration")?;

    let mut stdout = std::io::stdout();
    match cli.command {
        Commands::Secret(command) => run_secret(&config, command, &mut stdout),
        Commands::Request(args) => run_request(&config, &args, &mut stdout).await,
    }
}

fn run_secret<W: Write>(
    config: &BridgeConfig,
    command: SecretCommand,
    out: &mut W,
) -> Result<()> {
    let secrets = config.secret_store()?;
    match command {
        SecretCommand::Get => {
            writeln!(out, "{}", secrets.get_or_empty()?)?;
        }
        SecretCommand::Set { value } => {
            secrets.set(&value)?;
            if secrets.is_set()? {
                tracing::info!("Bridge secret stored");
            } else {
                tracing::info!("Blank value given, bridge secret cleared");
            }
        }
        SecretCommand::Clear => {
            secrets.clear()?;
            tracing::info!("Bridge secret cleared");
        }
    }
    Ok(())
}

/// Sends one request; the body goes to `out` and a non-2xx status is an error
async fn run_request<W: Write>(
    config: &BridgeConfig,
    args: &RequestArgs,
    out: &mut W,
) -> Result<()> {
    let prompt: Arc<dyn CredentialPrompt> = if args.no_prompt {
        Arc::new(NonInteractivePrompt)
    } else {
        Arc::new(TerminalPrompt::new())
    };
    let client = config.build_client(prompt)?;
    let request = build_request(args)?;

    let response = client.execute(&request).await?;
    eprintln!("{}", response.status());
    out.write_all(&response.body)?;

    if !response.is_success() {
        bail!("Request failed with status {}", response.status());
    }
    Ok(())
}

/// Turns command line arguments into a request; no `-X` leaves the method unset
fn build_request(args: &RequestArgs) -> Result<Request> {
    let mut request = Request::new(args.url.clone());
    request.method = args.method.clone();
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request.headers.append(name, value);
    }
    if let Some(data) = &args.data {
        request.body = Some(Body::Text(data.clone()));
    } else if !args.form.is_empty() {
        request.body = Some(Body::Multipart(parse_form(&args.form)?));
    }
    Ok(request)
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header must look like \"Name: value\": {}", raw))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name: {}", name.trim()))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid value for header {}", name))?;
    Ok((name, value))
}

fn parse_form(fields: &[String]) -> Result<MultipartForm> {
    let mut form = MultipartForm::new();
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("Form field must look like name=value: {}", field))?;
        form = match value.strip_prefix('@') {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read form file {}", path))?;
                let file_name = PathBuf::from(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                form.file(name, file_name, bytes)
            }
            None => form.text(name, value),
        };
    }
    Ok(form)
}
