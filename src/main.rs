//! NTLM SOAP request binary.
//!
//! Run with: `ntlm-soap --url https://host/Service.svc --username alice --payload request.xml`
//!
//! The response body is written to stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use ntlm_soap::{NtlmClientConfig, NtlmCredentials, NtlmRequestExecutor, SoapRequest};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Send one NTLM-authenticated SOAP request and print the response body.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Destination URL (http or https)
    #[arg(long)]
    url: String,

    /// Value of the SOAPAction header
    #[arg(long, default_value = "")]
    soap_action: String,

    /// File holding the XML payload, or "-" to read it from stdin
    #[arg(long, default_value = "-")]
    payload: PathBuf,

    /// NTLM user name
    #[arg(short, long)]
    username: String,

    /// NTLM password
    #[arg(short, long, env = "NTLM_PASSWORD", hide_env_values = true)]
    password: String,

    /// NTLM domain
    #[arg(short, long, default_value = "")]
    domain: String,

    /// Skip TLS certificate verification (overrides the config file)
    #[arg(long)]
    insecure: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries the response body
    let log_level = args.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut config = if args.config.exists() {
        let content = tokio::fs::read_to_string(&args.config)
            .await
            .context("Failed to read config file")?;
        serde_yaml::from_str::<NtlmClientConfig>(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        NtlmClientConfig::default()
    };
    if args.insecure {
        config.tls.accept_invalid_certs = true;
    }
    if args.timeout_secs.is_some() {
        config.timeouts.request_secs = args.timeout_secs;
    }

    info!(
        accept_invalid_certs = config.tls.accept_invalid_certs,
        request_timeout_secs = ?config.timeouts.request_secs,
        connect_timeout_secs = ?config.timeouts.connect_secs,
        "Configuration loaded"
    );

    let xml_payload = read_payload(&args.payload).await?;
    let executor = NtlmRequestExecutor::new(config).context("Invalid configuration")?;
    let credentials = NtlmCredentials::new(args.username, args.password, args.domain);
    let request = SoapRequest::new(args.url, args.soap_action, xml_payload);

    let body = tokio::select! {
        result = executor.ntlm_request(&credentials, &request) => {
            result.context("NTLM request failed")?
        }
        _ = shutdown_signal() => {
            anyhow::bail!("Interrupted before the response arrived");
        }
    };

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(body.as_bytes())
        .await
        .context("Failed to write response body")?;
    stdout.flush().await.context("Failed to flush stdout")?;
    Ok(())
}

async fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut payload = String::new();
        tokio::io::stdin()
            .read_to_string(&mut payload)
            .await
            .context("Failed to read payload from stdin")?;
        Ok(payload)
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read payload file {}", path.display()))
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
