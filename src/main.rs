use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paygate_client::payments::types::Amount;
use paygate_client::payments::{GatewayClient, PaymentOutcome};
use paygate_client::ClientConfig;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (TOML/JSON/YAML). Falls back to PAYGATE_* environment variables.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List payment methods available for the configured amount
    Methods,
    /// Submit a payment with a payment method payload read from a JSON file
    Pay {
        payload: PathBuf,
        #[arg(long)]
        reference: Option<String>,
        /// Amount in minor units, overrides the configured default
        #[arg(long)]
        amount: Option<u64>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Submit action details (redirect result, challenge result) read from a JSON file
    Details {
        details: PathBuf,
        #[arg(long)]
        payment_data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };

    tracing::info!("Starting paygate client");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Merchant account: {}", config.merchant.merchant_account);

    let client = GatewayClient::new(config)?;

    match cli.command {
        Command::Methods => {
            let request = client.payment_methods_request()?;
            let response = client.payment_methods(&request).await?;
            if let Some(failure) = response.failure() {
                println!("Gateway rejected the request: {:?}", failure);
            } else {
                for method in response.method_types() {
                    println!("{}", method);
                }
            }
        }
        Command::Pay {
            payload,
            reference,
            amount,
            currency,
        } => {
            let mut request = client.payments_request(read_json(&payload)?)?;
            if let Some(reference) = reference {
                request = request.with_reference(reference);
            }
            if amount.is_some() || currency.is_some() {
                let defaults = &client.config().defaults.amount;
                let amount = Amount::new(
                    currency.unwrap_or_else(|| defaults.currency.clone()),
                    amount.unwrap_or(defaults.value),
                )?;
                request = request.with_amount(amount)?;
            }
            print_outcome(&client.submit_payment(&request).await);
        }
        Command::Details {
            details,
            payment_data,
        } => {
            let mut request = client.details_request(read_json(&details)?)?;
            if let Some(payment_data) = payment_data {
                request = request.with_payment_data(payment_data);
            }
            print_outcome(&client.submit_details(&request).await);
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_outcome(outcome: &PaymentOutcome) {
    match outcome {
        PaymentOutcome::Success(success) => {
            println!(
                "result: {}",
                success
                    .result_code
                    .map(|code| format!("{:?}", code))
                    .unwrap_or_else(|| "none".to_string())
            );
            if let Some(psp_reference) = &success.psp_reference {
                println!("pspReference: {}", psp_reference);
            }
            if let Some(action) = &success.action {
                println!("action: {}", action);
            }
        }
        PaymentOutcome::ValidationError(err) => {
            println!(
                "validation error ({}): {} {}",
                err.kind,
                err.error_code.as_deref().unwrap_or("-"),
                err.error_message.as_deref().unwrap_or("")
            );
        }
        PaymentOutcome::CustomError(err) => {
            println!("gateway error {}: {}", err.error_code, err.message);
        }
        PaymentOutcome::TransportError(err) => {
            println!("transport error: {}", err);
        }
    }

    if let Some(refusal) = outcome.refusal() {
        println!(
            "refusal: {} ({})",
            refusal.kind,
            refusal.reason.as_deref().unwrap_or("no reason given")
        );
    }
}
