use crate::error::{ClientError, ClientResult};
use crate::payments::types::{default_additional_data, AdditionalData, Amount, Channel, Environment};
use anyhow::{Context, Result};
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Resolved client configuration.
///
/// Built once before the first request and handed to
/// [`crate::payments::client::GatewayClient`]; it is never mutated by a call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub environment: Environment,
    pub base_url: String,
    /// Extra headers sent with every request. `Content-Type` is always
    /// `application/json` regardless of what is configured here.
    pub headers: BTreeMap<String, String>,
    /// Public key used by the card component for field-level encryption.
    /// Carried for callers; the client itself never reads it.
    pub card_public_key: Option<String>,
    pub merchant: MerchantConfig,
    pub defaults: PaymentDefaults,
    pub retry: RetryConfig,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    pub merchant_account: String,
    pub apple_pay_merchant_identifier: Option<String>,
}

/// Values attached to every outgoing request unless overridden per call
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentDefaults {
    pub amount: Amount,
    pub reference: String,
    pub country_code: String,
    pub shopper_locale: String,
    pub return_url: String,
    pub shopper_reference: String,
    pub shopper_email: String,
    pub channel: Channel,
    pub additional_data: AdditionalData,
}

impl Default for PaymentDefaults {
    fn default() -> Self {
        Self {
            amount: Amount::default(),
            reference: "Test Order Reference".to_string(),
            country_code: "FR".to_string(),
            shopper_locale: "en_US".to_string(),
            return_url: String::new(),
            shopper_reference: String::new(),
            shopper_email: String::new(),
            channel: Channel::default(),
            additional_data: default_additional_data(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after a lost connection (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Fixed pause between attempts, zero retries immediately
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 0,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: String::new(),
            headers: BTreeMap::new(),
            card_public_key: None,
            merchant: MerchantConfig::default(),
            defaults: PaymentDefaults::default(),
            retry: RetryConfig::default(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, merchant_account: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            merchant: MerchantConfig {
                merchant_account: merchant_account.into(),
                apple_pay_merchant_identifier: None,
            },
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        let defaults = PaymentDefaults::default();

        let environment = match env::var("PAYGATE_ENVIRONMENT") {
            Ok(value) => value
                .parse::<Environment>()
                .context("PAYGATE_ENVIRONMENT is invalid")?,
            Err(_) => Environment::default(),
        };

        let headers = match env::var("PAYGATE_HEADERS") {
            Ok(raw) => parse_header_list(&raw)
                .context("PAYGATE_HEADERS must be a comma separated list of name=value pairs")?,
            Err(_) => BTreeMap::new(),
        };

        let currency = env::var("PAYGATE_CURRENCY").unwrap_or(defaults.amount.currency);
        let value = env::var("PAYGATE_AMOUNT")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<u64>()
            .context("PAYGATE_AMOUNT must be a non-negative integer in minor units")?;

        let channel = match env::var("PAYGATE_CHANNEL") {
            Ok(value) => value
                .parse::<Channel>()
                .context("PAYGATE_CHANNEL is invalid")?,
            Err(_) => defaults.channel,
        };

        let payment_defaults = PaymentDefaults {
            amount: Amount { currency, value },
            reference: env::var("PAYGATE_REFERENCE").unwrap_or(defaults.reference),
            country_code: env::var("PAYGATE_COUNTRY_CODE").unwrap_or(defaults.country_code),
            shopper_locale: env::var("PAYGATE_SHOPPER_LOCALE").unwrap_or(defaults.shopper_locale),
            return_url: env::var("PAYGATE_RETURN_URL").unwrap_or(defaults.return_url),
            shopper_reference: env::var("PAYGATE_SHOPPER_REFERENCE")
                .unwrap_or(defaults.shopper_reference),
            shopper_email: env::var("PAYGATE_SHOPPER_EMAIL").unwrap_or(defaults.shopper_email),
            channel,
            additional_data: defaults.additional_data,
        };

        let retry = RetryConfig {
            max_retries: env::var("PAYGATE_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("PAYGATE_MAX_RETRIES must be a valid number")?,
            delay_ms: env::var("PAYGATE_RETRY_DELAY_MS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("PAYGATE_RETRY_DELAY_MS must be a valid number")?,
        };

        let timeout_secs = match env::var("PAYGATE_TIMEOUT_SECS") {
            Ok(value) => Some(
                value
                    .parse()
                    .context("PAYGATE_TIMEOUT_SECS must be a valid number")?,
            ),
            Err(_) => None,
        };

        let config = ClientConfig {
            environment,
            base_url: env::var("PAYGATE_BASE_URL").context("PAYGATE_BASE_URL not set")?,
            headers,
            card_public_key: env::var("PAYGATE_CARD_PUBLIC_KEY").ok(),
            merchant: MerchantConfig {
                merchant_account: env::var("PAYGATE_MERCHANT_ACCOUNT")
                    .context("PAYGATE_MERCHANT_ACCOUNT not set")?,
                apple_pay_merchant_identifier: env::var("PAYGATE_APPLE_PAY_MERCHANT_ID").ok(),
            },
            defaults: payment_defaults,
            retry,
            timeout_secs,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML/JSON/YAML file, with `PAYGATE__SECTION__KEY`
    /// environment variables taking precedence.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix("PAYGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: ClientConfig = settings
            .try_deserialize()
            .with_context(|| format!("Invalid client configuration in {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks everything a request needs before it can be built.
    pub fn validate(&self) -> ClientResult<()> {
        self.endpoint_base()?;

        if self.merchant.merchant_account.trim().is_empty() {
            return Err(ClientError::configuration("Merchant account is not set"));
        }

        self.defaults.amount.validate()?;

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ClientError::configuration(format!("Invalid header name: {}", name))
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                ClientError::configuration(format!("Invalid value for header {}", name))
            })?;
        }

        Ok(())
    }

    /// Base URL without a trailing slash, checked to be an http(s) URL
    pub fn endpoint_base(&self) -> ClientResult<&str> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::configuration("Base URL is not set"));
        }

        let parsed = reqwest::Url::parse(base).map_err(|e| {
            ClientError::configuration(format!("Base URL {} is invalid: {}", base, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::configuration(format!(
                "Base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }

        Ok(base.trim_end_matches('/'))
    }

    pub fn endpoint_url(&self, path: &str) -> ClientResult<String> {
        Ok(format!(
            "{}/{}",
            self.endpoint_base()?,
            path.trim_start_matches('/')
        ))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_header_list(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut headers = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Header entry {:?} is missing '='", pair))?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(headers)
}
