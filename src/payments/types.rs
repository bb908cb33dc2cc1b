//! Payment gateway types and data structures
//!
//! Value types shared by request envelopes, response envelopes and configuration.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Amount in minor currency units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amount {
    /// ISO 4217 currency code (EUR, USD, NGN, ...)
    pub currency: String,
    /// Value in the smallest currency unit (e.g. cents for EUR)
    pub value: u64,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: u64) -> ClientResult<Self> {
        let amount = Self {
            currency: currency.into(),
            value,
        };
        amount.validate()?;
        Ok(amount)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !is_currency_code(&self.currency) {
            return Err(ClientError::configuration(format!(
                "Currency must be a 3-letter ISO code, got {:?}",
                self.currency
            )));
        }
        Ok(())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            value: 0,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Platform channel reported to the gateway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Channel {
    Android,
    #[serde(rename = "iOS")]
    Ios,
    #[default]
    Web,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Android => "Android",
            Channel::Ios => "iOS",
            Channel::Web => "Web",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Channel::Android),
            "ios" => Ok(Channel::Ios),
            "web" => Ok(Channel::Web),
            _ => Err(ClientError::configuration(format!(
                "Channel must be one of Android, iOS, Web, got {}",
                s
            ))),
        }
    }
}

/// Gateway environment the client talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Test,
    Live,
}

impl std::str::FromStr for Environment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "live" => Ok(Environment::Live),
            _ => Err(ClientError::configuration(format!(
                "Environment must be 'test' or 'live', got {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Test => f.write_str("test"),
            Environment::Live => f.write_str("live"),
        }
    }
}

/// Result code reported by the gateway for a payment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResultCode {
    Authorised,
    Refused,
    Pending,
    Cancelled,
    Error,
    Received,
    RedirectShopper,
    IdentifyShopper,
    ChallengeShopper,
}

impl ResultCode {
    /// Whether the shopper has to complete a follow-up action
    pub fn requires_action(&self) -> bool {
        matches!(
            self,
            ResultCode::RedirectShopper | ResultCode::IdentifyShopper | ResultCode::ChallengeShopper
        )
    }
}

/// Primitive value allowed in a request's `additionalData` map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AdditionalValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for AdditionalValue {
    fn from(v: bool) -> Self {
        AdditionalValue::Bool(v)
    }
}

impl From<i64> for AdditionalValue {
    fn from(v: i64) -> Self {
        AdditionalValue::Integer(v)
    }
}

impl From<f64> for AdditionalValue {
    fn from(v: f64) -> Self {
        AdditionalValue::Float(v)
    }
}

impl From<&str> for AdditionalValue {
    fn from(v: &str) -> Self {
        AdditionalValue::Text(v.to_string())
    }
}

impl From<String> for AdditionalValue {
    fn from(v: String) -> Self {
        AdditionalValue::Text(v)
    }
}

pub type AdditionalData = BTreeMap<String, AdditionalValue>;

/// Feature flags sent with every payment unless overridden: strong customer
/// authentication is enabled.
pub fn default_additional_data() -> AdditionalData {
    let mut data = AdditionalData::new();
    data.insert("allow3DS2".to_string(), AdditionalValue::Bool(true));
    data.insert("executeThreeD".to_string(), AdditionalValue::Bool(true));
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_rejects_bad_currency() {
        assert!(Amount::new("EUR", 1000).is_ok());
        assert!(Amount::new("eur", 1000).is_err());
        assert!(Amount::new("EURO", 1000).is_err());
        assert!(Amount::new("", 0).is_err());
    }

    #[test]
    fn test_channel_wire_names() {
        assert_eq!(serde_json::to_string(&Channel::Ios).unwrap(), "\"iOS\"");
        assert_eq!(serde_json::to_string(&Channel::Android).unwrap(), "\"Android\"");
        assert_eq!("ios".parse::<Channel>().unwrap(), Channel::Ios);
        assert!("desktop".parse::<Channel>().is_err());
    }

    #[test]
    fn test_result_code_is_closed() {
        let code: ResultCode = serde_json::from_str("\"ChallengeShopper\"").unwrap();
        assert!(code.requires_action());
        assert!(serde_json::from_str::<ResultCode>("\"PartiallyAuthorised\"").is_err());
    }

    #[test]
    fn test_additional_value_untagged() {
        let data = default_additional_data();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({"allow3DS2": true, "executeThreeD": true}));
    }
}
