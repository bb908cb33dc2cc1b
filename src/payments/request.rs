//! Request envelopes
//!
//! Each envelope combines a call-specific payload with the process-wide
//! defaults from [`ClientConfig`] and is bound to one gateway endpoint and
//! one response schema through [`GatewayRequest`].

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::payments::response::{PaymentMethodsResponse, PaymentsResponse};
use crate::payments::types::{AdditionalData, AdditionalValue, Amount, Channel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A serializable request bound to an endpoint path and its response schema
pub trait GatewayRequest: Serialize + Send + Sync {
    /// Decoded body of a non-500 response to this request
    type Response: DeserializeOwned + Send;

    /// Path relative to the configured base URL
    const PATH: &'static str;
}

/// Lists the payment methods available for a shopper and amount
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsRequest {
    merchant_account: String,
    shopper_reference: String,
    additional_data: AdditionalData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allowed_payment_methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blocked_payment_methods: Vec<String>,
    amount: Amount,
    country_code: String,
    shopper_locale: String,
    channel: Channel,
}

impl PaymentMethodsRequest {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let defaults = &config.defaults;

        Ok(Self {
            merchant_account: config.merchant.merchant_account.clone(),
            shopper_reference: defaults.shopper_reference.clone(),
            additional_data: defaults.additional_data.clone(),
            allowed_payment_methods: Vec::new(),
            blocked_payment_methods: Vec::new(),
            amount: defaults.amount.clone(),
            country_code: defaults.country_code.clone(),
            shopper_locale: defaults.shopper_locale.clone(),
            channel: defaults.channel,
        })
    }

    pub fn with_amount(mut self, amount: Amount) -> ClientResult<Self> {
        amount.validate()?;
        self.amount = amount;
        Ok(self)
    }

    pub fn with_shopper_reference(mut self, shopper_reference: impl Into<String>) -> Self {
        self.shopper_reference = shopper_reference.into();
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_shopper_locale(mut self, shopper_locale: impl Into<String>) -> Self {
        self.shopper_locale = shopper_locale.into();
        self
    }

    /// Restrict the response to these payment method types
    pub fn with_allowed_payment_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_payment_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_blocked_payment_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_payment_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }
}

impl GatewayRequest for PaymentMethodsRequest {
    type Response = PaymentMethodsResponse;
    const PATH: &'static str = "paymentMethods";
}

/// Submits a payment with an already validated payment method payload
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsRequest {
    payment_method: Value,
    store_payment_method: bool,
    channel: Channel,
    amount: Amount,
    reference: String,
    country_code: String,
    return_url: String,
    shopper_reference: String,
    shopper_email: String,
    shopper_locale: String,
    additional_data: AdditionalData,
    merchant_account: String,
}

impl PaymentsRequest {
    /// Build an envelope around `payment_method`, the opaque detail object
    /// produced by a payment method component.
    pub fn new(payment_method: Value, config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let defaults = &config.defaults;

        Ok(Self {
            payment_method,
            store_payment_method: false,
            channel: defaults.channel,
            amount: defaults.amount.clone(),
            reference: defaults.reference.clone(),
            country_code: defaults.country_code.clone(),
            return_url: defaults.return_url.clone(),
            shopper_reference: defaults.shopper_reference.clone(),
            shopper_email: defaults.shopper_email.clone(),
            shopper_locale: defaults.shopper_locale.clone(),
            additional_data: defaults.additional_data.clone(),
            merchant_account: config.merchant.merchant_account.clone(),
        })
    }

    pub fn with_amount(mut self, amount: Amount) -> ClientResult<Self> {
        amount.validate()?;
        self.amount = amount;
        Ok(self)
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_store_payment_method(mut self, store: bool) -> Self {
        self.store_payment_method = store;
        self
    }

    pub fn with_shopper_reference(mut self, shopper_reference: impl Into<String>) -> Self {
        self.shopper_reference = shopper_reference.into();
        self
    }

    pub fn with_shopper_email(mut self, shopper_email: impl Into<String>) -> Self {
        self.shopper_email = shopper_email.into();
        self
    }

    pub fn with_return_url(mut self, return_url: impl Into<String>) -> Self {
        self.return_url = return_url.into();
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_shopper_locale(mut self, shopper_locale: impl Into<String>) -> Self {
        self.shopper_locale = shopper_locale.into();
        self
    }

    /// Set or override a single `additionalData` flag
    pub fn with_additional_data(
        mut self,
        key: impl Into<String>,
        value: impl Into<AdditionalValue>,
    ) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    pub fn payment_method(&self) -> &Value {
        &self.payment_method
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn merchant_account(&self) -> &str {
        &self.merchant_account
    }
}

impl GatewayRequest for PaymentsRequest {
    type Response = PaymentsResponse;
    const PATH: &'static str = "payments";
}

/// Completes a payment after the shopper finished a redirect or challenge action
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsRequest {
    details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_data: Option<String>,
    merchant_account: String,
}

impl PaymentDetailsRequest {
    pub fn new(details: Value, config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self {
            details,
            payment_data: None,
            merchant_account: config.merchant.merchant_account.clone(),
        })
    }

    /// Opaque state blob returned alongside the action in the previous response
    pub fn with_payment_data(mut self, payment_data: impl Into<String>) -> Self {
        self.payment_data = Some(payment_data.into());
        self
    }
}

impl GatewayRequest for PaymentDetailsRequest {
    type Response = PaymentsResponse;
    const PATH: &'static str = "payments/details";
}
