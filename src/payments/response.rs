//! Response envelopes and the classified outcome handed to callers

use crate::error::{ClientError, ClientResult};
use crate::payments::classifier::{classify_failure, FailureFields, GatewayFailure, Refusal};
use crate::payments::types::ResultCode;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of a `payments` or `payments/details` response.
///
/// Every field is optional: success bodies and error bodies share this
/// schema and are told apart by [`PaymentsResponse::failure`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsResponse {
    /// Authorisation state of the payment
    #[serde(default)]
    pub result_code: Option<ResultCode>,
    /// Follow-up shopper interaction (redirect, 3-D Secure challenge). Opaque here.
    #[serde(default)]
    pub action: Option<Value>,
    /// Gateway-side reference of the payment
    #[serde(default)]
    pub psp_reference: Option<String>,
    #[serde(default)]
    pub additional_data: Option<Map<String, Value>>,
    /// Our own order reference, echoed back
    #[serde(default)]
    pub merchant_reference: Option<String>,
    /// Numeric refusal code, see [`RefusalReason`](crate::payments::RefusalReason)
    #[serde(default)]
    pub refusal_reason_code: Option<String>,
    /// Human-readable refusal text
    #[serde(default)]
    pub refusal_reason: Option<String>,
    /// Error category (`validation`, `security`, ...); set only on rejected requests
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Free-form error text used by non-validation failures
    #[serde(default)]
    pub message: Option<String>,
}

impl PaymentsResponse {
    pub fn from_slice(body: &[u8]) -> ClientResult<Self> {
        decode_body(body)
    }

    pub fn failure(&self) -> Option<GatewayFailure> {
        classify_failure(FailureFields {
            kind: self.kind.as_deref(),
            error_code: self.error_code.as_deref(),
            error_message: self.error_message.as_deref(),
            message: self.message.as_deref(),
            additional_data: self.additional_data.as_ref(),
        })
    }

    pub fn refusal(&self) -> Option<Refusal> {
        Refusal::from_parts(
            self.refusal_reason_code.as_deref(),
            self.refusal_reason.as_deref(),
        )
    }

    /// `type` of the action object, e.g. "redirect" or "threeDS2"
    pub fn action_type(&self) -> Option<&str> {
        self.action.as_ref()?.get("type")?.as_str()
    }

    pub fn into_outcome(self) -> PaymentOutcome {
        let refusal = self.refusal();

        match self.failure() {
            Some(GatewayFailure::Validation {
                kind,
                error_code,
                error_message,
            }) => PaymentOutcome::ValidationError(ValidationError {
                kind,
                error_code,
                error_message,
                refusal,
            }),
            Some(GatewayFailure::Custom {
                error_code,
                message,
                additional_data,
            }) => PaymentOutcome::CustomError(CustomError {
                error_code,
                message,
                additional_data,
                refusal,
            }),
            // An absent result code still counts as success here; see DESIGN.md.
            None => PaymentOutcome::Success(PaymentSuccess {
                result_code: self.result_code,
                action: self.action,
                psp_reference: self.psp_reference,
                merchant_reference: self.merchant_reference,
                refusal,
            }),
        }
    }
}

/// Body of a `paymentMethods` response
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsResponse {
    #[serde(default)]
    pub payment_methods: Vec<Value>,
    #[serde(default)]
    pub stored_payment_methods: Vec<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub additional_data: Option<Map<String, Value>>,
}

impl PaymentMethodsResponse {
    pub fn from_slice(body: &[u8]) -> ClientResult<Self> {
        decode_body(body)
    }

    pub fn failure(&self) -> Option<GatewayFailure> {
        classify_failure(FailureFields {
            kind: self.kind.as_deref(),
            error_code: self.error_code.as_deref(),
            error_message: self.error_message.as_deref(),
            message: self.message.as_deref(),
            additional_data: self.additional_data.as_ref(),
        })
    }

    /// Payment method `type` values offered to the shopper
    pub fn method_types(&self) -> Vec<&str> {
        self.payment_methods
            .iter()
            .filter_map(|method| method.get("type").and_then(Value::as_str))
            .collect()
    }
}

pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> ClientResult<T> {
    serde_json::from_slice(body).map_err(ClientError::from)
}

/// Outcome of one payment call after classification
#[derive(Debug)]
pub enum PaymentOutcome {
    Success(PaymentSuccess),
    ValidationError(ValidationError),
    CustomError(CustomError),
    TransportError(ClientError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSuccess {
    /// May be absent even on success
    pub result_code: Option<ResultCode>,
    pub action: Option<Value>,
    pub psp_reference: Option<String>,
    pub merchant_reference: Option<String>,
    pub refusal: Option<Refusal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The gateway's `type` field
    pub kind: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub refusal: Option<Refusal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomError {
    pub error_code: String,
    pub message: String,
    pub additional_data: Option<Map<String, Value>>,
    pub refusal: Option<Refusal>,
}

impl PaymentOutcome {
    pub fn from_result(result: ClientResult<PaymentsResponse>) -> Self {
        match result {
            Ok(response) => response.into_outcome(),
            Err(err) => PaymentOutcome::TransportError(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Success(_))
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            PaymentOutcome::Success(s) => s.refusal.as_ref(),
            PaymentOutcome::ValidationError(e) => e.refusal.as_ref(),
            PaymentOutcome::CustomError(e) => e.refusal.as_ref(),
            PaymentOutcome::TransportError(_) => None,
        }
    }

    /// Stable name of the outcome variant, used in logs
    pub fn label(&self) -> &'static str {
        match self {
            PaymentOutcome::Success(_) => "success",
            PaymentOutcome::ValidationError(_) => "validation_error",
            PaymentOutcome::CustomError(_) => "custom_error",
            PaymentOutcome::TransportError(_) => "transport_error",
        }
    }
}
