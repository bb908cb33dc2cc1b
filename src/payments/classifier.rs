//! Gateway failure classification
//!
//! Two pure mappings:
//! - the failure metadata of a decoded response to a validation or custom error
//! - the numeric refusal reason code to a stable symbolic code

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Symbolic refusal reason exposed to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RefusalReason {
    General,
    TransactionRefused,
    Referral,
    Acquirer,
    BlockedCard,
    ExpiredCard,
    InvalidAmount,
    InvalidCardNumber,
    IssuerUnavailable,
    BankNotSupported,
    ThreeDSecureAuthFailed,
    NotEnoughBalance,
    FraudDetected,
    Cancelled,
    InvalidPin,
    PinRetryExceeded,
    UnableToValidatePin,
    SubmissionToGateway,
    CvcDeclined,
    RestrictedCard,
    DoNotHonor,
    WithdrawalAmountExceeded,
    WithdrawalCountExceeded,
    AvsDeclined,
    CardRequiresOnlinePin,
    NoAccountAttachedToCard,
    MobilePinRequired,
    ContactlessFallback,
    AuthenticationRequired,
    Unknown,
}

impl RefusalReason {
    /// Look up a gateway refusal reason code. Total: anything outside the
    /// table maps to [`RefusalReason::Unknown`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => RefusalReason::General,
            "2" | "23" => RefusalReason::TransactionRefused,
            "3" => RefusalReason::Referral,
            "4" => RefusalReason::Acquirer,
            "5" => RefusalReason::BlockedCard,
            "6" => RefusalReason::ExpiredCard,
            "7" => RefusalReason::InvalidAmount,
            "8" => RefusalReason::InvalidCardNumber,
            "9" => RefusalReason::IssuerUnavailable,
            "10" => RefusalReason::BankNotSupported,
            "11" => RefusalReason::ThreeDSecureAuthFailed,
            "12" => RefusalReason::NotEnoughBalance,
            "14" | "20" | "31" => RefusalReason::FraudDetected,
            "15" | "16" => RefusalReason::Cancelled,
            "17" => RefusalReason::InvalidPin,
            "18" => RefusalReason::PinRetryExceeded,
            "19" => RefusalReason::UnableToValidatePin,
            "21" => RefusalReason::SubmissionToGateway,
            "24" => RefusalReason::CvcDeclined,
            "25" => RefusalReason::RestrictedCard,
            "27" => RefusalReason::DoNotHonor,
            "28" => RefusalReason::WithdrawalAmountExceeded,
            "29" => RefusalReason::WithdrawalCountExceeded,
            "32" => RefusalReason::AvsDeclined,
            "33" => RefusalReason::CardRequiresOnlinePin,
            "34" | "35" => RefusalReason::NoAccountAttachedToCard,
            "36" => RefusalReason::MobilePinRequired,
            "37" => RefusalReason::ContactlessFallback,
            "38" => RefusalReason::AuthenticationRequired,
            _ => RefusalReason::Unknown,
        }
    }

    /// Stable code consumers match on. These strings are part of the public
    /// contract and keep their historical spelling.
    pub fn as_code(&self) -> &'static str {
        match self {
            RefusalReason::General => "ERROR_GENERAL",
            RefusalReason::TransactionRefused => "ERROR_TRANSACTION_REFUSED",
            RefusalReason::Referral => "ERROR_REFERRAL",
            RefusalReason::Acquirer => "ERROR_ACQUIRER",
            RefusalReason::BlockedCard => "ERROR_BLOCKED_CARD",
            RefusalReason::ExpiredCard => "ERROR_EXPIRED_CARD",
            RefusalReason::InvalidAmount => "ERROR_INVALID_AMOUNT",
            RefusalReason::InvalidCardNumber => "ERROR_INVALID_CARDNUMBER",
            RefusalReason::IssuerUnavailable => "ERROR_ISSUER_UNAVAILABLE",
            RefusalReason::BankNotSupported => "ERROR_BANK_NOT_SUPPORTED",
            RefusalReason::ThreeDSecureAuthFailed => "ERROR_3DSECURE_AUTH_FAILED",
            RefusalReason::NotEnoughBalance => "ERROR_NO_ENOUGH_BALANCE",
            RefusalReason::FraudDetected => "ERROR_FRAUD_DETECTED",
            RefusalReason::Cancelled => "ERROR_CANCELLED",
            RefusalReason::InvalidPin => "ERROR_INVALID_PIN",
            RefusalReason::PinRetryExceeded => "ERROR_PIN_RETRY_EXCEEDED",
            RefusalReason::UnableToValidatePin => "ERROR_UNABLE_VALIDATE_PIN",
            RefusalReason::SubmissionToGateway => "ERROR_SUBMMISSION_ADYEN",
            RefusalReason::CvcDeclined => "ERROR_CVC_DECLINED",
            RefusalReason::RestrictedCard => "ERROR_RESTRICTED_CARD",
            RefusalReason::DoNotHonor => "ERROR_DO_NOT_HONOR",
            RefusalReason::WithdrawalAmountExceeded => "ERROR_WDRW_AMOUNT_EXCEEDED",
            RefusalReason::WithdrawalCountExceeded => "ERROR_WDRW_COUNT_EXCEEDED",
            RefusalReason::AvsDeclined => "ERROR_AVS_DECLINED",
            RefusalReason::CardRequiresOnlinePin => "ERROR_CARD_ONLINE_PIN",
            RefusalReason::NoAccountAttachedToCard => "ERROR_NO_ACCT_ATCHD_CARD",
            RefusalReason::MobilePinRequired => "ERROR_MOBILE_PIN",
            RefusalReason::ContactlessFallback => "ERROR_CONTACTLESS_FALLBACK",
            RefusalReason::AuthenticationRequired => "ERROR_AUTH_REQUIRED",
            RefusalReason::Unknown => "ERROR_UNKNOWN",
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// `None` when the gateway sent no refusal code at all
pub fn classify_refusal(code: Option<&str>) -> Option<RefusalReason> {
    code.map(RefusalReason::from_code)
}

/// Refusal details attached to an outcome for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    /// Raw code as sent by the gateway
    pub code: String,
    /// Human readable reason, when present
    pub reason: Option<String>,
    pub kind: RefusalReason,
}

impl Refusal {
    pub fn from_parts(code: Option<&str>, reason: Option<&str>) -> Option<Self> {
        let code = code?;
        Some(Self {
            code: code.to_string(),
            reason: reason.map(str::to_string),
            kind: RefusalReason::from_code(code),
        })
    }
}

/// Structured failure reported by the gateway in a response body
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayFailure {
    Validation {
        kind: String,
        error_code: Option<String>,
        error_message: Option<String>,
    },
    Custom {
        error_code: String,
        message: String,
        additional_data: Option<Map<String, Value>>,
    },
}

/// Failure metadata fields of a decoded response
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureFields<'a> {
    pub kind: Option<&'a str>,
    pub error_code: Option<&'a str>,
    pub error_message: Option<&'a str>,
    pub message: Option<&'a str>,
    pub additional_data: Option<&'a Map<String, Value>>,
}

/// Decide whether a response describes a gateway failure.
///
/// A present `type` always wins; otherwise both `errorCode` and `message`
/// are needed for a custom error. Anything else is not a failure.
pub fn classify_failure(fields: FailureFields<'_>) -> Option<GatewayFailure> {
    if let Some(kind) = fields.kind {
        return Some(GatewayFailure::Validation {
            kind: kind.to_string(),
            error_code: fields.error_code.map(str::to_string),
            error_message: fields.error_message.map(str::to_string),
        });
    }

    match (fields.error_code, fields.message) {
        (Some(error_code), Some(message)) => Some(GatewayFailure::Custom {
            error_code: error_code.to_string(),
            message: message.to_string(),
            additional_data: fields.additional_data.cloned(),
        }),
        _ => None,
    }
}
