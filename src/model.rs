//! Request and response models shared by the SOAP and REST transports.
//!
//! The field names follow the wire format of the BankID RP API; the same
//! `camelCase` names are used by the JSON bodies and the SOAP operation
//! elements.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

static PERSONAL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").unwrap());

/// Returns true when `value` is a well-formed personal number: exactly
/// twelve ASCII digits, century included, no separators.
pub fn is_valid_personal_number(value: &str) -> bool {
    PERSONAL_NUMBER.is_match(value)
}

pub(crate) fn to_base64(value: &str) -> String {
    BASE64.encode(value.as_bytes())
}

/// Base64-encodes a free-text field. Absent and empty values pass through
/// untouched.
fn encode_optional(field: Option<String>) -> Option<String> {
    match field {
        Some(ref value) if !value.is_empty() => Some(to_base64(value)),
        other => other,
    }
}

/// Arguments for starting an authentication order.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    /// Personal number of the end user. Optional; when absent the user
    /// enters it in the BankID application instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(regex(
        path = *PERSONAL_NUMBER,
        message = "the personal number must be exactly 12 digits"
    ))]
    pub personal_number: Option<String>,

    /// IP address of the end user as seen by the relying party.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "endUserIp is required"))]
    pub end_user_ip: Option<String>,
}

/// Arguments for starting a signing order.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// Personal number of the end user. Optional; when absent the user
    /// enters it in the BankID application instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(regex(
        path = *PERSONAL_NUMBER,
        message = "the personal number must be exactly 12 digits"
    ))]
    pub personal_number: Option<String>,

    /// IP address of the end user as seen by the relying party.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "endUserIp is required"))]
    pub end_user_ip: Option<String>,

    /// Text shown to the end user while signing. Base64-encoded before
    /// dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_visible_data: Option<String>,

    /// Data bound to the signature without being shown to the end user.
    /// Base64-encoded before dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_non_visible_data: Option<String>,
}

impl SignRequest {
    /// Returns the request with the free-text fields in their wire form.
    pub(crate) fn encoded(mut self) -> Self {
        self.user_visible_data = encode_optional(self.user_visible_data);
        self.user_non_visible_data = encode_optional(self.user_non_visible_data);
        self
    }
}

/// Wire form of the collect operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub order_ref: String,
}

impl CollectRequest {
    pub fn new(order_ref: impl Into<String>) -> Self {
        Self {
            order_ref: order_ref.into(),
        }
    }
}

/// Wire form of the cancel operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub order_ref: String,
}

impl CancelRequest {
    pub fn new(order_ref: impl Into<String>) -> Self {
        Self {
            order_ref: order_ref.into(),
        }
    }
}

/// Session identifiers returned by authenticate and sign.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Opaque reference used to collect or cancel the order. Not
    /// interpreted by this layer.
    pub order_ref: String,
    /// Token for launching the BankID application on the same device.
    #[serde(default)]
    pub auto_start_token: Option<String>,
}

/// Status report for an outstanding order.
///
/// Collect payloads differ between generations; every field is optional
/// and filled with whatever the remote sent, without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectResponse {
    pub order_ref: Option<String>,
    /// v5 order state: `pending`, `failed` or `complete`.
    pub status: Option<String>,
    /// v5 progress detail, for example `outstandingTransaction` or
    /// `userSign`.
    pub hint_code: Option<String>,
    /// v5 completion data, present once the order completes.
    pub completion_data: Option<CompletionData>,
    /// v4 progress status, for example `OUTSTANDING_TRANSACTION` or
    /// `COMPLETE`.
    pub progress_status: Option<String>,
    /// v4 user information, present once the order completes.
    pub user_info: Option<UserInfo>,
    pub signature: Option<String>,
    pub ocsp_response: Option<String>,
}

/// Completion payload of a finished v5 order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionData {
    pub user: Option<UserInfo>,
    pub device: Option<DeviceInfo>,
    pub cert: Option<CertValidity>,
    pub signature: Option<String>,
    pub ocsp_response: Option<String>,
}

/// Identity of the end user who completed an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub personal_number: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    /// v4 places the certificate validity in the user block.
    pub not_before: Option<String>,
    pub not_after: Option<String>,
    /// v4 places the device address in the user block.
    pub ip_address: Option<String>,
}

/// Device the order was completed on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub ip_address: Option<String>,
}

/// Validity window of the end user certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertValidity {
    pub not_before: Option<String>,
    pub not_after: Option<String>,
}
