use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

use crate::config::ConfigError;
use crate::endpoint::ApiGeneration;

/// Errors surfaced by every fallible operation of the client.
///
/// The variants keep the failure domains apart: local problems
/// ([`Configuration`](Error::Configuration), [`Validation`](Error::Validation),
/// [`Encode`](Error::Encode)) are reported before the network is touched,
/// remote application faults become [`Api`](Error::Api), and everything below
/// the application protocol stays a [`Transport`](Error::Transport) error.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete client configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The request failed validation; no network call was made.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    /// The outgoing SOAP payload could not be encoded. Does not occur for
    /// well-formed requests.
    #[error("failed to encode the request payload: {0}")]
    Encode(#[from] quick_xml::SeError),

    /// Application-level fault reported by the BankID service.
    #[error(transparent)]
    Api(#[from] ApiFault),

    /// Connection-level failure (DNS, TCP, TLS handshake) below the
    /// application protocol. Never rewritten into an [`Api`](Error::Api)
    /// fault.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response this layer could not map to a structured fault, carried
    /// verbatim so callers can still inspect it.
    #[error("unexpected response from the BankID service ({status}): {body}")]
    Response { status: StatusCode, body: String },

    /// The operation does not exist in the configured API generation.
    #[error("the {operation} operation is not available in the {generation} API generation")]
    Unsupported {
        operation: &'static str,
        generation: ApiGeneration,
    },
}

impl Error {
    /// Returns the normalized service fault, if that is what this error is.
    pub fn as_api_fault(&self) -> Option<&ApiFault> {
        match self {
            Error::Api(fault) => Some(fault),
            _ => None,
        }
    }
}

/// An application-level fault reported by the BankID service, normalized
/// from either transport's error shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFault {
    /// Human-readable message carried by the failure.
    pub message: String,
    /// Remote error code: `faultStatus` for the SOAP generations,
    /// `errorCode` for REST.
    pub status: Option<String>,
    /// Detailed description, supplied by the SOAP generations only.
    pub description: Option<String>,
    /// HTTP status the fault arrived with. Faults can ride on any status,
    /// including success.
    pub http_status: Option<StatusCode>,
}

impl fmt::Display for ApiFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BankID service fault: {}", self.message)?;
        if let Some(status) = &self.status {
            write!(f, " [{status}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiFault {}
