//! JSON transport for the current RP generation, including its error-body
//! normalization.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{ApiFault, Error};
use crate::model::{
    AuthenticateRequest, CancelRequest, CollectRequest, CollectResponse, OrderResponse,
    SignRequest,
};

#[derive(Debug, Clone)]
pub(crate) struct RestTransport {
    http: Client,
    endpoint: Endpoint,
}

impl RestTransport {
    pub(crate) fn new(http: Client, endpoint: Endpoint) -> Self {
        Self { http, endpoint }
    }

    pub(crate) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub(crate) async fn authenticate(
        &self,
        request: &AuthenticateRequest,
    ) -> Result<OrderResponse, Error> {
        self.post("auth", request).await
    }

    pub(crate) async fn sign(&self, request: &SignRequest) -> Result<OrderResponse, Error> {
        self.post("sign", request).await
    }

    pub(crate) async fn collect(&self, order_ref: &str) -> Result<CollectResponse, Error> {
        self.post("collect", &CollectRequest::new(order_ref)).await
    }

    pub(crate) async fn cancel(&self, order_ref: &str) -> Result<(), Error> {
        self.send("cancel", &CancelRequest::new(order_ref)).await?;
        Ok(())
    }

    async fn post<B, R>(&self, resource: &str, request: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let (status, body) = self.send(resource, request).await?;
        serde_json::from_str(&body).map_err(|_| Error::Response { status, body })
    }

    /// Dispatches one call and splits the outcome. Bodies carrying the
    /// `errorCode` marker become faults no matter which HTTP status they
    /// rode in on; other non-success responses pass through verbatim.
    async fn send<B: Serialize>(
        &self,
        resource: &str,
        request: &B,
    ) -> Result<(StatusCode, String), Error> {
        let url = self.endpoint.resource_url(resource);
        debug!(%url, "dispatching BankID REST call");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            if let Some(fault) = error_body(status, &body) {
                return Err(Error::Api(fault));
            }
            return Ok((status, body));
        }
        Err(normalize(Error::Response { status, body }))
    }
}

/// Error shape of the REST generation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<String>,
    details: Option<String>,
}

/// Extracts the structured error body, if the payload carries one.
///
/// Detection keys on the declared `errorCode` field. A body without it is
/// not an application fault, whatever the HTTP status says.
fn error_body(status: StatusCode, body: &str) -> Option<ApiFault> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let code = parsed.error_code?;

    Some(ApiFault {
        message: parsed.details.unwrap_or_else(|| code.clone()),
        status: Some(code),
        description: None,
        http_status: Some(status),
    })
}

/// Normalizes a failed REST call. A response whose body resolves to an
/// error shape becomes an [`ApiFault`]; any other failure, including
/// transport-level ones that never produced a body, is returned unchanged.
pub(crate) fn normalize(failure: Error) -> Error {
    match failure {
        Error::Response { status, body } => match error_body(status, &body) {
            Some(fault) => Error::Api(fault),
            None => Error::Response { status, body },
        },
        other => other,
    }
}
