//! SOAP transport for the legacy RP generations, including fault
//! normalization.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{ApiFault, Error};
use crate::model::{
    AuthenticateRequest, CollectRequest, CollectResponse, OrderResponse, SignRequest,
};
use crate::soap::Envelope;

const TEXT_XML: &str = "text/xml; charset=utf-8";

#[derive(Debug, Clone)]
pub(crate) struct SoapTransport {
    http: Client,
    endpoint: Endpoint,
}

/// Wrappers naming the operation element inside the envelope body.
#[derive(Debug, Serialize)]
struct AuthenticateCall<'a> {
    #[serde(rename = "AuthenticateRequest")]
    request: &'a AuthenticateRequest,
}

#[derive(Debug, Serialize)]
struct SignCall<'a> {
    #[serde(rename = "SignRequest")]
    request: &'a SignRequest,
}

#[derive(Debug, Serialize)]
struct CollectCall {
    #[serde(rename = "CollectRequest")]
    request: CollectRequest,
}

impl SoapTransport {
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
        self.call("Authenticate", &AuthenticateCall { request }).await
    }

    pub(crate) async fn sign(&self, request: &SignRequest) -> Result<OrderResponse, Error> {
        self.call("Sign", &SignCall { request }).await
    }

    pub(crate) async fn collect(&self, order_ref: &str) -> Result<CollectResponse, Error> {
        let call = CollectCall {
            request: CollectRequest::new(order_ref),
        };
        self.call("Collect", &call).await
    }

    /// Dispatches one SOAP call and parses the response envelope. Fault
    /// envelopes become faults no matter which HTTP status they rode in
    /// on; other non-success responses pass through verbatim.
    async fn call<B, R>(&self, action: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let xml = Envelope::new(body).serialize_soap(false)?;
        debug!(url = self.endpoint.base_url(), action, "dispatching BankID SOAP call");

        let response = self
            .http
            .post(self.endpoint.base_url())
            .header(CONTENT_TYPE, TEXT_XML)
            .header("SOAPAction", action)
            .body(xml)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            if let Some(fault) = extract_fault(status, &body) {
                return Err(Error::Api(fault));
            }
            return Envelope::<R>::parse(&body)
                .map(Envelope::into_body)
                .map_err(|_| Error::Response { status, body });
        }
        Err(normalize(Error::Response { status, body }))
    }
}

/// Fault shape of the legacy generations. Every level below the body is
/// optional so the extraction walk stays total on arbitrary envelopes.
#[derive(Debug, Deserialize)]
struct FaultEnvelope {
    #[serde(rename = "Body")]
    body: FaultBody,
}

#[derive(Debug, Deserialize)]
struct FaultBody {
    #[serde(rename = "Fault", default)]
    fault: Option<SoapFault>,
}

#[derive(Debug, Deserialize)]
struct SoapFault {
    #[serde(rename = "faultstring", default)]
    fault_string: Option<String>,
    #[serde(rename = "detail", default)]
    detail: Option<FaultDetail>,
}

#[derive(Debug, Deserialize)]
struct FaultDetail {
    #[serde(rename = "RpFault", default)]
    rp_fault: Option<RpFault>,
}

#[derive(Debug, Deserialize)]
struct RpFault {
    #[serde(rename = "faultStatus", default)]
    fault_status: Option<String>,
    #[serde(rename = "detailedDescription", default)]
    detailed_description: Option<String>,
}

impl FaultEnvelope {
    fn rp_fault(&self) -> Option<&RpFault> {
        self.body.fault.as_ref()?.detail.as_ref()?.rp_fault.as_ref()
    }
}

/// Extracts the remote-party fault, if the body is a fault envelope with an
/// `RpFault` detail at the expected path.
fn extract_fault(status: StatusCode, body: &str) -> Option<ApiFault> {
    let envelope: FaultEnvelope = crate::soap::from_str(body).ok()?;
    let fault_string = envelope
        .body
        .fault
        .as_ref()
        .and_then(|fault| fault.fault_string.clone());
    let rp_fault = envelope.rp_fault()?;

    Some(ApiFault {
        message: fault_string.unwrap_or_else(|| format!("BankID SOAP fault ({status})")),
        status: rp_fault.fault_status.clone(),
        description: rp_fault.detailed_description.clone(),
        http_status: Some(status),
    })
}

/// Normalizes a failed SOAP call. A response whose body resolves to a
/// remote-party fault becomes an [`ApiFault`]; any other failure,
/// including transport-level ones that never produced a body, is returned
/// unchanged.
pub(crate) fn normalize(failure: Error) -> Error {
    match failure {
        Error::Response { status, body } => match extract_fault(status, &body) {
            Some(fault) => Error::Api(fault),
            None => Error::Response { status, body },
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RP_FAULT: &str = include_str!("../../test_data/soap/rp_fault.xml");
    const FAULT_WITHOUT_DETAIL: &str =
        include_str!("../../test_data/soap/fault_without_detail.xml");
    const FAULT_UNRECOGNIZED_DETAIL: &str =
        include_str!("../../test_data/soap/fault_unrecognized_detail.xml");
    const AUTHENTICATE_RESPONSE: &str =
        include_str!("../../test_data/soap/authenticate_response.xml");
    const COLLECT_COMPLETE: &str = include_str!("../../test_data/soap/collect_complete.xml");

    #[test]
    fn normalizes_an_rp_fault_envelope() {
        let failure = Error::Response {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: RP_FAULT.to_string(),
        };

        let fault = match normalize(failure) {
            Error::Api(fault) => fault,
            other => panic!("expected an API fault, got {other:?}"),
        };

        assert_eq!(fault.status.as_deref(), Some("SOME_FAULT_STATUS"));
        assert_eq!(fault.description.as_deref(), Some("Some detailed description"));
        assert_eq!(fault.message, "Some error message");
        assert_eq!(fault.http_status, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn fault_without_detail_passes_through() {
        let failure = Error::Response {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: FAULT_WITHOUT_DETAIL.to_string(),
        };

        match normalize(failure) {
            Error::Response { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, FAULT_WITHOUT_DETAIL);
            }
            other => panic!("expected passthrough, got {other:?}"),
        }
    }

    #[test]
    fn fault_with_unrecognized_detail_passes_through() {
        let failure = Error::Response {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: FAULT_UNRECOGNIZED_DETAIL.to_string(),
        };

        assert!(matches!(normalize(failure), Error::Response { .. }));
    }

    #[test]
    fn non_xml_bodies_pass_through() {
        let failure = Error::Response {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>gateway error</html>".to_string(),
        };

        assert!(matches!(normalize(failure), Error::Response { .. }));
    }

    #[test]
    fn fault_detection_ignores_the_http_status() {
        // Servers have been seen returning fault envelopes with 200.
        let fault = extract_fault(StatusCode::OK, RP_FAULT).expect("fault");
        assert_eq!(fault.status.as_deref(), Some("SOME_FAULT_STATUS"));
    }

    #[test]
    fn success_envelopes_are_not_faults() {
        assert!(extract_fault(StatusCode::OK, AUTHENTICATE_RESPONSE).is_none());
    }

    #[test]
    fn parses_an_authenticate_response_envelope() {
        let envelope = Envelope::<OrderResponse>::parse(AUTHENTICATE_RESPONSE).unwrap();
        let response = envelope.into_body();

        assert_eq!(response.order_ref, "131daac9-16c6-4618-beb0-365768f37288");
        assert_eq!(
            response.auto_start_token.as_deref(),
            Some("7c40b5c9-fa74-49cf-b98c-bfe651f9a7c6")
        );
    }

    #[test]
    fn parses_a_v4_collect_response_envelope() {
        let envelope = Envelope::<CollectResponse>::parse(COLLECT_COMPLETE).unwrap();
        let response = envelope.into_body();

        assert_eq!(response.progress_status.as_deref(), Some("COMPLETE"));
        let user = response.user_info.unwrap();
        assert_eq!(user.personal_number.as_deref(), Some("199001011337"));
        assert_eq!(user.given_name.as_deref(), Some("Karl"));
        assert!(response.signature.is_some());
    }

    #[test]
    fn serializes_the_operation_envelope() {
        let request = AuthenticateRequest {
            personal_number: Some("199001011337".to_string()),
            end_user_ip: Some("192.168.0.1".to_string()),
        };
        let xml = Envelope::new(&AuthenticateCall { request: &request })
            .serialize_soap(false)
            .unwrap();

        assert!(xml.contains("<soapenv:Envelope"));
        assert!(xml.contains("xmlns=\"http://bankid.com/RpService/v4.0.0/types/\""));
        assert!(xml.contains("<AuthenticateRequest>"));
        assert!(xml.contains("<personalNumber>199001011337</personalNumber>"));
        assert!(xml.contains("<endUserIp>192.168.0.1</endUserIp>"));
    }
}
