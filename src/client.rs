//! The BankID relying-party client and its per-generation transports.

mod rest;
mod soap;

use tracing::debug;
use validator::Validate;

use crate::config::{CertificateBundle, Config, ConfigError, Environment};
use crate::endpoint::{ApiGeneration, Endpoint};
use crate::error::Error;
use crate::model::{AuthenticateRequest, CollectResponse, OrderResponse, SignRequest};
use crate::tls::{ClientIdentity, TlsError};

/// Asynchronous client for the BankID relying-party API.
///
/// One client owns one certificate bundle and targets one environment and
/// API generation, all fixed at construction. The client holds no per-call
/// state, so operations for different orders can be issued concurrently,
/// and cloning is cheap.
#[derive(Debug, Clone)]
pub struct BankIdClient {
    bundle: CertificateBundle,
    transport: Transport,
}

#[derive(Debug, Clone)]
enum Transport {
    Soap(soap::SoapTransport),
    Rest(rest::RestTransport),
}

impl BankIdClient {
    /// Builds a client for the current REST generation.
    pub fn new(bundle: CertificateBundle) -> Result<Self, Error> {
        Self::with_generation(bundle, ApiGeneration::default())
    }

    /// Builds a client for the given API generation, resolving the official
    /// endpoint from the bundle's environment.
    pub fn with_generation(
        bundle: CertificateBundle,
        generation: ApiGeneration,
    ) -> Result<Self, Error> {
        let endpoint = Endpoint::resolve(bundle.environment(), generation);
        Self::with_endpoint(bundle, endpoint)
    }

    /// Builds a client against an explicit endpoint, keeping the endpoint
    /// generation's transport and fault handling.
    pub fn with_endpoint(bundle: CertificateBundle, endpoint: Endpoint) -> Result<Self, Error> {
        let identity = ClientIdentity::from_bundle(&bundle).map_err(ConfigError::from)?;
        let http = identity
            .apply(reqwest::Client::builder())
            .build()
            .map_err(|e| ConfigError::from(TlsError::Identity(e)))?;

        debug!(
            environment = %bundle.environment(),
            generation = %endpoint.generation(),
            base_url = endpoint.base_url(),
            "constructed BankID client"
        );

        let transport = match endpoint.generation() {
            ApiGeneration::SoapV4 | ApiGeneration::SoapV5 => {
                Transport::Soap(soap::SoapTransport::new(http, endpoint))
            }
            ApiGeneration::Rest => Transport::Rest(rest::RestTransport::new(http, endpoint)),
        };

        Ok(Self { bundle, transport })
    }

    /// Builds a client from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let bundle = config.certificate_bundle()?;
        Self::with_generation(bundle, config.generation)
    }

    /// Target environment of this client.
    pub fn environment(&self) -> Environment {
        self.bundle.environment()
    }

    /// API generation this client speaks.
    pub fn generation(&self) -> ApiGeneration {
        self.endpoint().generation()
    }

    /// Resolved service endpoint of this client.
    pub fn endpoint(&self) -> &Endpoint {
        match &self.transport {
            Transport::Soap(transport) => transport.endpoint(),
            Transport::Rest(transport) => transport.endpoint(),
        }
    }

    /// Whether the configured generation exposes the cancel operation.
    pub fn supports_cancel(&self) -> bool {
        self.generation().supports_cancel()
    }

    /// Starts an authentication order.
    ///
    /// The request is validated first; an invalid request fails without any
    /// network activity. On success the remote returns the session
    /// identifiers used to poll the order.
    pub async fn authenticate(&self, request: AuthenticateRequest) -> Result<OrderResponse, Error> {
        request.validate()?;
        match &self.transport {
            Transport::Soap(transport) => transport.authenticate(&request).await,
            Transport::Rest(transport) => transport.authenticate(&request).await,
        }
    }

    /// Starts a signing order.
    ///
    /// The request is validated first, then the free-text data fields are
    /// base64-encoded for the wire.
    pub async fn sign(&self, request: SignRequest) -> Result<OrderResponse, Error> {
        request.validate()?;
        let request = request.encoded();
        match &self.transport {
            Transport::Soap(transport) => transport.sign(&request).await,
            Transport::Rest(transport) => transport.sign(&request).await,
        }
    }

    /// Polls the state of an outstanding order. The order reference is an
    /// opaque token and is not validated locally.
    ///
    /// This layer performs a single call per invocation; scheduling repeated
    /// polls is the caller's responsibility.
    pub async fn collect(&self, order_ref: &str) -> Result<CollectResponse, Error> {
        match &self.transport {
            Transport::Soap(transport) => transport.collect(order_ref).await,
            Transport::Rest(transport) => transport.collect(order_ref).await,
        }
    }

    /// Cancels an outstanding order.
    ///
    /// Only the REST generation exposes this operation. On the SOAP
    /// generations the call fails with [`Error::Unsupported`] before any
    /// network activity; probe with [`supports_cancel`](Self::supports_cancel)
    /// to avoid the error.
    pub async fn cancel(&self, order_ref: &str) -> Result<(), Error> {
        match &self.transport {
            Transport::Soap(transport) => Err(Error::Unsupported {
                operation: "cancel",
                generation: transport.endpoint().generation(),
            }),
            Transport::Rest(transport) => transport.cancel(order_ref).await,
        }
    }
}
