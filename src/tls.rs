mod cert_utils;
mod errors;

pub use cert_utils::*;
pub use errors::TlsError;

use openssl::pkcs12::Pkcs12;
use reqwest::{Certificate, ClientBuilder, Identity};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::config::CertificateBundle;

/// Client-side TLS material assembled from a [`CertificateBundle`].
///
/// The PKCS#12 bundle is decrypted once, converted to the PEM identity the
/// HTTP client understands, and combined with the configured trust roots.
pub struct ClientIdentity {
    identity: Identity,
    roots: Vec<Certificate>,
    accept_invalid_certs: bool,
}

impl ClientIdentity {
    /// Builds the TLS identity from the bundle.
    ///
    /// # Errors
    ///
    /// Fails when the PKCS#12 data cannot be decrypted with the supplied
    /// passphrase, or lacks a certificate or private key.
    pub fn from_bundle(bundle: &CertificateBundle) -> Result<Self, TlsError> {
        let pkcs12 = Pkcs12::from_der(bundle.pkcs12()).map_err(TlsError::Pkcs12)?;
        let parsed = pkcs12
            .parse2(bundle.passphrase().expose_secret())
            .map_err(TlsError::Pkcs12)?;

        let cert = parsed.cert.ok_or(TlsError::MissingClientCert)?;
        let key = parsed.pkey.ok_or(TlsError::MissingPrivateKey)?;

        let mut pem = cert.to_pem()?;
        pem.extend_from_slice(&key.private_key_to_pem_pkcs8()?);
        if let Some(chain) = &parsed.ca {
            for extra in chain.iter() {
                pem.extend_from_slice(&extra.to_pem()?);
            }
        }
        let identity = Identity::from_pem(&pem).map_err(TlsError::Identity)?;

        let roots = match bundle.ca() {
            Some(ca_pem) => Certificate::from_pem_bundle(ca_pem).map_err(TlsError::Identity)?,
            None => Vec::new(),
        };

        debug!(roots = roots.len(), "assembled client TLS identity");

        Ok(Self {
            identity,
            roots,
            accept_invalid_certs: bundle.accepts_invalid_certs(),
        })
    }

    /// Applies the identity and trust configuration to an HTTP client
    /// builder.
    pub(crate) fn apply(self, builder: ClientBuilder) -> ClientBuilder {
        let mut builder = builder.identity(self.identity).https_only(true);
        for root in self.roots {
            builder = builder.add_root_certificate(root);
        }
        if self.accept_invalid_certs {
            debug!("server certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
    }
}
