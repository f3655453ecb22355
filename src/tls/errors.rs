use openssl::error::ErrorStack;
use thiserror::Error;

/// Errors that can occur while assembling the client TLS material.
#[derive(Error, Debug)]
pub enum TlsError {
    /// The PKCS#12 data could not be decrypted. Usually a wrong passphrase
    /// or a corrupt bundle.
    #[error("failed to decrypt the PKCS#12 certificate bundle")]
    Pkcs12(#[source] ErrorStack),

    #[error("the PKCS#12 bundle does not contain a client certificate")]
    MissingClientCert,

    #[error("the PKCS#12 bundle does not contain a private key")]
    MissingPrivateKey,

    #[error(transparent)]
    OpenSSL(#[from] ErrorStack),

    /// The HTTP client rejected the assembled identity or trust roots.
    #[error("failed to build the TLS client identity")]
    Identity(#[source] reqwest::Error),
}
