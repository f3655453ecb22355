use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config as ConfigLib, Environment as EnvSource, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::endpoint::ApiGeneration;
use crate::tls::TlsError;

/// Errors produced while assembling the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No PKCS#12 data was supplied.
    #[error("a PKCS#12 certificate bundle must be supplied")]
    MissingCertificate,

    /// The certificate passphrase was empty or absent.
    #[error("a passphrase for the certificate bundle must be supplied")]
    MissingPassphrase,

    /// The environment label did not name a known environment.
    #[error("unknown environment `{0}`: allowed environments are `production` and `test`")]
    UnknownEnvironment(String),

    /// A configured file could not be read.
    #[error("failed to read `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The certificate bundle could not be turned into a TLS identity.
    #[error(transparent)]
    Certificate(#[from] TlsError),

    /// Configuration sources could not be loaded or deserialized.
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// Target BankID environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test environment, backed by the BankID test root.
    Test,
    /// Production environment. The default.
    #[default]
    Production,
}

impl Environment {
    pub fn is_test(self) -> bool {
        matches!(self, Environment::Test)
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Test => "test",
            Environment::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Client certificate material and the environment it belongs to.
///
/// A bundle is assembled once and handed to
/// [`BankIdClient`](crate::client::BankIdClient) at construction. The
/// PKCS#12 data and passphrase are never exposed through `Debug`.
#[derive(Clone)]
pub struct CertificateBundle {
    pkcs12: Vec<u8>,
    passphrase: SecretString,
    environment: Environment,
    ca: Option<Vec<u8>>,
    accept_invalid_certs: bool,
}

impl CertificateBundle {
    /// Creates a bundle from in-memory PKCS#12 data.
    ///
    /// # Errors
    ///
    /// Fails when the certificate data or the passphrase is empty. The
    /// PKCS#12 contents are not parsed until a client is built from the
    /// bundle.
    pub fn from_bytes(
        pkcs12: impl Into<Vec<u8>>,
        passphrase: impl Into<SecretString>,
    ) -> Result<Self, ConfigError> {
        let pkcs12 = pkcs12.into();
        if pkcs12.is_empty() {
            return Err(ConfigError::MissingCertificate);
        }
        let passphrase = passphrase.into();
        if passphrase.expose_secret().is_empty() {
            return Err(ConfigError::MissingPassphrase);
        }

        Ok(Self {
            pkcs12,
            passphrase,
            environment: Environment::default(),
            ca: None,
            accept_invalid_certs: false,
        })
    }

    /// Creates a bundle by reading the PKCS#12 file at `path`.
    pub fn from_path(
        path: impl AsRef<Path>,
        passphrase: impl Into<SecretString>,
    ) -> Result<Self, ConfigError> {
        let bytes = read_file(path.as_ref())?;
        Self::from_bytes(bytes, passphrase)
    }

    /// Sets the target environment. Defaults to production.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Provides CA roots in PEM form used to verify the remote server
    /// certificate, in addition to the system roots.
    pub fn with_ca(mut self, ca_pem: impl Into<Vec<u8>>) -> Self {
        self.ca = Some(ca_pem.into());
        self
    }

    /// Reads CA roots in PEM form from the file at `path`.
    pub fn with_ca_path(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let pem = read_file(path.as_ref())?;
        Ok(self.with_ca(pem))
    }

    /// Disables verification of the remote server certificate.
    ///
    /// Never enable this for production traffic.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Environment this bundle targets.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub(crate) fn pkcs12(&self) -> &[u8] {
        &self.pkcs12
    }

    pub(crate) fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }

    pub(crate) fn ca(&self) -> Option<&[u8]> {
        self.ca.as_deref()
    }

    pub(crate) fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}

impl fmt::Debug for CertificateBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateBundle")
            .field("pkcs12_len", &self.pkcs12.len())
            .field("environment", &self.environment)
            .field("ca_len", &self.ca.as_ref().map(Vec::len))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish_non_exhaustive()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Certificate entries of the file and environment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateConfig {
    /// Path to the PKCS#12 client certificate bundle.
    pub path: String,
    /// Passphrase protecting the bundle.
    pub passphrase: SecretString,
    /// Optional path to a PEM file with the CA roots of the remote server.
    #[serde(default)]
    pub ca_path: Option<String>,
}

/// Client configuration loaded from `config/bankid.*` files and `BANKID_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub certificate: CertificateConfig,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub generation: ApiGeneration,
    #[serde(default)]
    pub danger_accept_invalid_certs: bool,
}

impl Config {
    /// Loads the configuration from the default sources.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    /// Loads the configuration, overriding entries with the provided map
    /// instead of reading process environment variables. Lets tests avoid
    /// mutating the process environment.
    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("environment", "production")?
            .set_default("generation", "rest")?
            .set_default("danger_accept_invalid_certs", false)?
            .add_source(File::with_name("config/bankid").required(false));

        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Should be in the format BANKID_ENVIRONMENT or
            // BANKID_CERTIFICATE__PATH
            builder = builder.add_source(
                EnvSource::with_prefix("BANKID")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Materializes the certificate bundle, reading the configured files.
    pub fn certificate_bundle(&self) -> Result<CertificateBundle, ConfigError> {
        let mut bundle = CertificateBundle::from_path(
            &self.certificate.path,
            self.certificate.passphrase.clone(),
        )?
        .with_environment(self.environment);

        if let Some(ca_path) = &self.certificate.ca_path {
            bundle = bundle.with_ca_path(ca_path)?;
        }
        if self.danger_accept_invalid_certs {
            bundle = bundle.danger_accept_invalid_certs(true);
        }

        Ok(bundle)
    }
}
