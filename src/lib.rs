//! Client library for the BankID relying-party API.
//!
//! Connects with a PKCS#12 client certificate over mutually-authenticated
//! TLS and speaks either the legacy SOAP interfaces (RP v4 and v5) or the
//! current JSON interface (RP v5), selected once at construction. Remote
//! faults from both interfaces are normalized into a single
//! [`ApiFault`](error::ApiFault) shape.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod soap;
pub mod tls;

pub use client::BankIdClient;
pub use config::{CertificateBundle, Config, ConfigError, Environment};
pub use endpoint::{ApiGeneration, Endpoint};
pub use error::{ApiFault, Error};
