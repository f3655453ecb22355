use std::sync::{Arc, OnceLock};

use axum::Router;
use axum_server::tls_openssl::{OpenSSLAcceptor, OpenSSLConfig};
use openssl::pkey::PKey;
use openssl::ssl::{SslAcceptor, SslMethod, SslVerifyMode};
use openssl::x509::X509;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bankid_client::tls::TestCertificates;
use bankid_client::{ApiGeneration, BankIdClient, CertificateBundle, Endpoint, Environment};

/// Passphrase protecting the generated client PKCS#12 bundles.
pub const PASSPHRASE: &str = "qwerty123";

static TRACING: OnceLock<()> = OnceLock::new();

pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    });
}

/// Spawns the given router behind a TLS listener that requires client
/// certificates, returning the base URL of the server.
pub async fn spawn_server(router: Router, certs: &TestCertificates) -> String {
    init_tracing();

    let acceptor = build_acceptor(certs);
    let config = OpenSSLConfig::from_acceptor(Arc::new(acceptor));

    let listener = tokio::net::TcpListener::bind(("localhost", 0))
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    let std_listener = listener.into_std().unwrap();

    let server = axum_server::from_tcp(std_listener).acceptor(OpenSSLAcceptor::new(config));
    let app = router.layer(TraceLayer::new_for_http());
    tokio::spawn(server.serve(app.into_make_service()));

    format!("https://localhost:{port}")
}

/// Builds a client that trusts the test CA and presents the generated
/// client certificate, aimed at `base_url`.
pub fn test_client(
    base_url: &str,
    generation: ApiGeneration,
    certs: &TestCertificates,
) -> BankIdClient {
    let bundle = CertificateBundle::from_bytes(certs.client_pkcs12.clone(), PASSPHRASE)
        .unwrap()
        .with_environment(Environment::Test)
        .with_ca(certs.ca_cert.clone());

    BankIdClient::with_endpoint(bundle, Endpoint::custom(base_url, generation)).unwrap()
}

/// TLS acceptor with the test server identity, trusting the test CA for
/// client authentication.
fn build_acceptor(certs: &TestCertificates) -> SslAcceptor {
    let mut builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls_server()).unwrap();

    let cert = X509::from_pem(&certs.server_cert).unwrap();
    builder.set_certificate(&cert).unwrap();
    let key = PKey::private_key_from_pem(&certs.server_key).unwrap();
    builder.set_private_key(&key).unwrap();

    let ca = X509::from_pem(&certs.ca_cert).unwrap();
    builder.cert_store_mut().add_cert(ca).unwrap();
    builder.set_verify(SslVerifyMode::PEER | SslVerifyMode::FAIL_IF_NO_PEER_CERT);

    builder.build()
}
