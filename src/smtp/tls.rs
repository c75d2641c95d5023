use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ClientConfig, RootCertStore, ServerName};
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tokio_rustls::TlsConnector;

use super::error::ProbeError;

/// Builds the connector shared by every probe for implicit TLS and STARTTLS.
///
/// With `accept_invalid_certs` the server certificate is not verified at all;
/// mail exchangers routinely present certificates for a different name and the
/// probe only needs an encrypted channel. Otherwise certificates are checked
/// against the platform trust store.
pub fn build_tls_connector(accept_invalid_certs: bool) -> TlsConnector {
    let config = ClientConfig::builder().with_safe_defaults();

    let config = if accept_invalid_certs {
        config
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth()
    } else {
        config
            .with_root_certificates(native_root_store())
            .with_no_client_auth()
    };

    TlsConnector::from(Arc::new(config))
}

pub(crate) fn server_name(host: &str) -> Result<ServerName, ProbeError> {
    match IpAddr::from_str(host) {
        Ok(ip) => Ok(ServerName::IpAddress(ip)),
        Err(_) => ServerName::try_from(host)
            .map_err(|_| ProbeError::InvalidServerName(host.to_string())),
    }
}

fn native_root_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            for cert in certs {
                if let Err(err) = roots.add(&Certificate(cert.0)) {
                    tracing::trace!(error = %err, "skipping unusable native certificate");
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not load native root certificates");
        }
    }
    roots
}

struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}
