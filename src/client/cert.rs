// File: ./src/client/cert.rs
// TLS connector setup for the model endpoint
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;

/// `https` endpoints are verified against the system roots and never fall
/// back to plain HTTP. `http` endpoints (local proxies, test servers) get a
/// connector that speaks plain HTTP only.
pub fn build_connector(scheme: Option<&str>) -> Result<HttpsConnector<HttpConnector>, String> {
    match scheme {
        Some("https") => {
            let mut root_store = rustls::RootCertStore::empty();
            let result = rustls_native_certs::load_native_certs();
            root_store.add_parsable_certificates(result.certs);

            if root_store.is_empty() {
                return Err("No valid system certificates found.".to_string());
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            Ok(HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_only()
                .enable_http1()
                .build())
        }
        Some("http") => {
            // No trusted roots: any https URL reached through this connector fails.
            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(rustls::RootCertStore::empty())
                .with_no_client_auth();

            Ok(HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build())
        }
        other => Err(format!("Unsupported endpoint scheme '{}'.", other.unwrap_or(""))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_needs_no_system_roots() {
        assert!(build_connector(Some("http")).is_ok());
    }

    #[test]
    fn unknown_schemes_are_rejected() {
        assert!(build_connector(Some("ftp")).is_err());
        assert!(build_connector(None).is_err());
    }
}
