use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use rustls_pemfile::{certs, private_key};

use crate::error::{Result, TransportError};

/// Server-side TLS credentials: a certificate chain and its private key.
///
/// Supplying an identity at construction time is what selects the secure
/// transport for a listener; there is no runtime upgrade path.
#[derive(Clone)]
pub struct TlsIdentity {
    config: Arc<ServerConfig>,
}

impl TlsIdentity {
    /// Load a certificate chain and private key from PEM bytes.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let cert_chain = read_cert_chain(cert_pem)?;
        let key = read_private_key(key_pem)?;

        let config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(cert_chain, key)?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Load a certificate chain and private key from PEM files.
    pub fn from_pem_files(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<Self> {
        let cert_pem = std::fs::read(cert_path.as_ref())?;
        let key_pem = std::fs::read(key_path.as_ref())?;
        Self::from_pem(&cert_pem, &key_pem)
    }

    /// The rustls server configuration built from this identity.
    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }
}

impl std::fmt::Debug for TlsIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsIdentity").finish_non_exhaustive()
    }
}

/// Build a client configuration trusting exactly the given PEM CA bundle.
pub fn client_config_from_ca_pem(ca_pem: &[u8]) -> Result<Arc<ClientConfig>> {
    let ca_certs = read_cert_chain(ca_pem)?;
    let mut roots = RootCertStore::empty();
    for cert in ca_certs {
        roots
            .add(cert)
            .map_err(|err| TransportError::InvalidPem(err.to_string()))?;
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

fn read_cert_chain(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = std::io::BufReader::new(pem);
    let cert_chain = certs(&mut reader).collect::<std::io::Result<Vec<_>>>()?;
    if cert_chain.is_empty() {
        return Err(TransportError::InvalidPem(
            "no certificates found in PEM input".to_string(),
        ));
    }
    Ok(cert_chain)
}

fn read_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    let mut reader = std::io::BufReader::new(pem);
    private_key(&mut reader)?.ok_or_else(|| {
        TransportError::InvalidPem("no private key found in PEM input".to_string())
    })
}
