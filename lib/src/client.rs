use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::verify_server_cert_signed_by_trust_anchor;
use rustls::crypto::CryptoProvider;
use rustls::server::ParsedCertificate;
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::path::Path;
use std::sync::Arc;

use crate::name::ServerNameVerification;
use crate::{Error, ProtocolVersions};

/// Create a client configuration based on a chain verifier with custom name verification
///
/// The server's chain is validated against the CA certificates in `ca_cert_path`, after which
/// the name passed to the connector is checked as specified by `name_verification`.
pub fn authority(
    versions: ProtocolVersions,
    name_verification: ServerNameVerification,
    ca_cert_path: &Path,
    local_cert_path: &Path,
    private_key_path: &Path,
    private_key_password: Option<&str>,
) -> Result<rustls::ClientConfig, Error> {
    let ca_certs = crate::pem::read_certificates(ca_cert_path)?;
    let cert_chain = crate::pem::read_certificates(local_cert_path)?;
    let private_key = crate::pem::read_private_key(private_key_path, private_key_password)?;

    let mut root_cert_store = RootCertStore::empty();
    for cert in ca_certs {
        root_cert_store.add(cert)?;
    }

    let provider = Arc::new(crate::default_crypto_provider());

    let verifier = ServerNameVerifier {
        roots: Arc::new(root_cert_store),
        provider: provider.clone(),
        verification: name_verification,
    };

    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(versions.versions()?)?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_client_auth_cert(cert_chain, private_key)?;

    Ok(config)
}

/// Validates the chain with WebPKI, then applies the configured name policy
#[derive(Debug)]
struct ServerNameVerifier {
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
    verification: ServerNameVerification,
}

impl ServerCertVerifier for ServerNameVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let parsed = ParsedCertificate::try_from(end_entity)?;

        verify_server_cert_signed_by_trust_anchor(
            &parsed,
            &self.roots,
            intermediates,
            now,
            self.provider.signature_verification_algorithms.all,
        )?;

        match self.verification.policy() {
            Some(policy) => {
                crate::verify::verify_end_entity_name(end_entity, server_name, policy)?;
            }
            None => {
                log::debug!("name verification disabled, accepting server as {server_name:?}");
            }
        }

        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
