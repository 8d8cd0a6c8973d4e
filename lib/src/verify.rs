use log::{debug, trace, warn};
use rustls::{CertificateError, CommonState};
use rustls_pki_types::{CertificateDer, ServerName};
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use crate::certificate::Certificate;
use crate::matcher::matches;
use crate::name::NamePolicy;

/// Check whether a peer certificate authorizes the peer to act as `hostname`
///
/// * no certificate never matches
/// * if the certificate's SAN extension lists DNS names, `hostname` must match one of them and the
///   common name is ignored, even if it would have matched
/// * otherwise (no SAN extension, or one without DNS names) `hostname` must match the common name
///
/// Every name is compared with [`matches`](crate::matches), so wildcard rules are identical for
/// SAN entries and the common name.
pub fn verify_cert_matches_host<C>(cert: Option<&C>, hostname: &str) -> bool
where
    C: Certificate + ?Sized,
{
    match cert {
        Some(cert) => verify_names(cert, hostname, NamePolicy::SanOrCommonName),
        None => {
            debug!("no peer certificate to authorize '{hostname}'");
            false
        }
    }
}

/// Check whether a certificate authorizes `hostname` under the specified [`NamePolicy`]
pub fn verify_names<C>(cert: &C, hostname: &str, policy: NamePolicy) -> bool
where
    C: Certificate + ?Sized,
{
    if cert.has_subject_alt_names() {
        let matched = cert.subject_alt_dns_names().into_iter().any(|name| {
            let matched = matches(name, hostname);
            trace!("SAN '{name}' vs '{hostname}': {matched}");
            matched
        });
        debug!("'{hostname}' authorized by SAN extension: {matched}");
        return matched;
    }

    if policy == NamePolicy::SanOnly {
        debug!("'{hostname}' not authorized: no SAN DNS names");
        return false;
    }

    match cert.common_name() {
        Some(cn) => {
            let matched = matches(cn, hostname);
            debug!("'{hostname}' authorized by legacy CN '{cn}': {matched}");
            matched
        }
        None => {
            debug!("'{hostname}' not authorized: neither SAN DNS names nor CN present");
            false
        }
    }
}

/// Check whether the peer of an established session is authorized to act as `hostname`
///
/// Works with both client and server connections. If the handshake hasn't provided a peer
/// certificate, or the end-entity certificate cannot be decoded, the result is `false`.
pub fn verify_peer_cert_matches_host(session: &CommonState, hostname: &str) -> bool {
    let end_entity = session
        .peer_certificates()
        .and_then(|chain| chain.first());

    let end_entity = match end_entity {
        Some(x) => x,
        None => return verify_cert_matches_host::<X509Certificate>(None, hostname),
    };

    match X509Certificate::from_der(end_entity.as_ref()) {
        Ok((_, cert)) => verify_cert_matches_host(Some(&cert), hostname),
        Err(err) => {
            warn!("unable to decode peer certificate: {err}");
            false
        }
    }
}

/// Name check used by the Rustls verifiers once the chain itself has been validated
pub(crate) fn verify_end_entity_name(
    end_entity: &CertificateDer<'_>,
    name: &ServerName<'_>,
    policy: NamePolicy,
) -> Result<(), rustls::Error> {
    let hostname = match name {
        ServerName::DnsName(name) => name.as_ref(),
        _ => {
            debug!("only DNS names can be verified, rejecting {name:?}");
            return Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName,
            ));
        }
    };

    let (_, cert) = X509Certificate::from_der(end_entity.as_ref()).map_err(|err| {
        warn!("unable to decode end-entity certificate: {err}");
        rustls::Error::InvalidCertificate(CertificateError::BadEncoding)
    })?;

    if !verify_names(&cert, hostname, policy) {
        return Err(rustls::Error::InvalidCertificate(
            CertificateError::NotValidForName,
        ));
    }

    Ok(())
}
