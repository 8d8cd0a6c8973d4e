use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::FromDer;

use crate::Error;

/// Read-only view of the names claimed by a decoded, already validated certificate
///
/// This is the only way hostname verification looks at a certificate. Implementations must not
/// mutate the certificate and must tolerate concurrent reads through `&self`.
pub trait Certificate {
    /// True if the subject alternative name (SAN) extension lists at least one DNS name.
    ///
    /// When this is true, the common name is never used for hostname verification. A SAN
    /// extension holding only other entry types (IP addresses, e-mail addresses) doesn't count.
    fn has_subject_alt_names(&self) -> bool;

    /// DNS names listed in the SAN extension, in certificate order
    fn subject_alt_dns_names(&self) -> Vec<&str>;

    /// Common name (CN) of the subject, if present
    ///
    /// Only one CN takes part in verification. If the subject carries several, implementations
    /// return the first one.
    fn common_name(&self) -> Option<&str>;
}

/// Names accessor over a certificate decoded with [x509-parser](https://crates.io/crates/x509-parser)
///
/// A SAN extension that is present but cannot be decoded (or is duplicated) counts as holding DNS
/// names and yields none of them, so verification against it fails instead of falling back to the
/// common name.
impl Certificate for X509Certificate<'_> {
    fn has_subject_alt_names(&self) -> bool {
        match self.subject_alternative_name() {
            Ok(Some(san)) => san
                .value
                .general_names
                .iter()
                .any(|name| matches!(name, GeneralName::DNSName(_))),
            Ok(None) => false,
            Err(_) => true,
        }
    }

    fn subject_alt_dns_names(&self) -> Vec<&str> {
        match self.subject_alternative_name() {
            Ok(Some(san)) => san
                .value
                .general_names
                .iter()
                .filter_map(|name| match name {
                    GeneralName::DNSName(x) => Some(*x),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn common_name(&self) -> Option<&str> {
        self.subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
    }
}

/// Owned snapshot of the names a certificate claims
///
/// Useful to describe a certificate without any DER at hand, or to keep the names of a
/// certificate around after the DER has been dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateNames {
    /// `None` if the certificate has no SAN DNS names to check
    subject_alt_names: Option<Vec<String>>,
    common_name: Option<String>,
}

impl CertificateNames {
    /// Construct a set of names with no SAN extension and no common name
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a DNS name to the SAN extension, creating the extension if required
    pub fn with_dns_name<S: Into<String>>(self, name: S) -> Self {
        let mut names = self.subject_alt_names.unwrap_or_default();
        names.push(name.into());
        Self {
            subject_alt_names: Some(names),
            ..self
        }
    }

    /// Block the common name fallback without adding any DNS name, as an undecodable SAN extension
    /// does
    pub fn with_subject_alt_names(self) -> Self {
        Self {
            subject_alt_names: Some(self.subject_alt_names.unwrap_or_default()),
            ..self
        }
    }

    /// Set the common name of the subject
    pub fn with_common_name<S: Into<String>>(self, name: S) -> Self {
        Self {
            common_name: Some(name.into()),
            ..self
        }
    }

    /// Copy the names out of any other [`Certificate`] implementation
    pub fn snapshot<C: Certificate + ?Sized>(cert: &C) -> Self {
        let subject_alt_names = if cert.has_subject_alt_names() {
            Some(
                cert.subject_alt_dns_names()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            )
        } else {
            None
        };

        Self {
            subject_alt_names,
            common_name: cert.common_name().map(str::to_owned),
        }
    }

    /// Decode the names from a DER encoded X.509 certificate
    ///
    /// Unlike the lenient [`Certificate`] implementation on `X509Certificate`, this returns an
    /// error if the SAN extension is present but malformed.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let (_, cert) = X509Certificate::from_der(der)?;

        // surfaces duplicate or undecodable SAN extensions
        cert.subject_alternative_name()?;

        Ok(Self::snapshot(&cert))
    }
}

impl Certificate for CertificateNames {
    fn has_subject_alt_names(&self) -> bool {
        self.subject_alt_names.is_some()
    }

    fn subject_alt_dns_names(&self) -> Vec<&str> {
        self.subject_alt_names
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }
}
