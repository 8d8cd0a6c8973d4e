use rustls_pki_types::ServerName;

/// Which certificate fields may authorize a DNS name
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NamePolicy {
    /// Only the DNS names of the subject alternative name (SAN) extension are used
    SanOnly,
    /// SAN DNS names are used if the extension is present, otherwise the common name (CN) is used
    SanOrCommonName,
}

/// Specifies how name verification should or should not be performed on the server's name
///
/// Server names get passed in when connecting, so no name is present in this enum
#[derive(Copy, Clone, Debug)]
pub enum ServerNameVerification {
    /// Only verify the server's name from the SAN extension
    SanExtOnly,
    /// Prefer SAN-based verification, but try the common name if the SAN is absent
    SanOrCommonName,
    /// DANGER: Don't perform any name verification
    DisableNameVerification,
}

impl ServerNameVerification {
    pub(crate) fn policy(self) -> Option<NamePolicy> {
        match self {
            Self::SanExtOnly => Some(NamePolicy::SanOnly),
            Self::SanOrCommonName => Some(NamePolicy::SanOrCommonName),
            Self::DisableNameVerification => None,
        }
    }
}

/// Specifies how name verification should or should not be performed on the client's name
#[derive(Clone, Debug)]
pub enum ClientNameVerification {
    /// Don't perform any client name verification (which is the default for mTLS)
    None,
    /// Check that the client's SAN extension authorizes this name
    SanExtOnly(ServerName<'static>),
    /// Check that the client's SAN extension authorizes this name, or its common name if the
    /// SAN extension is absent
    SanOrCommonName(ServerName<'static>),
}

impl ClientNameVerification {
    pub(crate) fn expected(&self) -> Option<(&ServerName<'static>, NamePolicy)> {
        match self {
            Self::None => None,
            Self::SanExtOnly(name) => Some((name, NamePolicy::SanOnly)),
            Self::SanOrCommonName(name) => Some((name, NamePolicy::SanOrCommonName)),
        }
    }
}
