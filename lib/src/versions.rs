use crate::error::Details;
use crate::Error;

/// Specifies which protocol versions should be allowed
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProtocolVersions {
    /// Allow TLS 1.2
    v1_2: bool,
    /// Allow TLS 1.3
    v1_3: bool,
}

impl ProtocolVersions {
    /// Construct ProtocolVersions with nothing enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct ProtocolVersions with both TLS 1.2 and TLS 1.3 enabled
    pub fn all() -> Self {
        Self::new().enable_v12().enable_v13()
    }

    /// Construct ProtocolVersions with only TLS 1.2 enabled
    pub fn v12_only() -> Self {
        Self::new().enable_v12()
    }

    /// Construct ProtocolVersions with only TLS 1.3 enabled
    pub fn v13_only() -> Self {
        Self::new().enable_v13()
    }

    /// Enable support for TLS 1.2
    pub fn enable_v12(self) -> Self {
        Self { v1_2: true, ..self }
    }

    /// Enable support for TLS 1.3
    pub fn enable_v13(self) -> Self {
        Self { v1_3: true, ..self }
    }

    /// The Rustls versions, or an error if none is enabled
    pub(crate) fn versions(
        self,
    ) -> Result<&'static [&'static rustls::SupportedProtocolVersion], Error> {
        static V12_ONLY: &[&rustls::SupportedProtocolVersion] = &[&rustls::version::TLS12];
        static V13_ONLY: &[&rustls::SupportedProtocolVersion] = &[&rustls::version::TLS13];
        static V12_AND_V13: &[&rustls::SupportedProtocolVersion] =
            &[&rustls::version::TLS13, &rustls::version::TLS12];

        match (self.v1_2, self.v1_3) {
            (false, false) => Err(Details::NoProtocolVersions.into()),
            (false, true) => Ok(V13_ONLY),
            (true, false) => Ok(V12_ONLY),
            (true, true) => Ok(V12_AND_V13),
        }
    }
}
