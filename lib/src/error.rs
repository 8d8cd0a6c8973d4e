use rustls::client::VerifierBuilderError;
use x509_parser::error::X509Error;
use x509_parser::nom;

/// Opaque error type used by the library that implements [`std::error::Error`].
#[derive(Debug)]
pub struct Error {
    details: Details,
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Details::Io(err).into()
    }
}

impl From<crate::pem::Error> for Error {
    fn from(err: crate::pem::Error) -> Self {
        Details::Pem(err).into()
    }
}

impl From<X509Error> for Error {
    fn from(err: X509Error) -> Self {
        Details::X509(err).into()
    }
}

impl From<nom::Err<X509Error>> for Error {
    fn from(err: nom::Err<X509Error>) -> Self {
        match err {
            nom::Err::Error(err) | nom::Err::Failure(err) => err.into(),
            nom::Err::Incomplete(_) => X509Error::InvalidCertificate.into(),
        }
    }
}

impl From<rustls::Error> for Error {
    fn from(err: rustls::Error) -> Self {
        Details::Tls(err).into()
    }
}

impl From<VerifierBuilderError> for Error {
    fn from(err: VerifierBuilderError) -> Self {
        Details::BuilderError(err).into()
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self { details }
    }
}

#[derive(Debug)]
pub(crate) enum Details {
    /// Error reading PEM data from file
    Io(std::io::Error),
    /// Bad PEM file
    Pem(crate::pem::Error),
    /// Error decoding a certificate
    X509(X509Error),
    /// Error returned by Rustls
    Tls(rustls::Error),
    /// Error building a certificate verifier
    BuilderError(VerifierBuilderError),
    /// Neither TLS 1.2 nor TLS 1.3 is enabled
    NoProtocolVersions,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.details {
            Details::Io(err) => write!(f, "I/O error: {err}"),
            Details::Pem(err) => write!(f, "PEM error: {err}"),
            Details::X509(err) => write!(f, "X.509 error: {err}"),
            Details::Tls(err) => write!(f, "Rustls error: {err}"),
            Details::BuilderError(err) => write!(f, "Error building certificate verifier: {err}"),
            Details::NoProtocolVersions => f.write_str("No TLS protocol version is enabled"),
        }
    }
}
