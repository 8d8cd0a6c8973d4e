use std::path::Path;

use rustls_pki_types::{
    CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer, PrivateSec1KeyDer,
};

/// Error type used by the PEM routines that implements [`std::error::Error`]
#[derive(Debug)]
pub(crate) struct Error {
    details: ErrorDetails,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.details {
            ErrorDetails::InvalidPem(err) => write!(f, "PEM error: {err}"),
            ErrorDetails::DecryptionError(err) => write!(f, "PKCS#8 error: {err}"),
            ErrorDetails::NoPrivateKey => {
                f.write_str("PEM file does not contain a supported private key")
            }
            ErrorDetails::MoreThanOnePrivateKey => {
                f.write_str("PEM file contains more than one supported private key")
            }
            ErrorDetails::NoCertificate => f.write_str("PEM file does not contain a certificate"),
            ErrorDetails::PasswordRequired => {
                f.write_str("PEM file only contains an encrypted private key, but no password was supplied")
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug)]
enum ErrorDetails {
    /// Invalid PEM file
    InvalidPem(pem::PemError),
    /// Bad PKCS #8 format or decryption failure
    DecryptionError(pkcs8::Error),
    /// PEM file does not contain a recognized private key format
    NoPrivateKey,
    /// PEM file contains more than one private key
    MoreThanOnePrivateKey,
    /// PEM file does not contain at least one certificate
    NoCertificate,
    /// Private key is encrypted but no password was given
    PasswordRequired,
}

/// Read at least 1 certificate from a PEM file
pub(crate) fn read_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, crate::Error> {
    let data = std::fs::read(path)?;
    Ok(parse_certificates(data)?)
}

/// Read the single private key contained in a PEM file, decrypting it if a password is supplied
pub(crate) fn read_private_key(
    path: &Path,
    password: Option<&str>,
) -> Result<PrivateKeyDer<'static>, crate::Error> {
    let data = std::fs::read(path)?;
    let key = match password {
        Some(password) => PrivateKey::decrypt_from_pem(data, password)?,
        None => PrivateKey::read_from_pem(data)?,
    };
    Ok(key.into_inner())
}

fn parse_certificates<B: AsRef<[u8]>>(bytes: B) -> Result<Vec<CertificateDer<'static>>, Error> {
    let certs: Vec<CertificateDer<'static>> = pem::parse_many(bytes)?
        .into_iter()
        .filter(|x| x.tag() == "CERTIFICATE")
        .map(|x| CertificateDer::from(x.into_contents()))
        .collect();

    if certs.is_empty() {
        return Err(ErrorDetails::NoCertificate.into());
    }

    Ok(certs)
}

/// Private key read from a plaintext or encrypted PEM file
struct PrivateKey(PrivateKeyDer<'static>);

impl PrivateKey {
    /// PEM tag used for encrypted private keys
    const ENCRYPTED_KEY_TAG: &'static str = "ENCRYPTED PRIVATE KEY";
    /// PEM tags that are supported for plain-text private keys
    const PLAINTEXT_KEY_TAGS: &'static [&'static str] =
        &["PRIVATE KEY", "RSA PRIVATE KEY", "EC PRIVATE KEY"];

    fn into_inner(self) -> PrivateKeyDer<'static> {
        self.0
    }

    /// Read a plaintext private key from a PEM file that may also contain certificate data.
    ///
    /// 'PRIVATE KEY' (PKCS #8), 'RSA PRIVATE KEY' (PKCS #1) and 'EC PRIVATE KEY' (SEC1) sections
    /// are recognized. Only 1 private key may be present in a possibly multi-section PEM file.
    fn read_from_pem<B: AsRef<[u8]>>(bytes: B) -> Result<Self, Error> {
        let sections = pem::parse_many(bytes)?;

        let key = match Self::find_only_section_with_tags(&sections, Self::PLAINTEXT_KEY_TAGS) {
            Ok(x) => x,
            Err(err) => {
                if sections.iter().any(|x| x.tag() == Self::ENCRYPTED_KEY_TAG) {
                    return Err(ErrorDetails::PasswordRequired.into());
                }
                return Err(err);
            }
        };

        let contents = key.contents().to_vec();
        let der = match key.tag() {
            "RSA PRIVATE KEY" => PrivateKeyDer::Pkcs1(PrivatePkcs1KeyDer::from(contents)),
            "EC PRIVATE KEY" => PrivateKeyDer::Sec1(PrivateSec1KeyDer::from(contents)),
            _ => PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(contents)),
        };

        Ok(Self(der))
    }

    /// Decrypt a private key from a PEM file. The PEM must contain a single 'ENCRYPTED PRIVATE KEY'
    /// section with a PKCS #8 encrypted private key.
    fn decrypt_from_pem<B: AsRef<[u8]>, S: AsRef<[u8]>>(
        bytes: B,
        password: S,
    ) -> Result<Self, Error> {
        let sections = pem::parse_many(bytes)?;
        let section = Self::find_only_section_with_tags(&sections, &[Self::ENCRYPTED_KEY_TAG])?;
        let parsed = pkcs8::EncryptedPrivateKeyInfo::try_from(section.contents())?;
        let document = parsed.decrypt(password.as_ref())?;
        Ok(Self(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
            document.as_bytes().to_vec(),
        ))))
    }

    fn find_only_section_with_tags<'a>(
        sections: &'a [pem::Pem],
        allowed_tags: &[&str],
    ) -> Result<&'a pem::Pem, Error> {
        let mut iter = sections.iter();
        let first = match iter.find(|x| allowed_tags.contains(&x.tag())) {
            Some(x) => x,
            None => return Err(ErrorDetails::NoPrivateKey.into()),
        };

        // make sure there are not other sections that match the allowed tags
        if iter.any(|x| allowed_tags.contains(&x.tag())) {
            return Err(ErrorDetails::MoreThanOnePrivateKey.into());
        }

        Ok(first)
    }
}

impl From<pem::PemError> for Error {
    fn from(err: pem::PemError) -> Self {
        ErrorDetails::InvalidPem(err).into()
    }
}

impl From<pkcs8::Error> for Error {
    fn from(err: pkcs8::Error) -> Self {
        ErrorDetails::DecryptionError(err).into()
    }
}

impl From<ErrorDetails> for Error {
    fn from(details: ErrorDetails) -> Self {
        Error { details }
    }
}
