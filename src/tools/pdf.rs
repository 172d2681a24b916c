use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use lopdf::encryption::{DecryptionError, EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Error as LopdfError};

/// Write a password-protected copy of `input` to `output`.
///
/// The owner password falls back to the user password when not given, as the
/// common "lock a document for sharing" case wants one secret.
pub fn protect(
    input: &Path,
    output: &Path,
    user_password: &str,
    owner_password: Option<&str>,
) -> Result<()> {
    if user_password.is_empty() {
        bail!("password cannot be empty");
    }

    let mut doc =
        Document::load(input).with_context(|| format!("cannot read PDF '{}'", input.display()))?;
    if doc.is_encrypted() {
        bail!("'{}' is already encrypted", input.display());
    }

    let owner_password = owner_password.unwrap_or(user_password);
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).context("building encryption state")?;
    doc.encrypt(&state).context("encrypting document")?;
    doc.save(output)
        .with_context(|| format!("cannot write '{}'", output.display()))?;
    Ok(())
}

/// Parsed encrypted document shared across password attempts. Parsing once
/// and authenticating per candidate is far cheaper than reloading the file.
#[derive(Clone)]
pub struct PdfCracker {
    doc: Arc<Document>,
}

impl PdfCracker {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path)
            .with_context(|| format!("cannot read PDF '{}'", path.display()))?;
        if !doc.is_encrypted() {
            bail!("'{}' is not encrypted", path.display());
        }
        Ok(Self { doc: Arc::new(doc) })
    }

    /// Authenticate one candidate. A wrong password is a miss; any other
    /// decryption failure is a real error.
    pub fn try_password(&self, password: &str) -> Result<bool> {
        match self.doc.authenticate_password(password) {
            Ok(()) => Ok(true),
            Err(LopdfError::Decryption(DecryptionError::IncorrectPassword)) => Ok(false),
            Err(e) => Err(e).context("password check failed"),
        }
    }
}

/// Default brute-force charset for PDF passwords: lowercase and digits.
pub fn default_charset() -> Vec<char> {
    ('a'..='z').chain('0'..='9').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_missing_input() {
        let err = protect(
            Path::new("/no/such/file.pdf"),
            Path::new("/tmp/out.pdf"),
            "secret",
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot read PDF"));
    }

    #[test]
    fn refuses_empty_password() {
        let err = protect(
            Path::new("/no/such/file.pdf"),
            Path::new("/tmp/out.pdf"),
            "",
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("password cannot be empty"));
    }

    #[test]
    fn default_charset_is_lowercase_digits() {
        let cs = default_charset();
        assert_eq!(cs.len(), 36);
        assert!(cs.contains(&'a') && cs.contains(&'9') && !cs.contains(&'A'));
    }
}
