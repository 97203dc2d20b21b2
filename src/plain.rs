//! The PLAIN mechanism (RFC 4616).

use crate::error::Error;
use crate::mechanism::{Credentials, Mechanism};

const NUL: u8 = 0;

/// PLAIN formats the credentials as `authzid NUL authcid NUL passwd` and
/// performs no cryptographic derivation; confidentiality is the transport's
/// responsibility.
#[derive(Debug, Default)]
pub struct Plain;

impl Plain {
    pub fn new() -> Plain {
        Plain
    }
}

impl Mechanism for Plain {
    fn name(&self) -> &str {
        "PLAIN"
    }

    fn respond(&mut self, credentials: &Credentials<'_>) -> Result<Vec<u8>, Error> {
        credentials.validate()?;
        let authzid = credentials.authzid.unwrap_or("");
        let mut response = Vec::with_capacity(
            authzid.len() + credentials.authcid.len() + credentials.passwd.len() + 2,
        );
        response.extend_from_slice(authzid.as_bytes());
        response.push(NUL);
        response.extend_from_slice(credentials.authcid.as_bytes());
        response.push(NUL);
        response.extend_from_slice(credentials.passwd.as_bytes());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::Plain;
    use crate::error::{Error, Field};
    use crate::mechanism::{Credentials, Mechanism};

    #[test]
    fn formats_all_three_identities() {
        let response = Plain::new()
            .respond(&Credentials::new("bob", "mypass").authzid("alice"))
            .unwrap();
        assert_eq!(response, b"alice\0bob\0mypass");
    }

    #[test]
    fn authzid_defaults_to_empty() {
        let response = Plain::new()
            .respond(&Credentials::new("bob", "mypass"))
            .unwrap();
        assert_eq!(response, b"\0bob\0mypass");
    }

    #[test]
    fn requires_authcid_and_password() {
        assert_eq!(
            Plain::new().respond(&Credentials::new("", "mypass")),
            Err(Error::MissingCredentials(Field::Authcid))
        );
        assert_eq!(
            Plain::new().respond(&Credentials::new("bob", "")),
            Err(Error::MissingCredentials(Field::Password))
        );
    }
}
