//! The common surface of all client-side mechanisms and the registry that
//! constructs one by name.

use std::fmt;

use crate::error::{Error, Field};
use crate::plain::Plain;
use crate::scram::Scram;

/// The credentials supplied for one authentication attempt.
///
/// `authcid` and `passwd` are required and must be non-empty; `authzid` names
/// the identity to act as when it differs from the authenticated one. For
/// challenge-response mechanisms driven through [`Mechanism::respond`], a
/// present, non-empty `challenge` selects the final response; otherwise the
/// initial response is produced.
///
/// `passwd` is a secret. It is excluded from the `Debug` output and never
/// appears in error messages or log records.
#[derive(Clone)]
pub struct Credentials<'a> {
    pub authcid: &'a str,
    pub passwd: &'a str,
    pub authzid: Option<&'a str>,
    pub challenge: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    pub fn new(authcid: &'a str, passwd: &'a str) -> Credentials<'a> {
        Credentials {
            authcid,
            passwd,
            authzid: None,
            challenge: None,
        }
    }

    pub fn authzid(mut self, authzid: &'a str) -> Credentials<'a> {
        self.authzid = Some(authzid);
        self
    }

    pub fn challenge(mut self, challenge: &'a str) -> Credentials<'a> {
        self.challenge = Some(challenge);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.authcid.is_empty() {
            return Err(Error::MissingCredentials(Field::Authcid));
        }
        if self.passwd.is_empty() {
            return Err(Error::MissingCredentials(Field::Password));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Credentials")
            .field("authcid", &self.authcid)
            .field("passwd", &"<redacted>")
            .field("authzid", &self.authzid)
            .field("challenge", &self.challenge)
            .finish()
    }
}

/// A client-side SASL mechanism.
pub trait Mechanism {
    /// The name this instance answers to, e.g. `PLAIN` or `SCRAM-SHA-256`.
    fn name(&self) -> &str;

    /// Whether this instance serves the given mechanism name. Mechanism
    /// names are matched case-insensitively.
    fn accepts(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    /// Produces the next client response for the supplied credentials.
    fn respond(&mut self, credentials: &Credentials<'_>) -> Result<Vec<u8>, Error>;
}

/// Constructs the mechanism registered under `name`.
///
/// `PLAIN` and the `SCRAM-<HASH>` family are known, matched
/// case-insensitively; the hash part of a SCRAM name must be one of the
/// supported algorithms. Every other name fails with
/// [`Error::UnknownMechanism`].
pub fn select(name: &str) -> Result<Box<dyn Mechanism>, Error> {
    if name.eq_ignore_ascii_case("PLAIN") {
        return Ok(Box::new(Plain::new()));
    }
    let upper = name.to_ascii_uppercase();
    if let Some(hash) = upper.strip_prefix("SCRAM-") {
        return Ok(Box::new(Scram::new(hash)?));
    }
    Err(Error::UnknownMechanism(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{select, Credentials};
    use crate::error::{Error, Field};

    #[test]
    fn selects_plain_case_insensitively() {
        for name in ["PLAIN", "plain", "Plain"] {
            let mechanism = select(name).unwrap();
            assert_eq!(mechanism.name(), "PLAIN");
            assert!(mechanism.accepts("plain"));
        }
    }

    #[test]
    fn selects_scram_by_hash_name() {
        let mechanism = select("SCRAM-SHA-256").unwrap();
        assert_eq!(mechanism.name(), "SCRAM-SHA-256");
        assert!(mechanism.accepts("scram-sha-256"));
        assert!(!mechanism.accepts("SCRAM-SHA-1"));

        assert_eq!(select("scram-md5").unwrap().name(), "SCRAM-MD5");
    }

    #[test]
    fn rejects_unknown_names() {
        match select("GSSAPI") {
            Err(err) => assert_eq!(err, Error::UnknownMechanism("GSSAPI".to_string())),
            Ok(_) => panic!("GSSAPI is not registered"),
        }
        match select("SCRAM-SHA3-512") {
            Err(err) => assert_eq!(err, Error::UnsupportedAlgorithm("SHA3-512".to_string())),
            Ok(_) => panic!("SHA3-512 is not a supported hash"),
        }
    }

    #[test]
    fn validates_required_credentials() {
        assert_eq!(
            Credentials::new("", "secret").validate(),
            Err(Error::MissingCredentials(Field::Authcid))
        );
        assert_eq!(
            Credentials::new("user", "").validate(),
            Err(Error::MissingCredentials(Field::Password))
        );
        assert!(Credentials::new("user", "secret").validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let credentials = Credentials::new("user", "hunter2").authzid("admin");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("user"));
    }
}
