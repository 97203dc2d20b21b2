use std::{error, fmt};

/// The failure cases of a SASL exchange.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested hash algorithm is not in the supported set.
    ///
    /// Carries the name as it was supplied.
    UnsupportedAlgorithm(String),
    /// A required credential was absent or empty.
    MissingCredentials(Field),
    /// The server-first message didn't match the challenge grammar. `Kind`
    /// contains further information.
    MalformedChallenge(Kind),
    /// The server-final message didn't match the `v=<base64>` grammar.
    MalformedVerifier,
    /// The server's nonce doesn't start with the nonce this client sent.
    ///
    /// This is the anti-replay/anti-downgrade check; a mismatch is not a
    /// retryable condition.
    NonceMismatch,
    /// The server requested more key-derivation work than the session's
    /// configured ceiling permits.
    ExcessiveIterations {
        /// The iteration count taken from the challenge.
        requested: u32,
        /// The ceiling the session was configured with.
        limit: u32,
    },
    /// An operation was invoked out of sequence for the session's state.
    InvalidState,
    /// No cryptographically secure randomness source was available. There is
    /// no fallback generator; the exchange must be aborted.
    EntropyUnavailable,
    /// No mechanism is registered under the requested name.
    UnknownMechanism(String),
}

/// The reasons a server challenge is rejected as malformed.
#[derive(Debug, PartialEq, Eq)]
pub enum Kind {
    /// The field `Field` was expected but not found.
    ExpectedField(Field),
    /// The content of the field `Field` is invalid.
    InvalidField(Field),
    /// The session holds no client nonce to check the challenge against; no
    /// client-first message was issued.
    NoSession,
}

/// The fields of the exchanged messages and of the supplied credentials.
#[derive(Debug, PartialEq, Eq)]
pub enum Field {
    /// Authentication identity
    Authcid,
    /// Password
    Password,
    /// Nonce
    Nonce,
    /// Salt
    Salt,
    /// Iteration count
    Iterations,
    /// Challenge extension
    Extension,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::Error::*;
        match *self {
            UnsupportedAlgorithm(ref name) => {
                write!(fmt, "unsupported hash algorithm '{}'", name)
            }
            MissingCredentials(ref field) => write!(fmt, "missing credential: {:?}", field),
            MalformedChallenge(ref kind) => write!(fmt, "malformed challenge: {}", kind),
            MalformedVerifier => write!(fmt, "malformed server verifier"),
            NonceMismatch => write!(fmt, "server nonce does not extend the client nonce"),
            ExcessiveIterations { requested, limit } => write!(
                fmt,
                "server requested {} iterations, ceiling is {}",
                requested, limit
            ),
            InvalidState => write!(fmt, "operation invoked out of sequence"),
            EntropyUnavailable => write!(fmt, "no secure randomness source available"),
            UnknownMechanism(ref name) => write!(fmt, "unknown mechanism '{}'", name),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::Kind::*;
        match *self {
            ExpectedField(ref field) => write!(fmt, "expected field {:?}", field),
            InvalidField(ref field) => write!(fmt, "invalid field {:?}", field),
            NoSession => write!(fmt, "no client-first message was issued"),
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::{Error, Field, Kind};

    #[test]
    fn display_carries_public_parameters_only() {
        let message = Error::ExcessiveIterations {
            requested: 50_000_000,
            limit: 10_000_000,
        }
        .to_string();
        assert!(message.contains("50000000"));
        assert!(message.contains("10000000"));

        assert_eq!(
            Error::MalformedChallenge(Kind::InvalidField(Field::Salt)).to_string(),
            "malformed challenge: invalid field Salt"
        );
        assert_eq!(
            Error::MissingCredentials(Field::Password).to_string(),
            "missing credential: Password"
        );
    }
}
