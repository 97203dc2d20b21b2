//! Client side of the Salted Challenge Response Authentication Mechanism
//! (SCRAM, RFC 5802), parameterized by hash function.

use std::fmt;
use std::mem;

use log::warn;
use subtle::ConstantTimeEq;

use crate::error::{Error, Field, Kind};
use crate::hash::HashAlgorithm;
use crate::mechanism::{Credentials, Mechanism};
use crate::utils::{escape_username, generate_nonce};

/// Default ceiling on the iteration count accepted from a server.
///
/// The challenge names the iteration count, so a hostile or misconfigured
/// server can demand arbitrarily expensive key derivation; counts above the
/// ceiling are refused before any derivation work starts.
pub const DEFAULT_ITERATION_LIMIT: u32 = 10_000_000;

/// Session state across the two-round exchange. Each variant carries only
/// the fields that are meaningful in that state.
enum State {
    New,
    InitialSent {
        gs2_header: String,
        client_nonce: String,
        first_message_bare: String,
    },
    ProofSent {
        salted_password: Vec<u8>,
        auth_message: String,
    },
    Verified,
    Rejected,
}

impl State {
    fn name(&self) -> &'static str {
        match *self {
            State::New => "New",
            State::InitialSent { .. } => "InitialSent",
            State::ProofSent { .. } => "ProofSent",
            State::Verified => "Verified",
            State::Rejected => "Rejected",
        }
    }
}

/// A SCRAM client session covering exactly one authentication attempt.
///
/// The session advances `New` → `InitialSent` → `ProofSent` → `Verified` or
/// `Rejected` through [`initial_response`](Scram::initial_response),
/// [`final_response`](Scram::final_response) and [`verify`](Scram::verify),
/// in that order. Any protocol failure is terminal; a fresh attempt needs a
/// fresh session. One instance belongs to one exchange and is not meant to
/// be shared across threads.
pub struct Scram {
    algorithm: HashAlgorithm,
    name: String,
    iteration_limit: u32,
    state: State,
}

struct ServerFirst<'a> {
    nonce: &'a str,
    salt: Vec<u8>,
    iterations: u32,
}

/// Parses `r=<nonce>,s=<base64-salt>,i=<positive integer>[,<extension>]*`.
fn parse_server_first(challenge: &str) -> Result<ServerFirst<'_>, Error> {
    let expected = |field| Error::MalformedChallenge(Kind::ExpectedField(field));
    let invalid = |field| Error::MalformedChallenge(Kind::InvalidField(field));

    let mut parts = challenge.split(',');

    let nonce = parts
        .next()
        .and_then(|part| part.strip_prefix("r="))
        .ok_or_else(|| expected(Field::Nonce))?;
    // Printable ASCII; a comma can't occur here since we split on it.
    if nonce.is_empty() || !nonce.bytes().all(|byte| (0x21..=0x7e).contains(&byte)) {
        return Err(invalid(Field::Nonce));
    }

    let salt = parts
        .next()
        .and_then(|part| part.strip_prefix("s="))
        .ok_or_else(|| expected(Field::Salt))
        .and_then(|encoded| base64::decode(encoded).map_err(|_| invalid(Field::Salt)))?;
    if salt.is_empty() {
        return Err(invalid(Field::Salt));
    }

    let iterations = parts
        .next()
        .and_then(|part| part.strip_prefix("i="))
        .ok_or_else(|| expected(Field::Iterations))?
        .parse::<u32>()
        .map_err(|_| invalid(Field::Iterations))?;
    if iterations == 0 {
        return Err(invalid(Field::Iterations));
    }

    for extension in parts {
        let bytes = extension.as_bytes();
        if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b'=' {
            return Err(invalid(Field::Extension));
        }
    }

    Ok(ServerFirst {
        nonce,
        salt,
        iterations,
    })
}

impl Scram {
    /// Creates a session for the hash algorithm with the given name.
    ///
    /// The name is matched case-insensitively and hyphens are ignored, so
    /// `SHA-256`, `sha256` and `Sha-256` all select the same algorithm.
    /// Names outside the supported set fail with
    /// [`Error::UnsupportedAlgorithm`].
    pub fn new(hash: &str) -> Result<Scram, Error> {
        let algorithm = hash.parse::<HashAlgorithm>()?;
        Ok(Scram {
            algorithm,
            name: format!("SCRAM-{}", algorithm),
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            state: State::New,
        })
    }

    /// Replaces the ceiling on the server-requested iteration count,
    /// [`DEFAULT_ITERATION_LIMIT`] by default.
    pub fn with_iteration_limit(mut self, limit: u32) -> Scram {
        self.iteration_limit = limit;
        self
    }

    /// The hash algorithm this session was created with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Builds the client-first message.
    ///
    /// Draws a fresh client nonce from the operating system and fixes the
    /// gs2 header and the bare first message for the remainder of the
    /// session. The result is deterministic but for the nonce.
    pub fn initial_response(&mut self, credentials: &Credentials<'_>) -> Result<String, Error> {
        if !matches!(self.state, State::New) {
            return Err(Error::InvalidState);
        }
        credentials.validate()?;

        let client_nonce = generate_nonce()?;
        let gs2_header = match credentials.authzid {
            Some(authzid) if !authzid.is_empty() => format!("n,a={},", authzid),
            _ => "n,,".to_string(),
        };
        let first_message_bare = format!(
            "n={},r={}",
            escape_username(credentials.authcid),
            client_nonce
        );
        let client_first = format!("{}{}", gs2_header, first_message_bare);

        self.state = State::InitialSent {
            gs2_header,
            client_nonce,
            first_message_bare,
        };
        Ok(client_first)
    }

    /// Processes the server challenge and builds the client-final message
    /// carrying the proof.
    ///
    /// The server nonce must extend the nonce this session sent, the salt
    /// must decode, and the iteration count must be positive and below the
    /// session's ceiling. Every failure here is terminal for the session;
    /// the caller decides whether to start over with a fresh one.
    pub fn final_response(&mut self, challenge: &str, passwd: &str) -> Result<String, Error> {
        let (gs2_header, client_nonce, first_message_bare) =
            match mem::replace(&mut self.state, State::Rejected) {
                State::InitialSent {
                    gs2_header,
                    client_nonce,
                    first_message_bare,
                } => (gs2_header, client_nonce, first_message_bare),
                State::New => return Err(Error::MalformedChallenge(Kind::NoSession)),
                state => {
                    self.state = state;
                    return Err(Error::InvalidState);
                }
            };

        let ServerFirst {
            nonce,
            salt,
            iterations,
        } = parse_server_first(challenge)?;

        if !nonce.starts_with(&client_nonce) {
            warn!("server nonce does not extend the client nonce; possible replay or downgrade");
            return Err(Error::NonceMismatch);
        }
        if iterations > self.iteration_limit {
            warn!(
                "server requested {} hash iterations, refusing to derive beyond {}",
                iterations, self.iteration_limit
            );
            return Err(Error::ExcessiveIterations {
                requested: iterations,
                limit: self.iteration_limit,
            });
        }

        let channel_binding = format!("c={}", base64::encode(&gs2_header));
        let final_message_without_proof = format!("{},r={}", channel_binding, nonce);

        let salted_password = self.algorithm.derive(passwd.as_bytes(), &salt, iterations);
        let client_key = self.algorithm.hmac(&salted_password, b"Client Key");
        let stored_key = self.algorithm.hash(&client_key);

        let auth_message = format!(
            "{},{},{}",
            first_message_bare, challenge, final_message_without_proof
        );
        let client_signature = self.algorithm.hmac(&stored_key, auth_message.as_bytes());

        // Equal lengths are guaranteed by using one hash for key and
        // signature.
        let client_proof: Vec<u8> = client_key
            .iter()
            .zip(&client_signature)
            .map(|(key, signature)| key ^ signature)
            .collect();

        let client_final = format!(
            "{},p={}",
            final_message_without_proof,
            base64::encode(&client_proof)
        );

        self.state = State::ProofSent {
            salted_password,
            auth_message,
        };
        Ok(client_final)
    }

    /// Checks the server's final `v=<base64>` message against the signature
    /// this session expects.
    ///
    /// `Ok(true)` means the server proved knowledge of the shared secret;
    /// `Ok(false)` means the signature did not match and the session is
    /// rejected. Calling this before a final response was built is an
    /// [`Error::InvalidState`], distinguishing "never attempted" from
    /// "checked and failed". The comparison runs in constant time.
    pub fn verify(&mut self, server_message: &str) -> Result<bool, Error> {
        let (salted_password, auth_message) =
            match mem::replace(&mut self.state, State::Rejected) {
                State::ProofSent {
                    salted_password,
                    auth_message,
                } => (salted_password, auth_message),
                state => {
                    self.state = state;
                    return Err(Error::InvalidState);
                }
            };

        let verifier = server_message
            .strip_prefix("v=")
            .and_then(|encoded| base64::decode(encoded).ok())
            .ok_or(Error::MalformedVerifier)?;

        let server_key = self.algorithm.hmac(&salted_password, b"Server Key");
        let server_signature = self.algorithm.hmac(&server_key, auth_message.as_bytes());

        if bool::from(server_signature.as_slice().ct_eq(&verifier)) {
            self.state = State::Verified;
            Ok(true)
        } else {
            warn!("server signature failed verification; the peer may not hold the server key");
            Ok(false)
        }
    }
}

impl fmt::Debug for Scram {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Scram")
            .field("algorithm", &self.algorithm)
            .field("state", &self.state.name())
            .finish()
    }
}

impl Mechanism for Scram {
    fn name(&self) -> &str {
        &self.name
    }

    /// A present, non-empty challenge selects the final response; otherwise
    /// the initial response is produced.
    fn respond(&mut self, credentials: &Credentials<'_>) -> Result<Vec<u8>, Error> {
        credentials.validate()?;
        let response = match credentials.challenge {
            Some(challenge) if !challenge.is_empty() => {
                self.final_response(challenge, credentials.passwd)?
            }
            _ => self.initial_response(credentials)?,
        };
        Ok(response.into_bytes())
    }
}
