//! # Simple Authentication and Security Layer (SASL) client mechanisms
//!
//! This crate produces the byte sequences a SASL authentication exchange
//! requires and verifies the server's counter-proof. It implements the
//! trivial PLAIN mechanism (RFC 4616) and a client for the SCRAM family
//! (RFC 5802) over a fixed set of hash functions, without channel binding.
//! The crate never performs I/O; the caller owns the connection and feeds
//! server messages in as they arrive.
//!
//! # Usage
//!
//! A typical SCRAM session is shown below. One [`Scram`] value covers
//! exactly one authentication attempt: it advances strictly from the initial
//! response through the final response to verification, and any failure is
//! terminal, so a retry needs a fresh session. In productive code you should
//! replace the unwrapping by proper error handling.
//!
//! ```no_run
//! use sasl::{Credentials, Scram};
//!
//! // This function represents your I/O implementation.
//! fn send_and_receive(message: &[u8]) -> String {
//!     unimplemented!()
//! }
//!
//! // Create a SCRAM session for the hash function the server advertised.
//! let mut scram = Scram::new("SHA-256").unwrap();
//!
//! // Send the client-first message and receive the server's challenge.
//! let client_first = scram
//!     .initial_response(&Credentials::new("user", "pencil"))
//!     .unwrap();
//! let challenge = send_and_receive(client_first.as_bytes());
//!
//! // Answer the challenge with the proof and receive the server's
//! // verification message.
//! let client_final = scram.final_response(&challenge, "pencil").unwrap();
//! let server_final = send_and_receive(client_final.as_bytes());
//!
//! // Check that the server itself knows the secret.
//! assert!(scram.verify(&server_final).unwrap());
//! ```
//!
//! Mechanisms can also be constructed by name through [`select`] and driven
//! through the [`Mechanism`] trait, which picks the initial or the final
//! response depending on whether the supplied [`Credentials`] carry a
//! challenge.

mod error;
mod hash;
mod mechanism;
mod plain;
mod scram;
mod utils;

pub use crate::error::{Error, Field, Kind};
pub use crate::hash::HashAlgorithm;
pub use crate::mechanism::{select, Credentials, Mechanism};
pub use crate::plain::Plain;
pub use crate::scram::{Scram, DEFAULT_ITERATION_LIMIT};
pub use crate::utils::NONCE_LENGTH;
