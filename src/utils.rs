use std::borrow::Cow;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::Error;

/// Number of random bytes drawn for a client nonce, before base64 encoding.
pub const NONCE_LENGTH: usize = 32;

/// Escapes an authentication identity for inclusion in a SCRAM message:
/// `=` becomes `=3D` and `,` becomes `=2C`.
///
/// The replacement runs in a single pass so the `=` introduced by one escape
/// sequence is never re-escaped: `t,e=st` becomes `t=2Ce=3Dst`. Input
/// containing neither reserved character is returned borrowed, unchanged.
pub fn escape_username(authcid: &str) -> Cow<'_, str> {
    if !authcid.chars().any(|chr| chr == ',' || chr == '=') {
        return Cow::Borrowed(authcid);
    }
    let mut escaped = String::with_capacity(authcid.len() + 4);
    for chr in authcid.chars() {
        match chr {
            '=' => escaped.push_str("=3D"),
            ',' => escaped.push_str("=2C"),
            chr => escaped.push(chr),
        }
    }
    Cow::Owned(escaped)
}

/// Draws a fresh client nonce from the operating system's entropy source and
/// returns it base64-encoded.
///
/// Nonce unpredictability underlies the protocol's replay resistance, so an
/// unavailable entropy source aborts the exchange instead of degrading to a
/// weaker generator.
pub fn generate_nonce() -> Result<String, Error> {
    let mut bytes = [0u8; NONCE_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| Error::EntropyUnavailable)?;
    Ok(base64::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::{escape_username, generate_nonce, NONCE_LENGTH};
    use std::borrow::Cow;

    #[test]
    fn escapes_reserved_characters_in_one_pass() {
        assert_eq!(escape_username("t,e=st"), "t=2Ce=3Dst");
        assert_eq!(escape_username("=,"), "=3D=2C");
        assert_eq!(escape_username(",,"), "=2C=2C");
    }

    #[test]
    fn leaves_reserved_free_input_borrowed() {
        assert!(matches!(escape_username("user"), Cow::Borrowed("user")));
        assert!(matches!(escape_username(""), Cow::Borrowed("")));
    }

    #[test]
    fn nonce_is_base64_of_thirty_two_bytes() {
        let nonce = generate_nonce().unwrap();
        let decoded = base64::decode(&nonce).unwrap();
        assert_eq!(decoded.len(), NONCE_LENGTH);
    }

    #[test]
    fn nonces_differ_between_draws() {
        assert_ne!(generate_nonce().unwrap(), generate_nonce().unwrap());
    }
}
