//! Request signing seam
//!
//! Every store request carries a `date` header and an `Authorization` header
//! holding a signature over that date. The [`Signer`] trait keeps the key
//! handling opaque to the client: implementations only produce raw signature
//! bytes and name their algorithm.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

/// Signs the per-request challenge with a private key.
///
/// Implementations live with the transport crate (or in tests); the client
/// treats them as opaque per-request header injectors.
#[cfg_attr(test, mockall::automock)]
pub trait Signer: Send + Sync {
    /// Algorithm token placed in the authorization header, e.g. `ed25519`
    fn algorithm(&self) -> &'static str;

    /// Sign the given message, returning raw signature bytes
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// The string-to-sign for a request carrying the given `date` header value
pub fn signing_string(date: &str) -> String {
    format!("date: {date}")
}

/// Assemble the `Authorization` header value for a request.
///
/// `key_id` identifies the key server-side (`/{account}/keys/{fingerprint}`);
/// the signature covers the `date` header and is base64-encoded.
pub fn authorization_header(key_id: &str, signer: &dyn Signer, date: &str) -> Result<String> {
    let signature = signer.sign(signing_string(date).as_bytes())?;
    Ok(format!(
        "Signature keyId=\"{key_id}\",algorithm=\"{}\",signature=\"{}\"",
        signer.algorithm(),
        STANDARD.encode(signature)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_string() {
        assert_eq!(
            signing_string("Thu, 05 Aug 2026 16:00:00 GMT"),
            "date: Thu, 05 Aug 2026 16:00:00 GMT"
        );
    }

    #[test]
    fn test_authorization_header_format() {
        let mut signer = MockSigner::new();
        signer.expect_algorithm().return_const("ed25519");
        signer
            .expect_sign()
            .withf(|message| message == b"date: Thu, 05 Aug 2026 16:00:00 GMT")
            .returning(|_| Ok(vec![1, 2, 3]));

        let header = authorization_header(
            "/ops/keys/aa:bb",
            &signer,
            "Thu, 05 Aug 2026 16:00:00 GMT",
        )
        .unwrap();

        assert_eq!(
            header,
            "Signature keyId=\"/ops/keys/aa:bb\",algorithm=\"ed25519\",signature=\"AQID\""
        );
    }

    #[test]
    fn test_authorization_header_propagates_sign_failure() {
        let mut signer = MockSigner::new();
        signer.expect_algorithm().return_const("ed25519");
        signer
            .expect_sign()
            .returning(|_| Err(crate::error::Error::Auth("key unavailable".into())));

        let result = authorization_header("/ops/keys/aa:bb", &signer, "now");
        assert!(matches!(result, Err(crate::error::Error::Auth(_))));
    }
}
