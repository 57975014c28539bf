//! Keyed password hashing.
//!
//! Digests are deterministic HMAC-SHA256 over the plaintext, keyed by a
//! process-wide secret, hex-encoded. Verification recomputes and compares in
//! constant time via the Mac's `verify_slice`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key of any length")
}

pub fn encrypt_password(plain: &str, secret: &str) -> String {
    let mut m = mac(secret);
    m.update(plain.as_bytes());
    hex::encode(m.finalize().into_bytes())
}

/// Returns `false` for wrong passwords and for malformed digests alike.
pub fn verify_password(plain: &str, digest: &str, secret: &str) -> bool {
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let mut m = mac(secret);
    m.update(plain.as_bytes());
    m.verify_slice(&expected).is_ok()
}
