// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token minting for tests.
//!
//! Stands in for the external identity issuer: produces bearer tokens in
//! the `<user_id>.<hex hmac-sha256>` form the gateway's verifier accepts.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Mint a bearer token for `user_id` signed with `secret`.
pub fn mint_token(secret: &str, user_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(user_id.as_bytes());
    let tag = mac.finalize().into_bytes();
    format!("{user_id}.{}", hex::encode(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_embeds_user_id_and_hex_tag() {
        let token = mint_token("a-secret-of-16ch", "user-1");
        let (user_id, tag) = token.rsplit_once('.').unwrap();
        assert_eq!(user_id, "user-1");
        assert_eq!(tag.len(), 64);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_secrets_produce_different_tags() {
        let a = mint_token("a-secret-of-16ch", "user-1");
        let b = mint_token("b-secret-of-16ch", "user-1");
        assert_ne!(a, b);
    }
}
