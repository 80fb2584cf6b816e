// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential verification seam.

use async_trait::async_trait;

use crate::error::ConfabError;

/// Verifies a bearer credential and yields the authenticated user id.
///
/// Issuance lives with the external identity collaborator; Confab only
/// consumes tokens. Implementations must fail closed: anything that does
/// not verify, including the unconfigured case, is
/// [`ConfabError::Unauthenticated`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, ConfabError>;
}
