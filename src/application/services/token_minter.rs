//! Short token generation with collision-checked, bounded retry.

use std::sync::Arc;

use rand::Rng;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;

/// Unambiguous alphanumeric alphabet: no `0 O o 1 I l`.
pub const TOKEN_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz";

pub const DEFAULT_TOKEN_LENGTH: usize = 6;
pub const MIN_TOKEN_LENGTH: usize = 4;
pub const MAX_TOKEN_LENGTH: usize = 32;
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Attempts after which repeated collisions are logged at WARN.
const COLLISION_WARN_THRESHOLD: usize = 3;

/// Generates a random token of `length` symbols from [`TOKEN_ALPHABET`].
///
/// Does not check uniqueness; see [`TokenMinter::mint`].
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Returns true if every symbol of `token` is in [`TOKEN_ALPHABET`].
pub fn is_minted_shape(token: &str, length: usize) -> bool {
    token.len() == length && token.bytes().all(|b| TOKEN_ALPHABET.contains(&b))
}

/// Failure of a mint operation.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// Every candidate collided with an existing token.
    #[error("no unique token after {attempts} attempts")]
    Exhausted { attempts: usize },

    /// The existence check could not be performed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<MintError> for AppError {
    fn from(e: MintError) -> Self {
        match e {
            MintError::Exhausted { attempts } => AppError::internal(
                "Failed to generate unique token",
                json!({ "reason": "Too many collisions", "attempts": attempts }),
            ),
            MintError::Store(inner) => inner,
        }
    }
}

/// Mints tokens that are unique among stored links at the moment of the check.
///
/// The check and the later insert are not atomic. The store's unique index on
/// `token` is the backstop, and callers treat a conflict on insert as another
/// collision (see [`crate::application::services::LinkService::create`]).
pub struct TokenMinter<R: ShortLinkRepository> {
    repository: Arc<R>,
    length: usize,
    max_attempts: usize,
}

impl<R: ShortLinkRepository> TokenMinter<R> {
    /// Creates a minter. `length` is clamped to 4..=32 and `max_attempts` to at least 1.
    pub fn new(repository: Arc<R>, length: usize, max_attempts: usize) -> Self {
        Self {
            repository,
            length: length.clamp(MIN_TOKEN_LENGTH, MAX_TOKEN_LENGTH),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn token_length(&self) -> usize {
        self.length
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Generates candidates until one is not present in the store.
    ///
    /// # Errors
    ///
    /// - [`MintError::Store`] if the existence check fails; no token is returned
    /// - [`MintError::Exhausted`] if all `max_attempts` candidates collided
    pub async fn mint(&self) -> Result<String, MintError> {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_token(self.length);

            if !self.repository.token_exists(&candidate).await? {
                debug!(attempt, "Minted token");
                return Ok(candidate);
            }

            if attempt >= COLLISION_WARN_THRESHOLD {
                warn!(attempt, length = self.length, "Repeated token collisions");
            } else {
                debug!(attempt, "Token collision, retrying");
            }
        }

        Err(MintError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
