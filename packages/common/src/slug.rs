use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::naming::{RandomTokens, TokenSource};

/// Maximum length of the sanitized display-name prefix.
pub const PREFIX_MAX_LEN: usize = 20;

/// Number of hex characters in the disambiguating suffix.
pub const SUFFIX_LEN: usize = 4;

/// Longest possible folder name: prefix, separator and suffix.
pub const FOLDER_NAME_MAX_LEN: usize = PREFIX_MAX_LEN + 1 + SUFFIX_LEN;

/// How the disambiguating suffix of a folder name is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuffixStrategy {
    /// Random hex from the injected token source.
    Random,
    /// Hex digest of the creator identifier, so a creator always maps to the
    /// same folder name for a given attempt number.
    #[default]
    Identifier,
}

/// Lower-case `display_name`, keep only `[a-z0-9]`, cap at [`PREFIX_MAX_LEN`].
pub fn sanitize_prefix(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(PREFIX_MAX_LEN)
        .collect()
}

/// Join a display name and an already-chosen suffix into a folder name.
pub fn slug_with_suffix(display_name: &str, suffix: &str) -> String {
    format!("{}-{}", sanitize_prefix(display_name), suffix)
}

/// Suffix derived from a creator identifier. `attempt` salts the digest so a
/// caller can step to a different value after a uniqueness conflict.
pub fn identifier_suffix(identifier: &str, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    if attempt > 0 {
        hasher.update(attempt.to_be_bytes());
    }
    let mut suffix = hex::encode(hasher.finalize());
    suffix.truncate(SUFFIX_LEN);
    suffix
}

/// Whether `name` has the shape of a generated folder name. Used to reject
/// path components that did not come from [`SlugGenerator`].
pub fn is_folder_name(name: &str) -> bool {
    let Some((prefix, suffix)) = name.rsplit_once('-') else {
        return false;
    };
    prefix.len() <= PREFIX_MAX_LEN
        && prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// The one place folder names are produced.
#[derive(Clone)]
pub struct SlugGenerator {
    strategy: SuffixStrategy,
    tokens: Arc<dyn TokenSource>,
}

impl SlugGenerator {
    pub fn new(strategy: SuffixStrategy, tokens: Arc<dyn TokenSource>) -> Self {
        Self { strategy, tokens }
    }

    pub fn strategy(&self) -> SuffixStrategy {
        self.strategy
    }

    /// Generate a folder name for a creator.
    ///
    /// `identifier` is only consulted by [`SuffixStrategy::Identifier`];
    /// `attempt` is 0 on the first try and increases on each uniqueness retry.
    pub fn generate(&self, display_name: &str, identifier: &str, attempt: u32) -> String {
        let suffix = match self.strategy {
            SuffixStrategy::Random => self.tokens.hex_token(SUFFIX_LEN),
            SuffixStrategy::Identifier => identifier_suffix(identifier, attempt),
        };
        slug_with_suffix(display_name, &suffix)
    }
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new(SuffixStrategy::default(), Arc::new(RandomTokens))
    }
}

impl std::fmt::Debug for SlugGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugGenerator")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
