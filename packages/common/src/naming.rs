use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::RngCore;

/// Source of the current time for generated names.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of lowercase hexadecimal tokens for generated names.
pub trait TokenSource: Send + Sync {
    /// Return exactly `len` lowercase hex characters.
    fn hex_token(&self, len: usize) -> String;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Tokens drawn from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn hex_token(&self, len: usize) -> String {
        let mut bytes = vec![0u8; len.div_ceil(2)];
        rand::rng().fill_bytes(&mut bytes);
        let mut token = hex::encode(bytes);
        token.truncate(len);
        token
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Deterministic tokens: each call renders the next counter value as hex,
/// left-padded with zeros (or keeping the low digits when `len` is short).
#[derive(Debug, Default)]
pub struct SequenceTokens {
    next: Mutex<u64>,
}

impl SequenceTokens {
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl TokenSource for SequenceTokens {
    fn hex_token(&self, len: usize) -> String {
        let value = {
            let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
            let value = *next;
            *next = next.wrapping_add(1);
            value
        };
        let rendered = format!("{value:0len$x}");
        rendered[rendered.len() - len..].to_string()
    }
}
