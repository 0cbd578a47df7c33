//! Lexicographically sortable identifiers
//!
//! A ULID is a 48-bit millisecond timestamp followed by 80 random bits,
//! written as 26 Crockford base32 characters. Sorting the text sorts by time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::UlidError;

/// Crockford base32 alphabet
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ENCODED_LEN: usize = 26;
const RANDOM_BITS: u32 = 80;
const RANDOM_MASK: u128 = (1 << RANDOM_BITS) - 1;
const MS_PER_DAY: u64 = 86_400_000;

/// Characters of the random part used in the day slice
const SLICE_RANDOM_CHARS: usize = 6;

fn encode_base32(mut value: u128, width: usize) -> String {
    let mut out = vec![b'0'; width];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1f) as usize];
        value >>= 5;
    }
    out.into_iter().map(char::from).collect()
}

fn decode_char(c: char) -> Result<u128, UlidError> {
    let upper = match c.to_ascii_uppercase() {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    };
    ALPHABET
        .iter()
        .position(|&b| char::from(b) == upper)
        .map(|i| i as u128)
        .ok_or(UlidError::InvalidChar(c))
}

/// A 128-bit sortable identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ulid(u128);

impl Ulid {
    /// Build from a millisecond timestamp and random bits (truncated to 80)
    #[must_use]
    pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        let ts = (timestamp_ms as u128) & 0xffff_ffff_ffff;
        Self((ts << RANDOM_BITS) | (random & RANDOM_MASK))
    }

    /// Milliseconds since the Unix epoch
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        (self.0 >> RANDOM_BITS) as u64
    }

    /// The 80 random bits
    #[must_use]
    pub const fn random(&self) -> u128 {
        self.0 & RANDOM_MASK
    }

    #[must_use]
    pub const fn to_u128(&self) -> u128 {
        self.0
    }

    /// The next identifier within the same millisecond
    ///
    /// `None` once the random part is exhausted; the carry never reaches the
    /// timestamp.
    #[must_use]
    pub const fn increment(&self) -> Option<Self> {
        if self.random() == RANDOM_MASK {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    /// Short form for date-partitioned keys
    ///
    /// Milliseconds since UTC midnight (6 characters), a dash, then the last
    /// characters of the random part, which are the ones a monotonic
    /// increment changes. Lowercase.
    #[must_use]
    pub fn day_slice(&self) -> String {
        let since_midnight = u128::from(self.timestamp_ms() % MS_PER_DAY);
        let random = self.random() & ((1 << (5 * SLICE_RANDOM_CHARS)) - 1);
        format!(
            "{}-{}",
            encode_base32(since_midnight, 6),
            encode_base32(random, SLICE_RANDOM_CHARS)
        )
        .to_ascii_lowercase()
    }
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_base32(self.0, ENCODED_LEN))
    }
}

impl FromStr for Ulid {
    type Err = UlidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != ENCODED_LEN {
            return Err(UlidError::InvalidLength(len));
        }

        let mut chars = s.chars();
        let mut value = chars.next().map_or(Ok(0), decode_char)?;
        if value > 7 {
            return Err(UlidError::Overflow);
        }
        for c in chars {
            value = (value << 5) | decode_char(c)?;
        }
        Ok(Self(value))
    }
}

impl Serialize for Ulid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ulid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Produces strictly increasing ULIDs
///
/// When the clock has not moved past the previous identifier, the previous
/// value is incremented instead of drawing new random bits.
#[derive(Debug)]
pub struct UlidGenerator<R = StdRng> {
    rng: R,
    last: Option<Ulid>,
}

impl UlidGenerator<StdRng> {
    /// Generator seeded from the operating system
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible generator
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for UlidGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> UlidGenerator<R> {
    pub const fn with_rng(rng: R) -> Self {
        Self { rng, last: None }
    }

    /// Identifier for the current time
    pub fn generate(&mut self) -> Ulid {
        self.generate_at(Utc::now())
    }

    /// Identifier for `at`
    ///
    /// Times before the Unix epoch are stamped as millisecond 0. When the
    /// random part of the previous identifier is exhausted, the new one moves
    /// to the following millisecond.
    pub fn generate_at(&mut self, at: DateTime<Utc>) -> Ulid {
        let mut ms = u64::try_from(at.timestamp_millis()).unwrap_or(0);

        if let Some(last) = self.last
            && last.timestamp_ms() >= ms
        {
            if let Some(next) = last.increment() {
                self.last = Some(next);
                return next;
            }
            ms = last.timestamp_ms() + 1;
        }

        let random = (u128::from(self.rng.next_u64()) << 16) | u128::from(self.rng.next_u32() & 0xffff);
        let ulid = Ulid::from_parts(ms, random);
        self.last = Some(ulid);
        ulid
    }

    /// Most recently produced identifier
    #[must_use]
    pub const fn last(&self) -> Option<Ulid> {
        self.last
    }
}
