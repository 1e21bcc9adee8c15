use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Document identifier of a movie: 12 bytes, written as 24 lowercase hex characters.
///
/// Only the canonical lowercase form parses, so an id always prints back exactly
/// as it was received.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieId([u8; 12]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("invalid movie id {0:?}: expected 24 lowercase hex characters")]
    Malformed(String),
}

impl MovieId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// New id laid out as seconds since epoch (4 bytes), random (5 bytes),
    /// process-wide counter (3 bytes).
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();
        let random = uuid::Uuid::new_v4();
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&random.as_bytes()[..5]);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let malformed = || IdError::Malformed(input.to_string());

        let decoded = hex::decode(input).map_err(|_| malformed())?;
        let bytes: [u8; 12] = decoded.try_into().map_err(|_| malformed())?;
        // Uppercase digits decode too; only the form we print back is accepted.
        if hex::encode(bytes) != input {
            return Err(malformed());
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MovieId({})", self)
    }
}

impl FromStr for MovieId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MovieId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// Accepts the plain string form and the `{"$oid": "..."}` form found in
// exported document dumps.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Plain(String),
    Extended {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match RawId::deserialize(deserializer)? {
            RawId::Plain(s) => s,
            RawId::Extended { oid } => oid,
        };
        MovieId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
