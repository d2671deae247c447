//! Base schemas shared by DTOs and persisted models

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current UTC time
pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a timestamp and normalize it to UTC.
///
/// Offset-aware values are converted; naive values (as stored by SQLite)
/// are taken to be UTC already.
pub fn ensure_utc(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Serde adapter for UTC timestamps that also accepts naive input
pub mod utc_datetime {
    use super::ensure_utc;
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ensure_utc(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

/// Creation and last-update timestamps of a record
///
/// `created_at` is fixed once the value exists; only `touch` moves
/// `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(with = "utc_datetime")]
    created_at: DateTime<Utc>,

    #[serde(with = "utc_datetime")]
    updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Timestamps for a record being created now
    pub fn now() -> Self {
        let now = utc_now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild timestamps loaded from storage
    pub fn restore(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            updated_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refresh `updated_at`; never moves backwards
    pub fn touch(&mut self) {
        let now = utc_now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}

/// Records carrying [`Timestamps`]
pub trait Timestamped {
    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;
}

/// Schema for records with an integer id and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntIdSchema {
    /// The unique integer identifier
    pub id: i64,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Schema for records with a UUID and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UuidSchema {
    /// The unique UUID identifier
    pub id: Uuid,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl UuidSchema {
    /// New record with a random v4 id
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamps: Timestamps::now(),
        }
    }
}

impl Timestamped for IntIdSchema {
    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

impl Timestamped for UuidSchema {
    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}
