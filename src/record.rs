// 🧾 Record - what every registry entry has in common
//
// Identity: UUID assigned at creation, never changes, never reused
// Values: everything else (can change through update/toggle)
// Time: created_at set once, updated_at moves forward on every mutation

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable entity name used in errors and logs
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
}

/// Next `updated_at` for a record last touched at `previous`.
///
/// Strictly greater than `previous` even if the wall clock has not moved
/// (or moved backwards).
pub fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// A list of records together with its count
#[derive(Debug, Clone, Serialize)]
pub struct Listing<R> {
    pub records: Vec<R>,
    pub total: usize,
}

impl<R> Listing<R> {
    pub fn new(records: Vec<R>) -> Self {
        let total = records.len();
        Listing { records, total }
    }
}
