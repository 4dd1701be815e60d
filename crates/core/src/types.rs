/// Primary keys for operator-owned rows are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts in minor currency units (e.g. cents).
pub type Amount = i64;
