/// Database row types — these map directly to SQLite rows.
/// Distinct from the corkboard-types API models to keep the DB layer
/// independent of the wire format.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

pub struct MessageRow {
    pub id: i64,
    pub username: String,
    pub message: String,
}
