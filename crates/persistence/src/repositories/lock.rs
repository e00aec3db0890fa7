//! Transaction-scoped advisory locks.
//!
//! Locks are keyed by a namespace plus `hashtext` of a string key and are
//! released automatically when the surrounding transaction ends.

use sqlx::PgConnection;

use crate::metrics::QueryTimer;

/// Namespace for per-(user, venue) interest toggles.
pub const INTEREST_LOCK_NAMESPACE: i32 = 0x5241_4c01;

/// Namespace for per-venue action-item creation.
pub const VENUE_LOCK_NAMESPACE: i32 = 0x5241_4c02;

pub struct AdvisoryLock;

impl AdvisoryLock {
    /// Blocks until the lock for `(namespace, key)` is held by this transaction.
    pub async fn acquire(conn: &mut PgConnection, namespace: i32, key: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("advisory_xact_lock");
        let result = sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(namespace)
            .bind(key)
            .execute(conn)
            .await;
        timer.record();
        result.map(|_| ())
    }
}
