//! Versioned, idempotent schema migrations.
//!
//! Applied versions are recorded in `schema_migrations`; running the
//! migration engine twice is a no-op.

use rusqlite::{Connection, OptionalExtension, Result};

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM schema_migrations WHERE version = ?1 LIMIT 1")?;
    let found: Option<i64> = stmt.query_row([version], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

fn mark_applied(conn: &Connection, version: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Base schema: sessions, breaks, correction requests, audit log.
fn migrate_base_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS work_sessions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT NOT NULL,
            tenant_id     TEXT NOT NULL,
            date          TEXT NOT NULL,
            clock_in      TEXT NOT NULL,
            clock_out     TEXT,
            status        TEXT NOT NULL CHECK(status IN ('working','on_break','clocked_out')),
            total_minutes INTEGER,
            notes         TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_tenant_user_date
            ON work_sessions(tenant_id, user_id, date);
        CREATE INDEX IF NOT EXISTS idx_sessions_tenant_date
            ON work_sessions(tenant_id, date);

        CREATE TABLE IF NOT EXISTS breaks (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id       INTEGER NOT NULL
                             REFERENCES work_sessions(id) ON DELETE CASCADE,
            start_time       TEXT NOT NULL,
            end_time         TEXT,
            duration_minutes INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_breaks_session ON breaks(session_id);

        CREATE TABLE IF NOT EXISTS correction_requests (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id         INTEGER NOT NULL,
            requester_id       TEXT NOT NULL,
            tenant_id          TEXT NOT NULL,
            original_clock_in  TEXT NOT NULL,
            original_clock_out TEXT,
            requested_clock_in  TEXT,
            requested_clock_out TEXT,
            reason             TEXT NOT NULL,
            status             TEXT NOT NULL
                               CHECK(status IN ('pending','approved','rejected','cancelled')),
            reviewer_id        TEXT,
            reviewed_at        TEXT,
            review_notes       TEXT,
            created_at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_corrections_tenant_status
            ON correction_requests(tenant_id, status);
        CREATE INDEX IF NOT EXISTS idx_corrections_session
            ON correction_requests(session_id);

        CREATE TABLE IF NOT EXISTS audit_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_id    TEXT NOT NULL,
            tenant_id   TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id   TEXT NOT NULL,
            action      TEXT NOT NULL,
            old_values  TEXT,
            new_values  TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_audit_tenant_entity
            ON audit_log(tenant_id, entity_type, entity_id);
        "#,
    )?;
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked from `db::initialize::init_db`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_migrations_table(conn)?;

    let migrations: &[(&str, fn(&Connection) -> Result<()>)] =
        &[("0001_base_schema", migrate_base_schema)];

    for (version, apply) in migrations {
        if is_applied(conn, version)? {
            continue;
        }
        apply(conn)?;
        mark_applied(conn, version)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(applied, 1);

        // All four tables exist afterwards.
        for table in ["work_sessions", "breaks", "correction_requests", "audit_log"] {
            let found: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(found, 1, "missing table {table}");
        }
    }
}
