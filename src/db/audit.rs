//! Append-only audit trail. Every state transition in the engine emits a
//! record with the old/new values; emission is best-effort and must never
//! make a primary operation fail.

use crate::errors::AppResult;
use crate::models::actor::Actor;
use chrono::Utc;
use rusqlite::{Connection, params};
use serde_json::Value;

pub struct AuditRecord<'a> {
    pub entity_type: &'a str,
    pub entity_id: String,
    pub action: &'a str,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
}

fn insert_record(conn: &Connection, actor: &Actor, rec: &AuditRecord) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_log
             (actor_id, tenant_id, entity_type, entity_id, action, old_values, new_values, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.execute(params![
        actor.user_id,
        actor.tenant_id,
        rec.entity_type,
        rec.entity_id,
        rec.action,
        rec.old_values.as_ref().map(|v| v.to_string()),
        rec.new_values.as_ref().map(|v| v.to_string()),
        Utc::now().to_rfc3339(),
    ])?;
    Ok(())
}

/// Fire-and-forget write. A failed audit insert is logged and swallowed;
/// the caller's transition has already happened and must stand.
pub fn emit(conn: &Connection, actor: &Actor, rec: AuditRecord) {
    if let Err(e) = insert_record(conn, actor, &rec) {
        tracing::warn!(
            entity_type = rec.entity_type,
            entity_id = %rec.entity_id,
            action = rec.action,
            error = %e,
            "audit write failed"
        );
    }
}
