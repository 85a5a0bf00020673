use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, external_id, name, email, image_url, role,
         credits, verification_status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user.id,
            user.external_id,
            user.name,
            user.email,
            user.image_url,
            user.role.as_str(),
            user.credits,
            user.verification_status.as_str(),
            user.created_at,
        ],
    )?;
    Ok(())
}

pub fn find_user_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, external_id, name, email, image_url, role, credits,
                verification_status, created_at
         FROM users WHERE external_id = ?1",
    )?;

    let row = stmt
        .query_row(params![external_id], user_row_from_rusqlite)
        .optional()?;

    row.map(user_from_row).transpose()
}

pub fn insert_credit_transaction(
    conn: &Connection,
    tx: &CreditTransaction,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO credit_transactions (id, user_id, type, package_id, amount, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.id,
            tx.user_id,
            tx.transaction_type.as_str(),
            tx.package_id,
            tx.amount,
            tx.created_at,
        ],
    )?;
    Ok(())
}

// Internal row type for User mapping
struct UserRow {
    id: String,
    external_id: String,
    name: String,
    email: String,
    image_url: Option<String>,
    role: String,
    credits: i64,
    verification_status: String,
    created_at: chrono::NaiveDateTime,
}

fn user_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        image_url: row.get(4)?,
        role: row.get(5)?,
        credits: row.get(6)?,
        verification_status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.id,
        external_id: row.external_id,
        name: row.name,
        email: row.email,
        image_url: row.image_url,
        role: UserRole::from_str(&row.role)?,
        credits: row.credits,
        verification_status: VerificationStatus::from_str(&row.verification_status)?,
        created_at: row.created_at,
    })
}
