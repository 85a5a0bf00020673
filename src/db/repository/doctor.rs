use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

const DOCTOR_COLUMNS: &str = "id, name, email, specialty, experience, credential_url,
         description, credits, verification_status, created_at";

/// Doctors awaiting credential review, most recent application first.
pub fn list_doctors_pending(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    list_doctors_by_status(conn, VerificationStatus::Pending, "created_at DESC")
}

/// Verified doctors, alphabetical for the directory listing.
pub fn list_doctors_verified(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    list_doctors_by_status(conn, VerificationStatus::Verified, "name ASC")
}

fn list_doctors_by_status(
    conn: &Connection,
    status: VerificationStatus,
    order_by: &str,
) -> Result<Vec<Doctor>, DatabaseError> {
    let sql = format!(
        "SELECT {DOCTOR_COLUMNS}
         FROM users WHERE role = 'DOCTOR' AND verification_status = ?1
         ORDER BY {order_by}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map(params![status.as_str()], doctor_row_from_rusqlite)?;
    rows.map(|r| r.map_err(DatabaseError::from).and_then(doctor_from_row))
        .collect()
}

/// Set a doctor's verification status. The id is an opaque string key;
/// a zero-row update errors with NotFound, mirroring an ORM-style
/// update-by-key.
pub fn set_verification_status(
    conn: &Connection,
    doctor_id: &str,
    status: VerificationStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET verification_status = ?1 WHERE id = ?2",
        params![status.as_str(), doctor_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "doctor".into(),
            id: doctor_id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for Doctor mapping
struct DoctorRow {
    id: String,
    name: String,
    email: String,
    specialty: Option<String>,
    experience: Option<i64>,
    credential_url: Option<String>,
    description: Option<String>,
    credits: i64,
    verification_status: String,
    created_at: chrono::NaiveDateTime,
}

fn doctor_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<DoctorRow, rusqlite::Error> {
    Ok(DoctorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        specialty: row.get(3)?,
        experience: row.get(4)?,
        credential_url: row.get(5)?,
        description: row.get(6)?,
        credits: row.get(7)?,
        verification_status: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: row.id,
        name: row.name,
        email: row.email,
        specialty: row.specialty,
        experience: row.experience,
        credential_url: row.credential_url,
        description: row.description,
        credits: row.credits,
        verification_status: VerificationStatus::from_str(&row.verification_status)?,
        created_at: row.created_at,
    })
}
