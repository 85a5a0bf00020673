use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_payout(conn: &Connection, payout: &Payout) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payouts (id, doctor_id, amount, credits, platform_fee,
         net_amount, paypal_email, status, created_at, processed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            payout.id,
            payout.doctor_id,
            payout.amount,
            payout.credits,
            payout.platform_fee,
            payout.net_amount,
            payout.paypal_email,
            payout.status.as_str(),
            payout.created_at,
            payout.processed_at,
        ],
    )?;
    Ok(())
}

/// Payouts still in PROCESSING, newest first, each with its doctor's
/// id/name/email/specialty/credits snapshot joined in. The inner join
/// guarantees every returned payout resolves to an existing doctor.
pub fn list_payouts_processing(conn: &Connection) -> Result<Vec<PayoutWithDoctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.doctor_id, p.amount, p.credits, p.platform_fee,
                p.net_amount, p.paypal_email, p.status, p.created_at, p.processed_at,
                u.id, u.name, u.email, u.specialty, u.credits
         FROM payouts p
         JOIN users u ON p.doctor_id = u.id
         WHERE p.status = ?1
         ORDER BY p.created_at DESC",
    )?;

    let rows = stmt.query_map(params![PayoutStatus::Processing.as_str()], payout_row_from_rusqlite)?;
    rows.map(|r| r.map_err(DatabaseError::from).and_then(payout_from_row))
        .collect()
}

// Internal row type for the payout + doctor join
struct PayoutJoinRow {
    id: String,
    doctor_id: String,
    amount: f64,
    credits: i64,
    platform_fee: f64,
    net_amount: f64,
    paypal_email: String,
    status: String,
    created_at: chrono::NaiveDateTime,
    processed_at: Option<chrono::NaiveDateTime>,
    doc_id: String,
    doc_name: String,
    doc_email: String,
    doc_specialty: Option<String>,
    doc_credits: i64,
}

fn payout_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PayoutJoinRow, rusqlite::Error> {
    Ok(PayoutJoinRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        amount: row.get(2)?,
        credits: row.get(3)?,
        platform_fee: row.get(4)?,
        net_amount: row.get(5)?,
        paypal_email: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        processed_at: row.get(9)?,
        doc_id: row.get(10)?,
        doc_name: row.get(11)?,
        doc_email: row.get(12)?,
        doc_specialty: row.get(13)?,
        doc_credits: row.get(14)?,
    })
}

fn payout_from_row(row: PayoutJoinRow) -> Result<PayoutWithDoctor, DatabaseError> {
    Ok(PayoutWithDoctor {
        payout: Payout {
            id: row.id,
            doctor_id: row.doctor_id,
            amount: row.amount,
            credits: row.credits,
            platform_fee: row.platform_fee,
            net_amount: row.net_amount,
            paypal_email: row.paypal_email,
            status: PayoutStatus::from_str(&row.status)?,
            created_at: row.created_at,
            processed_at: row.processed_at,
        },
        doctor: DoctorSnapshot {
            id: row.doc_id,
            name: row.doc_name,
            email: row.doc_email,
            specialty: row.doc_specialty,
            credits: row.doc_credits,
        },
    })
}
