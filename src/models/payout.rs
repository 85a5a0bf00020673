use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::doctor::DoctorSnapshot;
use super::enums::PayoutStatus;

/// A disbursement request against a doctor's accumulated credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub doctor_id: String,
    pub amount: f64,
    pub credits: i64,
    pub platform_fee: f64,
    pub net_amount: f64,
    pub paypal_email: String,
    pub status: PayoutStatus,
    pub created_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
}

/// Payout joined with its doctor's snapshot, as the admin queue shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutWithDoctor {
    #[serde(flatten)]
    pub payout: Payout,
    pub doctor: DoctorSnapshot,
}
