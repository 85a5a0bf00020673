use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::VerificationStatus;

/// Doctor view of a user row — what the admin listings return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub experience: Option<i64>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
    pub credits: i64,
    pub verification_status: VerificationStatus,
    pub created_at: NaiveDateTime,
}

/// Doctor fields embedded in each payout row (eager join).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub credits: i64,
}
