use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{TransactionType, UserRole, VerificationStatus};

/// A platform account. Doctors and admins share the table with patients;
/// the credential fields are only populated for doctors.
///
/// Ids are opaque unique strings assigned at creation — nothing in the
/// workflow assumes a particular format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Opaque token from the external identity provider.
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub role: UserRole,
    pub credits: i64,
    pub verification_status: VerificationStatus,
    pub created_at: NaiveDateTime,
}

/// A credit movement against a user's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: String,
    pub user_id: String,
    pub transaction_type: TransactionType,
    pub package_id: Option<String>,
    pub amount: i64,
    pub created_at: NaiveDateTime,
}
