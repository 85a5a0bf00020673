//! Admin workflow operations — credential review and payout queue.
//!
//! Every operation takes an `AuthzContext` resolved once per request and
//! fails with `Unauthorized` when the caller lacks the admin capability.
//! Unlike the Identity Gate, this surface fails loudly once entered.
//!
//! Verification status state machine (statuses change only through the two
//! mutations here):
//!
//! ```text
//! PENDING --(update_verification_status VERIFIED)--> VERIFIED
//! PENDING --(update_verification_status REJECTED)--> REJECTED
//! VERIFIED --(set_doctor_active_status suspend)--> PENDING
//! PENDING/REJECTED --(set_doctor_active_status reinstate)--> VERIFIED
//! ```
//!
//! Reinstatement is a one-step transition back to VERIFIED; it does not
//! re-run the pending review.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::cache::{ListingCache, ADMIN_VIEW};
use crate::db::{repository, DatabaseError};
use crate::identity::AuthzContext;
use crate::models::{Doctor, PayoutWithDoctor, VerificationStatus};
use crate::store::Store;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Listing failure — deliberately generic, no cause attached.
    #[error("{0}")]
    Fetch(&'static str),

    /// Mutation failure — carries the underlying cause message.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: DatabaseError,
    },
}

/// Successful-listing shape for the doctor queues.
#[derive(Debug, Serialize)]
pub struct DoctorList {
    pub doctors: Vec<Doctor>,
}

/// Result shape of the verified-doctors listing: items or a structured
/// error value. Callers must check which shape they received; a storage
/// failure here is NOT an `Err`. The asymmetry with the sibling listings is
/// inherited platform behavior (see DESIGN.md) and must not be unified.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DoctorListing {
    Doctors(DoctorList),
    Error { error: String },
}

/// Successful-listing shape for the payout queue.
#[derive(Debug, Serialize)]
pub struct PayoutList {
    pub payouts: Vec<PayoutWithDoctor>,
}

/// Mutations return this on success; there is no partial-success shape.
#[derive(Debug, Serialize)]
pub struct MutationOutcome {
    pub success: bool,
}

impl MutationOutcome {
    fn ok() -> Self {
        Self { success: true }
    }
}

fn require_admin(ctx: &AuthzContext) -> Result<(), AdminError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(AdminError::Unauthorized)
    }
}

// Ids are opaque strings; presence is the only validation. An id that
// matches no row surfaces as a storage-level NotFound on update.
fn require_doctor_id(doctor_id: &str) -> Result<(), AdminError> {
    if doctor_id.is_empty() {
        return Err(AdminError::InvalidInput("doctor id is required".into()));
    }
    Ok(())
}

/// Doctors awaiting credential review, newest application first.
pub fn list_pending_doctors(store: &Store, ctx: &AuthzContext) -> Result<DoctorList, AdminError> {
    require_admin(ctx)?;

    let doctors = store
        .with(repository::list_doctors_pending)
        .map_err(|e| {
            tracing::error!(error = %e, "pending doctors listing failed");
            AdminError::Fetch("Failed to fetch pending doctors")
        })?;
    Ok(DoctorList { doctors })
}

/// Verified doctors, alphabetical. Storage failures come back as the
/// structured error shape rather than an `Err`.
pub fn list_verified_doctors(store: &Store, ctx: &AuthzContext) -> Result<DoctorListing, AdminError> {
    require_admin(ctx)?;

    match store.with(repository::list_doctors_verified) {
        Ok(doctors) => Ok(DoctorListing::Doctors(DoctorList { doctors })),
        Err(e) => {
            tracing::error!(error = %e, "verified doctors listing failed");
            Ok(DoctorListing::Error {
                error: "Failed to fetch verified doctors".to_string(),
            })
        }
    }
}

/// Resolve a credential review: status must be VERIFIED or REJECTED.
/// Validated before any storage access.
pub fn update_verification_status(
    store: &Store,
    cache: &dyn ListingCache,
    ctx: &AuthzContext,
    doctor_id: &str,
    status: &str,
) -> Result<MutationOutcome, AdminError> {
    require_admin(ctx)?;

    require_doctor_id(doctor_id)?;
    let status = VerificationStatus::from_str(status)
        .ok()
        .filter(|s| matches!(s, VerificationStatus::Verified | VerificationStatus::Rejected))
        .ok_or_else(|| {
            AdminError::InvalidInput(format!("status must be VERIFIED or REJECTED, got {status:?}"))
        })?;

    apply_status(store, cache, doctor_id, status)
}

/// Suspend (back to PENDING, out of the active pool) or reinstate (straight
/// to VERIFIED, bypassing review) a doctor.
pub fn set_doctor_active_status(
    store: &Store,
    cache: &dyn ListingCache,
    ctx: &AuthzContext,
    doctor_id: &str,
    suspend: bool,
) -> Result<MutationOutcome, AdminError> {
    require_admin(ctx)?;

    require_doctor_id(doctor_id)?;
    let status = if suspend {
        VerificationStatus::Pending
    } else {
        VerificationStatus::Verified
    };

    apply_status(store, cache, doctor_id, status)
}

fn apply_status(
    store: &Store,
    cache: &dyn ListingCache,
    doctor_id: &str,
    status: VerificationStatus,
) -> Result<MutationOutcome, AdminError> {
    store
        .with(|conn| repository::set_verification_status(conn, doctor_id, status))
        .map_err(|e| AdminError::Storage {
            context: "Failed to update doctor status",
            source: e,
        })?;

    // Fire-and-forget: the write stands even if invalidation fails.
    if let Err(e) = cache.invalidate(ADMIN_VIEW) {
        tracing::warn!(error = %e, "listing invalidation failed after status write");
    }

    tracing::info!(doctor_id, status = status.as_str(), "doctor status updated");
    Ok(MutationOutcome::ok())
}

/// Payouts awaiting admin approval, newest first, each with its doctor's
/// snapshot eagerly joined.
pub fn list_pending_payouts(store: &Store, ctx: &AuthzContext) -> Result<PayoutList, AdminError> {
    require_admin(ctx)?;

    let payouts = store
        .with(repository::list_payouts_processing)
        .map_err(|e| {
            tracing::error!(error = %e, "pending payouts listing failed");
            AdminError::Fetch("Failed to fetch pending payouts")
        })?;
    Ok(PayoutList { payouts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, NoopCache, ViewCache};
    use crate::identity::Principal;
    use crate::models::UserRole;
    use rusqlite::params;
    use uuid::Uuid;

    struct FailingCache;
    impl ListingCache for FailingCache {
        fn invalidate(&self, _view: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    fn ctx_with_role(role: UserRole) -> AuthzContext {
        AuthzContext::from_principal(Some(Principal {
            user_id: Uuid::new_v4().to_string(),
            external_id: "ext-caller".to_string(),
            role,
        }))
    }

    fn admin_ctx() -> AuthzContext {
        ctx_with_role(UserRole::Admin)
    }

    fn seed_doctor_with_id(
        store: &Store,
        id: &str,
        name: &str,
        status: VerificationStatus,
        created_at: &str,
    ) {
        store
            .with(|conn| {
                conn.execute(
                    "INSERT INTO users (id, external_id, name, email, role, specialty, credits,
                     verification_status, created_at)
                     VALUES (?1, ?2, ?3, 'doc@example.com', 'DOCTOR', 'Neurology', 30, ?4, ?5)",
                    params![id, format!("ext-{id}"), name, status.as_str(), created_at],
                )?;
                Ok(())
            })
            .unwrap();
    }

    fn seed_doctor(store: &Store, name: &str, status: VerificationStatus, created_at: &str) -> String {
        let id = Uuid::new_v4().to_string();
        seed_doctor_with_id(store, &id, name, status, created_at);
        id
    }

    fn seed_payout(store: &Store, doctor_id: &str, created_at: &str) {
        store
            .with(|conn| {
                conn.execute(
                    "INSERT INTO payouts (id, doctor_id, amount, credits, platform_fee,
                     net_amount, paypal_email, status, created_at)
                     VALUES (?1, ?2, 300.0, 30, 60.0, 240.0, 'doc@paypal.com',
                             'PROCESSING', ?3)",
                    params![Uuid::new_v4().to_string(), doctor_id, created_at],
                )?;
                Ok(())
            })
            .unwrap();
    }

    fn status_of(store: &Store, id: &str) -> String {
        store
            .with(|conn| {
                conn.query_row(
                    "SELECT verification_status FROM users WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(DatabaseError::from)
            })
            .unwrap()
    }

    fn break_store(store: &Store) {
        store
            .with(|conn| {
                conn.execute_batch(
                    "DROP TABLE credit_transactions; DROP TABLE payouts; DROP TABLE users;",
                )?;
                Ok(())
            })
            .unwrap();
    }

    // ── Authorization gate ───────────────────────────────

    #[test]
    fn every_operation_requires_admin() {
        let store = Store::open_in_memory().unwrap();
        let doc = seed_doctor(&store, "Maya", VerificationStatus::Pending, "2026-01-01T08:00:00");
        let cache = NoopCache;

        for ctx in [
            ctx_with_role(UserRole::Patient),
            ctx_with_role(UserRole::Doctor),
            ctx_with_role(UserRole::Unassigned),
            AuthzContext::from_principal(None),
        ] {
            assert!(matches!(
                list_pending_doctors(&store, &ctx),
                Err(AdminError::Unauthorized)
            ));
            assert!(matches!(
                list_verified_doctors(&store, &ctx),
                Err(AdminError::Unauthorized)
            ));
            assert!(matches!(
                update_verification_status(&store, &cache, &ctx, &doc, "VERIFIED"),
                Err(AdminError::Unauthorized)
            ));
            assert!(matches!(
                set_doctor_active_status(&store, &cache, &ctx, &doc, true),
                Err(AdminError::Unauthorized)
            ));
            assert!(matches!(
                list_pending_payouts(&store, &ctx),
                Err(AdminError::Unauthorized)
            ));
        }

        // No mutation slipped through
        assert_eq!(status_of(&store, &doc), "PENDING");
    }

    // ── Listings ─────────────────────────────────────────

    #[test]
    fn pending_doctors_newest_first() {
        let store = Store::open_in_memory().unwrap();
        seed_doctor(&store, "Older", VerificationStatus::Pending, "2026-01-01T08:00:00");
        seed_doctor(&store, "Newer", VerificationStatus::Pending, "2026-02-01T08:00:00");
        seed_doctor(&store, "Verified", VerificationStatus::Verified, "2026-03-01T08:00:00");

        let list = list_pending_doctors(&store, &admin_ctx()).unwrap();
        let names: Vec<&str> = list.doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older"]);
        assert!(list
            .doctors
            .iter()
            .all(|d| d.verification_status == VerificationStatus::Pending));
    }

    #[test]
    fn pending_doctors_storage_failure_is_generic_error() {
        let store = Store::open_in_memory().unwrap();
        break_store(&store);

        let result = list_pending_doctors(&store, &admin_ctx());
        match result {
            Err(AdminError::Fetch(msg)) => assert_eq!(msg, "Failed to fetch pending doctors"),
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[test]
    fn verified_doctors_alphabetical() {
        let store = Store::open_in_memory().unwrap();
        seed_doctor(&store, "Zoe", VerificationStatus::Verified, "2026-01-01T08:00:00");
        seed_doctor(&store, "Amir", VerificationStatus::Verified, "2026-02-01T08:00:00");

        match list_verified_doctors(&store, &admin_ctx()).unwrap() {
            DoctorListing::Doctors(list) => {
                let names: Vec<&str> = list.doctors.iter().map(|d| d.name.as_str()).collect();
                assert_eq!(names, vec!["Amir", "Zoe"]);
            }
            DoctorListing::Error { error } => panic!("unexpected error shape: {error}"),
        }
    }

    #[test]
    fn verified_doctors_storage_failure_returns_error_shape_not_err() {
        let store = Store::open_in_memory().unwrap();
        break_store(&store);

        let listing = list_verified_doctors(&store, &admin_ctx()).unwrap();
        match listing {
            DoctorListing::Error { error } => {
                assert_eq!(error, "Failed to fetch verified doctors");
            }
            DoctorListing::Doctors(_) => panic!("expected structured error shape"),
        }
    }

    #[test]
    fn empty_verified_listing_is_distinct_from_error_shape() {
        let store = Store::open_in_memory().unwrap();

        match list_verified_doctors(&store, &admin_ctx()).unwrap() {
            DoctorListing::Doctors(list) => assert!(list.doctors.is_empty()),
            DoctorListing::Error { .. } => panic!("empty listing must not be an error"),
        }
    }

    #[test]
    fn pending_payouts_joined_and_newest_first() {
        let store = Store::open_in_memory().unwrap();
        let doc = seed_doctor(&store, "Ines", VerificationStatus::Verified, "2026-01-01T08:00:00");
        seed_payout(&store, &doc, "2026-03-01T10:00:00");
        seed_payout(&store, &doc, "2026-04-01T10:00:00");

        let list = list_pending_payouts(&store, &admin_ctx()).unwrap();
        assert_eq!(list.payouts.len(), 2);
        assert!(list.payouts[0].payout.created_at > list.payouts[1].payout.created_at);
        for p in &list.payouts {
            assert_eq!(p.doctor.id, doc);
            assert_eq!(p.doctor.name, "Ines");
        }
    }

    #[test]
    fn pending_payouts_storage_failure_throws() {
        let store = Store::open_in_memory().unwrap();
        break_store(&store);

        let result = list_pending_payouts(&store, &admin_ctx());
        assert!(matches!(result, Err(AdminError::Fetch(_))));
    }

    // ── update_verification_status ───────────────────────

    #[test]
    fn verify_pending_doctor() {
        let store = Store::open_in_memory().unwrap();
        let d1 = seed_doctor(&store, "Maya", VerificationStatus::Pending, "2026-01-01T08:00:00");

        let outcome =
            update_verification_status(&store, &NoopCache, &admin_ctx(), &d1, "VERIFIED").unwrap();
        assert!(outcome.success);
        assert_eq!(status_of(&store, &d1), "VERIFIED");
    }

    #[test]
    fn opaque_doctor_id_passes_through_to_storage() {
        let store = Store::open_in_memory().unwrap();
        seed_doctor_with_id(&store, "d1", "Maya", VerificationStatus::Pending, "2026-01-01T08:00:00");

        // Ids carry no format requirement — "d1" is as valid as any key
        let outcome =
            update_verification_status(&store, &NoopCache, &admin_ctx(), "d1", "VERIFIED").unwrap();
        assert!(outcome.success);
        assert_eq!(status_of(&store, "d1"), "VERIFIED");

        set_doctor_active_status(&store, &NoopCache, &admin_ctx(), "d1", true).unwrap();
        assert_eq!(status_of(&store, "d1"), "PENDING");
    }

    #[test]
    fn reject_pending_doctor() {
        let store = Store::open_in_memory().unwrap();
        let d1 = seed_doctor(&store, "Maya", VerificationStatus::Pending, "2026-01-01T08:00:00");

        update_verification_status(&store, &NoopCache, &admin_ctx(), &d1, "REJECTED").unwrap();
        assert_eq!(status_of(&store, &d1), "REJECTED");
    }

    #[test]
    fn invalid_status_rejected_before_storage() {
        let store = Store::open_in_memory().unwrap();
        break_store(&store);

        // Store is unusable; InvalidInput proves validation ran first
        for status in ["PENDING", "verified", "SUSPENDED", ""] {
            let result =
                update_verification_status(&store, &NoopCache, &admin_ctx(), "d1", status);
            assert!(
                matches!(result, Err(AdminError::InvalidInput(_))),
                "status {status:?} should be invalid input"
            );
        }
    }

    #[test]
    fn empty_doctor_id_is_invalid_input() {
        let store = Store::open_in_memory().unwrap();

        let result =
            update_verification_status(&store, &NoopCache, &admin_ctx(), "", "VERIFIED");
        assert!(matches!(result, Err(AdminError::InvalidInput(_))));

        let result = set_doctor_active_status(&store, &NoopCache, &admin_ctx(), "", true);
        assert!(matches!(result, Err(AdminError::InvalidInput(_))));
    }

    #[test]
    fn unknown_doctor_is_wrapped_storage_error() {
        let store = Store::open_in_memory().unwrap();

        let result = update_verification_status(
            &store,
            &NoopCache,
            &admin_ctx(),
            "no-such-doctor",
            "VERIFIED",
        );
        match result {
            Err(AdminError::Storage { context, source }) => {
                assert_eq!(context, "Failed to update doctor status");
                assert!(matches!(source, DatabaseError::NotFound { .. }));
            }
            other => panic!("expected wrapped storage error, got {other:?}"),
        }
    }

    // ── set_doctor_active_status ─────────────────────────

    #[test]
    fn suspend_then_reinstate_round_trips_to_verified() {
        let store = Store::open_in_memory().unwrap();
        let d1 = seed_doctor(&store, "Maya", VerificationStatus::Verified, "2026-01-01T08:00:00");

        set_doctor_active_status(&store, &NoopCache, &admin_ctx(), &d1, true).unwrap();
        assert_eq!(status_of(&store, &d1), "PENDING");

        set_doctor_active_status(&store, &NoopCache, &admin_ctx(), &d1, false).unwrap();
        assert_eq!(status_of(&store, &d1), "VERIFIED");
    }

    #[test]
    fn reinstate_from_rejected_skips_review() {
        let store = Store::open_in_memory().unwrap();
        let d1 = seed_doctor(&store, "Maya", VerificationStatus::Rejected, "2026-01-01T08:00:00");

        set_doctor_active_status(&store, &NoopCache, &admin_ctx(), &d1, false).unwrap();
        assert_eq!(status_of(&store, &d1), "VERIFIED");
    }

    // ── Cache side effect ────────────────────────────────

    #[test]
    fn successful_mutation_invalidates_admin_view() {
        let store = Store::open_in_memory().unwrap();
        let d1 = seed_doctor(&store, "Maya", VerificationStatus::Pending, "2026-01-01T08:00:00");
        let cache = ViewCache::new();

        update_verification_status(&store, &cache, &admin_ctx(), &d1, "VERIFIED").unwrap();
        assert_eq!(cache.epoch(ADMIN_VIEW), 1);

        set_doctor_active_status(&store, &cache, &admin_ctx(), &d1, true).unwrap();
        assert_eq!(cache.epoch(ADMIN_VIEW), 2);
    }

    #[test]
    fn failed_mutation_does_not_invalidate() {
        let store = Store::open_in_memory().unwrap();
        let cache = ViewCache::new();

        let _ = update_verification_status(&store, &cache, &admin_ctx(), "no-such-doctor", "VERIFIED");
        assert_eq!(cache.epoch(ADMIN_VIEW), 0);
    }

    #[test]
    fn cache_failure_does_not_fail_the_write() {
        let store = Store::open_in_memory().unwrap();
        let d1 = seed_doctor(&store, "Maya", VerificationStatus::Pending, "2026-01-01T08:00:00");

        let outcome =
            update_verification_status(&store, &FailingCache, &admin_ctx(), &d1, "VERIFIED")
                .unwrap();
        assert!(outcome.success);
        assert_eq!(status_of(&store, &d1), "VERIFIED");
    }

    // ── Serialized shapes ────────────────────────────────

    #[test]
    fn listing_shapes_serialize_as_expected() {
        let ok = DoctorListing::Doctors(DoctorList { doctors: vec![] });
        assert_eq!(serde_json::to_value(&ok).unwrap(), serde_json::json!({"doctors": []}));

        let err = DoctorListing::Error { error: "boom".to_string() };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"error": "boom"})
        );

        assert_eq!(
            serde_json::to_value(MutationOutcome::ok()).unwrap(),
            serde_json::json!({"success": true})
        );
    }
}
