//! Identity Gate — resolves an opaque identity-provider token to an internal
//! principal and an admin capability.
//!
//! Two deliberately different contracts live at this boundary:
//! - resolution here is fail-closed: any lookup failure (including store
//!   unavailability) is logged and treated as "not admin", never surfaced to
//!   the caller;
//! - the workflow operations in `crate::admin` fail loudly once entered.
//! Do not merge the two styles.

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::{CreditTransaction, TransactionType, User, UserRole, VerificationStatus};
use crate::store::Store;

/// Credits granted on first sign-in, recorded as a CREDIT_PURCHASE.
const WELCOME_CREDITS: i64 = 2;
const WELCOME_PACKAGE: &str = "free_user";

/// Resolved identity of a caller. The user id is an opaque string key,
/// carried through without interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub external_id: String,
    pub role: UserRole,
}

/// Source of the caller's opaque identity token. Adapters for concrete
/// providers live outside this crate.
pub trait IdentityProvider {
    fn current_identity(&self) -> Option<String>;
}

/// Look up the internal user for an external token.
///
/// `None` token or no matching user resolves to `Ok(None)`. Storage errors
/// propagate; swallowing them is the job of `AuthzContext::resolve`.
pub fn resolve_principal(
    conn: &Connection,
    external_id: Option<&str>,
) -> Result<Option<Principal>, DatabaseError> {
    let Some(external_id) = external_id else {
        return Ok(None);
    };

    let user = repository::find_user_by_external_id(conn, external_id)?;
    Ok(user.map(|u| Principal {
        user_id: u.id,
        external_id: u.external_id,
        role: u.role,
    }))
}

/// Authorization capability resolved once per request and passed into each
/// workflow operation, instead of re-querying the store per call.
#[derive(Debug, Clone)]
pub struct AuthzContext {
    principal: Option<Principal>,
}

impl AuthzContext {
    /// Resolve the caller's capability. Fail-closed: lookup failures yield a
    /// context with no principal (and therefore no admin capability), logged
    /// for operators but never returned as an error.
    pub fn resolve(store: &Store, external_id: Option<&str>) -> Self {
        let principal = store
            .with(|conn| resolve_principal(conn, external_id))
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "identity resolution failed, denying admin capability");
                None
            });
        Self { principal }
    }

    /// Resolve using whatever identity the provider currently reports.
    pub fn resolve_current(store: &Store, provider: &dyn IdentityProvider) -> Self {
        Self::resolve(store, provider.current_identity().as_deref())
    }

    /// Test/construction escape hatch for callers that already hold a principal.
    pub fn from_principal(principal: Option<Principal>) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self.principal,
            Some(Principal { role: UserRole::Admin, .. })
        )
    }
}

/// Profile handed over by the identity provider at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignIn {
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Find the account for a sign-in, creating it on first login with the
/// welcome credit grant. Role starts UNASSIGNED; promotion happens elsewhere.
pub fn ensure_account(store: &Store, sign_in: &SignIn) -> Result<User, DatabaseError> {
    store.with(|conn| {
        if let Some(existing) = repository::find_user_by_external_id(conn, &sign_in.external_id)? {
            return Ok(existing);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            external_id: sign_in.external_id.clone(),
            name: sign_in.name.clone(),
            email: sign_in.email.clone(),
            image_url: sign_in.image_url.clone(),
            role: UserRole::Unassigned,
            credits: WELCOME_CREDITS,
            verification_status: VerificationStatus::Pending,
            created_at: Utc::now().naive_utc(),
        };
        repository::insert_user(conn, &user)?;
        repository::insert_credit_transaction(
            conn,
            &CreditTransaction {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                transaction_type: TransactionType::CreditPurchase,
                package_id: Some(WELCOME_PACKAGE.to_string()),
                amount: WELCOME_CREDITS,
                created_at: user.created_at,
            },
        )?;

        tracing::info!(user_id = %user.id, "created account on first sign-in");
        Ok(user)
    })
}
