use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Uppercase values are the platform's wire forms, stored verbatim.

str_enum!(UserRole {
    Unassigned => "UNASSIGNED",
    Patient => "PATIENT",
    Doctor => "DOCTOR",
    Admin => "ADMIN",
});

str_enum!(VerificationStatus {
    Pending => "PENDING",
    Verified => "VERIFIED",
    Rejected => "REJECTED",
});

str_enum!(PayoutStatus {
    Processing => "PROCESSING",
    Processed => "PROCESSED",
    Rejected => "REJECTED",
});

str_enum!(TransactionType {
    CreditPurchase => "CREDIT_PURCHASE",
    AppointmentDeduction => "APPOINTMENT_DEDUCTION",
});
