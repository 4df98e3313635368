//! Shared domain enums stored as lowercase text columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares a text-backed enum with `as_str`, `Display`, `FromStr` and the
/// sqlx conversions needed to bind it and read it from a TEXT column.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Whether an institution gives equipment, receives it, or both
    InstitutionKind {
        Donor => "donor",
        Receiver => "receiver",
        Both => "both",
    }
}

text_enum! {
    /// System role of a user account
    Role {
        Admin => "admin",
        Technician => "technician",
        Volunteer => "volunteer",
    }
}

text_enum! {
    /// Donation progress
    DonationStatus {
        Pending => "pending",
        Received => "received",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Physical equipment category
    EquipmentKind {
        Laptop => "laptop",
        Desktop => "desktop",
        Monitor => "monitor",
        Other => "other",
    }
}

text_enum! {
    /// Assignment request progress
    AssignmentStatus {
        Pending => "pending",
        Matched => "matched",
        Delivered => "delivered",
        Rejected => "rejected",
    }
}

text_enum! {
    /// Outcome of a refurbishment
    RefurbishmentStatus {
        InProgress => "in_progress",
        Refurbished => "refurbished",
        Irreparable => "irreparable",
    }
}

text_enum! {
    /// Nature of a support ticket
    SupportKind {
        Technical => "technical",
        Functional => "functional",
        Logistical => "logistical",
    }
}

impl Role {
    /// Human-readable role name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Technician => "Technician",
            Role::Volunteer => "Volunteer",
        }
    }
}

impl SupportKind {
    pub fn label(&self) -> &'static str {
        match self {
            SupportKind::Technical => "Technical",
            SupportKind::Functional => "Functional",
            SupportKind::Logistical => "Logistical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Technician".parse::<Role>().unwrap(), Role::Technician);
        assert_eq!(" IN_PROGRESS ".parse::<RefurbishmentStatus>().unwrap(), RefurbishmentStatus::InProgress);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("Tecnico".parse::<Role>().is_err());
        assert!("broken".parse::<EquipmentKind>().is_err());
    }

    #[test]
    fn serializes_as_stored_text() {
        for status in AssignmentStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
