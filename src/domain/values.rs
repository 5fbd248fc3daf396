//! Enumerated column values
//!
//! Rows store these as plain text; services parse them on the way in and
//! write `as_str()` on the way out.

use std::fmt;
use std::str::FromStr;

use super::DomainError;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(DomainError::validation(format!(
                    "'{}' is not a valid {}",
                    s,
                    stringify!($name)
                )))
            }
        }
    };
}

text_enum!(
    /// Kind of movement recorded in `inventory_logs`
    InventoryAction {
        CheckIn => "checkin",
        CheckOut => "checkout",
        Waste => "waste",
        Transfer => "transfer",
        Edit => "edit",
        Delete => "delete",
    }
);

text_enum!(
    InvoiceStatus {
        Submitted => "Submitted",
        Processed => "Processed",
    }
);

text_enum!(
    TransmittalStatus {
        Submitted => "Submitted",
        Verified => "Verified",
    }
);

text_enum!(
    SnapshotKind {
        Beginning => "beginning",
        Ending => "ending",
    }
);

text_enum!(
    TimeEntryStatus {
        Pending => "Pending",
        Approved => "Approved",
        Rejected => "Rejected",
    }
);
