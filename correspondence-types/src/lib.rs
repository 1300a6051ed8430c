//! Core domain types for the correspondence lifecycle.
//!
//! Everything the ledger, store and dialog mirror agree on lives here:
//! - Strongly-typed identifiers (correspondence, attachment, party)
//! - The status enumeration and its classification helpers
//! - The correspondence aggregate with its external references
//! - The four syncable event kinds (status, notification, forwarding, delete)
//! - Idempotency key scopes for mirrored external effects

use thiserror::Error;

/// Returned when a persisted or wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// variants are stored by name.
macro_rules! named_enum {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($ty::$variant),)+
                    other => Err($crate::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

mod correspondence;
mod events;
mod ids;
mod idempotency;
mod status;

pub use correspondence::{Attachment, Content, Correspondence, ExternalReference, ReferenceType};
pub use events::{
    DeleteEvent, DeleteEventType, ForwardingDestination, ForwardingEvent, NotificationChannel,
    NotificationEvent, StatusEvent, SyncBatch,
};
pub use ids::{AttachmentId, CorrespondenceId, PartyId};
pub use idempotency::{EffectKind, IdempotencyKey, IdempotentAction, KeyScope};
pub use status::CorrespondenceStatus;
