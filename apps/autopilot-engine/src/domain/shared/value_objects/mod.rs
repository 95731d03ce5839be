//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod decimal;
mod identifiers;
mod symbol;

pub use decimal::{decimal_from_json, lenient_decimal};
pub use identifiers::{ClientOrderId, JournalEntryId, PositionId, RouteId};
pub use symbol::Symbol;
