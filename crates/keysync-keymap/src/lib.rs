//! Static key identity data for keysync
//!
//! This crate holds the platform-independent vocabulary shared by the
//! translation core and the embedding shell:
//!
//! - [`PhysicalKeyId`] / [`LogicalKeyId`] newtypes and the id *planes* that
//!   partition their 64-bit space into canonical and auto-generated
//!   namespaces
//! - the static lookup tables from native keycodes to physical ids and from
//!   native keyvals to logical ids
//! - keyval-to-Unicode conversion for deriving character payloads
//! - the [`CheckedKey`] descriptors naming which modifier and lock families
//!   the core keeps synchronized with the event bitmask
//!
//! Everything here is compiled-in data with no I/O. The tables are assumed
//! correct and complete by the core; they are not validated at runtime.

mod checked;
mod id;
pub mod logical;
pub mod physical;

pub use checked::{state_bits, tracked_locks, tracked_modifiers, CheckedKey};
pub use id::{LogicalKeyId, PhysicalKeyId, FUNCTIONAL_PLANE, PLATFORM_PLANE, UNICODE_PLANE, VALUE_MASK};
pub use logical::{keyval_to_unicode, logical_key_for_keyval};
pub use physical::physical_key_for_keycode;
