//! Domain data types

pub mod contact;
pub mod provider;

pub use contact::{ContactParts, GenericContact};
pub use provider::ProviderKind;
