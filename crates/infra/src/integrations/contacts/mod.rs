//! Contact import integration
//!
//! Provides OAuth2 authorization and contact retrieval for:
//! - Google (People API)
//! - Microsoft (Graph)
//! - Yahoo (Social Directory)

pub mod importer;
pub mod providers;

pub use importer::ContactImporter;
pub use providers::{
    create_provider, GoogleContactsProvider, MicrosoftContactsProvider, YahooContactsProvider,
};
