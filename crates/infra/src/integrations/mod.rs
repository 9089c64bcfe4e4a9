//! External service integrations

pub mod contacts;
