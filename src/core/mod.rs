//! Core library components.

pub mod access;
pub mod context;
pub mod exportfmt;
pub mod gpg;
pub mod identity;
pub mod membership;
pub mod pass;
pub mod registry;
pub mod validate;
