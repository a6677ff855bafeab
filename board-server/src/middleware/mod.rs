mod access;
mod admin;
mod client_addr;

pub use access::{password_matches, require_password};
pub use admin::{require_admin, CurrentAdmin};
pub use client_addr::ClientAddr;
