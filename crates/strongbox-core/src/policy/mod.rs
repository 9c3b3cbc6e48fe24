//! Trust and permission policy composition for the identity role

pub mod permissions;
pub mod trust;

pub use trust::{string_like, subject_pattern};
