//! Game specific definitions

pub mod defines;

pub use defines::{pw2rw, pw2rw_vec, rw2pw, rw2pw_int, rw2pw_vec, ObjectType, PRV};
