//! Request middleware.

pub mod staff_guard;

pub use staff_guard::{staff_guard, StaffContext};
