pub mod atomic;

pub use atomic::{atomic_write, write_if_absent};
