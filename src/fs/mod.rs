//! Filesystem utilities for batch.

pub mod atomic;

pub use atomic::atomic_write_file;
