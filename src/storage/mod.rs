pub mod sidecar;

pub use sidecar::{atomic_write, read_sidecar, sidecar_path, write_sidecar};
