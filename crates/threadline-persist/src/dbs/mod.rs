#[cfg(feature = "mongodb")]
pub mod mongo;
