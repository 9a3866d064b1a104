pub mod protocol;
pub mod snapshot;
