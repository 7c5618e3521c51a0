pub mod migrate;
pub mod sync;
