//! Service layer providing blog-oriented operations on top of models.
//! - Configuration facade (`blog`) backed by the key-value option store.
//! - Local file storage with virtual-path resolution (`storage`).
//! - Clear error types; validation and entities live in the `models` crate.

pub mod errors;
pub mod options;
pub mod blog;
pub mod storage;
#[cfg(test)]
pub mod test_support;
