//! Chorus library exports for testing

pub mod api;
pub mod core;
pub mod inference;

#[cfg(test)]
pub mod test_support;
