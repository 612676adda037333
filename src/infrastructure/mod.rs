//! Infrastructure layer - storage backends, hashing and logging

pub mod api_key;
pub mod logging;
