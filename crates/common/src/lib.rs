//! Shared types for the helloar triangle renderer crates.

mod types;

pub use types::ShaderStage;
