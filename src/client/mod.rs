// File: ./src/client/mod.rs
// re-exports the model endpoint client modules
pub mod cert;
pub mod core;

pub use self::core::{API_KEY_HEADER, GeminiClient};
