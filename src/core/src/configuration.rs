pub mod config;

pub use config::{Configuration, SecretSource};
