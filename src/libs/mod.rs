pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod generator;
pub mod schema;
pub mod source;
pub mod statement;

// Re-export them for easier access from main.rs
pub use compiler::*;
pub use config::*;
pub use error::{Error, Result};
pub use executor::*;
pub use generator::*;
pub use schema::*;
pub use source::*;
pub use statement::*;
