pub mod config;
pub mod constants;
pub mod error;
pub mod records;
pub mod transaction;
pub mod types;

pub use config::SystemParams;
pub use constants::*;
pub use error::{DimensionError, ErrorKind};
pub use records::*;
pub use transaction::*;
pub use types::*;
