pub mod compiler;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod model;
pub mod query;
pub mod scanner;
pub mod store;
pub mod util;

pub use config::Config;
pub use error::{GeneroError, Result};
pub use scanner::Scanner;
