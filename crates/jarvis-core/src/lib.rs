pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use config::JarvisConfig;
pub use error::{JarvisError, Result};
pub use session::SessionMap;
pub use types::*;
