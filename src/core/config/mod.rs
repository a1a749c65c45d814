pub mod data;
pub mod io;

pub use data::{api_key_from_env, path_display, Config};
pub use io::ConfigError;
