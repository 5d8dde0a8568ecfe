pub mod cli;
pub mod load_config;
pub mod netlify;
pub mod setup;

pub use cli::{run, Cli, Commands};
