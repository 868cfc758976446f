//! 命令列介面

mod args;
mod handlers;

pub use args::Cli;
pub use handlers::execute;
