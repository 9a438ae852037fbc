pub mod scoring;
pub mod server;
pub mod settings;
pub mod utils;
