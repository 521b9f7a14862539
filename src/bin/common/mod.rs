pub mod config;
pub mod helpers;
