pub mod config;
pub mod filters;
pub mod paths;
