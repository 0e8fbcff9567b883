// Library exports for integration tests and the server binary.

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod utils;
