pub mod api_client;
pub mod config;
pub mod contract;
pub mod errors;
pub mod services;
pub mod session;
pub mod state;
pub mod views;
