pub mod backend;
pub mod catalog;
pub mod config;
pub mod handlers;
pub mod models;
pub mod purchase;
pub mod routes;
pub mod session;
pub mod state;
pub mod tickets;
pub mod utils;
