pub mod config;
pub mod dto;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod routes;
pub mod services;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
