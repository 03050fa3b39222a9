pub mod aggregate;
pub mod auth;
pub mod client;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod resolver;
pub mod services;

pub use error::{AppError, Result};
