// src/config/mod.rs
pub mod service;

pub use crate::config::service::ServiceConfig;
