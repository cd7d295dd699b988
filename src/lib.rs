// Library root for the stock service

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod engine;
pub mod storage;
