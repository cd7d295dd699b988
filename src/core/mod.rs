// Core domain types: models and errors

pub mod errors;
pub mod models;
