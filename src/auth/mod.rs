// Authentication & authorization module

pub mod audit;
pub mod middleware;
pub mod password;
pub mod token;
pub mod user_store;
