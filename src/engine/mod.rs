// Inventory domain: product repository and the transactional engine

pub mod inventory;
pub mod products;
