// Integration tests against the real router and tempfile databases

#[path = "../common/mod.rs"]
mod common;

pub mod test_inventory_api;
