// Core services
pub mod deliveries;
pub mod orders;
pub mod reviews;

// Catalog CRUD, plain functions over the pool
pub mod activity_log;
pub mod customers;
pub mod equipment;
pub mod item_designs;
