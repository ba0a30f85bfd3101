pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_customers_table;
mod m20260105_000002_create_item_designs_table;
mod m20260105_000003_create_equipment_table;
mod m20260105_000004_create_orders_table;
mod m20260105_000005_create_deliveries_table;
mod m20260112_000006_create_reviews_table;
mod m20260119_000007_create_activity_logs_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_customers_table::Migration),
            Box::new(m20260105_000002_create_item_designs_table::Migration),
            Box::new(m20260105_000003_create_equipment_table::Migration),
            Box::new(m20260105_000004_create_orders_table::Migration),
            Box::new(m20260105_000005_create_deliveries_table::Migration),
            Box::new(m20260112_000006_create_reviews_table::Migration),
            Box::new(m20260119_000007_create_activity_logs_table::Migration),
        ]
    }
}
