use sea_orm_migration::prelude::*;

use super::m20260105_000001_create_customers_table::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reviews::CustomerId).big_integer().not_null())
                    // Yes/no questions (q1-q4)
                    .col(ColumnDef::new(Reviews::Q1).boolean().not_null())
                    .col(ColumnDef::new(Reviews::Q2).boolean().not_null())
                    .col(ColumnDef::new(Reviews::Q3).boolean().not_null())
                    .col(ColumnDef::new(Reviews::Q4).boolean().not_null())
                    // Rating questions (q5-q6), 1-5
                    .col(ColumnDef::new(Reviews::Q5).small_integer().not_null())
                    .col(ColumnDef::new(Reviews::Q6).small_integer().not_null())
                    // Essay questions (q7-q10)
                    .col(ColumnDef::new(Reviews::Q7).text().not_null())
                    .col(ColumnDef::new(Reviews::Q8).text().not_null())
                    .col(ColumnDef::new(Reviews::Q9).text().not_null())
                    .col(ColumnDef::new(Reviews::Q10).text().not_null())
                    .col(
                        ColumnDef::new(Reviews::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Reviews::SubmittedAt).timestamp().not_null())
                    .col(ColumnDef::new(Reviews::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_customer")
                            .from(Reviews::Table, Reviews::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reviews {
    Table,
    Id,
    CustomerId,
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
    Q6,
    Q7,
    Q8,
    Q9,
    Q10,
    Status,
    SubmittedAt,
    CreatedAt,
}
