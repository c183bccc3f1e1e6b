//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication
//! - `configurations`: named costing setups (recipes and prices as JSON)
//! - `config_shares`: configurations shared with other users
//! - `tea_bags`: per-user tea bag prices
//! - `counter_readings`: cumulative machine counters and counted cash
//! - `cash_events`: deposits and withdrawals

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Configurations {
    Table,
    Id,
    Owner,
    Name,
    CleaningCost,
    ProductsPerDay,
    IngredientPrices,
    Drinks,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ConfigShares {
    Table,
    ConfigId,
    Username,
    CanEdit,
}

#[derive(Iden)]
enum TeaBags {
    Table,
    Id,
    Owner,
    Name,
    CostPerUnit,
}

#[derive(Iden)]
enum CounterReadings {
    Table,
    Id,
    ConfigId,
    Owner,
    TakenAt,
    CounterData,
    CashInRegisterMinor,
    Notes,
    ProductPrices,
}

#[derive(Iden)]
enum CashEvents {
    Table,
    Id,
    ConfigId,
    Owner,
    Kind,
    AmountMinor,
    Description,
    OccurredAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Configurations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Configurations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Configurations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Configurations::Owner).string().not_null())
                    .col(ColumnDef::new(Configurations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Configurations::CleaningCost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Configurations::ProductsPerDay)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Configurations::IngredientPrices)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Configurations::Drinks).text().not_null())
                    .col(
                        ColumnDef::new(Configurations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Configurations::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-configurations-owner")
                            .from(Configurations::Table, Configurations::Owner)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-configurations-owner-name-unique")
                    .table(Configurations::Table)
                    .col(Configurations::Owner)
                    .col(Configurations::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Config Shares
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ConfigShares::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ConfigShares::ConfigId).string().not_null())
                    .col(ColumnDef::new(ConfigShares::Username).string().not_null())
                    .col(
                        ColumnDef::new(ConfigShares::CanEdit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(ConfigShares::ConfigId)
                            .col(ConfigShares::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-config_shares-config_id")
                            .from(ConfigShares::Table, ConfigShares::ConfigId)
                            .to(Configurations::Table, Configurations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-config_shares-username")
                            .from(ConfigShares::Table, ConfigShares::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-config_shares-username")
                    .table(ConfigShares::Table)
                    .col(ConfigShares::Username)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Tea Bags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TeaBags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TeaBags::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(TeaBags::Owner).string().not_null())
                    .col(ColumnDef::new(TeaBags::Name).string().not_null())
                    .col(ColumnDef::new(TeaBags::CostPerUnit).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tea_bags-owner")
                            .from(TeaBags::Table, TeaBags::Owner)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tea_bags-owner-name-unique")
                    .table(TeaBags::Table)
                    .col(TeaBags::Owner)
                    .col(TeaBags::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Counter Readings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CounterReadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CounterReadings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CounterReadings::ConfigId).string())
                    .col(ColumnDef::new(CounterReadings::Owner).string().not_null())
                    .col(
                        ColumnDef::new(CounterReadings::TakenAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CounterReadings::CounterData)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CounterReadings::CashInRegisterMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CounterReadings::Notes).string())
                    .col(
                        ColumnDef::new(CounterReadings::ProductPrices)
                            .text()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-counter_readings-config_id")
                            .from(CounterReadings::Table, CounterReadings::ConfigId)
                            .to(Configurations::Table, Configurations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-counter_readings-owner")
                            .from(CounterReadings::Table, CounterReadings::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-counter_readings-config_id-taken_at")
                    .table(CounterReadings::Table)
                    .col(CounterReadings::ConfigId)
                    .col(CounterReadings::TakenAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-counter_readings-owner")
                    .table(CounterReadings::Table)
                    .col(CounterReadings::Owner)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Cash Events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashEvents::ConfigId).string())
                    .col(ColumnDef::new(CashEvents::Owner).string().not_null())
                    .col(ColumnDef::new(CashEvents::Kind).string().not_null())
                    .col(
                        ColumnDef::new(CashEvents::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashEvents::Description).string())
                    .col(
                        ColumnDef::new(CashEvents::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_events-config_id")
                            .from(CashEvents::Table, CashEvents::ConfigId)
                            .to(Configurations::Table, Configurations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_events-owner")
                            .from(CashEvents::Table, CashEvents::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_events-config_id-occurred_at")
                    .table(CashEvents::Table)
                    .col(CashEvents::ConfigId)
                    .col(CashEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(CashEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CounterReadings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeaBags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Configurations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
