//! Initial schema migration.
//!
//! Creates the complete schema for Haulage:
//!
//! - `users`: identities with role and password hash
//! - `trucks`: the fleet, owned by an owner, optionally driven by a driver
//! - `orders`: transportation orders with their money fields and unique code
//! - `expenses`: trip expenses, removed with their order
//! - `transfers`: money transfers, removed with their order
//! - `timeline_events`: append-only audit log, removed with its order

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Phone,
    Role,
    PasswordHash,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Trucks {
    Table,
    Id,
    Number,
    Make,
    Model,
    Year,
    AxleCount,
    CapacityKg,
    FuelType,
    CurrentMileageKm,
    RcExpiry,
    RcDocument,
    InsuranceExpiry,
    InsuranceDocument,
    PollutionExpiry,
    PollutionDocument,
    Status,
    OwnerId,
    AssignedDriverId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    Code,
    Description,
    PickupLocation,
    PickupContact,
    PickupPhone,
    DeliveryLocation,
    DeliveryContact,
    DeliveryPhone,
    PickupDate,
    EstimatedDeliveryDate,
    ActualDeliveryDate,
    LoadType,
    WeightKg,
    VolumeLitres,
    TotalAmountMinor,
    AdvanceAmountMinor,
    BalanceAmountMinor,
    Status,
    TruckId,
    DriverId,
    OwnerId,
    CreatedBy,
    WaybillDocument,
    LrDocument,
    OtherDocument,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    OrderId,
    Category,
    Description,
    AmountMinor,
    BillPhoto,
    AddedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    OrderId,
    Kind,
    AmountMinor,
    Description,
    Status,
    TransactionRef,
    BankName,
    AccountNumber,
    IfscCode,
    Receipt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TimelineEvents {
    Table,
    Id,
    OrderId,
    EventType,
    Title,
    Description,
    RelatedExpenseId,
    RelatedTransferId,
    CreatedBy,
    CreatedAt,
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
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(
                        ColumnDef::new(Users::FirstName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Users::LastName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Users::Phone).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Trucks
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trucks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trucks::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Trucks::Number).string().not_null())
                    .col(ColumnDef::new(Trucks::Make).string().not_null())
                    .col(ColumnDef::new(Trucks::Model).string().not_null())
                    .col(ColumnDef::new(Trucks::Year).integer().not_null())
                    .col(ColumnDef::new(Trucks::AxleCount).integer().not_null())
                    .col(ColumnDef::new(Trucks::CapacityKg).big_integer().not_null())
                    .col(
                        ColumnDef::new(Trucks::FuelType)
                            .string()
                            .not_null()
                            .default("diesel"),
                    )
                    .col(
                        ColumnDef::new(Trucks::CurrentMileageKm)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Trucks::RcExpiry).date().not_null())
                    .col(ColumnDef::new(Trucks::RcDocument).string())
                    .col(ColumnDef::new(Trucks::InsuranceExpiry).date().not_null())
                    .col(ColumnDef::new(Trucks::InsuranceDocument).string())
                    .col(ColumnDef::new(Trucks::PollutionExpiry).date().not_null())
                    .col(ColumnDef::new(Trucks::PollutionDocument).string())
                    .col(
                        ColumnDef::new(Trucks::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Trucks::OwnerId).string().not_null())
                    .col(ColumnDef::new(Trucks::AssignedDriverId).string())
                    .col(ColumnDef::new(Trucks::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Trucks::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trucks-owner_id")
                            .from(Trucks::Table, Trucks::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trucks-assigned_driver_id")
                            .from(Trucks::Table, Trucks::AssignedDriverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trucks-number-unique")
                    .table(Trucks::Table)
                    .col(Trucks::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Orders::Code).string().not_null())
                    .col(
                        ColumnDef::new(Orders::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Orders::PickupLocation).string().not_null())
                    .col(ColumnDef::new(Orders::PickupContact).string().not_null())
                    .col(ColumnDef::new(Orders::PickupPhone).string().not_null())
                    .col(ColumnDef::new(Orders::DeliveryLocation).string().not_null())
                    .col(ColumnDef::new(Orders::DeliveryContact).string().not_null())
                    .col(ColumnDef::new(Orders::DeliveryPhone).string().not_null())
                    .col(ColumnDef::new(Orders::PickupDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Orders::EstimatedDeliveryDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::ActualDeliveryDate).timestamp())
                    .col(ColumnDef::new(Orders::LoadType).string().not_null())
                    .col(ColumnDef::new(Orders::WeightKg).big_integer().not_null())
                    .col(ColumnDef::new(Orders::VolumeLitres).big_integer())
                    .col(
                        ColumnDef::new(Orders::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::AdvanceAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::BalanceAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Orders::TruckId).string())
                    .col(ColumnDef::new(Orders::DriverId).string())
                    .col(ColumnDef::new(Orders::OwnerId).string().not_null())
                    .col(ColumnDef::new(Orders::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Orders::WaybillDocument).string())
                    .col(ColumnDef::new(Orders::LrDocument).string())
                    .col(ColumnDef::new(Orders::OtherDocument).string())
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Orders::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-truck_id")
                            .from(Orders::Table, Orders::TruckId)
                            .to(Trucks::Table, Trucks::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-driver_id")
                            .from(Orders::Table, Orders::DriverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-owner_id")
                            .from(Orders::Table, Orders::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-created_by")
                            .from(Orders::Table, Orders::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Authoritative guard for order-code generation.
        manager
            .create_index(
                Index::create()
                    .name("idx-orders-code-unique")
                    .table(Orders::Table)
                    .col(Orders::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-owner_id-created_at")
                    .table(Orders::Table)
                    .col(Orders::OwnerId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-driver_id")
                    .table(Orders::Table)
                    .col(Orders::DriverId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::OrderId).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::BillPhoto).string())
                    .col(ColumnDef::new(Expenses::AddedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-order_id")
                            .from(Expenses::Table, Expenses::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-added_by")
                            .from(Expenses::Table, Expenses::AddedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-order_id")
                    .table(Expenses::Table)
                    .col(Expenses::OrderId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transfers::OrderId).string().not_null())
                    .col(ColumnDef::new(Transfers::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transfers::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Transfers::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Transfers::TransactionRef).string())
                    .col(ColumnDef::new(Transfers::BankName).string())
                    .col(ColumnDef::new(Transfers::AccountNumber).string())
                    .col(ColumnDef::new(Transfers::IfscCode).string())
                    .col(ColumnDef::new(Transfers::Receipt).string())
                    .col(ColumnDef::new(Transfers::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Transfers::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-order_id")
                            .from(Transfers::Table, Transfers::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-created_by")
                            .from(Transfers::Table, Transfers::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-order_id")
                    .table(Transfers::Table)
                    .col(Transfers::OrderId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Timeline Events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TimelineEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelineEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TimelineEvents::OrderId).string())
                    .col(ColumnDef::new(TimelineEvents::EventType).string().not_null())
                    .col(ColumnDef::new(TimelineEvents::Title).string().not_null())
                    .col(
                        ColumnDef::new(TimelineEvents::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimelineEvents::RelatedExpenseId).string())
                    .col(ColumnDef::new(TimelineEvents::RelatedTransferId).string())
                    .col(ColumnDef::new(TimelineEvents::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(TimelineEvents::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timeline_events-order_id")
                            .from(TimelineEvents::Table, TimelineEvents::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timeline_events-related_expense_id")
                            .from(TimelineEvents::Table, TimelineEvents::RelatedExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timeline_events-related_transfer_id")
                            .from(TimelineEvents::Table, TimelineEvents::RelatedTransferId)
                            .to(Transfers::Table, Transfers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timeline_events-created_by")
                            .from(TimelineEvents::Table, TimelineEvents::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-timeline_events-order_id-created_at")
                    .table(TimelineEvents::Table)
                    .col(TimelineEvents::OrderId)
                    .col(TimelineEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(TimelineEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trucks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
