//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication, username doubles as member id
//! - `events`: shared-expense events and their settlement status
//! - `event_members`: who takes part in an event
//! - `payments`: recorded expenses, participants stored as a JSON array
//! - `transfers`: the stored settlement plan, one row per `(event, from, to)`

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
    DisplayName,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    Name,
    Status,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum EventMembers {
    Table,
    EventId,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    EventId,
    PayerId,
    Amount,
    Participants,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Transfers {
    Table,
    EventId,
    FromUser,
    ToUser,
    Amount,
    Status,
    UpdatedAt,
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
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Events::Name).string().not_null())
                    .col(
                        ColumnDef::new(Events::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Events::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-events-created_by")
                            .from(Events::Table, Events::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Event members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(EventMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventMembers::EventId).string().not_null())
                    .col(ColumnDef::new(EventMembers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(EventMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EventMembers::EventId)
                            .col(EventMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_members-event_id")
                            .from(EventMembers::Table, EventMembers::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_members-user_id")
                            .from(EventMembers::Table, EventMembers::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-event_members-user_id")
                    .table(EventMembers::Table)
                    .col(EventMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::EventId).string().not_null())
                    .col(ColumnDef::new(Payments::PayerId).string().not_null())
                    .col(ColumnDef::new(Payments::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Payments::Participants)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Payments::Note).string())
                    .col(ColumnDef::new(Payments::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-event_id")
                            .from(Payments::Table, Payments::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-payer_id")
                            .from(Payments::Table, Payments::PayerId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-event_id-created_at")
                    .table(Payments::Table)
                    .col(Payments::EventId)
                    .col(Payments::CreatedAt)
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
                    .col(ColumnDef::new(Transfers::EventId).string().not_null())
                    .col(ColumnDef::new(Transfers::FromUser).string().not_null())
                    .col(ColumnDef::new(Transfers::ToUser).string().not_null())
                    .col(ColumnDef::new(Transfers::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Transfers::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Transfers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Transfers::EventId)
                            .col(Transfers::FromUser)
                            .col(Transfers::ToUser),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-event_id")
                            .from(Transfers::Table, Transfers::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-from_user")
                            .from(Transfers::Table, Transfers::FromUser)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-to_user")
                            .from(Transfers::Table, Transfers::ToUser)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order.
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
