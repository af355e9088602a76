//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Username).string_len(128).not_null())
                    .col(ColumnDef::new(User::Email).string_len(256))
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(User::Name).string_len(256))
                    .col(ColumnDef::new(User::Phone).string_len(32))
                    .col(ColumnDef::new(User::Nif).string_len(32))
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(16)
                            .not_null()
                            .default("client"),
                    )
                    .col(
                        ColumnDef::new(User::Status)
                            .string_len(16)
                            .not_null()
                            .default("approved"),
                    )
                    .col(ColumnDef::new(User::DateOfBirth).date())
                    .col(ColumnDef::new(User::MaritalStatus).string_len(64))
                    .col(ColumnDef::new(User::CitizenCardNumber).string_len(64))
                    .col(ColumnDef::new(User::CitizenCardExpiry).date())
                    .col(ColumnDef::new(User::TaxResidenceCountry).string_len(128))
                    .col(ColumnDef::new(User::FixedPhone).string_len(32))
                    .col(ColumnDef::new(User::FiscalAddress).string_len(512))
                    .col(ColumnDef::new(User::FiscalPostalCode).string_len(32))
                    .col(ColumnDef::new(User::FiscalCity).string_len(128))
                    .col(ColumnDef::new(User::FiscalCounty).string_len(128))
                    .col(ColumnDef::new(User::FiscalDistrict).string_len(128))
                    .col(ColumnDef::new(User::OfficialEmail).string_len(256))
                    .col(ColumnDef::new(User::BillingSoftware).string_len(128))
                    .col(ColumnDef::new(User::PreferredFormat).string_len(32))
                    .col(ColumnDef::new(User::ReportFrequency).string_len(32))
                    .col(ColumnDef::new(User::PreferredContactHours).string_len(64))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique indexes: username, email, nif (NULLs never collide)
        for (name, column) in [
            ("idx_user_username", User::Username),
            ("idx_user_email", User::Email),
            ("idx_user_nif", User::Nif),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(User::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        // Index: (role, status) for directory listings
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role_status")
                    .table(User::Table)
                    .col(User::Role)
                    .col(User::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Name,
    Phone,
    Nif,
    Role,
    Status,
    DateOfBirth,
    MaritalStatus,
    CitizenCardNumber,
    CitizenCardExpiry,
    TaxResidenceCountry,
    FixedPhone,
    FiscalAddress,
    FiscalPostalCode,
    FiscalCity,
    FiscalCounty,
    FiscalDistrict,
    OfficialEmail,
    BillingSoftware,
    PreferredFormat,
    ReportFrequency,
    PreferredContactHours,
    CreatedAt,
    UpdatedAt,
}
