//! Create company table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Company::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Company::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Company::CompanyName).string_len(256))
                    .col(ColumnDef::new(Company::Nipc).string_len(32))
                    .col(ColumnDef::new(Company::LegalForm).string_len(128).not_null())
                    .col(ColumnDef::new(Company::Cae).string_len(32))
                    .col(ColumnDef::new(Company::FoundingDate).date())
                    .col(ColumnDef::new(Company::AccountingRegime).string_len(64))
                    .col(ColumnDef::new(Company::VatRegime).string_len(64))
                    .col(ColumnDef::new(Company::BusinessActivity).text())
                    .col(ColumnDef::new(Company::EstimatedRevenue).double())
                    .col(ColumnDef::new(Company::MonthlyInvoices).integer())
                    .col(ColumnDef::new(Company::NumberEmployees).integer())
                    .col(ColumnDef::new(Company::TradeName).string_len(256))
                    .col(ColumnDef::new(Company::CorporateObject).text())
                    .col(ColumnDef::new(Company::Address).string_len(512))
                    .col(ColumnDef::new(Company::PostalCode).string_len(32))
                    .col(ColumnDef::new(Company::City).string_len(128))
                    .col(ColumnDef::new(Company::County).string_len(128))
                    .col(ColumnDef::new(Company::District).string_len(128))
                    .col(ColumnDef::new(Company::Country).string_len(128))
                    .col(ColumnDef::new(Company::ShareCapital).double())
                    .col(ColumnDef::new(Company::GroupStartDate).date())
                    .col(ColumnDef::new(Company::BankName).string_len(128))
                    .col(ColumnDef::new(Company::Iban).string_len(64))
                    .col(ColumnDef::new(Company::Bic).string_len(32))
                    .col(ColumnDef::new(Company::AnnualRevenue).double())
                    .col(ColumnDef::new(Company::HasStock).boolean())
                    .col(ColumnDef::new(Company::MainClients).text())
                    .col(ColumnDef::new(Company::MainSuppliers).text())
                    .col(
                        ColumnDef::new(Company::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Company::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_user")
                            .from(Company::Table, Company::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user_id (one company per user)
        manager
            .create_index(
                Index::create()
                    .name("idx_company_user_id")
                    .table(Company::Table)
                    .col(Company::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: nipc
        manager
            .create_index(
                Index::create()
                    .name("idx_company_nipc")
                    .table(Company::Table)
                    .col(Company::Nipc)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Company::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Company {
    Table,
    Id,
    UserId,
    CompanyName,
    Nipc,
    LegalForm,
    Cae,
    FoundingDate,
    AccountingRegime,
    VatRegime,
    BusinessActivity,
    EstimatedRevenue,
    MonthlyInvoices,
    NumberEmployees,
    TradeName,
    CorporateObject,
    Address,
    PostalCode,
    City,
    County,
    District,
    Country,
    ShareCapital,
    GroupStartDate,
    BankName,
    Iban,
    Bic,
    AnnualRevenue,
    HasStock,
    MainClients,
    MainSuppliers,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
