//! Create registration request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RegistrationRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegistrationRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RegistrationRequest::ApprovalToken)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegistrationRequest::RequestType)
                            .string_len(16)
                            .not_null()
                            .default("new_client"),
                    )
                    .col(
                        ColumnDef::new(RegistrationRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(RegistrationRequest::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(RegistrationRequest::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(RegistrationRequest::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::ReviewNotes).text())
                    .col(
                        ColumnDef::new(RegistrationRequest::Username)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegistrationRequest::PasswordHash)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RegistrationRequest::Name).string_len(256))
                    .col(ColumnDef::new(RegistrationRequest::Email).string_len(256))
                    .col(ColumnDef::new(RegistrationRequest::Phone).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::Nif).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::DateOfBirth).date())
                    .col(ColumnDef::new(RegistrationRequest::MaritalStatus).string_len(64))
                    .col(ColumnDef::new(RegistrationRequest::CitizenCardNumber).string_len(64))
                    .col(ColumnDef::new(RegistrationRequest::CitizenCardExpiry).date())
                    .col(ColumnDef::new(RegistrationRequest::TaxResidenceCountry).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::FixedPhone).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::FiscalAddress).string_len(512))
                    .col(ColumnDef::new(RegistrationRequest::FiscalPostalCode).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::FiscalCity).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::FiscalCounty).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::FiscalDistrict).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::Address).string_len(512))
                    .col(ColumnDef::new(RegistrationRequest::PostalCode).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::City).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::Country).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::OfficialEmail).string_len(256))
                    .col(ColumnDef::new(RegistrationRequest::BillingSoftware).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::PreferredFormat).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::ReportFrequency).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::PreferredContactHours).string_len(64))
                    .col(
                        ColumnDef::new(RegistrationRequest::LegalForm)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RegistrationRequest::CompanyName).string_len(256))
                    .col(ColumnDef::new(RegistrationRequest::Nipc).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::Cae).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::FoundingDate).date())
                    .col(ColumnDef::new(RegistrationRequest::AccountingRegime).string_len(64))
                    .col(ColumnDef::new(RegistrationRequest::VatRegime).string_len(64))
                    .col(ColumnDef::new(RegistrationRequest::BusinessActivity).text())
                    .col(ColumnDef::new(RegistrationRequest::EstimatedRevenue).double())
                    .col(ColumnDef::new(RegistrationRequest::MonthlyInvoices).integer())
                    .col(ColumnDef::new(RegistrationRequest::NumberEmployees).integer())
                    .col(ColumnDef::new(RegistrationRequest::TradeName).string_len(256))
                    .col(ColumnDef::new(RegistrationRequest::CorporateObject).text())
                    .col(ColumnDef::new(RegistrationRequest::CompanyAddress).string_len(512))
                    .col(ColumnDef::new(RegistrationRequest::CompanyPostalCode).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::CompanyCity).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::CompanyCounty).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::CompanyDistrict).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::CompanyCountry).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::ShareCapital).double())
                    .col(ColumnDef::new(RegistrationRequest::GroupStartDate).date())
                    .col(ColumnDef::new(RegistrationRequest::BankName).string_len(128))
                    .col(ColumnDef::new(RegistrationRequest::Iban).string_len(64))
                    .col(ColumnDef::new(RegistrationRequest::Bic).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::AnnualRevenue).double())
                    .col(ColumnDef::new(RegistrationRequest::HasStock).boolean())
                    .col(ColumnDef::new(RegistrationRequest::MainClients).text())
                    .col(ColumnDef::new(RegistrationRequest::MainSuppliers).text())
                    .col(ColumnDef::new(RegistrationRequest::UserId).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::CompanyId).string_len(32))
                    .col(ColumnDef::new(RegistrationRequest::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: approval_token
        manager
            .create_index(
                Index::create()
                    .name("idx_registration_request_approval_token")
                    .table(RegistrationRequest::Table)
                    .col(RegistrationRequest::ApprovalToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookup indexes for review queues and duplicate checks
        for (name, column) in [
            ("idx_registration_request_status", RegistrationRequest::Status),
            ("idx_registration_request_nif", RegistrationRequest::Nif),
            ("idx_registration_request_email", RegistrationRequest::Email),
            ("idx_registration_request_user_id", RegistrationRequest::UserId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(RegistrationRequest::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RegistrationRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RegistrationRequest {
    Table,
    Id,
    ApprovalToken,
    RequestType,
    Status,
    SubmittedAt,
    ReviewedAt,
    ReviewedBy,
    ReviewNotes,
    Username,
    PasswordHash,
    Name,
    Email,
    Phone,
    Nif,
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
    Address,
    PostalCode,
    City,
    Country,
    OfficialEmail,
    BillingSoftware,
    PreferredFormat,
    ReportFrequency,
    PreferredContactHours,
    LegalForm,
    CompanyName,
    Nipc,
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
    CompanyAddress,
    CompanyPostalCode,
    CompanyCity,
    CompanyCounty,
    CompanyDistrict,
    CompanyCountry,
    ShareCapital,
    GroupStartDate,
    BankName,
    Iban,
    Bic,
    AnnualRevenue,
    HasStock,
    MainClients,
    MainSuppliers,
    UserId,
    CompanyId,
    UpdatedAt,
}
