use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_accounts_table(manager).await?;
        self.create_submission_attempts_table(manager).await?;
        self.create_operational_events_table(manager).await?;
        self.create_indexes(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperationalEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubmissionAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    // Helper functions for database-specific types
    fn create_id_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.uuid().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn create_timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    async fn create_accounts_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .col(self.create_id_column(manager, Accounts::Id).primary_key())
                    .col(ColumnDef::new(Accounts::Phone).string().not_null())
                    .col(ColumnDef::new(Accounts::Password).string().not_null())
                    .col(ColumnDef::new(Accounts::Steps).integer().not_null())
                    .col(ColumnDef::new(Accounts::Hour).integer().not_null())
                    .col(ColumnDef::new(Accounts::Minute).integer().not_null())
                    .col(ColumnDef::new(Accounts::Enabled).boolean().not_null())
                    .col(ColumnDef::new(Accounts::AuthToken).string().not_null())
                    .col(ColumnDef::new(Accounts::TimeToken).string().not_null())
                    .col(self.create_timestamp_column(manager, Accounts::CreatedAt))
                    .col(self.create_timestamp_column(manager, Accounts::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_submission_attempts_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubmissionAttempts::Table)
                    .col(
                        self.create_id_column(manager, SubmissionAttempts::Id)
                            .primary_key(),
                    )
                    .col(self.create_id_column(manager, SubmissionAttempts::AccountId))
                    .col(
                        ColumnDef::new(SubmissionAttempts::Steps)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionAttempts::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionAttempts::Message)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubmissionAttempts::ResponseCode).integer())
                    .col(self.create_timestamp_column(manager, SubmissionAttempts::SubmittedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_attempts_account_id")
                            .from(SubmissionAttempts::Table, SubmissionAttempts::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_operational_events_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperationalEvents::Table)
                    .col(
                        self.create_id_column(manager, OperationalEvents::Id)
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperationalEvents::Level).string().not_null())
                    .col(
                        ColumnDef::new(OperationalEvents::Message)
                            .text()
                            .not_null(),
                    )
                    .col(self.create_timestamp_column(manager, OperationalEvents::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_attempts_account_submitted")
                    .table(SubmissionAttempts::Table)
                    .col(SubmissionAttempts::AccountId)
                    .col(SubmissionAttempts::SubmittedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_attempts_submitted_at")
                    .table(SubmissionAttempts::Table)
                    .col(SubmissionAttempts::SubmittedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_operational_events_created_at")
                    .table(OperationalEvents::Table)
                    .col(OperationalEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_operational_events_level")
                    .table(OperationalEvents::Table)
                    .col(OperationalEvents::Level)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Phone,
    Password,
    Steps,
    Hour,
    Minute,
    Enabled,
    AuthToken,
    TimeToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SubmissionAttempts {
    Table,
    Id,
    AccountId,
    Steps,
    Status,
    Message,
    ResponseCode,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum OperationalEvents {
    Table,
    Id,
    Level,
    Message,
    CreatedAt,
}
