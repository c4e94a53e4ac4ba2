use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Both partitions live in one table, told apart by table_type
        manager
            .create_table(
                Table::create()
                    .table(BinRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BinRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BinRecords::TableType).string().not_null())
                    .col(ColumnDef::new(BinRecords::BinCode).string().not_null())
                    .col(ColumnDef::new(BinRecords::BinType).string())
                    .col(ColumnDef::new(BinRecords::HubName).string())
                    .col(ColumnDef::new(BinRecords::EmployeeId).big_integer())
                    .col(ColumnDef::new(BinRecords::EmployeeName).string())
                    .col(ColumnDef::new(BinRecords::CustName).string())
                    .col(ColumnDef::new(BinRecords::CustAddress).text())
                    .col(ColumnDef::new(BinRecords::CustWard).string())
                    .col(ColumnDef::new(BinRecords::CustDistrict).string())
                    .col(ColumnDef::new(BinRecords::CustProvince).string())
                    .col(ColumnDef::new(BinRecords::MaDon).string())
                    .col(ColumnDef::new(BinRecords::ReferenceCode).string())
                    .col(ColumnDef::new(BinRecords::ReferenceCodeOfSo).string())
                    .col(ColumnDef::new(BinRecords::HanThuHoi).timestamp_with_time_zone())
                    .col(ColumnDef::new(BinRecords::NgayPhatSinhBin).timestamp_with_time_zone())
                    .col(ColumnDef::new(BinRecords::WeekLabel).string().not_null())
                    .col(ColumnDef::new(BinRecords::Status).string())
                    .col(
                        ColumnDef::new(BinRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bin_records_table_week")
                    .table(BinRecords::Table)
                    .col(BinRecords::TableType)
                    .col(BinRecords::WeekLabel)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bin_records_table_created")
                    .table(BinRecords::Table)
                    .col(BinRecords::TableType)
                    .col(BinRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ImportHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImportHistory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ImportHistory::FileName).string().not_null())
                    .col(ColumnDef::new(ImportHistory::TableType).string().not_null())
                    .col(ColumnDef::new(ImportHistory::WeekLabel).string().not_null())
                    .col(
                        ColumnDef::new(ImportHistory::TotalRows)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ImportHistory::SuccessRows)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ImportHistory::FailedRows)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ImportHistory::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ImportHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BinRecords::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum BinRecords {
    Table,
    Id,
    TableType,
    BinCode,
    BinType,
    HubName,
    EmployeeId,
    EmployeeName,
    CustName,
    CustAddress,
    CustWard,
    CustDistrict,
    CustProvince,
    MaDon,
    ReferenceCode,
    ReferenceCodeOfSo,
    HanThuHoi,
    NgayPhatSinhBin,
    WeekLabel,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ImportHistory {
    Table,
    Id,
    FileName,
    TableType,
    WeekLabel,
    TotalRows,
    SuccessRows,
    FailedRows,
    UploadedAt,
}
