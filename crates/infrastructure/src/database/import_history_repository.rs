use crate::database::entities::import_history;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use domain::{
    DomainError, ImportHistory, ImportHistoryRepository, NewImportHistory, TableType, WeekLabel,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct SeaOrmImportHistoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmImportHistoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_history(model: import_history::Model) -> Result<ImportHistory, DomainError> {
        Ok(ImportHistory {
            id: model.id,
            file_name: model.file_name,
            table_type: model.table_type.parse()?,
            week_label: WeekLabel::new(model.week_label)?,
            total_rows: model.total_rows.max(0) as u64,
            success_rows: model.success_rows.max(0) as u64,
            failed_rows: model.failed_rows.max(0) as u64,
            uploaded_at: model.uploaded_at.with_timezone(&Utc),
        })
    }

    fn to_offset(dt: DateTime<Utc>) -> DateTime<FixedOffset> {
        dt.fixed_offset()
    }
}

fn store_error(e: DbErr) -> DomainError {
    DomainError::Store(format!("Database error: {}", e))
}

#[async_trait]
impl ImportHistoryRepository for SeaOrmImportHistoryRepository {
    async fn append(&self, entry: NewImportHistory) -> Result<ImportHistory, DomainError> {
        let history = entry.into_history(uuid::Uuid::new_v4().to_string(), Utc::now());

        let active_model = import_history::ActiveModel {
            id: Set(history.id.clone()),
            file_name: Set(history.file_name.clone()),
            table_type: Set(history.table_type.as_str().to_string()),
            week_label: Set(history.week_label.as_str().to_string()),
            total_rows: Set(history.total_rows as i64),
            success_rows: Set(history.success_rows as i64),
            failed_rows: Set(history.failed_rows as i64),
            uploaded_at: Set(Self::to_offset(history.uploaded_at)),
        };

        import_history::Entity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(history)
    }

    async fn list(&self, table: TableType) -> Result<Vec<ImportHistory>, DomainError> {
        let models = import_history::Entity::find()
            .filter(import_history::Column::TableType.eq(table.as_str()))
            .order_by_desc(import_history::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        models.into_iter().map(Self::model_to_history).collect()
    }

    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError> {
        let result = import_history::Entity::delete_many()
            .filter(import_history::Column::TableType.eq(table.as_str()))
            .filter(import_history::Column::WeekLabel.eq(week.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected)
    }
}
