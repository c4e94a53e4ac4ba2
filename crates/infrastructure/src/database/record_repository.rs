use crate::database::entities::bin_records;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use domain::{
    BinRecord, BinStatus, DomainError, FacetScope, FilterState, NewBinRecord, PageRange,
    RecordColumn, RecordPage, RecordRepository, TableType, WeekLabel,
};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{BinOper, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use tracing::debug;

/// Rows per INSERT statement. Each row binds 20 values, which keeps a chunk
/// well under SQLite's 32,766 and PostgreSQL's 65,535 parameter limits.
const INSERT_CHUNK_ROWS: usize = 1_000;

pub struct SeaOrmRecordRepository {
    db: DatabaseConnection,
}

impl SeaOrmRecordRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_record(model: bin_records::Model) -> Result<BinRecord, DomainError> {
        let table_type: TableType = model.table_type.parse()?;
        let status = model
            .status
            .as_deref()
            .map(|s| s.parse::<BinStatus>())
            .transpose()?;

        Ok(BinRecord {
            id: model.id,
            table_type,
            bin_code: model.bin_code,
            bin_type: model.bin_type,
            hub_name: model.hub_name,
            employee_id: model.employee_id,
            employee_name: model.employee_name,
            cust_name: model.cust_name,
            cust_address: model.cust_address,
            cust_ward: model.cust_ward,
            cust_district: model.cust_district,
            cust_province: model.cust_province,
            ma_don: model.ma_don,
            reference_code: model.reference_code,
            reference_code_of_so: model.reference_code_of_so,
            han_thu_hoi: model.han_thu_hoi.map(to_utc),
            ngay_phat_sinh_bin: model.ngay_phat_sinh_bin.map(to_utc),
            week_label: WeekLabel::new(model.week_label)?,
            status,
            created_at: to_utc(model.created_at),
        })
    }

    fn new_active_model(
        table: TableType,
        record: NewBinRecord,
        created_at: DateTime<FixedOffset>,
    ) -> bin_records::ActiveModel {
        bin_records::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            table_type: Set(table.as_str().to_string()),
            bin_code: Set(record.bin_code),
            bin_type: Set(record.bin_type),
            hub_name: Set(record.hub_name),
            employee_id: Set(record.employee_id),
            employee_name: Set(record.employee_name),
            cust_name: Set(record.cust_name),
            cust_address: Set(record.cust_address),
            cust_ward: Set(record.cust_ward),
            cust_district: Set(record.cust_district),
            cust_province: Set(record.cust_province),
            ma_don: Set(record.ma_don),
            reference_code: Set(record.reference_code),
            reference_code_of_so: Set(record.reference_code_of_so),
            han_thu_hoi: Set(record.han_thu_hoi.map(to_offset)),
            ngay_phat_sinh_bin: Set(record.ngay_phat_sinh_bin.map(to_offset)),
            week_label: Set(record.week_label.into()),
            status: Set(None),
            created_at: Set(created_at),
        }
    }

    fn filtered(&self, table: TableType, filter: &FilterState) -> Select<bin_records::Entity> {
        let backend = self.db.get_database_backend();
        bin_records::Entity::find().filter(filter_condition(backend, table, filter))
    }

    fn scoped(
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Select<bin_records::Entity> {
        let target = column_of(column);
        let mut select = bin_records::Entity::find()
            .select_only()
            .column(target)
            .filter(bin_records::Column::TableType.eq(table.as_str()))
            .filter(target.is_not_null())
            .filter(target.ne(""));
        if let Some(scope) = scope {
            select = select.filter(column_of(scope.column).eq(scope.value));
        }
        select
    }
}

/// The one place the SQL predicate for a filter is built. Pages, counts,
/// distinct counts and exports all go through here.
pub(crate) fn filter_condition(
    backend: DatabaseBackend,
    table: TableType,
    filter: &FilterState,
) -> Condition {
    let mut condition = Condition::all().add(bin_records::Column::TableType.eq(table.as_str()));

    if let Some(status) = filter.status {
        let mut status_condition =
            Condition::any().add(bin_records::Column::Status.eq(status.as_str()));
        if status == BinStatus::Pending {
            status_condition = status_condition.add(bin_records::Column::Status.is_null());
        }
        condition = condition.add(status_condition);
    }
    if let Some(week) = filter.week() {
        condition = condition.add(bin_records::Column::WeekLabel.eq(week));
    }
    if let Some(hub) = filter.hub() {
        condition = condition.add(bin_records::Column::HubName.eq(hub));
    }
    if let Some(employee) = filter.employee() {
        condition = condition.add(bin_records::Column::EmployeeName.eq(employee));
    }
    if let Some(needle) = filter.search() {
        let mut any = Condition::any();
        for column in [
            bin_records::Column::BinCode,
            bin_records::Column::CustName,
            bin_records::Column::ReferenceCodeOfSo,
        ] {
            any = any.add(contains_ignore_case(backend, column, needle));
        }
        condition = condition.add(any);
    }

    condition
}

/// Case-insensitive substring test with full Unicode case folding.
///
/// SQLite's `LOWER` and `LIKE` only fold ASCII, so there the needle becomes a
/// `GLOB` pattern with one `[xX]` class per letter.
fn contains_ignore_case(
    backend: DatabaseBackend,
    column: bin_records::Column,
    needle: &str,
) -> SimpleExpr {
    match backend {
        DatabaseBackend::Postgres => {
            Expr::col(column).ilike(LikeExpr::new(like_pattern(needle)).escape('\\'))
        }
        DatabaseBackend::Sqlite => {
            Expr::col(column).binary(BinOper::Custom("GLOB"), glob_pattern(needle))
        }
        _ => Expr::expr(Func::lower(Expr::col(column)))
            .like(LikeExpr::new(like_pattern(needle)).escape('\\')),
    }
}

/// `%needle%`, lower-cased, with LIKE wildcards in the needle escaped.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// `*needle*` where every cased letter matches either case and GLOB
/// metacharacters match literally.
pub(crate) fn glob_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() * 4 + 2);
    pattern.push('*');
    for c in needle.chars() {
        let mut lower = c.to_lowercase();
        let mut upper = c.to_uppercase();
        match (lower.next(), lower.next(), upper.next(), upper.next()) {
            (Some(l), None, Some(u), None) if l != u => {
                pattern.push('[');
                pattern.push(l);
                pattern.push(u);
                pattern.push(']');
            }
            _ if matches!(c, '*' | '?' | '[') => {
                pattern.push('[');
                pattern.push(c);
                pattern.push(']');
            }
            _ => pattern.push(c),
        }
    }
    pattern.push('*');
    pattern
}

fn column_of(column: RecordColumn) -> bin_records::Column {
    match column {
        RecordColumn::HubName => bin_records::Column::HubName,
        RecordColumn::EmployeeName => bin_records::Column::EmployeeName,
        RecordColumn::WeekLabel => bin_records::Column::WeekLabel,
        RecordColumn::CustName => bin_records::Column::CustName,
    }
}

fn store_error(e: DbErr) -> DomainError {
    DomainError::Store(format!("Database error: {}", e))
}

fn to_utc(dt: DateTime<FixedOffset>) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

fn to_offset(dt: DateTime<Utc>) -> DateTime<FixedOffset> {
    dt.fixed_offset()
}

#[async_trait]
impl RecordRepository for SeaOrmRecordRepository {
    async fn fetch_page(
        &self,
        table: TableType,
        filter: &FilterState,
        range: PageRange,
    ) -> Result<RecordPage<BinRecord>, DomainError> {
        let total = self.filtered(table, filter)
            .count(&self.db)
            .await
            .map_err(store_error)?;

        let models = self.filtered(table, filter)
            .order_by_desc(bin_records::Column::CreatedAt)
            .order_by_desc(bin_records::Column::Id)
            .offset(range.offset)
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(store_error)?;

        let mut rows = Vec::with_capacity(models.len());
        for m in models {
            rows.push(Self::model_to_record(m)?);
        }
        Ok(RecordPage { rows, total })
    }

    async fn fetch_all(
        &self,
        table: TableType,
        filter: &FilterState,
    ) -> Result<Vec<BinRecord>, DomainError> {
        let models = self.filtered(table, filter)
            .order_by_desc(bin_records::Column::CreatedAt)
            .order_by_desc(bin_records::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        models.into_iter().map(Self::model_to_record).collect()
    }

    async fn count(&self, table: TableType, filter: &FilterState) -> Result<u64, DomainError> {
        self.filtered(table, filter)
            .count(&self.db)
            .await
            .map_err(store_error)
    }

    async fn count_distinct(
        &self,
        table: TableType,
        filter: &FilterState,
        column: RecordColumn,
    ) -> Result<u64, DomainError> {
        let target = column_of(column);
        // COUNT(*) over SELECT DISTINCT <column>
        self.filtered(table, filter)
            .select_only()
            .column(target)
            .filter(target.is_not_null())
            .filter(target.ne(""))
            .distinct()
            .count(&self.db)
            .await
            .map_err(store_error)
    }

    async fn distinct_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        debug!(table = %table, column = column.as_str(), "Listing distinct values");
        Self::scoped(table, column, scope)
            .distinct()
            .order_by_asc(column_of(column))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(store_error)
    }

    async fn column_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        Self::scoped(table, column, scope)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(store_error)
    }

    async fn update_status(
        &self,
        table: TableType,
        id: &str,
        status: BinStatus,
    ) -> Result<BinRecord, DomainError> {
        let result = bin_records::Entity::update_many()
            .col_expr(bin_records::Column::Status, Expr::value(status.as_str()))
            .filter(bin_records::Column::Id.eq(id))
            .filter(bin_records::Column::TableType.eq(table.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(DomainError::RecordNotFound(id.to_string()));
        }

        let model = bin_records::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::RecordNotFound(id.to_string()))?;

        Self::model_to_record(model)
    }

    async fn insert_batch(
        &self,
        table: TableType,
        records: Vec<NewBinRecord>,
    ) -> Result<u64, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }

        let created_at = to_offset(Utc::now());
        let models: Vec<_> = records
            .into_iter()
            .map(|r| Self::new_active_model(table, r, created_at))
            .collect();

        // Chunked under the bind-parameter limit, committed as one batch
        let txn = self.db.begin().await.map_err(store_error)?;
        let mut inserted = 0;
        for chunk in models.chunks(INSERT_CHUNK_ROWS) {
            inserted += bin_records::Entity::insert_many(chunk.iter().cloned())
                .exec_without_returning(&txn)
                .await
                .map_err(store_error)?;
        }
        txn.commit().await.map_err(store_error)?;

        debug!(table = %table, inserted, "Inserted record batch");
        Ok(inserted)
    }

    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError> {
        let result = bin_records::Entity::delete_many()
            .filter(bin_records::Column::TableType.eq(table.as_str()))
            .filter(bin_records::Column::WeekLabel.eq(week.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected)
    }
}
