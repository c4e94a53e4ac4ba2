mod common;

use application::{DataTable, RecordService, SummaryService};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{GatedStore, bulk_store, context, record_service, seeded_store, week};
use domain::{
    BinRecord, BinStatus, DomainError, FacetScope, FilterState, NewBinRecord, PageRange,
    RecordColumn, RecordPage, RecordRepository, StatusTracking, TableType, WeekLabel,
};
use infrastructure::XlsxCodec;
use mockall::{Sequence, mock};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

const DELAY: Duration = Duration::from_millis(500);

mock! {
    pub Repo {}

    #[async_trait]
    impl RecordRepository for Repo {
        async fn fetch_page(&self, table: TableType, filter: &FilterState, range: PageRange) -> Result<RecordPage<BinRecord>, DomainError>;
        async fn fetch_all(&self, table: TableType, filter: &FilterState) -> Result<Vec<BinRecord>, DomainError>;
        async fn count(&self, table: TableType, filter: &FilterState) -> Result<u64, DomainError>;
        async fn count_distinct(&self, table: TableType, filter: &FilterState, column: RecordColumn) -> Result<u64, DomainError>;
        async fn distinct_values(&self, table: TableType, column: RecordColumn, scope: Option<FacetScope>) -> Result<Vec<String>, DomainError>;
        async fn column_values(&self, table: TableType, column: RecordColumn, scope: Option<FacetScope>) -> Result<Vec<String>, DomainError>;
        async fn update_status(&self, table: TableType, id: &str, status: BinStatus) -> Result<BinRecord, DomainError>;
        async fn insert_batch(&self, table: TableType, records: Vec<NewBinRecord>) -> Result<u64, DomainError>;
        async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError>;
    }
}

fn stored(id: &str, status: Option<BinStatus>) -> BinRecord {
    let mut record = NewBinRecord::new("BIN-001", week("Week 1")).into_record(
        id.to_string(),
        TableType::Pending,
        Utc.with_ymd_and_hms(2024, 11, 4, 8, 0, 0).unwrap(),
    );
    record.status = status;
    record
}

#[tokio::test]
async fn test_page_count_and_navigation() {
    let store = Arc::new(bulk_store(120).await);
    let table = DataTable::new(record_service(store), context(), TableType::Pending, DELAY);

    table.load().await.unwrap();
    let snapshot = table.snapshot();
    assert_eq!(snapshot.total, 120);
    assert_eq!(snapshot.total_pages, 3);
    assert_eq!(snapshot.rows.len(), 50);
    // newest first
    assert_eq!(snapshot.rows[0].bin_code, "BIN-0119");

    table.go_to_page(3).await.unwrap();
    let last = table.snapshot();
    assert_eq!(last.page, 3);
    assert_eq!(last.rows.len(), 20);
    assert_eq!(last.rows[19].bin_code, "BIN-0000");

    table.next_page().await.unwrap();
    assert_eq!(table.current_page().number(), 3);

    table.go_to_page(0).await.unwrap();
    assert_eq!(table.current_page().number(), 1);
    table.previous_page().await.unwrap();
    assert_eq!(table.current_page().number(), 1);
}

#[tokio::test]
async fn test_page_beyond_last_is_clamped() {
    let store = Arc::new(bulk_store(120).await);
    let table = DataTable::new(record_service(store), context(), TableType::Pending, DELAY);

    table.go_to_page(9).await.unwrap();
    let snapshot = table.snapshot();
    assert_eq!(snapshot.page, 3);
    assert_eq!(snapshot.rows.len(), 20);
}

#[tokio::test]
async fn test_filter_change_returns_to_first_page() {
    let store = Arc::new(bulk_store(120).await);
    let ctx = context();
    let table = DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY);

    table.go_to_page(2).await.unwrap();
    ctx.set_search_text("bin-01");
    table.filters_changed().await.unwrap();

    let snapshot = table.snapshot();
    assert_eq!(snapshot.page, 1);
    // BIN-0010..BIN-0019 and BIN-0100..BIN-0119
    assert_eq!(snapshot.total, 30);
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_columns() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY);

    ctx.set_search_text("ABC");
    table.load().await.unwrap();

    let mut codes: Vec<String> = table.rows().into_iter().map(|r| r.bin_code).collect();
    codes.sort();
    assert_eq!(codes, vec!["BIN-001", "BIN-003", "BIN-004"]);
    for row in table.rows() {
        let hit = [
            Some(row.bin_code.as_str()),
            row.cust_name.as_deref(),
            row.reference_code_of_so.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|v| v.to_lowercase().contains("abc"));
        assert!(hit, "{} does not contain the needle", row.bin_code);
    }
}

#[tokio::test]
async fn test_summary_total_matches_table_total() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = DataTable::new(record_service(store.clone()), ctx.clone(), TableType::Pending, DELAY);
    let summary = SummaryService::new(store, StatusTracking::default());

    let filters = [
        FilterState::default(),
        FilterState {
            hub_name: "HUB B".into(),
            ..FilterState::default()
        },
        FilterState {
            search_text: "abc".into(),
            week_label: "Week 2".into(),
            ..FilterState::default()
        },
    ];
    for filter in filters {
        ctx.replace(filter.clone());
        table.filters_changed().await.unwrap();
        let totals = summary.summarize(TableType::Pending, &filter).await.unwrap();
        assert_eq!(totals.total, table.snapshot().total, "filter {filter:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_every_transition_is_allowed_and_visible() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY);
    ctx.set_search_text("BIN-002");
    table.load().await.unwrap();
    let id = table.rows()[0].id.clone();

    for from in BinStatus::ALL {
        for to in BinStatus::ALL {
            table.set_status(&id, from).await.unwrap();
            let updated = table.set_status(&id, to).await.unwrap();
            assert_eq!(updated.status, Some(to));
            assert_eq!(table.rows()[0].status, Some(to), "{from} -> {to}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_success_waits_refresh_delay_then_bumps_revision() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY);
    table.load().await.unwrap();
    let id = table.rows()[0].id.clone();

    let started = tokio::time::Instant::now();
    table.set_status(&id, BinStatus::PickedUp).await.unwrap();

    assert!(started.elapsed() >= DELAY);
    assert_eq!(ctx.revision(), 1);
    assert!(!table.is_busy(&id));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_change_is_optimistic_and_blocks_second_change() {
    let gated = Arc::new(GatedStore::new(seeded_store().await, "none"));
    gated.hold_updates.store(true, Ordering::SeqCst);
    let table = Arc::new(DataTable::new(
        record_service(gated.clone()),
        context(),
        TableType::Pending,
        DELAY,
    ));
    table.load().await.unwrap();
    let id = table.rows()[0].id.clone();

    let first = {
        let table = table.clone();
        let id = id.clone();
        tokio::spawn(async move { table.set_status(&id, BinStatus::Returned).await })
    };
    gated.entered.notified().await;

    assert!(table.is_busy(&id));
    assert_eq!(table.rows()[0].status, Some(BinStatus::Returned));
    assert_eq!(
        table.set_status(&id, BinStatus::PickedUp).await,
        Err(DomainError::RecordBusy(id.clone()))
    );

    gated.hold_updates.store(false, Ordering::SeqCst);
    gated.release.notify_one();
    let updated = first.await.unwrap().unwrap();
    assert_eq!(updated.status, Some(BinStatus::Returned));
    assert!(!table.is_busy(&id));
}

#[tokio::test]
async fn test_failed_change_rolls_back() {
    let mut repo = MockRepo::new();
    repo.expect_fetch_page().returning(|_, _, _| {
        Ok(RecordPage {
            rows: vec![stored("r1", Some(BinStatus::PickedUp))],
            total: 1,
        })
    });
    repo.expect_update_status()
        .times(1)
        .returning(|_, _, _| Err(DomainError::Store("connection reset".into())));

    let ctx = context();
    let table = DataTable::new(record_service(Arc::new(repo)), ctx.clone(), TableType::Pending, DELAY);
    table.load().await.unwrap();

    let result = table.set_status("r1", BinStatus::Returned).await;
    assert_eq!(result, Err(DomainError::Store("connection reset".into())));
    assert_eq!(table.rows()[0].status, Some(BinStatus::PickedUp));
    assert!(!table.is_busy("r1"));
    assert_eq!(ctx.revision(), 0);
}

#[tokio::test]
async fn test_failed_change_off_page_reloads_stored_status() {
    let mut repo = MockRepo::new();
    let mut seq = Sequence::new();
    repo.expect_fetch_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(RecordPage {
                rows: vec![stored("r1", None)],
                total: 2,
            })
        });
    repo.expect_fetch_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(RecordPage {
                rows: vec![stored("r2", Some(BinStatus::Returned)), stored("r1", None)],
                total: 2,
            })
        });
    repo.expect_update_status()
        .times(1)
        .returning(|_, _, _| Err(DomainError::Store("timeout".into())));

    let table = DataTable::new(record_service(Arc::new(repo)), context(), TableType::Pending, DELAY);
    table.load().await.unwrap();

    let result = table.set_status("r2", BinStatus::PickedUp).await;
    assert_eq!(result, Err(DomainError::Store("timeout".into())));

    let rows = table.rows();
    let r2 = rows.iter().find(|r| r.id == "r2").unwrap();
    assert_eq!(r2.status, Some(BinStatus::Returned));
    assert!(!table.is_busy("r2"));
}

#[tokio::test(start_paused = true)]
async fn test_success_reconciles_with_stored_record() {
    let mut repo = MockRepo::new();
    repo.expect_fetch_page().returning(|_, _, _| {
        Ok(RecordPage {
            rows: vec![stored("r1", None)],
            total: 1,
        })
    });
    repo.expect_update_status()
        .withf(|table, id, status| {
            *table == TableType::Pending && id == "r1" && *status == BinStatus::PickedUp
        })
        .returning(|_, _, _| {
            let mut record = stored("r1", Some(BinStatus::PickedUp));
            record.employee_name = Some("Assigned later".into());
            Ok(record)
        });

    let table = DataTable::new(record_service(Arc::new(repo)), context(), TableType::Pending, DELAY);
    table.load().await.unwrap();

    let updated = table.set_status("r1", BinStatus::PickedUp).await.unwrap();
    assert_eq!(updated.employee_name.as_deref(), Some("Assigned later"));
}

#[tokio::test]
async fn test_untracked_table_rejects_status_change() {
    let store = Arc::new(seeded_store().await);
    let tracking = StatusTracking {
        pending: true,
        compensation: false,
    };
    let records = Arc::new(RecordService::new(store, Arc::new(XlsxCodec::new()), tracking));
    let table = DataTable::new(records, context(), TableType::Compensation, DELAY);
    table.load().await.unwrap();
    let id = table.rows()[0].id.clone();

    assert_eq!(
        table.set_status(&id, BinStatus::Returned).await,
        Err(DomainError::StatusNotTracked(TableType::Compensation))
    );
    assert_eq!(table.rows()[0].status, None);
}

#[tokio::test]
async fn test_superseded_page_is_discarded() {
    let gated = Arc::new(GatedStore::new(seeded_store().await, "HUB A"));
    let ctx = context();
    let table = Arc::new(DataTable::new(
        record_service(gated.clone()),
        ctx.clone(),
        TableType::Pending,
        DELAY,
    ));

    ctx.set_hub_name("HUB A");
    let slow = {
        let table = table.clone();
        tokio::spawn(async move { table.load().await })
    };
    gated.entered.notified().await;

    ctx.set_hub_name("HUB B");
    table.load().await.unwrap();

    gated.release.notify_one();
    slow.await.unwrap().unwrap();

    let rows = table.rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.hub_name.as_deref() == Some("HUB B")));
}

#[tokio::test]
async fn test_table_switch_keeps_filters_and_resets_page() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY);
    ctx.set_hub_name("HUB A");
    table.load().await.unwrap();
    assert_eq!(table.snapshot().total, 2);

    table.set_table_type(TableType::Compensation).await.unwrap();
    let snapshot = table.snapshot();
    assert_eq!(snapshot.table, TableType::Compensation);
    assert_eq!(snapshot.page, 1);
    assert_eq!(snapshot.total, 1);
    assert_eq!(ctx.snapshot().hub_name, "HUB A");
}

#[tokio::test]
async fn test_follow_reloads_on_filter_change() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = Arc::new(DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY));
    table.load().await.unwrap();
    let handle = table.clone().follow();

    ctx.set_week_label("Week 1");
    for _ in 0..50 {
        if table.snapshot().total == 2 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(table.snapshot().total, 2);
    handle.abort();
}

#[tokio::test]
async fn test_follow_ends_after_table_is_dropped() {
    let store = Arc::new(seeded_store().await);
    let ctx = context();
    let table = Arc::new(DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY));
    let handle = table.clone().follow();
    drop(table);

    ctx.set_hub_name("HUB A");
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("follow task still running")
        .unwrap();
}

#[tokio::test]
async fn test_export_uses_filters_without_pagination() {
    let store = Arc::new(bulk_store(75).await);
    let ctx = context();
    let table = DataTable::new(record_service(store), ctx.clone(), TableType::Pending, DELAY);
    ctx.set_hub_name("HUB A");

    let today = chrono::NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
    let export = table.export(today).await.unwrap();
    assert_eq!(export.rows, 75);
    assert_eq!(export.file_name, "bin_recovery_pending_2024-11-05.xlsx");
    assert!(!export.bytes.is_empty());
}
