use chrono::{TimeZone, Utc};
use domain::{DomainError, NewBinRecord, SpreadsheetCodec, TableType, WeekLabel};
use infrastructure::XlsxCodec;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

fn week(label: &str) -> WeekLabel {
    WeekLabel::new(label).unwrap()
}

/// Sheet laid out like the operations team's source files.
fn source_sheet() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    let sheet = workbook.add_worksheet();
    sheet.set_name("Tuan 45").unwrap();
    let header = [
        "HUB_NAME",
        "HẠN THU HỒI",
        "MÃ ĐƠN",
        "NGÀY PHÁT SINH BIN",
        "bin_code",
        "employee_id",
        "employee_name",
        "cust_name",
        "reference_code_of_so",
    ];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *title).unwrap();
    }

    let deadline = ExcelDateTime::from_ymd(2024, 11, 15)
        .unwrap()
        .and_hms(12, 0, 0)
        .unwrap();
    sheet.write_string(1, 0, "HUB A").unwrap();
    sheet.write_datetime_with_format(1, 1, &deadline, &date_format).unwrap();
    sheet.write_string(1, 2, "DH-001").unwrap();
    sheet.write_string(1, 3, "2024-11-01 08:00:00").unwrap();
    sheet.write_string(1, 4, "BIN-001").unwrap();
    sheet.write_number(1, 5, 1001.0).unwrap();
    sheet.write_string(1, 6, "Nguyen Van A").unwrap();
    sheet.write_string(1, 7, "Cong ty ABC").unwrap();
    sheet.write_string(1, 8, "SO-100").unwrap();

    // no bin code: skipped
    sheet.write_string(2, 0, "HUB A").unwrap();
    sheet.write_string(2, 7, "Orphan").unwrap();

    sheet.write_string(3, 0, "HUB B").unwrap();
    sheet.write_number(3, 3, 45_597.0).unwrap();
    sheet.write_string(3, 4, "BIN-003").unwrap();

    workbook.add_worksheet().set_name("Notes").unwrap();
    workbook.save_to_buffer().unwrap()
}

#[test]
fn test_decode_source_sheet() {
    let codec = XlsxCodec::new();
    let parsed = codec.decode(&source_sheet(), &week("W45"), None).unwrap();

    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.records.len(), 2);

    let first = &parsed.records[0];
    assert_eq!(first.bin_code, "BIN-001");
    assert_eq!(first.hub_name.as_deref(), Some("HUB A"));
    assert_eq!(first.ma_don.as_deref(), Some("DH-001"));
    assert_eq!(first.employee_id, Some(1001));
    assert_eq!(first.reference_code_of_so.as_deref(), Some("SO-100"));
    assert_eq!(first.week_label, week("W45"));
    assert_eq!(
        first.han_thu_hoi,
        Some(Utc.with_ymd_and_hms(2024, 11, 15, 12, 0, 0).unwrap())
    );
    assert_eq!(
        first.ngay_phat_sinh_bin,
        Some(Utc.with_ymd_and_hms(2024, 11, 1, 8, 0, 0).unwrap())
    );

    let second = &parsed.records[1];
    assert_eq!(second.bin_code, "BIN-003");
    assert_eq!(
        second.ngay_phat_sinh_bin,
        Some(Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_sheet_names_in_order() {
    let codec = XlsxCodec::new();
    assert_eq!(
        codec.sheet_names(&source_sheet()).unwrap(),
        vec!["Tuan 45", "Notes"]
    );
}

#[test]
fn test_decode_named_sheet() {
    let codec = XlsxCodec::new();
    let parsed = codec
        .decode(&source_sheet(), &week("W45"), Some("Notes"))
        .unwrap();
    assert!(parsed.records.is_empty());

    let missing = codec.decode(&source_sheet(), &week("W45"), Some("Nope"));
    assert!(matches!(missing, Err(DomainError::Spreadsheet(_))));
}

#[test]
fn test_bad_rows_are_reported_with_sheet_row() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "bin_code").unwrap();
    sheet.write_string(0, 1, "employee_id").unwrap();
    sheet.write_string(0, 2, "HẠN THU HỒI").unwrap();
    sheet.write_string(1, 0, "BIN-1").unwrap();
    sheet.write_string(2, 0, "BIN-2").unwrap();
    sheet.write_string(2, 1, "12a").unwrap();
    sheet.write_string(3, 0, "BIN-3").unwrap();
    sheet.write_string(3, 2, "someday").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let parsed = XlsxCodec::new().decode(&bytes, &week("W1"), None).unwrap();
    assert_eq!(parsed.records.len(), 1);
    let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![3, 4]);
    assert!(parsed.errors[0].to_string().starts_with("Row 3:"));
}

#[test]
fn test_garbage_bytes_are_rejected() {
    let result = XlsxCodec::new().sheet_names(b"definitely not a workbook");
    assert!(matches!(result, Err(DomainError::Spreadsheet(_))));
}

#[test]
fn test_export_reimports() {
    let codec = XlsxCodec::new();
    let mut source = NewBinRecord::new("BIN-9", week("W9"))
        .with_hub("HUB Z")
        .with_employee("Do Van F")
        .with_customer("Khach Le")
        .with_reference_of_so("SO-9");
    source.reference_code = Some("REF-9".into());
    source.cust_address = Some("12 Le Loi".into());
    source.cust_ward = Some("Ben Nghe".into());
    source.cust_district = Some("Quan 1".into());
    source.cust_province = Some("HCM".into());
    source.employee_id = Some(77);
    let record = source.clone().into_record("id-9".into(), TableType::Pending, Utc::now());

    let bytes = codec.encode(&[record]).unwrap();
    assert_eq!(codec.sheet_names(&bytes).unwrap(), vec!["Data"]);

    let parsed = codec.decode(&bytes, &week("W9"), None).unwrap();
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.records, vec![source]);
}
