use super::columns::{EXPORT_COLUMNS, Field};
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use domain::{BinRecord, DomainError, NewBinRecord, ParsedSheet, RowError, SpreadsheetCodec, WeekLabel};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::{debug, warn};

const EXPORT_SHEET: &str = "Data";

/// `.xlsx` / `.xls` codec backed by calamine (read) and rust_xlsxwriter (write).
#[derive(Debug, Clone, Default)]
pub struct XlsxCodec;

impl XlsxCodec {
    pub fn new() -> Self {
        Self
    }

    fn open_range(bytes: &[u8], sheet: Option<&str>) -> Result<Range<Data>, DomainError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| DomainError::Spreadsheet(format!("Failed to read file: {}", e)))?;

        let name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| DomainError::Spreadsheet("Workbook has no sheets".to_string()))?,
        };

        workbook
            .worksheet_range(&name)
            .map_err(|e| DomainError::Spreadsheet(format!("Sheet '{}': {}", name, e)))
    }
}

impl SpreadsheetCodec for XlsxCodec {
    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, DomainError> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| DomainError::Spreadsheet(format!("Failed to read file: {}", e)))?;
        Ok(workbook.sheet_names())
    }

    fn decode(
        &self,
        bytes: &[u8],
        week: &WeekLabel,
        sheet: Option<&str>,
    ) -> Result<ParsedSheet, DomainError> {
        let range = Self::open_range(bytes, sheet)?;
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(ParsedSheet::default());
        };

        let columns: HashMap<usize, Field> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                let title = cell_text(cell)?;
                Field::from_header(&title).map(|field| (idx, field))
            })
            .collect();

        if !columns.values().any(|f| *f == Field::BinCode) {
            warn!("Sheet has no bin_code column; every row will be skipped");
        }

        let mut parsed = ParsedSheet::default();
        for (offset, row) in rows.enumerate() {
            // header is sheet row `first_row + 1`, data starts right after
            let sheet_row = first_row + offset + 2;
            match decode_row(row, &columns, week) {
                Ok(Some(record)) => parsed.records.push(record),
                Ok(None) => {}
                Err(message) => parsed.errors.push(RowError::new(sheet_row, message)),
            }
        }

        debug!(
            records = parsed.records.len(),
            errors = parsed.errors.len(),
            "Decoded sheet"
        );
        Ok(parsed)
    }

    fn encode(&self, records: &[BinRecord]) -> Result<Vec<u8>, DomainError> {
        let mut workbook = Workbook::new();
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(EXPORT_SHEET).map_err(xlsx_error)?;

            for (col, (_, label)) in EXPORT_COLUMNS.iter().enumerate() {
                worksheet
                    .write_string(0, col as u16, *label)
                    .map_err(xlsx_error)?;
            }

            for (idx, record) in records.iter().enumerate() {
                let row = (idx + 1) as u32;
                for (col, (field, _)) in EXPORT_COLUMNS.iter().enumerate() {
                    let col = col as u16;
                    if *field == Field::EmployeeId {
                        if let Some(id) = record.employee_id {
                            worksheet
                                .write_number(row, col, id as f64)
                                .map_err(xlsx_error)?;
                        }
                        continue;
                    }
                    if let Some(text) = text_field(record, *field) {
                        worksheet.write_string(row, col, text).map_err(xlsx_error)?;
                    }
                }
            }
        }

        workbook.save_to_buffer().map_err(xlsx_error)
    }
}

fn xlsx_error(e: XlsxError) -> DomainError {
    DomainError::Spreadsheet(format!("Failed to write workbook: {}", e))
}

fn text_field(record: &BinRecord, field: Field) -> Option<&str> {
    match field {
        Field::BinCode => Some(record.bin_code.as_str()),
        Field::BinType => record.bin_type.as_deref(),
        Field::HubName => record.hub_name.as_deref(),
        Field::EmployeeName => record.employee_name.as_deref(),
        Field::CustName => record.cust_name.as_deref(),
        Field::CustAddress => record.cust_address.as_deref(),
        Field::CustWard => record.cust_ward.as_deref(),
        Field::CustDistrict => record.cust_district.as_deref(),
        Field::CustProvince => record.cust_province.as_deref(),
        Field::MaDon => record.ma_don.as_deref(),
        Field::ReferenceCode => record.reference_code.as_deref(),
        Field::ReferenceCodeOfSo => record.reference_code_of_so.as_deref(),
        Field::EmployeeId | Field::HanThuHoi | Field::NgayPhatSinhBin => None,
    }
}

/// `Ok(None)` for rows without a bin code; `Err` carries the row message.
fn decode_row(
    row: &[Data],
    columns: &HashMap<usize, Field>,
    week: &WeekLabel,
) -> Result<Option<NewBinRecord>, String> {
    let bin_code = columns
        .iter()
        .find(|(_, f)| **f == Field::BinCode)
        .and_then(|(idx, _)| row.get(*idx))
        .and_then(cell_text);

    let Some(bin_code) = bin_code else {
        return Ok(None);
    };

    let mut record = NewBinRecord::new(bin_code, week.clone());

    for (idx, field) in columns {
        let Some(cell) = row.get(*idx) else {
            continue;
        };
        match field {
            Field::BinCode => {}
            Field::EmployeeId => record.employee_id = cell_integer(cell)?,
            Field::HanThuHoi => {
                record.han_thu_hoi = cell_datetime(cell).map_err(|e| format!("HẠN THU HỒI: {e}"))?
            }
            Field::NgayPhatSinhBin => {
                record.ngay_phat_sinh_bin =
                    cell_datetime(cell).map_err(|e| format!("NGÀY PHÁT SINH BIN: {e}"))?
            }
            text => {
                let value = cell_text(cell);
                match text {
                    Field::BinType => record.bin_type = value,
                    Field::HubName => record.hub_name = value,
                    Field::EmployeeName => record.employee_name = value,
                    Field::CustName => record.cust_name = value,
                    Field::CustAddress => record.cust_address = value,
                    Field::CustWard => record.cust_ward = value,
                    Field::CustDistrict => record.cust_district = value,
                    Field::CustProvince => record.cust_province = value,
                    Field::MaDon => record.ma_don = value,
                    Field::ReferenceCode => record.reference_code = value,
                    Field::ReferenceCodeOfSo => record.reference_code_of_so = value,
                    _ => {}
                }
            }
        }
    }

    Ok(Some(record))
}

/// Cell as trimmed text; empty and error cells read as `None`.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    if text.is_empty() { None } else { Some(text) }
}

fn cell_integer(cell: &Data) -> Result<Option<i64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(i) => Ok(Some(*i)),
        Data::Float(f) if f.fract() == 0.0 => Ok(Some(*f as i64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("employee_id '{}' is not a number", s.trim())),
        other => Err(format!("employee_id '{}' is not a number", other)),
    }
}

fn cell_datetime(cell: &Data) -> Result<Option<DateTime<Utc>>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| Some(naive.and_utc()))
            .ok_or_else(|| "invalid date value".to_string()),
        Data::Float(serial) => excel_serial(*serial).map(Some),
        Data::Int(serial) => excel_serial(*serial as f64).map(Some),
        Data::String(s) | Data::DateTimeIso(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) | Data::DateTimeIso(s) => parse_date_text(s.trim()).map(Some),
        other => Err(format!("invalid date '{}'", other)),
    }
}

/// Excel serial date (1900 system, epoch 1899-12-30) to UTC.
fn excel_serial(serial: f64) -> Result<DateTime<Utc>, String> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(format!("invalid date serial {}", serial));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "invalid epoch".to_string())?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("date serial {} out of range", serial))
}

fn parse_date_text(text: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }
    Err(format!("invalid date '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_excel_serial_conversion() {
        let dt = excel_serial(45_597.5).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 11, 1));
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_date_text_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(parse_date_text("2024-11-05").unwrap(), expected);
        assert_eq!(parse_date_text("05/11/2024").unwrap(), expected);
        assert_eq!(parse_date_text("2024-11-05T00:00:00Z").unwrap(), expected);
        assert!(parse_date_text("next tuesday").is_err());
    }

    #[test]
    fn test_cell_text_normalizes_numbers() {
        assert_eq!(cell_text(&Data::Float(12345.0)), Some("12345".to_string()));
        assert_eq!(cell_text(&Data::String("  ".into())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn test_cell_integer() {
        assert_eq!(cell_integer(&Data::Float(42.0)), Ok(Some(42)));
        assert_eq!(cell_integer(&Data::String(" 7 ".into())), Ok(Some(7)));
        assert!(cell_integer(&Data::String("abc".into())).is_err());
    }
}
