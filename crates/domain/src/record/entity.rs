use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BinStatus, TableType, WeekLabel};

/// A BIN row as it arrives from a spreadsheet, before the store assigns
/// identity, status and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBinRecord {
    pub bin_code: String,
    pub bin_type: Option<String>,
    pub hub_name: Option<String>,
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
    pub cust_name: Option<String>,
    pub cust_address: Option<String>,
    pub cust_ward: Option<String>,
    pub cust_district: Option<String>,
    pub cust_province: Option<String>,
    pub ma_don: Option<String>,
    pub reference_code: Option<String>,
    pub reference_code_of_so: Option<String>,
    /// Recovery deadline
    pub han_thu_hoi: Option<DateTime<Utc>>,
    /// When the BIN was raised
    pub ngay_phat_sinh_bin: Option<DateTime<Utc>>,
    pub week_label: WeekLabel,
}

impl NewBinRecord {
    /// A record with only the natural key and batch label set.
    pub fn new(bin_code: impl Into<String>, week_label: WeekLabel) -> Self {
        Self {
            bin_code: bin_code.into(),
            bin_type: None,
            hub_name: None,
            employee_id: None,
            employee_name: None,
            cust_name: None,
            cust_address: None,
            cust_ward: None,
            cust_district: None,
            cust_province: None,
            ma_don: None,
            reference_code: None,
            reference_code_of_so: None,
            han_thu_hoi: None,
            ngay_phat_sinh_bin: None,
            week_label,
        }
    }

    pub fn with_hub(mut self, hub_name: impl Into<String>) -> Self {
        self.hub_name = Some(hub_name.into());
        self
    }

    pub fn with_employee(mut self, employee_name: impl Into<String>) -> Self {
        self.employee_name = Some(employee_name.into());
        self
    }

    pub fn with_customer(mut self, cust_name: impl Into<String>) -> Self {
        self.cust_name = Some(cust_name.into());
        self
    }

    pub fn with_reference_of_so(mut self, reference: impl Into<String>) -> Self {
        self.reference_code_of_so = Some(reference.into());
        self
    }

    /// Materialize the row the way a store does on insert.
    pub fn into_record(
        self,
        id: String,
        table_type: TableType,
        created_at: DateTime<Utc>,
    ) -> BinRecord {
        BinRecord {
            id,
            table_type,
            bin_code: self.bin_code,
            bin_type: self.bin_type,
            hub_name: self.hub_name,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            cust_name: self.cust_name,
            cust_address: self.cust_address,
            cust_ward: self.cust_ward,
            cust_district: self.cust_district,
            cust_province: self.cust_province,
            ma_don: self.ma_don,
            reference_code: self.reference_code,
            reference_code_of_so: self.reference_code_of_so,
            han_thu_hoi: self.han_thu_hoi,
            ngay_phat_sinh_bin: self.ngay_phat_sinh_bin,
            week_label: self.week_label,
            status: None,
            created_at,
        }
    }
}

/// One physical BIN unit as stored.
///
/// `id` and `created_at` are assigned by the store and never change. `status`
/// only changes through an explicit status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    pub id: String,
    pub table_type: TableType,
    pub bin_code: String,
    pub bin_type: Option<String>,
    pub hub_name: Option<String>,
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
    pub cust_name: Option<String>,
    pub cust_address: Option<String>,
    pub cust_ward: Option<String>,
    pub cust_district: Option<String>,
    pub cust_province: Option<String>,
    pub ma_don: Option<String>,
    pub reference_code: Option<String>,
    pub reference_code_of_so: Option<String>,
    pub han_thu_hoi: Option<DateTime<Utc>>,
    pub ngay_phat_sinh_bin: Option<DateTime<Utc>>,
    pub week_label: WeekLabel,
    pub status: Option<BinStatus>,
    pub created_at: DateTime<Utc>,
}

impl BinRecord {
    pub fn effective_status(&self) -> BinStatus {
        BinStatus::or_pending(self.status)
    }
}
