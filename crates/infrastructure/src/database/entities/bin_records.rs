use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bin_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub table_type: String, // "pending" | "compensation"
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
    pub han_thu_hoi: Option<DateTimeWithTimeZone>,
    pub ngay_phat_sinh_bin: Option<DateTimeWithTimeZone>,
    pub week_label: String,
    pub status: Option<String>, // null reads as "pending"
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
