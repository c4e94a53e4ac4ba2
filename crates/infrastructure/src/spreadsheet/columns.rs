/// Record fields a spreadsheet column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
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
}

/// Header used by the operations team's source sheets.
const SOURCE_HEADERS: &[(Field, &str)] = &[
    (Field::HubName, "HUB_NAME"),
    (Field::HanThuHoi, "HẠN THU HỒI"),
    (Field::MaDon, "MÃ ĐƠN"),
    (Field::NgayPhatSinhBin, "NGÀY PHÁT SINH BIN"),
    (Field::BinCode, "bin_code"),
    (Field::BinType, "bin_type"),
    (Field::ReferenceCode, "reference_code"),
    (Field::ReferenceCodeOfSo, "reference_code_of_so"),
    (Field::CustName, "cust_name"),
    (Field::CustAddress, "cust_address"),
    (Field::CustWard, "cust_ward"),
    (Field::CustDistrict, "cust_district"),
    (Field::CustProvince, "cust_province"),
    (Field::EmployeeId, "employee_id"),
    (Field::EmployeeName, "employee_name"),
];

/// Exported columns, in sheet order. Internal id, status and timestamps are
/// never exported.
pub const EXPORT_COLUMNS: &[(Field, &str)] = &[
    (Field::BinCode, "BIN Code"),
    (Field::HubName, "HUB Name"),
    (Field::ReferenceCode, "Reference Code"),
    (Field::ReferenceCodeOfSo, "Reference Code OF SO"),
    (Field::CustName, "Customer Name"),
    (Field::CustAddress, "Address"),
    (Field::CustWard, "Ward"),
    (Field::CustDistrict, "District"),
    (Field::CustProvince, "Province"),
    (Field::EmployeeId, "Employee ID"),
    (Field::EmployeeName, "Employee Name"),
];

impl Field {
    /// Resolve a header cell. Source headers and export labels are both
    /// accepted so an exported file can be imported again.
    pub fn from_header(header: &str) -> Option<Field> {
        let wanted = header.trim().to_lowercase();
        SOURCE_HEADERS
            .iter()
            .chain(EXPORT_COLUMNS.iter())
            .find(|(_, name)| name.to_lowercase() == wanted)
            .map(|(field, _)| *field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_headers_resolve() {
        assert_eq!(Field::from_header("HUB_NAME"), Some(Field::HubName));
        assert_eq!(Field::from_header(" bin_code "), Some(Field::BinCode));
        assert_eq!(Field::from_header("HẠN THU HỒI"), Some(Field::HanThuHoi));
    }

    #[test]
    fn test_export_labels_resolve() {
        assert_eq!(Field::from_header("BIN Code"), Some(Field::BinCode));
        assert_eq!(Field::from_header("reference code of so"), Some(Field::ReferenceCodeOfSo));
        assert_eq!(Field::from_header("Reference Code"), Some(Field::ReferenceCode));
    }

    #[test]
    fn test_unknown_header() {
        assert_eq!(Field::from_header("notes"), None);
    }
}
