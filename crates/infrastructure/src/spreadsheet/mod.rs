mod columns;
mod xlsx_codec;

pub use columns::{Field, EXPORT_COLUMNS};
pub use xlsx_codec::XlsxCodec;
