pub mod api;
pub mod io;
pub mod models;
pub mod normalize;

pub use api::{BackendClient, BackendConfig};
pub use io::{
    encode_image_file, format_file_detail, format_file_list, parse_records_file,
    parse_records_json, DashboardExport, RecordsError,
};
pub use models::{
    EmployeeData, ExpenseUpdate, FileRecord, FileSummary, RawCollection, StageDetails, StageEntry,
    StageObject, StagePayload,
};
pub use normalize::normalize;
