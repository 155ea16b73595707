pub mod get_run;
pub mod list_records;

pub use get_run::{GetRunError, GetRunQuery};
pub use list_records::{ListRunRecordsError, ListRunRecordsQuery};
