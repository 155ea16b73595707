pub mod upload;

pub use upload::{
    UploadRunDataCommand, UploadRunDataError, UploadRunDataResponse, ValidatedUpload,
};
