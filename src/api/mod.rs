pub mod upload;

pub use upload::{MultipartForm, UploadedFile};
