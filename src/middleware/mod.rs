pub mod response;
pub mod validate;

pub use response::{ApiResponse, ApiResult, Message};
pub use validate::{FieldErrors, PathId, ValidJson, ValidQuery, Validate};
