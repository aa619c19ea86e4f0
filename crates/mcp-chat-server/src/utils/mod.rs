pub mod error;
pub mod logger;
pub mod timestamp;

pub use error::{ApiError, LlmError, StoreError};
pub use timestamp::local_iso_timestamp;
