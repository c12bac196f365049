pub mod json_file;
pub mod traits;

pub use json_file::JsonFileStore;
pub use traits::CacheStore;
