pub mod fetch_service;

pub use fetch_service::{
    BatchResult, FailedSource, FetchService, FetchedSource, Progress, DEFAULT_REQUEST_DELAY,
};
