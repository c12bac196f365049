pub mod api;
pub mod client;
pub mod fields;
pub mod github;
pub mod normalizer;
pub mod registry;
pub mod rss;
pub mod source;
pub mod traits;
pub mod transform;

pub use registry::SourceRegistry;
pub use source::ConfiguredSource;
pub use traits::{FeedFetcher, SourceFetcher, SourceInfo};
