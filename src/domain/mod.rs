pub mod announcement;
pub mod cache;
pub mod feed;
pub mod merge;
pub mod staleness;

pub use announcement::Announcement;
pub use cache::{CacheDocument, CacheStatus, SourceMeta};
pub use feed::FeedType;
pub use merge::merge_announcements;
pub use staleness::is_stale;
