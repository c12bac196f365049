//! Aggregates announcements (blog posts, releases, keynote updates) from
//! configured sources into a local cache.
//!
//! Each source is a list of feeds: syndication feeds, hosted release APIs
//! or arbitrary JSON endpoints. Fetched items are normalized into
//! [`domain::Announcement`]s, merged and deduplicated by link (or title),
//! and kept newest-first in a JSON cache document.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod sources;
pub mod storage;
