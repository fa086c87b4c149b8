//! Downloader for the Bing image of the day.
//! Fetches the image archive metadata, saves images that have not been seen
//! before and remembers their ids in a flat-file cache.

pub mod cache;
pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod models;
pub mod report;

pub use cache::{FlushGuard, SeenIdCache};
pub use client::{Client, ImageSource};
pub use config::Settings;
pub use downloader::{Downloader, RunSummary};
pub use error::BingError;
pub use models::{ImageRecord, MetadataResponse, ToolTips};
