//! Async client for the GalleryDesk content-management API.
//!
//! Besides the HTTP client this crate holds the small pieces of logic the
//! console pages need around it: event picker labels and links, check-item
//! text preparation and schedule date helpers.

pub mod checks;
pub mod client;
pub mod events;
pub mod schedule;

pub use checks::merge_check_lines;
pub use client::{Client, DEFAULT_TIMEOUT, Error};
pub use events::{EventOption, SiteLinks, event_label, filter_events};
pub use schedule::{DateOffset, detail_end_date, format_date, parse_date};
