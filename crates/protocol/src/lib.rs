//! Wire types for the GalleryDesk content-management API.
//!
//! Request and response bodies, endpoint paths and multipart field names.
//! The backend itself is external; these types only mirror what it sends.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{Endpoint, HttpMethod, RELATE_GALLERY_VERSION};
pub use types::{EventDetail, GallerySearchHit, Game, GameEvent, GalleryInfo, ScheduledGame};
