use serde::{Deserialize, Serialize};

/// Value of the `relate` multipart field on every chunk upload.
pub const RELATE_GALLERY_VERSION: &str = "gallery_version";

/// Date format the backend expects for schedule and publish dates.
pub const SCHEDULE_DATE_FORMAT: &str = "%Y/%m/%d";

/// Multipart field names of a chunk upload (`POST /upload`).
pub mod fields {
    pub const CHUNK_NUMBER: &str = "flowChunkNumber";
    pub const CHUNK_SIZE: &str = "flowChunkSize";
    pub const CURRENT_CHUNK_SIZE: &str = "flowCurrentChunkSize";
    pub const TOTAL_SIZE: &str = "flowTotalSize";
    pub const IDENTIFIER: &str = "flowIdentifier";
    pub const FILENAME: &str = "flowFilename";
    pub const RELATIVE_PATH: &str = "flowRelativePath";
    pub const TOTAL_CHUNKS: &str = "flowTotalChunks";
    pub const RELATE: &str = "relate";
    pub const CONTAINER_ID: &str = "id";
    pub const ORDER_INDEX: &str = "order_index";
    pub const FILE: &str = "file";
    pub const CUSTOM_FILENAME: &str = "customFilename";
    pub const IS_LAST_CHUNK: &str = "isLastChunk";
}

/// HTTP verb used by an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// REST endpoint consumed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    // Upload pipeline
    Events,
    GetInfo,
    Upload,

    // Gallery pages
    ListGames,
    SearchGallery,
    GalleryInfo,
    CreateGallery,
    CheckItem,

    // Login cookie capture
    SaveLoginData,
    ReadCookies,

    // Event scheduling
    Games,
    SaveEvent,
    SaveEventDetail,
}

impl Endpoint {
    /// Path relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Events => "/events",
            Self::GetInfo => "/getInfo",
            Self::Upload => "/upload",
            Self::ListGames => "/listGame",
            Self::SearchGallery => "/search-gallery",
            Self::GalleryInfo => "/get-gallery-info",
            Self::CreateGallery => "/createNewGallery",
            Self::CheckItem => "/check_item",
            Self::SaveLoginData => "/saveLoginData",
            Self::ReadCookies => "/readDataCookies",
            Self::Games => "/games",
            Self::SaveEvent => "/event",
            Self::SaveEventDetail => "/action",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Self::Events | Self::ListGames | Self::ReadCookies | Self::Games => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}
