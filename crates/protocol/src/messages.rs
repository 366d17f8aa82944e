use serde::{Deserialize, Serialize};

use crate::types::{EventDetail, flex_id, flex_id_opt};

// ---------------------------------------------------------------------------
// Upload pipeline
// ---------------------------------------------------------------------------

/// Container lookup before an upload pass (`POST /getInfo`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInfoRequest {
    pub event_id: String,
}

/// Response of `POST /getInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInfoResponse {
    pub result: ContainerContents,
}

/// Items already stored in a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerContents {
    #[serde(default)]
    pub gallery: Vec<serde_json::Value>,
}

impl GetInfoResponse {
    /// Number of items currently in the container.
    pub fn item_count(&self) -> u64 {
        self.result.gallery.len() as u64
    }
}

// ---------------------------------------------------------------------------
// Gallery pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchGalleryRequest {
    #[serde(rename = "gameId")]
    pub game_id: String,
    pub search_keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryInfoRequest {
    pub game_id: String,
    pub gallery_name: String,
}

/// Creates a new gallery (`POST /createNewGallery`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGalleryRequest {
    #[serde(rename = "gameId")]
    pub game_id: String,
    #[serde(rename = "galleryName")]
    pub gallery_name: String,
    /// Whether the gallery is also published as a content post.
    #[serde(rename = "IsContent")]
    pub is_content: bool,
    /// Publish date, `YYYY/MM/DD`.
    #[serde(rename = "publicDate")]
    pub public_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGalleryResponse {
    pub result: CreatedGallery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedGallery {
    #[serde(deserialize_with = "flex_id")]
    pub gallery_id: String,
}

/// Bulk validity check of pasted items (`POST /check_item`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItemRequest {
    pub game_id: String,
    pub check_data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItemResponse {
    #[serde(default)]
    pub result_data: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Login cookie capture
// ---------------------------------------------------------------------------

/// Stores the captured login cookie. The value is opaque to the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveLoginDataRequest {
    pub datas: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveLoginDataResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadCookiesResponse {
    #[serde(default)]
    pub result: Option<String>,
}

// ---------------------------------------------------------------------------
// Event scheduling
// ---------------------------------------------------------------------------

/// Creates or updates a schedulable event (`POST /event`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEventRequest {
    #[serde(rename = "eventId", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub name: String,
    pub gallery_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_slug: Option<String>,
    #[serde(rename = "gameId")]
    pub game_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEventResponse {
    #[serde(rename = "lastedId", deserialize_with = "flex_id")]
    pub last_id: String,
}

/// Saves one event-detail date range (`POST /action`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEventDetailRequest {
    #[serde(flatten)]
    pub detail: EventDetail,
    /// Day the schedule page is showing, `YYYY/MM/DD`.
    pub date: String,
    #[serde(rename = "gameId")]
    pub game_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEventDetailResponse {
    #[serde(default, deserialize_with = "flex_id_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
}
