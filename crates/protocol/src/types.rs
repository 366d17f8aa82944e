use serde::{Deserialize, Deserializer, Serialize};

/// A schedulable event as returned by `GET /events`.
///
/// `gallery_id` is the upload container the event is linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(deserialize_with = "flex_id")]
    pub id: String,
    pub name: String,
    /// Related group name, shown in parentheses in the picker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g_name: Option<String>,
    #[serde(rename = "gameName", default)]
    pub game_name: String,
    #[serde(
        default,
        deserialize_with = "flex_id_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub gallery_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_slug: Option<String>,
    /// Default length of the event in days.
    #[serde(
        default,
        deserialize_with = "flex_i64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_day: Option<i64>,
}

/// A game as returned by `GET /listGame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(deserialize_with = "flex_id")]
    pub id: String,
    pub name: String,
}

/// One row of a gallery search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GallerySearchHit {
    pub title: String,
    #[serde(default)]
    pub href: String,
    /// Comma-separated related event names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl GallerySearchHit {
    /// Title without its trailing `- suffix` part.
    pub fn short_title(&self) -> &str {
        match self.title.rfind('-') {
            Some(idx) => self.title[..idx].trim(),
            None => &self.title,
        }
    }

    /// Related event names (from `sub`) plus the short title, filtered by `keyword`.
    pub fn matching_events(&self, keyword: &str) -> Vec<String> {
        let keyword = keyword.to_lowercase();
        self.sub
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(|item| item.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .chain(std::iter::once(self.short_title().to_string()))
            .filter(|name| name.to_lowercase().contains(&keyword))
            .collect()
    }
}

/// Details of a single gallery (`POST /get-gallery-info`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryInfo {
    #[serde(deserialize_with = "flex_id")]
    pub id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A scheduled date range of one event inside a game section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    #[serde(
        default,
        deserialize_with = "flex_id_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(
        default,
        deserialize_with = "flex_id_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default = "default_detail_type")]
    pub kind: String,
    #[serde(rename = "isDelete", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_delete: bool,
}

fn default_detail_type() -> String {
    "date".into()
}

/// A game section of the schedule page (`GET /games?date=`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    #[serde(deserialize_with = "flex_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub events: Vec<GameEvent>,
    #[serde(rename = "event-details", default)]
    pub event_details: Vec<EventDetail>,
}

// ---------------------------------------------------------------------------
// Id helpers
// ---------------------------------------------------------------------------

/// The backend is inconsistent about numeric vs string ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl FlexValue {
    fn into_id(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

pub(crate) fn flex_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    FlexValue::deserialize(d).map(FlexValue::into_id)
}

pub(crate) fn flex_id_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<FlexValue>::deserialize(d)?;
    Ok(value.map(FlexValue::into_id).filter(|s| !s.is_empty()))
}

fn flex_i64_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<FlexValue>::deserialize(d)?;
    Ok(match value {
        Some(FlexValue::Int(n)) => Some(n),
        Some(FlexValue::Float(f)) => Some(f as i64),
        Some(FlexValue::Str(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_event_accepts_numeric_ids() {
        let json = r#"{
            "id": 7,
            "name": "Spring Cup",
            "g_name": "Finals",
            "gameName": "Racing",
            "gallery_id": 1234,
            "post_slug": "spring-cup",
            "default_day": "3"
        }"#;
        let event: GameEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "7");
        assert_eq!(event.gallery_id.as_deref(), Some("1234"));
        assert_eq!(event.default_day, Some(3));
    }

    #[test]
    fn game_event_optional_fields_missing() {
        let json = r#"{"id": "e1", "name": "Weekly", "gameName": "Puzzle", "gallery_id": null}"#;
        let event: GameEvent = serde_json::from_str(json).unwrap();
        assert!(event.g_name.is_none());
        assert!(event.gallery_id.is_none());
        assert!(event.post_slug.is_none());
    }

    #[test]
    fn search_hit_short_title_cuts_last_dash() {
        let hit = GallerySearchHit {
            title: "Summer Festival - Day 1 - Gallery".into(),
            href: String::new(),
            sub: None,
        };
        assert_eq!(hit.short_title(), "Summer Festival - Day 1");

        let plain = GallerySearchHit {
            title: "NoDash".into(),
            href: String::new(),
            sub: None,
        };
        assert_eq!(plain.short_title(), "NoDash");
    }

    #[test]
    fn search_hit_matching_events() {
        let hit = GallerySearchHit {
            title: "Winter Cup - Gallery".into(),
            href: String::new(),
            sub: Some("Winter Cup Finals, Summer Cup".into()),
        };
        assert_eq!(
            hit.matching_events("winter"),
            vec!["Winter Cup Finals".to_string(), "Winter Cup".to_string()]
        );
    }

    #[test]
    fn scheduled_game_parses_event_details() {
        let json = r#"{
            "id": 3,
            "name": "Racing",
            "events": [],
            "event-details": [
                {"id": 10, "from": "2024/01/01", "to": null, "event_id": 5, "status": "ok", "type": "date"}
            ]
        }"#;
        let game: ScheduledGame = serde_json::from_str(json).unwrap();
        assert_eq!(game.event_details.len(), 1);
        assert_eq!(game.event_details[0].id.as_deref(), Some("10"));
        assert_eq!(game.event_details[0].kind, "date");
        assert!(!game.event_details[0].is_delete);
    }
}
