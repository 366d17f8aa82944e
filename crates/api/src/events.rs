//! Event picker helpers: labels, filtering and admin-site links.

use gallerydesk_protocol::GameEvent;

/// One row of the event picker.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOption {
    pub event: GameEvent,
    pub label: String,
}

impl From<GameEvent> for EventOption {
    fn from(event: GameEvent) -> Self {
        let label = event_label(&event);
        Self { event, label }
    }
}

impl EventOption {
    /// The upload container linked to this event, if any.
    pub fn container_id(&self) -> Option<&str> {
        self.event.gallery_id.as_deref()
    }

    /// Case-insensitive match on the linked container id or the label.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.container_id()
            .is_some_and(|id| id.to_lowercase().contains(&query))
            || self.label.to_lowercase().contains(&query)
    }
}

/// `"{name} ( {group} ) - {game}"`, or `"{name} - {game}"` without a group.
pub fn event_label(event: &GameEvent) -> String {
    match event.g_name.as_deref().filter(|g| !g.is_empty()) {
        Some(group) => format!("{} ( {} ) - {}", event.name, group, event.game_name),
        None => format!("{} - {}", event.name, event.game_name),
    }
}

pub fn filter_events<'a>(options: &'a [EventOption], query: &str) -> Vec<&'a EventOption> {
    options.iter().filter(|o| o.matches(query)).collect()
}

/// Builds links into the public site and its admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLinks {
    base: String,
}

impl SiteLinks {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Admin page for editing a gallery.
    pub fn edit_url(&self, gallery_id: &str) -> String {
        format!(
            "{}/admin/cms/blog/?page=8&gallery-edit-instance={gallery_id}",
            self.base
        )
    }

    /// Public page of a published gallery.
    pub fn view_url(&self, post_slug: &str) -> String {
        format!("{}/library/gallery/{post_slug}", self.base)
    }

    /// Edit and view links of an event; each is present only when the event
    /// carries the needed id or slug.
    pub fn event_links(&self, event: &GameEvent) -> (Option<String>, Option<String>) {
        (
            event.gallery_id.as_deref().map(|id| self.edit_url(id)),
            event
                .post_slug
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| self.view_url(s)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, group: Option<&str>, gallery: Option<&str>) -> GameEvent {
        GameEvent {
            id: "1".into(),
            name: name.into(),
            g_name: group.map(Into::into),
            game_name: "Racing".into(),
            gallery_id: gallery.map(Into::into),
            post_slug: None,
            default_day: None,
        }
    }

    #[test]
    fn label_with_and_without_group() {
        assert_eq!(
            event_label(&event("Cup", Some("Finals"), None)),
            "Cup ( Finals ) - Racing"
        );
        assert_eq!(event_label(&event("Cup", None, None)), "Cup - Racing");
        assert_eq!(event_label(&event("Cup", Some(""), None)), "Cup - Racing");
    }

    #[test]
    fn filter_matches_label_or_container() {
        let options: Vec<EventOption> = vec![
            event("Spring Cup", None, Some("4410")).into(),
            event("Autumn Open", Some("Qualifiers"), Some("9000")).into(),
            event("Winter", None, None).into(),
        ];

        let by_label = filter_events(&options, "QUALI");
        assert_eq!(by_label.len(), 1);
        assert_eq!(by_label[0].event.name, "Autumn Open");

        let by_id = filter_events(&options, "441");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].container_id(), Some("4410"));

        assert_eq!(filter_events(&options, "racing").len(), 3);
    }

    #[test]
    fn site_links() {
        let links = SiteLinks::new("https://example.com/");
        assert_eq!(
            links.edit_url("812"),
            "https://example.com/admin/cms/blog/?page=8&gallery-edit-instance=812"
        );
        assert_eq!(
            links.view_url("spring-cup"),
            "https://example.com/library/gallery/spring-cup"
        );

        let mut e = event("Cup", None, Some("5"));
        e.post_slug = Some("cup".into());
        let (edit, view) = links.event_links(&e);
        assert!(edit.unwrap().ends_with("gallery-edit-instance=5"));
        assert_eq!(view.as_deref(), Some("https://example.com/library/gallery/cup"));

        let (edit, view) = links.event_links(&event("Bare", None, None));
        assert!(edit.is_none() && view.is_none());
    }
}
