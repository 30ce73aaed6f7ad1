//! Rows read from the remote store

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{RemoteError, SupabaseClient};

/// Selection shape for the events listing: every event with its registrations
pub const EVENTS_SELECT: &str = "
    id,
    name,
    post_image,
    description,
    event_time,
    location,
    created_at,
    registrations:registrations (id, user_id)
";

/// Primary key as returned by PostgREST (bigint or uuid)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

/// An event row with its nested registrations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: RowId,
    pub name: String,
    pub post_image: Option<String>,
    pub description: Option<String>,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RowId,
    pub user_id: Option<String>,
}

impl Event {
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Registered user ids in row order
    pub fn registered_users(&self) -> Vec<&str> {
        self.registrations
            .iter()
            .filter_map(|r| r.user_id.as_deref())
            .collect()
    }

    /// Public URL of the event image in the given storage bucket
    pub fn image_url(&self, client: &SupabaseClient, bucket: &str) -> Option<String> {
        self.post_image
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| client.storage_public_url(bucket, p))
    }
}

/// Fetch all events with their registrations
pub async fn fetch_events(client: &SupabaseClient) -> Result<Vec<Event>, RemoteError> {
    client.from("events").select(EVENTS_SELECT).execute().await
}

/// Fetch all blog rows; the shape is not fixed
pub async fn fetch_blogs(client: &SupabaseClient) -> Result<Vec<serde_json::Value>, RemoteError> {
    client.from("blogs").select("*").execute().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_event_row() {
        let json = r#"[{
            "id": 7,
            "name": "DevFest",
            "post_image": "devfest.png",
            "description": "Annual fest",
            "event_time": "2024-11-02T10:00:00+05:30",
            "location": "Pune",
            "created_at": "2024-09-01T00:00:00+00:00",
            "registrations": [
                {"id": 1, "user_id": "u-1"},
                {"id": 2, "user_id": "u-2"}
            ]
        }]"#;
        let events: Vec<Event> = serde_json::from_str(json).unwrap();
        assert_eq!(events[0].id, RowId::Int(7));
        assert_eq!(events[0].registration_count(), 2);
        assert_eq!(events[0].registered_users(), vec!["u-1", "u-2"]);
    }

    #[test]
    fn test_uuid_ids_and_missing_relation() {
        let json = r#"{"id": "9b2f", "name": "Study Jam", "post_image": null,
            "description": null, "event_time": null, "location": null, "created_at": null}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id.to_string(), "9b2f");
        assert_eq!(event.registration_count(), 0);
        assert!(event.registered_users().is_empty());
    }
}
