//! Supabase REST client with a fluent query builder

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::RemoteError;
use crate::config::SupabaseConfig;
use crate::helpers::{encode_path, join_url};

/// Authenticated handle to a Supabase project.
///
/// Cheap to clone; handlers receive it through shared state rather than a
/// process-wide singleton.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, RemoteError> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let base_url = non_empty(&config.url).ok_or(RemoteError::MissingConfig("url"))?;
        let anon_key = non_empty(&config.anon_key).ok_or(RemoteError::MissingConfig("anon key"))?;

        let header = |value: &str| {
            HeaderValue::from_str(value).map_err(|e| RemoteError::InvalidHeader(e.to_string()))
        };
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header(&anon_key)?);
        headers.insert(AUTHORIZATION, header(&format!("Bearer {}", anon_key))?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("gdg-site/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a query against `table`
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        join_url(&self.base_url, &format!("rest/v1/{}", encode_path(table)))
    }

    /// Public URL of an object in a public storage bucket
    pub fn storage_public_url(&self, bucket: &str, object: &str) -> String {
        join_url(
            &self.base_url,
            &format!(
                "storage/v1/object/public/{}/{}",
                encode_path(bucket),
                encode_path(object)
            ),
        )
    }
}

/// A read query under construction
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    client: &'a SupabaseClient,
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
}

impl<'a> QueryBuilder<'a> {
    /// Columns to return, including nested relations such as
    /// `id, registrations (id, user_id)`
    pub fn select(mut self, columns: &str) -> Self {
        self.select = compact_columns(columns);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lte", value)
    }

    fn filter(mut self, column: &str, op: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value.to_string())));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Query-string pairs in the order PostgREST receives them
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select.clone())];
        pairs.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Run the query: one round trip, no retry
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, RemoteError> {
        let url = self.client.rest_url(&self.table);
        tracing::debug!(table = %self.table, select = %self.select, "Querying Supabase");

        let response = self
            .client
            .http
            .get(&url)
            .query(&self.query_pairs())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = RemoteError::from_response(status.as_u16(), &body);
            tracing::warn!(table = %self.table, error = %err, "Supabase query failed");
            return Err(err);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Strip whitespace outside double quotes, as PostgREST expects
fn compact_columns(columns: &str) -> String {
    let mut quoted = false;
    columns
        .chars()
        .filter(|&c| {
            if c == '"' {
                quoted = !quoted;
            }
            quoted || !c.is_whitespace()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: Some("https://abc.supabase.co/".to_string()),
            anon_key: Some("anon".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_config() {
        let err = SupabaseClient::new(&SupabaseConfig::default()).unwrap_err();
        assert!(matches!(err, RemoteError::MissingConfig("url")));
    }

    #[test]
    fn test_query_pairs() {
        let client = client();
        let query = client
            .from("events")
            .select("id, name,\n registrations:registrations (id, user_id)")
            .eq("location", "Pune")
            .gte("event_time", "2024-01-01")
            .order("event_time", false)
            .limit(5);

        assert_eq!(
            query.query_pairs(),
            vec![
                (
                    "select".to_string(),
                    "id,name,registrations:registrations(id,user_id)".to_string()
                ),
                ("location".to_string(), "eq.Pune".to_string()),
                ("event_time".to_string(), "gte.2024-01-01".to_string()),
                ("order".to_string(), "event_time.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_compact_columns_keeps_quoted_spaces() {
        assert_eq!(compact_columns(r#"id, "full name""#), r#"id,"full name""#);
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(client.base_url(), "https://abc.supabase.co");
        assert_eq!(
            client.rest_url("events"),
            "https://abc.supabase.co/rest/v1/events"
        );
        assert_eq!(
            client.storage_public_url("events", "devfest 2024.png"),
            "https://abc.supabase.co/storage/v1/object/public/events/devfest%202024.png"
        );
    }
}
