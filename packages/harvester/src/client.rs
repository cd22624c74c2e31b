//! Pontoon transport client.
//!
//! Implements the two query protocols of a Pontoon server:
//! - paginated entity search (`POST /get-entities/`) joined with one
//!   history lookup (`GET /get-history`) per entity
//! - a single GraphQL query (`GET /graphql`) listing the locales
//!
//! Both fetches are lazy iterators: a request is only sent from
//! [`Iterator::next`], so a consumer that stops early stops the traffic.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{
    default_from_date, default_to_date, entities_url, graphql_url, history_url, time_window,
    validate_base_url, validate_max_items, ALL_PLURAL_FORMS, ALL_PROJECTS, LOCALES_QUERY,
};
use crate::error::{HarvesterError, Result};
use crate::http::{create_client, decode_json, send_for_text};
use crate::types::{Entity, LocaleRecord};

/// Form body of an entities search.
#[derive(Debug, Serialize)]
struct EntitiesForm<'a> {
    locale: &'a str,
    project: &'a str,
    page: u32,
    limit: usize,
    time: &'a str,
}

/// Query string of a history lookup.
#[derive(Debug, Serialize)]
struct HistoryQuery<'a> {
    entity: u64,
    locale: &'a str,
    plural_form: i32,
}

/// One page of the entities search.
#[derive(Debug, Deserialize)]
struct EntitiesPage {
    entities: Vec<Entity>,
    #[serde(default)]
    has_next: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LocalesData {
    locales: Vec<LocaleCode>,
}

#[derive(Debug, Deserialize)]
struct LocaleCode {
    #[serde(deserialize_with = "non_empty")]
    code: String,
}

/// A locale code is the natural key of a locale record; it cannot be blank.
fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(serde::de::Error::custom("empty locale code"));
    }
    Ok(value)
}

/// Client for a single Pontoon server.
#[derive(Debug, Clone)]
pub struct PontoonClient {
    http: Client,
    base_url: String,
    max_items: usize,
}

impl PontoonClient {
    /// Create a client with the default HTTP configuration.
    ///
    /// # Arguments
    /// * `base_url` - Server address (e.g., "https://pontoon.mozilla.org")
    /// * `max_items` - Number of entities requested per page
    pub fn new(base_url: &str, max_items: usize) -> Result<Self> {
        Self::with_http_client(base_url, max_items, create_client()?)
    }

    /// Create a client on top of an existing HTTP client.
    pub fn with_http_client(base_url: &str, max_items: usize, http: Client) -> Result<Self> {
        Ok(Self {
            http,
            base_url: validate_base_url(base_url)?,
            max_items: validate_max_items(max_items)?,
        })
    }

    /// Normalized server address.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page size of the entities search.
    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Fetch the entities of a locale changed since `from_date`.
    ///
    /// Without `from_date` the whole history of the locale is fetched.
    pub fn fetch_entities(&self, locale: &str, from_date: Option<DateTime<Utc>>) -> Entities<'_> {
        let from = from_date.unwrap_or_else(default_from_date);
        self.fetch_entities_between(locale, from, default_to_date())
    }

    /// Fetch the entities of a locale changed within `[from, to]`.
    pub fn fetch_entities_between(
        &self,
        locale: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Entities<'_> {
        Entities {
            client: self,
            locale: locale.to_string(),
            time: time_window(&from, &to),
            page: 1,
            buffer: Vec::new().into_iter(),
            last_page: false,
            done: false,
        }
    }

    /// Fetch the history of all plural forms of an entity.
    pub fn history(&self, entity: u64, locale: &str) -> Result<Vec<Value>> {
        self.history_for_plural_form(entity, locale, ALL_PLURAL_FORMS)
    }

    /// Fetch the history of one plural form of an entity.
    ///
    /// The body is returned as-is; history entries are not interpreted.
    pub fn history_for_plural_form(
        &self,
        entity: u64,
        locale: &str,
        plural_form: i32,
    ) -> Result<Vec<Value>> {
        tracing::debug!(entity, locale, plural_form, "Fetching history");

        let query = HistoryQuery {
            entity,
            locale,
            plural_form,
        };
        let request = self.http.get(history_url(&self.base_url)).query(&query);
        let body = send_for_text(request).map_err(|source| HarvesterError::HistoryRequest {
            entity,
            locale: locale.to_string(),
            source,
        })?;

        decode_json(&body, &format!("history of entity {entity} ({locale})"))
    }

    /// Fetch the locales available on the server.
    ///
    /// The GraphQL query is sent on the first call to `next`.
    pub fn fetch_locales(&self) -> Locales<'_> {
        Locales {
            client: self,
            state: LocalesState::Pending,
        }
    }

    fn entities_page(&self, locale: &str, page: u32, time: &str) -> Result<EntitiesPage> {
        tracing::debug!(locale, page, time, limit = self.max_items, "Fetching entities page");

        let form = EntitiesForm {
            locale,
            project: ALL_PROJECTS,
            page,
            limit: self.max_items,
            time,
        };
        let request = self.http.post(entities_url(&self.base_url)).form(&form);
        let body = send_for_text(request).map_err(|source| HarvesterError::EntitiesRequest {
            page,
            locale: locale.to_string(),
            source,
        })?;

        decode_json(&body, &format!("entities page {page} ({locale})"))
    }

    fn locales(&self) -> Result<Vec<LocaleRecord>> {
        tracing::debug!(url = %self.base_url, "Fetching locales");

        let request = self
            .http
            .get(graphql_url(&self.base_url))
            .query(&[("query", LOCALES_QUERY)]);
        let body = send_for_text(request)
            .map_err(|source| HarvesterError::LocalesRequest { source })?;

        let response: GraphQlResponse<LocalesData> = decode_json(&body, "locales query")?;
        if !response.errors.is_empty() {
            let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(HarvesterError::GraphQl(messages.join("; ")));
        }
        let data = response
            .data
            .ok_or_else(|| HarvesterError::GraphQl("response carries no data".to_string()))?;

        Ok(data
            .locales
            .into_iter()
            .map(|locale| LocaleRecord {
                locale: locale.code,
                url: self.base_url.clone(),
            })
            .collect())
    }
}

/// Lazy iterator over the entities of one locale.
///
/// Pages are requested one at a time and each entity gets its history
/// attached right before it is yielded. The first error ends the iteration.
#[derive(Debug)]
pub struct Entities<'a> {
    client: &'a PontoonClient,
    locale: String,
    time: String,
    page: u32,
    buffer: std::vec::IntoIter<Entity>,
    last_page: bool,
    done: bool,
}

impl Entities<'_> {
    /// The `time` window sent with every page request.
    #[must_use]
    pub fn time_window(&self) -> &str {
        &self.time
    }

    fn fail(&mut self, err: HarvesterError) -> Option<Result<Entity>> {
        self.done = true;
        self.buffer = Vec::new().into_iter();
        Some(Err(err))
    }
}

impl Iterator for Entities<'_> {
    type Item = Result<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(mut entity) = self.buffer.next() {
                return match self.client.history(entity.pk, &self.locale) {
                    Ok(history) => {
                        entity.history_data = history;
                        entity.locale.clone_from(&self.locale);
                        Some(Ok(entity))
                    }
                    Err(e) => self.fail(e),
                };
            }

            if self.last_page {
                self.done = true;
                return None;
            }

            let page = match self.client.entities_page(&self.locale, self.page, &self.time) {
                Ok(page) => page,
                Err(e) => return self.fail(e),
            };

            if page.entities.is_empty() {
                tracing::debug!(page = self.page, "Empty entities page, stopping");
                self.done = true;
                return None;
            }

            self.last_page = page.has_next == Some(false);
            self.page += 1;
            self.buffer = page.entities.into_iter();
        }
    }
}

#[derive(Debug)]
enum LocalesState {
    Pending,
    Streaming(std::vec::IntoIter<LocaleRecord>),
    Done,
}

/// Lazy iterator over the locales of a server.
#[derive(Debug)]
pub struct Locales<'a> {
    client: &'a PontoonClient,
    state: LocalesState,
}

impl Iterator for Locales<'_> {
    type Item = Result<LocaleRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, LocalesState::Done) {
            LocalesState::Pending => match self.client.locales() {
                Ok(locales) => {
                    self.state = LocalesState::Streaming(locales.into_iter());
                    self.next()
                }
                Err(e) => Some(Err(e)),
            },
            LocalesState::Streaming(mut locales) => {
                let next = locales.next()?;
                self.state = LocalesState::Streaming(locales);
                Some(Ok(next))
            }
            LocalesState::Done => None,
        }
    }
}
