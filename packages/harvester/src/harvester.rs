//! Main harvester service that ties all components together.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;

use crate::client::PontoonClient;
use crate::config::{BACKEND_NAME, DEFAULT_MAX_ITEMS};
use crate::error::{HarvesterError, Result};
use crate::identity::uuid;
use crate::types::{Category, Envelope, Item, SearchFields};

/// Lazy stream of envelopes returned by [`Pontoon::fetch`].
pub type Items<'a> = Box<dyn Iterator<Item = Result<Envelope>> + 'a>;

/// Categories a Pontoon harvester can fetch.
const CATEGORIES: &[Category] = &[Category::Entity, Category::Locale];

/// Harvester for a Pontoon server.
///
/// Fetches the entities of one locale (with their history) or the locales
/// of the server, and wraps every record in an [`Envelope`].
///
/// # Example
/// ```
/// use pontoon_harvester::Pontoon;
///
/// let pontoon = Pontoon::builder("https://pontoon.example.com")
///     .locale("es")
///     .build()
///     .unwrap();
/// assert_eq!(pontoon.origin(), "https://pontoon.example.com/es");
/// assert_eq!(pontoon.tag(), pontoon.origin());
/// ```
#[derive(Debug, Clone)]
pub struct Pontoon {
    client: PontoonClient,
    locale: Option<String>,
    origin: String,
    tag: String,
    from_date: Option<DateTime<Utc>>,
}

/// Builder for [`Pontoon`].
#[derive(Debug)]
pub struct PontoonBuilder {
    uri: String,
    locale: Option<String>,
    tag: Option<String>,
    max_items: usize,
    from_date: Option<DateTime<Utc>>,
    http_client: Option<Client>,
}

impl PontoonBuilder {
    /// Locale whose entities are fetched.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Grouping label. Empty labels fall back to the origin.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Number of entities requested per page.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Resume checkpoint used when `fetch` gets no explicit `from_date`.
    pub fn from_date(mut self, from_date: DateTime<Utc>) -> Self {
        self.from_date = Some(from_date);
        self
    }

    /// HTTP client to send requests with.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Validate the configuration and build the harvester.
    pub fn build(self) -> Result<Pontoon> {
        let client = match self.http_client {
            Some(http) => PontoonClient::with_http_client(&self.uri, self.max_items, http)?,
            None => PontoonClient::new(&self.uri, self.max_items)?,
        };

        let locale = self.locale.filter(|l| !l.is_empty());
        let origin = match &locale {
            Some(locale) => format!("{}/{locale}", client.base_url()),
            None => client.base_url().to_string(),
        };
        let tag = self
            .tag
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| origin.clone());

        Ok(Pontoon {
            client,
            locale,
            origin,
            tag,
            from_date: self.from_date,
        })
    }
}

impl Pontoon {
    /// Start configuring a harvester for the server at `uri`.
    pub fn builder(uri: impl Into<String>) -> PontoonBuilder {
        PontoonBuilder {
            uri: uri.into(),
            locale: None,
            tag: None,
            max_items: DEFAULT_MAX_ITEMS,
            from_date: None,
            http_client: None,
        }
    }

    /// Harvester for the entities of `locale` with default settings.
    pub fn new(uri: &str, locale: &str) -> Result<Self> {
        Self::builder(uri).locale(locale).build()
    }

    /// Normalized server address.
    #[must_use]
    pub fn uri(&self) -> &str {
        self.client.base_url()
    }

    /// Configured locale, if any.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Server address, plus `/locale` when a locale is configured.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        self.client.max_items()
    }

    /// Configured resume checkpoint.
    #[must_use]
    pub fn from_date(&self) -> Option<DateTime<Utc>> {
        self.from_date
    }

    /// Underlying transport client.
    #[must_use]
    pub fn client(&self) -> &PontoonClient {
        &self.client
    }

    /// Supported categories.
    #[must_use]
    pub fn categories() -> &'static [Category] {
        CATEGORIES
    }

    /// Raw responses are never stored for offline replay.
    #[must_use]
    pub fn has_archiving() -> bool {
        false
    }

    /// Entity fetches can resume from a `from_date`.
    #[must_use]
    pub fn has_resuming() -> bool {
        true
    }

    /// Natural key of a raw record, as stored in `search_fields.item_id`.
    #[must_use]
    pub fn metadata_id(item: &Item) -> String {
        item.item_id()
    }

    #[must_use]
    pub fn metadata_category(item: &Item) -> Category {
        item.category()
    }

    /// Fetch the entities of the configured locale from the checkpoint on.
    pub fn fetch_default(&self) -> Result<Items<'_>> {
        self.fetch(Category::Entity, None)
    }

    /// Fetch the records of `category`.
    ///
    /// For entities the time window starts at `from_date`, else at the
    /// configured checkpoint, else at the beginning of time. `from_date`
    /// is ignored for locales.
    ///
    /// # Errors
    /// Returns [`HarvesterError::MissingLocale`] when entities are requested
    /// from a harvester built without a locale. Transport and decoding errors
    /// are yielded by the returned iterator.
    pub fn fetch(&self, category: Category, from_date: Option<DateTime<Utc>>) -> Result<Items<'_>> {
        match category {
            Category::Entity => self.fetch_entities(from_date),
            Category::Locale => Ok(self.fetch_locales()),
        }
    }

    fn fetch_entities(&self, from_date: Option<DateTime<Utc>>) -> Result<Items<'_>> {
        let locale = self.locale.as_deref().ok_or(HarvesterError::MissingLocale)?;
        let from_date = from_date.or(self.from_date);
        let origin = format!("{}/{locale}", self.uri());

        tracing::info!(
            origin = %origin,
            from_date = ?from_date,
            max_items = self.max_items(),
            "Fetching entities"
        );

        let entities = self.client.fetch_entities(locale, from_date);
        Ok(Box::new(entities.map(move |entity| {
            entity.and_then(|entity| self.envelope(&origin, Item::Entity(entity)))
        })))
    }

    fn fetch_locales(&self) -> Items<'_> {
        tracing::info!(origin = %self.uri(), "Fetching locales");

        let locales = self.client.fetch_locales();
        Box::new(locales.map(move |locale| {
            locale.and_then(|locale| self.envelope(self.uri(), Item::Locale(locale)))
        }))
    }

    fn envelope(&self, origin: &str, item: Item) -> Result<Envelope> {
        let item_id = Self::metadata_id(&item);
        let uuid = uuid(&[origin, &item_id])?;

        Ok(Envelope {
            backend_name: BACKEND_NAME.to_string(),
            backend_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: extraction_timestamp(),
            origin: origin.to_string(),
            uuid,
            category: Self::metadata_category(&item),
            search_fields: SearchFields { item_id },
            tag: self.tag.clone(),
            data: item,
        })
    }
}

/// Current time as fractional UNIX seconds.
fn extraction_timestamp() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}
