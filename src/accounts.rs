use crate::config::{RunConfig, REQUEST_TIMEOUT_SECONDS};
use crate::error::{Result, SyncError};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// GraphQL document sent for every page request.
const FETCH_ACCOUNTS_QUERY: &str = r#"
query FetchAccount($query: AccountQueryInput, $filters: FilterPaginationInput) {
  accounts: fetchAccounts(query: $query, filters: $filters) {
    total
    offset
    data {
      address
    }
  }
}
"#;

/// Wire form of one page request.
#[derive(Debug, Serialize)]
struct PageRequest<'a> {
    query: &'a str,
    variables: PageVariables,
}

#[derive(Debug, Serialize)]
struct PageVariables {
    query: AccountQuery,
    filters: PageFilters,
}

/// Serializes to `{}`; the endpoint expects an empty query object for an
/// unfiltered fetch.
#[derive(Debug, Serialize)]
struct AccountQuery {}

#[derive(Debug, Serialize)]
struct PageFilters {
    offset: u64,
    limit: u64,
}

impl PageRequest<'_> {
    fn new(offset: u64, limit: u64) -> Self {
        PageRequest {
            query: FETCH_ACCOUNTS_QUERY,
            variables: PageVariables {
                query: AccountQuery {},
                filters: PageFilters { offset, limit },
            },
        }
    }
}

/// One page of account records as returned by a single query call.
///
/// `total` is authoritative across all pages of a run; the remote is assumed
/// not to mutate the account set while pagination is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPage {
    pub total: u64,
    pub offset: u64,
    pub addresses: Vec<String>,
}

/// A source of paginated account pages.
#[async_trait::async_trait]
pub trait AccountSource: Send + Sync {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<AccountPage>;
}

/// Fetches account pages from the ela.city GraphQL endpoint.
pub struct GraphqlAccountSource {
    client: reqwest::Client,
    url: String,
    origin: String,
}

impl GraphqlAccountSource {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            url: config.graphql_url(),
            origin: config.graphql_origin(),
        })
    }
}

#[async_trait::async_trait]
impl AccountSource for GraphqlAccountSource {
    #[instrument(skip(self))]
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<AccountPage> {
        let payload = PageRequest::new(offset, limit);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("Origin", &self.origin)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Transport(format!(
                "HTTP {} {} from {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
                self.url
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            SyncError::MalformedResponse(format!("GraphQL response was not valid JSON: {e}"))
        })?;

        debug!(offset, limit, "fetched account page");
        Ok(parse_account_page(&body, offset))
    }
}

/// Pulls the account page out of a GraphQL response body.
///
/// Absent or oddly shaped nested fields yield fewer or zero addresses rather
/// than an error; a warning names the offset so a silently-empty page is
/// still visible in the logs. Address order follows the response order.
pub fn parse_account_page(body: &Value, requested_offset: u64) -> AccountPage {
    let accounts = &body["data"]["accounts"];
    if accounts.is_null() {
        warn!(
            offset = requested_offset,
            "response has no data.accounts; treating page as empty"
        );
    }

    let total = accounts["total"].as_u64().unwrap_or(0);
    let offset = accounts["offset"].as_u64().unwrap_or(requested_offset);

    let mut addresses = Vec::new();
    match accounts["data"].as_array() {
        Some(entries) => {
            for entry in entries {
                match entry["address"].as_str() {
                    Some(address) if !address.is_empty() => addresses.push(address.to_string()),
                    _ => debug!(offset = requested_offset, "account entry without a usable address"),
                }
            }
        }
        None if !accounts.is_null() => {
            warn!(
                offset = requested_offset,
                "data.accounts.data is not an array; treating page as empty"
            );
        }
        None => {}
    }

    AccountPage {
        total,
        offset,
        addresses,
    }
}
