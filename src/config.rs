/// Default subdomain for the ela.city GraphQL API.
pub const DEFAULT_GRAPHQL_SUBDOMAIN: &str = "staging";
/// Default subdomain for the Lit relayer.
pub const DEFAULT_RELAYER_SUBDOMAIN: &str = "datil-test";
/// Addresses fetched per page and sent per relayer request.
pub const DEFAULT_BATCH_SIZE: u64 = 50;
/// Seconds to pause between chunk iterations.
pub const DEFAULT_DELAY_SECONDS: f64 = 1.0;
/// Per-request timeout applied to every HTTP call.
pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

const GRAPHQL_APEX_HOST: &str = "ela.city";
const RELAYER_HOST: &str = "getlit.dev";

/// Everything one run needs, assembled from the CLI and passed into the driver.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: String,
    pub payer_secret_key: String,
    pub batch_size: u64,
    pub delay_seconds: f64,
    pub graphql_subdomain: String,
    pub relayer_subdomain: String,
}

impl RunConfig {
    /// GraphQL endpoint URL; an empty subdomain means the apex host.
    pub fn graphql_url(&self) -> String {
        format!("{}/api/2.0/graphql", self.graphql_origin())
    }

    /// Origin header value for GraphQL requests, derived like the URL host.
    pub fn graphql_origin(&self) -> String {
        if self.graphql_subdomain.is_empty() {
            format!("https://{GRAPHQL_APEX_HOST}")
        } else {
            format!("https://{}.{GRAPHQL_APEX_HOST}", self.graphql_subdomain)
        }
    }

    /// Relayer add-users endpoint URL.
    pub fn relayer_url(&self) -> String {
        format!(
            "https://{}-relayer.{RELAYER_HOST}/add-users",
            self.relayer_subdomain
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(graphql_subdomain: &str, relayer_subdomain: &str) -> RunConfig {
        RunConfig {
            api_key: "key".into(),
            payer_secret_key: "secret".into(),
            batch_size: DEFAULT_BATCH_SIZE,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            graphql_subdomain: graphql_subdomain.into(),
            relayer_subdomain: relayer_subdomain.into(),
        }
    }

    #[test]
    fn graphql_url_uses_subdomain() {
        let config = config_with("staging", "datil-test");
        assert_eq!(
            config.graphql_url(),
            "https://staging.ela.city/api/2.0/graphql"
        );
        assert_eq!(config.graphql_origin(), "https://staging.ela.city");
    }

    #[test]
    fn empty_graphql_subdomain_falls_back_to_apex() {
        let config = config_with("", "datil-test");
        assert_eq!(config.graphql_url(), "https://ela.city/api/2.0/graphql");
        assert_eq!(config.graphql_origin(), "https://ela.city");
    }

    #[test]
    fn relayer_url_prefixes_subdomain() {
        let config = config_with("staging", "datil-prod");
        assert_eq!(
            config.relayer_url(),
            "https://datil-prod-relayer.getlit.dev/add-users"
        );
    }
}
