//! ClickHouse store client over the HTTP interface

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{Error, Result};

use super::{Params, Row, StoreClient};

const QUERY_SETTINGS: &[(&str, &str)] = &[
    ("output_format_json_quote_64bit_integers", "0"),
    ("date_time_output_format", "iso"),
];

const SYNC_MUTATION_SETTINGS: &[(&str, &str)] = &[("mutations_sync", "1")];

/// Connection settings for [`ClickHouseClient`]
#[derive(Debug, Clone)]
pub struct ClickHouseConfig {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub query_timeout: Duration,
    /// Block `ALTER ... UPDATE` until the mutation has been applied
    pub wait_for_mutations: bool,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            database: "default".to_string(),
            username: "default".to_string(),
            password: String::new(),
            connect_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(5),
            wait_for_mutations: false,
        }
    }
}

/// ClickHouse client
///
/// Wraps a pooled `reqwest::Client`, so one instance is shared by every
/// in-flight request.
pub struct ClickHouseClient {
    http: Client,
    endpoint: Url,
    database: String,
    username: String,
    password: String,
    query_timeout: Duration,
    wait_for_mutations: bool,
}

impl ClickHouseClient {
    pub fn connect(config: ClickHouseConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.url).map_err(|e| {
            Error::connection(format!("invalid ClickHouse url '{}': {}", config.url, e))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::connection(format!(
                "unsupported ClickHouse url scheme '{}'",
                endpoint.scheme()
            )));
        }

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::connection(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(url = %endpoint, database = %config.database, "ClickHouse client created");

        Ok(Self {
            http,
            endpoint,
            database: config.database,
            username: config.username,
            password: config.password,
            query_timeout: config.query_timeout,
            wait_for_mutations: config.wait_for_mutations,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    async fn send(
        &self,
        statement: &str,
        params: &Params,
        settings: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String> {
        let mut query = vec![("database".to_string(), self.database.clone())];
        query.extend(settings.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        query.extend(
            params
                .iter()
                .map(|(name, value)| (format!("param_{}", name), value.to_param_text())),
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .query(&query)
            .header("X-ClickHouse-User", &self.username)
            .header("X-ClickHouse-Key", &self.password)
            .timeout(timeout)
            .body(statement.to_string())
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;

        // Reading the full body hands the connection back to the pool
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(e, timeout))?;

        if !status.is_success() {
            return Err(Error::statement(format!(
                "ClickHouse returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(body)
    }
}

fn request_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout)
    } else if err.is_connect() {
        Error::unavailable(format!("ClickHouse connection failed: {}", err))
    } else {
        Error::statement(format!("ClickHouse request failed: {}", err))
    }
}

#[async_trait]
impl StoreClient for ClickHouseClient {
    fn name(&self) -> &str {
        "clickhouse"
    }

    async fn ping(&self, timeout: Duration) -> Result<()> {
        match self.send("SELECT 1", &Params::new(), &[], timeout).await {
            Ok(_) => Ok(()),
            Err(Error::Unavailable(msg)) => Err(Error::Unavailable(msg)),
            Err(Error::Timeout(after)) => Err(Error::unavailable(format!(
                "ping timed out after {:?}",
                after
            ))),
            Err(other) => Err(Error::unavailable(other.to_string())),
        }
    }

    async fn execute(&self, statement: &str, params: &Params) -> Result<()> {
        let settings: &[(&str, &str)] = if self.wait_for_mutations {
            SYNC_MUTATION_SETTINGS
        } else {
            &[]
        };

        self.send(statement, params, settings, self.query_timeout)
            .await?;
        Ok(())
    }

    async fn query(&self, statement: &str, params: &Params) -> Result<Vec<Row>> {
        let statement = format!(
            "{}\nFORMAT JSONEachRow",
            statement.trim_end().trim_end_matches(';')
        );

        let body = self
            .send(&statement, params, QUERY_SETTINGS, self.query_timeout)
            .await?;

        let mut rows = Vec::new();
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            rows.push(serde_json::from_str::<Row>(line)?);
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = ClickHouseConfig {
            url: "not a url".to_string(),
            ..ClickHouseConfig::default()
        };
        assert!(matches!(
            ClickHouseClient::connect(config),
            Err(Error::Connection(_))
        ));

        let config = ClickHouseConfig {
            url: "tcp://localhost:9000".to_string(),
            ..ClickHouseConfig::default()
        };
        assert!(matches!(
            ClickHouseClient::connect(config),
            Err(Error::Connection(_))
        ));
    }

    #[test]
    fn test_connect_does_not_touch_network() {
        let client = ClickHouseClient::connect(ClickHouseConfig::default()).unwrap();
        assert_eq!(client.name(), "clickhouse");
        assert_eq!(client.database(), "default");
    }
}
