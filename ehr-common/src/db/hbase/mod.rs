//! HBase REST gateway ("Stargate") implementation of the cell store client.
//!
//! All row keys, column identifiers and values travel base64 encoded in the
//! JSON `CellSet` representation:
//!
//! ```json
//! {"Row":[{"key":"<b64 key>","Cell":[{"column":"<b64 fam:qual>","$":"<b64 value>"}]}]}
//! ```
//!
//! Row keys are also used, encoded, as the path segment of row requests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Response, StatusCode};
use serde_json::json;
use url::Url;

use crate::codec;
use crate::db::{
    cell::Cell,
    client::{CellStoreClient, TableStatus},
    error::{StoreError, StoreResult},
    row::{CellSet, Row},
    StoreSettings,
};
use crate::schema::TableSchema;

const JSON: &str = "application/json";

/// Wrapper for the HBase REST connection
#[derive(Clone)]
pub struct HBaseClientImpl {
    base_url: Url,
    timeout: Duration,
    health_timeout: Duration,
    http: reqwest::Client,
}

impl HBaseClientImpl {
    pub fn new(settings: &StoreSettings, http: reqwest::Client) -> StoreResult<Self> {
        let base_url =
            Url::parse(&settings.url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(settings.url.clone()));
        }
        debug!("📊 HBase REST url: {}", base_url);
        Ok(Self {
            base_url,
            timeout: settings.timeout,
            health_timeout: settings.health_timeout,
            http,
        })
    }

    /// Build a request URL from raw path segments. Each segment is percent
    /// encoded, so base64 keys containing `/` stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Return the response if it carries a success status, otherwise the
    /// store's status and body as a [StoreError::Status].
    async fn check_status(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or_default().to_owned()
            } else {
                message
            },
        })
    }

    async fn read_cell_set(&self, url: Url) -> StoreResult<Option<CellSet>> {
        trace!("📊 GET {}", url);
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, JSON)
            .timeout(self.timeout)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Some(CellSet::default()));
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| StoreError::Deserialize(e.to_string()))
    }
}

#[async_trait]
impl CellStoreClient for HBaseClientImpl {
    async fn put_row(&self, table: &str, row_key: &str, cells: Vec<Cell>) -> StoreResult<()> {
        let row = Row::from_cells(row_key, &cells);
        let url = self.endpoint(&[table, row.key.as_str()])?;
        trace!("📊 PUT {}", url; "cells" => cells.len());
        let response = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, JSON)
            .json(&CellSet::from(row))
            .timeout(self.timeout)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn get_row(&self, table: &str, row_key: &str) -> StoreResult<Option<Row>> {
        let key = codec::encode(row_key);
        let url = self.endpoint(&[table, key.as_str()])?;
        Ok(self
            .read_cell_set(url)
            .await?
            .and_then(|set| set.rows.into_iter().next()))
    }

    async fn scan_table(&self, table: &str) -> StoreResult<Vec<Row>> {
        let url = self.endpoint(&[table, "*"])?;
        Ok(self
            .read_cell_set(url)
            .await?
            .map(|set| set.rows)
            .unwrap_or_default())
    }

    async fn create_table(&self, schema: &TableSchema) -> StoreResult<TableStatus> {
        let url = self.endpoint(&[schema.name, "schema"])?;
        let body = json!({
            "name": schema.name,
            "ColumnSchema": schema
                .families
                .iter()
                .map(|family| json!({ "name": family }))
                .collect::<Vec<_>>(),
        });
        let response = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, JSON)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(TableStatus::Exists);
        }
        Self::check_status(response).await?;
        Ok(TableStatus::Created)
    }

    async fn cluster_version(&self) -> StoreResult<serde_json::Value> {
        let url = self.endpoint(&["version", "cluster"])?;
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, JSON)
            .timeout(self.health_timeout)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        // Some gateway versions answer with a bare version string.
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }

    fn box_clone(&self) -> Box<dyn CellStoreClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::schema::PATIENT_DEMOGRAPHICS;

    fn make_client() -> HBaseClientImpl {
        HBaseClientImpl::new(
            &StoreSettings {
                url: mockito::server_url(),
                ..Default::default()
            },
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = HBaseClientImpl::new(
            &StoreSettings {
                url: "http://hbase-rest:8080/".to_owned(),
                ..Default::default()
            },
            reqwest::Client::new(),
        )
        .unwrap();
        let url = client.endpoint(&["prescriptions", "a/b+c="]).unwrap();
        assert_eq!(url.as_str(), "http://hbase-rest:8080/prescriptions/a%2Fb+c=");
        let url = client.endpoint(&["medical_history", "*"]).unwrap();
        assert_eq!(url.as_str(), "http://hbase-rest:8080/medical_history/*");
    }

    #[test]
    fn rejects_bad_url() {
        let result = HBaseClientImpl::new(
            &StoreSettings {
                url: "not a url".to_owned(),
                ..Default::default()
            },
            reqwest::Client::new(),
        );
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn put_row_sends_cell_set() {
        let client = make_client();
        let mock = mockito::mock("PUT", "/patient_demographics/UEFUXzAwMQ==")
            .match_header("Content-Type", "application/json")
            .match_body(Matcher::Json(json!({
                "Row": [{
                    "key": "UEFUXzAwMQ==",
                    "Cell": [{
                        "column": codec::encode("personal_info:first_name"),
                        "$": codec::encode("John"),
                    }]
                }]
            })))
            .with_status(200)
            .create();

        client
            .put_row(
                "patient_demographics",
                "PAT_001",
                vec![Cell::new("personal_info", "first_name", "John")],
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn put_row_passes_store_message() {
        let client = make_client();
        let _mock = mockito::mock("PUT", "/prescriptions/UEFUXzAwOV8x")
            .with_status(500)
            .with_body("org.apache.hadoop.hbase.TableNotFoundException: prescriptions")
            .create();

        let err = client
            .put_row(
                "prescriptions",
                "PAT_009_1",
                vec![Cell::new("medications", "medication", "Metformin")],
            )
            .await
            .unwrap_err();
        match err {
            StoreError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(
                    message,
                    "org.apache.hadoop.hbase.TableNotFoundException: prescriptions"
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_row_found_and_missing() {
        let client = make_client();
        let body = json!({
            "Row": [{
                "key": "UEFUXzAwMg==",
                "Cell": [{
                    "column": codec::encode("personal_info:last_name"),
                    "timestamp": 1696161600000u64,
                    "$": codec::encode("Johnson"),
                }]
            }]
        });
        let _found = mockito::mock("GET", "/patient_demographics/UEFUXzAwMg==")
            .match_header("Accept", "application/json")
            .with_body(body.to_string())
            .create();
        let _missing = mockito::mock("GET", "/patient_demographics/UEFUXzQwNA==")
            .with_status(404)
            .create();

        let row = client
            .get_row("patient_demographics", "PAT_002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.row_key().unwrap(), "PAT_002");
        assert_eq!(row.cells.len(), 1);
        assert_eq!(codec::decode(&row.cells[0].value), "Johnson");

        let row = client
            .get_row("patient_demographics", "PAT_404")
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn scan_table_empty_on_404() {
        let client = make_client();
        let _mock = mockito::mock("GET", "/lab_reports/*")
            .with_status(404)
            .create();
        assert!(client.scan_table("lab_reports").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_table_rejects_garbage() {
        let client = make_client();
        let _mock = mockito::mock("GET", "/patient_visits/*")
            .with_body("<html>proxy error</html>")
            .create();
        assert!(matches!(
            client.scan_table("patient_visits").await,
            Err(StoreError::Deserialize(_))
        ));
    }

    #[tokio::test]
    async fn create_table_created_and_exists() {
        let client = make_client();
        let created = mockito::mock("PUT", "/patient_demographics/schema")
            .match_body(Matcher::Json(json!({
                "name": "patient_demographics",
                "ColumnSchema": [
                    {"name": "personal_info"},
                    {"name": "contact_info"},
                    {"name": "emergency_contact"},
                ]
            })))
            .with_status(201)
            .create();
        assert_eq!(
            client.create_table(&PATIENT_DEMOGRAPHICS).await.unwrap(),
            TableStatus::Created
        );
        created.assert();
        drop(created);

        let _exists = mockito::mock("PUT", "/patient_demographics/schema")
            .with_status(409)
            .create();
        assert_eq!(
            client.create_table(&PATIENT_DEMOGRAPHICS).await.unwrap(),
            TableStatus::Exists
        );
    }

    #[tokio::test]
    async fn cluster_version() {
        let client = make_client();
        let _mock = mockito::mock("GET", "/version/cluster")
            .with_body(r#"{"Version":"2.5.5"}"#)
            .create();
        let version = client.cluster_version().await.unwrap();
        assert_eq!(version["Version"], "2.5.5");
    }
}
