use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{A1Range, Authenticator, RangeStore};
use crate::error::StoreError;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Range store backed by the Google Sheets values API
pub struct SheetsClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn Authenticator>,
}

impl SheetsClient {
    pub fn new(api_base: &str, sheet_id: &str, auth: Arc<dyn Authenticator>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(SheetsClient {
            client,
            base_url: spreadsheet_url(api_base, sheet_id),
            auth,
        })
    }

    async fn request(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Value, StoreError> {
        let token = self.auth.bearer_token().await?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = response.status();
        info!("[{method}] {url} {}", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RangeStore for SheetsClient {
    async fn read(&self, range: &A1Range) -> Result<Vec<Vec<String>>, StoreError> {
        let body = self.request(Method::GET, &read_endpoint(range), None).await?;
        let parsed: ValueRange = serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!("read {} rows from {range}", parsed.values.len());
        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write(&self, range: &A1Range, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        let body = json!({
            "range": range.to_string(),
            "values": rows,
        });
        self.request(Method::PUT, &write_endpoint(range), Some(body)).await?;
        Ok(())
    }

    async fn clear(&self, range: &A1Range) -> Result<(), StoreError> {
        self.request(Method::POST, &clear_endpoint(range), Some(json!({}))).await?;
        Ok(())
    }
}

fn spreadsheet_url(api_base: &str, sheet_id: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), sheet_id)
}

fn read_endpoint(range: &A1Range) -> String {
    format!("values/{range}?majorDimension=ROWS")
}

fn write_endpoint(range: &A1Range) -> String {
    format!("values/{range}?valueInputOption=USER_ENTERED")
}

fn clear_endpoint(range: &A1Range) -> String {
    format!("values/{range}:clear")
}

/// Formatted values come back as strings; anything else is rendered as JSON text
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{bands_range, scores_range, StaticToken};

    #[test]
    fn endpoints_follow_the_values_api() {
        assert_eq!(read_endpoint(&scores_range()), "values/Scores!A2:C22?majorDimension=ROWS");
        assert_eq!(read_endpoint(&bands_range()), "values/Bands!A:B?majorDimension=ROWS");
        assert_eq!(
            write_endpoint(&A1Range::cell("Scores", 2, 5)),
            "values/Scores!C5?valueInputOption=USER_ENTERED"
        );
        assert_eq!(clear_endpoint(&A1Range::cell("Scores", 1, 3)), "values/Scores!B3:clear");
    }

    #[test]
    fn base_url_includes_the_spreadsheet() {
        assert_eq!(
            spreadsheet_url("https://sheets.googleapis.com/v4/spreadsheets/", "abc123"),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123"
        );
        let client = SheetsClient::new(DEFAULT_API_BASE, "abc123", Arc::new(StaticToken::new("t"))).unwrap();
        assert_eq!(client.base_url, "https://sheets.googleapis.com/v4/spreadsheets/abc123");
    }

    #[test]
    fn empty_ranges_decode_to_no_rows() {
        let parsed: ValueRange = serde_json::from_value(json!({"range": "Scores!A2:C22", "majorDimension": "ROWS"})).unwrap();
        assert!(parsed.values.is_empty());

        let parsed: ValueRange =
            serde_json::from_value(json!({"values": [["June 7 8pm", "alpha"], ["June 7 9pm", 3]]})).unwrap();
        let rows: Vec<Vec<String>> = parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        assert_eq!(rows[1], vec!["June 7 9pm".to_string(), "3".to_string()]);
    }
}
