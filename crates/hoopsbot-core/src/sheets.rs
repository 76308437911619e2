//! Attendance persistence in Google Sheets.
//!
//! The spreadsheet is the only state that survives between invocations.
//! One tab per month, named `Trainings_<YYYY-MM>`; rows are appended
//! after each collection and read back for the monthly report. Auth is
//! a pre-issued bearer token from the environment; no flow is ever
//! negotiated here.

use serde::Deserialize;
use tracing::debug;

use crate::error::SheetsError;

const API_BASE: &str = "https://sheets.googleapis.com";

/// Tab name for a month's attendance.
pub fn sheet_for_month(year: i32, month: u32) -> String {
    format!("Trainings_{year}-{month:02}")
}

/// Append-only tabular storage.
pub trait AttendanceStore {
    fn append_rows(
        &self,
        sheet: &str,
        rows: Vec<Vec<String>>,
    ) -> impl std::future::Future<Output = Result<(), SheetsError>> + Send;

    /// All rows of a sheet. A missing sheet reads as empty.
    fn read_all_rows(
        &self,
        sheet: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Vec<String>>, SheetsError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Sheets API v4 client bound to one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token: token.to_string(),
        }
    }

    /// Point the client at a different API host (tests).
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.base_url = base.trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self, sheet: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(sheet),
            suffix
        )
    }
}

impl AttendanceStore for SheetsClient {
    async fn append_rows(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let url = self.values_url(sheet, ":append?valueInputOption=USER_ENTERED");
        debug!(sheet = %sheet, rows = rows.len(), "appending attendance rows");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "values": rows }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SheetsError::Status {
                operation: "append".into(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn read_all_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(sheet, "");
        let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;

        let status = resp.status();
        // The API answers 400 for a tab that does not exist yet.
        if status.as_u16() == 400 || status.as_u16() == 404 {
            debug!(sheet = %sheet, "sheet not found, reading as empty");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SheetsError::Status {
                operation: "read".into(),
                status: status.as_u16(),
            });
        }

        let body: ValuesResponse = resp.json().await.map_err(|e| SheetsError::UnexpectedResponse {
            operation: "read".into(),
            message: e.to_string(),
        })?;
        Ok(body.values)
    }
}
