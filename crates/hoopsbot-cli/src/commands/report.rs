//! Monthly report preview: renders the stats to stdout instead of
//! sending them to the chat.

use chrono::{Datelike, Local, NaiveDate};
use hoopsbot_core::config::Credentials;
use hoopsbot_core::sheets::{sheet_for_month, AttendanceStore, SheetsClient};
use hoopsbot_core::stats::{report_message, MonthlyStats};

pub fn run(month: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (year, month) = match month {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };

    let creds = Credentials::from_env()?;
    let (Some(spreadsheet_id), Some(token)) = (&creds.spreadsheet_id, &creds.sheets_token) else {
        return Err("SPREADSHEET_ID and GOOGLE_SHEETS_TOKEN are required for report".into());
    };
    let store = SheetsClient::new(spreadsheet_id, token);

    let runtime = tokio::runtime::Runtime::new()?;
    let rows = runtime.block_on(store.read_all_rows(&sheet_for_month(year, month)))?;
    println!("{}", report_message(&MonthlyStats::from_rows(&rows)));
    Ok(())
}

fn parse_month(raw: &str) -> Result<(i32, u32), Box<dyn std::error::Error>> {
    let date = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map_err(|_| format!("invalid month {raw:?}, expected YYYY-MM"))?;
    Ok((date.year(), date.month()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_month_accepts_year_dash_month() {
        assert_eq!(parse_month("2025-05").unwrap(), (2025, 5));
        assert_eq!(parse_month("2024-12").unwrap(), (2024, 12));
    }

    #[test]
    fn parse_month_rejects_other_shapes() {
        assert!(parse_month("May-2025").is_err());
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025").is_err());
    }
}
