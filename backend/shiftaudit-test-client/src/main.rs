// src/main.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;

// Request types
#[derive(Debug, Serialize)]
struct DailyAuditRequest<'a> {
    date: &'a str,
    events_csv: &'a str,
    activity_csv: &'a str,
}

// Response types
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct StatusCount {
    status: String,
    count: usize,
    percentage: String,
}

#[derive(Debug, Deserialize)]
struct DailySummary {
    total_drivers: usize,
    statuses: Vec<StatusCount>,
}

#[derive(Debug, Deserialize)]
struct DriverResult {
    driver: String,
    status: String,
    minutes_late: i64,
    minutes_early: i64,
}

#[derive(Debug, Deserialize)]
struct DailyReport {
    date: String,
    summary: DailySummary,
    drivers: Vec<DriverResult>,
}

const SAMPLE_EVENTS: &str = "\
Driver,Asset,Timestamp,Event Type
Jane Doe,TRK-01,2024-05-01 06:52:00,Key On
Jane Doe,TRK-01,2024-05-01 17:04:00,Key Off
Sam Roe,TRK-02,2024-05-01 07:25:00,Key On
Sam Roe,TRK-02,2024-05-01 17:10:00,Key Off
Al Poe,TRK-03,2024-05-01 06:40:00,Key On
Al Poe,TRK-03,2024-05-01 15:30:00,Key Off
";

const SAMPLE_ACTIVITY: &str = "\
Driver,Asset,Location,Start,End
Jane Doe,TRK-01,North Yard,2024-05-01 07:00,2024-05-01 17:00
Sam Roe,TRK-02,Depot,2024-05-01 07:00,2024-05-01 17:00
Al Poe,TRK-03,Quarry,2024-05-01 07:00,2024-05-01 17:00
Kim Loe,TRK-04,Quarry,2024-05-01 07:00,2024-05-01 17:00
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = std::env::var("SHIFTAUDIT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = Client::new();

    // Test 1: Health check
    println!("\n🔍 Testing health check endpoint...");
    let health_response = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json::<HealthResponse>()
        .await?;

    println!("Health check response: {:?}", health_response);

    // Test 2: Daily audit with the sample logs
    println!("\n🔍 Testing daily audit endpoint...");
    let response = client
        .post(format!("{}/api/audit/daily", base_url))
        .json(&DailyAuditRequest {
            date: "2024-05-01",
            events_csv: SAMPLE_EVENTS,
            activity_csv: SAMPLE_ACTIVITY,
        })
        .send()
        .await?;

    println!("Daily audit response status: {}", response.status());

    if response.status().is_success() {
        let report = response.json::<DailyReport>().await?;
        println!("Report for {} ({} drivers):", report.date, report.summary.total_drivers);
        for s in &report.summary.statuses {
            println!("  {:<12} {:>3} ({}%)", s.status, s.count, s.percentage);
        }
        for d in &report.drivers {
            println!(
                "  {:<10} {:<12} late {}m, early {}m",
                d.driver, d.status, d.minutes_late, d.minutes_early
            );
        }
    } else {
        println!("Daily audit failed: {}", response.text().await?);
    }

    // Test 3: Bad input should come back as 400
    println!("\n🔍 Testing error handling with an invalid date...");
    let bad_response = client
        .post(format!("{}/api/audit/daily", base_url))
        .json(&DailyAuditRequest {
            date: "sometime",
            events_csv: SAMPLE_EVENTS,
            activity_csv: SAMPLE_ACTIVITY,
        })
        .send()
        .await?;

    println!("Invalid date response status: {}", bad_response.status());
    println!("Invalid date response body: {}", bad_response.text().await?);

    println!("\n✅ Testing complete!");

    Ok(())
}
