// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use irtsrs::domain::services::update_service::{UpdateOutcome, UpdateService};
use irtsrs::engines::anbima_irts::AnbimaIrtsEngine;
use irtsrs::infrastructure::repositories::csv_params_repo::CsvParamsRepository;
use irtsrs::utils::calendar::BusinessCalendar;
use irtsrs::utils::retry_policy::RetryPolicy;

const ETTJ_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<ETTJ>
  <PARAMETROS>
    <PARAMETRO Grupo="PREFIXADOS" B1="0,113" B2="-0,021" B3="0,034" B4="0,012" L1="2,297" L2="0,441"/>
    <PARAMETRO Grupo="IPCA" B1="0,057" B2="-0,043" B3="0,011" B4="" L1="1,863" L2="0,325"/>
  </PARAMETROS>
</ETTJ>"#;

async fn mount_ettj_endpoint(server: &MockServer, date_fragment: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path("/informacoes/est-termo/CZ-down.asp"))
        .and(body_string_contains(date_fragment))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/xml"))
        .mount(server)
        .await;
}

fn build_service(server: &MockServer, dataset_path: &Path) -> UpdateService {
    let engine = Arc::new(
        AnbimaIrtsEngine::new(
            format!("{}/informacoes/est-termo/CZ-down.asp", server.uri()),
            Duration::from_secs(5),
            RetryPolicy::standard(),
        )
        .unwrap(),
    );
    let repository = Arc::new(CsvParamsRepository::new(dataset_path));
    let calendar = Arc::new(BusinessCalendar::new(HashSet::new()));

    UpdateService::new(engine, repository, calendar, 5)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_full_update_writes_dataset_file() {
    let server = MockServer::start().await;
    mount_ettj_endpoint(&server, "Dt_Ref=04%2F01%2F2024", ETTJ_XML).await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("anbima/irts_params.csv");
    let service = build_service(&server, &dataset_path);

    let outcome = service.run(date(2024, 1, 4), date(2024, 1, 5)).await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            new_rows: 2,
            total_rows: 2
        }
    );

    let content = std::fs::read_to_string(&dataset_path).unwrap();
    assert!(content.starts_with("date,curve,b1,b2,b3,b4,l1,l2"));
    assert!(content.contains("2024-01-04,ipca,"));
    assert!(content.contains("2024-01-04,pre,0.113,"));
}

#[tokio::test]
async fn test_rerun_for_same_date_leaves_file_untouched() {
    let server = MockServer::start().await;
    mount_ettj_endpoint(&server, "saida=xml", ETTJ_XML).await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("irts_params.csv");
    let service = build_service(&server, &dataset_path);

    let first = service.run(date(2024, 1, 4), date(2024, 1, 5)).await.unwrap();
    assert!(matches!(first, UpdateOutcome::Updated { .. }));
    let bytes_after_first = std::fs::read(&dataset_path).unwrap();

    // Second run is the no-op the downstream commit guard relies on:
    // identical bytes, so `git diff --staged --quiet` sees no change
    let second = service.run(date(2024, 1, 4), date(2024, 1, 5)).await.unwrap();
    assert_eq!(second, UpdateOutcome::AlreadyPresent);
    assert_eq!(std::fs::read(&dataset_path).unwrap(), bytes_after_first);
}

#[tokio::test]
async fn test_consecutive_days_accumulate_sorted_history() {
    let server = MockServer::start().await;
    mount_ettj_endpoint(&server, "saida=xml", ETTJ_XML).await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("irts_params.csv");

    // Thursday's run scrapes Wednesday, Friday's run scrapes Thursday
    let service = build_service(&server, &dataset_path);
    service.run(date(2024, 1, 3), date(2024, 1, 4)).await.unwrap();
    let outcome = service.run(date(2024, 1, 4), date(2024, 1, 5)).await.unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            new_rows: 2,
            total_rows: 4
        }
    );

    let content = std::fs::read_to_string(&dataset_path).unwrap();
    let dates: Vec<&str> = content
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-03", "2024-01-03", "2024-01-04", "2024-01-04"]);
}

#[tokio::test]
async fn test_weekend_run_touches_nothing() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("irts_params.csv");
    let service = build_service(&server, &dataset_path);

    // Sunday resolves as the reference date only on misconfigured schedules;
    // the service still refuses it
    let outcome = service.run(date(2024, 1, 7), date(2024, 1, 8)).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::NotBusinessDay);
    assert!(!dataset_path.exists());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}
