// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::Utc;
use irtsrs::config::settings::Settings;
use irtsrs::domain::services::update_service::{UpdateOutcome, UpdateService};
use irtsrs::engines::anbima_irts::AnbimaIrtsEngine;
use irtsrs::infrastructure::repositories::csv_params_repo::CsvParamsRepository;
use irtsrs::utils::calendar::BusinessCalendar;
use irtsrs::utils::retry_policy::RetryPolicy;
use irtsrs::utils::telemetry;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 批处理入口点：解析前一个巴西工作日并更新该日的期限结构数据。
/// 跳过类结果以状态码0退出，保证CI的提交守卫按"无变化"处理；
/// 抓取或持久化失败以非零状态码退出并使当次运行失败。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting irtsrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Build the Brazilian business calendar
    let calendar = Arc::new(
        BusinessCalendar::load(&settings.anbima.holiday_url, settings.anbima.timeout()).await,
    );

    // 4. Resolve the reference date: the business day before today (UTC)
    let today = Utc::now().date_naive();
    let Some(reference_date) = calendar.previous_business_day(today) else {
        info!("No business day found before {}, skipping scraping routines", today);
        return Ok(());
    };
    info!("Reference date resolved to {}", reference_date);

    // 5. Initialize components
    let engine = Arc::new(AnbimaIrtsEngine::new(
        settings.anbima.irts_url.clone(),
        settings.anbima.timeout(),
        RetryPolicy::upstream(),
    )?);
    let repository = Arc::new(CsvParamsRepository::new(settings.storage.dataset_path()));
    let service = UpdateService::new(
        engine,
        repository,
        calendar,
        settings.scrape.max_age_business_days,
    );

    // 6. Run the update
    match service.run(reference_date, today).await? {
        UpdateOutcome::Updated {
            new_rows,
            total_rows,
        } => {
            info!(
                "IRTS data successfully scraped and updated: {} new rows, {} total",
                new_rows, total_rows
            );
        }
        outcome => {
            info!("Skipping scraping routines: {:?}", outcome);
        }
    }

    Ok(())
}
