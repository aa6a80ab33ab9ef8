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

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::term_structure::TermStructureParams;
use crate::domain::repositories::params_repository::ParamsRepository;
use crate::engines::traits::TermStructureEngine;
use crate::utils::calendar::BusinessCalendar;
use crate::utils::errors::UpdateError;

/// 单次更新的结果
///
/// 跳过类结果都是幂等空操作：数据集文件保持不变，
/// 下游CI的提交守卫随之不产生新提交。
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// 数据已抓取并合并入数据集
    Updated {
        /// 本次新增的行数
        new_rows: usize,
        /// 合并后数据集总行数
        total_rows: usize,
    },
    /// 该日数据已在数据集中，跳过
    AlreadyPresent,
    /// 非工作日，跳过
    NotBusinessDay,
    /// 日期在未来，跳过
    FutureDate,
    /// 日期超出允许的回溯窗口，跳过
    TooOld,
}

/// 期限结构更新服务
///
/// 负责单个参考日的完整更新流程：
/// - 校验请求日期
/// - 下载该日的新数据
/// - 与已有数据集合并去重
/// - 排序后持久化
pub struct UpdateService {
    engine: Arc<dyn TermStructureEngine>,
    repository: Arc<dyn ParamsRepository>,
    calendar: Arc<BusinessCalendar>,
    max_age_business_days: usize,
}

impl UpdateService {
    /// 创建新的更新服务实例
    pub fn new(
        engine: Arc<dyn TermStructureEngine>,
        repository: Arc<dyn ParamsRepository>,
        calendar: Arc<BusinessCalendar>,
        max_age_business_days: usize,
    ) -> Self {
        Self {
            engine,
            repository,
            calendar,
            max_age_business_days,
        }
    }

    /// 执行指定参考日的更新
    ///
    /// # 参数
    ///
    /// * `date` - 要抓取的参考日期
    /// * `today` - 当前日期，用于未来日期和回溯窗口校验
    ///
    /// # 返回值
    ///
    /// * `Ok(UpdateOutcome)` - 更新结果或跳过原因
    /// * `Err(UpdateError)` - 抓取或持久化失败
    pub async fn run(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<UpdateOutcome, UpdateError> {
        if let Some(outcome) = self.validate_date(date, today) {
            return Ok(outcome);
        }

        let existing = self.repository.load().await?;
        if !existing.is_empty() {
            info!("Existing dataset loaded with {} rows", existing.len());
        } else {
            info!("No existing dataset found, creating a new one");
        }

        if existing.iter().any(|row| row.date == date) {
            info!("Data for {} is already present, skipping scrape", date);
            return Ok(UpdateOutcome::AlreadyPresent);
        }

        info!("Starting data scrape for {} via {}", date, self.engine.name());
        let new_rows = self.engine.fetch(date).await?;
        if new_rows.is_empty() {
            // An empty merge would silently commit nothing and hide an upstream change
            return Err(UpdateError::EmptyResult(date));
        }
        info!("New data fetched for {}: {} rows", date, new_rows.len());

        let new_count = new_rows.len();
        let mut combined = existing;
        combined.extend(new_rows);
        // Full-field ordering keeps identical rows adjacent, so dedup is global
        combined.sort_by(compare_rows);
        combined.dedup_by(|a, b| a == b);

        let total = combined.len();
        self.repository.save(&combined).await?;
        info!("Combined dataset saved with {} rows", total);

        Ok(UpdateOutcome::Updated {
            new_rows: new_count,
            total_rows: total,
        })
    }

    /// 校验请求日期，返回Some表示应跳过
    ///
    /// 日期必须是工作日、不在未来、且不早于回溯窗口。
    /// 窗口以闭区间内的工作日数量衡量。
    fn validate_date(&self, date: NaiveDate, today: NaiveDate) -> Option<UpdateOutcome> {
        if !self.calendar.is_business_day(date) {
            warn!("Provided date {} is not a business day, skipping", date);
            return Some(UpdateOutcome::NotBusinessDay);
        }

        if date > today {
            warn!("Provided date {} is in the future, skipping", date);
            return Some(UpdateOutcome::FutureDate);
        }

        let window = self.calendar.business_day_range(date, today).len();
        if window > self.max_age_business_days {
            warn!(
                "Provided date {} is older than {} business days, skipping",
                date, self.max_age_business_days
            );
            return Some(UpdateOutcome::TooOld);
        }

        None
    }
}

/// 数据集行的全字段排序
///
/// 主序为(日期, 曲线)，与数据集的展示顺序一致；
/// 其余参数字段作为次序，保证完全相同的行相邻。
fn compare_rows(a: &TermStructureParams, b: &TermStructureParams) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.curve.as_str().cmp(b.curve.as_str()))
        .then_with(|| compare_params(a.b1, b.b1))
        .then_with(|| compare_params(a.b2, b.b2))
        .then_with(|| compare_params(a.b3, b.b3))
        .then_with(|| compare_params(a.b4, b.b4))
        .then_with(|| compare_params(a.l1, b.l1))
        .then_with(|| compare_params(a.l2, b.l2))
}

fn compare_params(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

#[cfg(test)]
#[path = "update_service_test.rs"]
mod tests;
