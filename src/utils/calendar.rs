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

use calamine::{Data, Reader, Xls};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashSet;
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// 日历错误类型
#[derive(Error, Debug)]
pub enum CalendarError {
    /// 节假日文件下载失败
    #[error("Holiday download failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 节假日工作簿解析失败
    #[error("Holiday workbook error: {0}")]
    Workbook(String),
}

/// 巴西工作日日历
///
/// 基于ANBIMA全国节假日表的工作日计算工具，提供：
/// - 判断某日是否为工作日
/// - 查找前一工作日
/// - 生成闭区间内的工作日序列
/// - 统计区间内的工作日数量
pub struct BusinessCalendar {
    holidays: HashSet<NaiveDate>,
}

/// 向前查找工作日的搜索上限（天）
const BACKWARD_SEARCH_LIMIT: u64 = 366;

impl BusinessCalendar {
    /// 使用给定节假日集合创建日历
    pub fn new(holidays: HashSet<NaiveDate>) -> Self {
        Self { holidays }
    }

    /// 从ANBIMA节假日文件构建日历
    ///
    /// 下载失败时退化为仅排除周末的日历并记录警告，
    /// 与上游短暂不可用时保持任务可运行的行为一致。
    pub async fn load(url: &str, timeout: Duration) -> Self {
        match fetch_national_holidays(url, timeout).await {
            Ok(holidays) => {
                info!("Loaded {} national holidays from ANBIMA", holidays.len());
                Self::new(holidays)
            }
            Err(e) => {
                warn!("Failed to fetch holidays from {}: {}", url, e);
                Self::new(HashSet::new())
            }
        }
    }

    /// 判断某日是否为工作日（周一至周五且非节假日）
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        date.weekday().num_days_from_monday() < 5 && !self.holidays.contains(&date)
    }

    /// 返回严格早于给定日期的最近一个工作日
    pub fn previous_business_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut candidate = date.checked_sub_days(Days::new(1))?;
        for _ in 0..BACKWARD_SEARCH_LIMIT {
            if self.is_business_day(candidate) {
                return Some(candidate);
            }
            candidate = candidate.checked_sub_days(Days::new(1))?;
        }
        None
    }

    /// 生成闭区间内的工作日序列（升序）
    pub fn business_day_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            if self.is_business_day(current) {
                days.push(current);
            }
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }

    /// 统计两个日期之间的工作日数量（不含端点差一）
    pub fn business_day_count(&self, start: NaiveDate, end: NaiveDate) -> usize {
        self.business_day_range(start, end).len().saturating_sub(1)
    }
}

/// 下载并解析ANBIMA全国节假日工作簿
///
/// 取第一个工作表的第一列（表头为"Data"），忽略表尾的
/// 非日期说明行。
pub async fn fetch_national_holidays(
    url: &str,
    timeout: Duration,
) -> Result<HashSet<NaiveDate>, CalendarError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    parse_holiday_workbook(&bytes)
}

fn parse_holiday_workbook(bytes: &[u8]) -> Result<HashSet<NaiveDate>, CalendarError> {
    let mut workbook =
        Xls::new(Cursor::new(bytes.to_vec())).map_err(|e| CalendarError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CalendarError::Workbook("workbook has no sheets".to_string()))?
        .map_err(|e| CalendarError::Workbook(e.to_string()))?;

    Ok(holiday_dates(range.rows()))
}

/// 从工作表行提取节假日日期
///
/// 首行为"Data"表头，日期取每行第一列；表尾的纯文本说明行忽略，
/// 但日期形状的字符串仍按dd/mm/YYYY解析。
fn holiday_dates<'r>(rows: impl Iterator<Item = &'r [Data]>) -> HashSet<NaiveDate> {
    let mut holidays = HashSet::new();
    for row in rows.skip(1) {
        match row.first() {
            Some(Data::DateTime(dt)) => {
                if let Some(date) = excel_serial_to_date(dt.as_f64()) {
                    holidays.insert(date);
                }
            }
            Some(Data::Float(serial)) => {
                if let Some(date) = excel_serial_to_date(*serial) {
                    holidays.insert(date);
                }
            }
            Some(Data::String(s)) => {
                if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y") {
                    holidays.insert(date);
                }
            }
            _ => {}
        }
    }
    holidays
}

/// 将Excel序列日期转换为NaiveDate（1900日期系统，序列0对应1899-12-30）
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
