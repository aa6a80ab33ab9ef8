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

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::models::term_structure::TermStructureParams;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 上游返回非成功状态码
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),
    /// XML解析失败
    #[error("Malformed XML: {0}")]
    MalformedXml(String),
    /// 所有重试都失败，保留最后一次的失败原因
    #[error("All {attempts} attempts failed: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<EngineError>,
    },
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::UpstreamStatus(code) => *code >= 500,
            // Malformed payloads come back identical on retry
            _ => false,
        }
    }
}

/// 期限结构数据引擎特质
#[async_trait]
pub trait TermStructureEngine: Send + Sync {
    /// 下载并解析指定参考日的期限结构参数
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<TermStructureParams>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
