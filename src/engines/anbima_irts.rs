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
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::models::term_structure::{CurveType, TermStructureParams};
use crate::engines::traits::{EngineError, TermStructureEngine};
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::text_encoding;

/// ANBIMA期限结构抓取引擎
///
/// 向ANBIMA的ETTJ下载端点提交表单请求，解析返回的XML中
/// 每条曲线的Svensson参数。端点按参考日返回当日发布的全部曲线。
pub struct AnbimaIrtsEngine {
    client: reqwest::Client,
    url: String,
    retry_policy: RetryPolicy,
}

impl AnbimaIrtsEngine {
    /// 创建新的ANBIMA引擎实例
    ///
    /// # 参数
    ///
    /// * `url` - ETTJ下载端点
    /// * `timeout` - 单次请求超时时间
    /// * `retry_policy` - 请求重试策略
    pub fn new(
        url: String,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; irtsrs/0.1; +https://github.com/Kirky-X)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url,
            retry_policy,
        })
    }

    /// 下载指定参考日的原始XML内容
    ///
    /// 对可重试错误（超时、连接失败、5xx）按重试策略退避后重试，
    /// 其余错误立即返回。
    async fn download_xml(&self, date: NaiveDate) -> Result<String, EngineError> {
        let form = [
            ("Idioma", "PT".to_string()),
            ("Dt_Ref", date.format("%d/%m/%Y").to_string()),
            ("saida", "xml".to_string()),
        ];

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.try_download(&form).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && self.retry_policy.should_retry(attempt) => {
                    let backoff = self.retry_policy.calculate_backoff(attempt);
                    warn!(
                        "ANBIMA request attempt {} failed ({}), retrying in {:?}",
                        attempt, e, backoff
                    );
                    sleep(backoff).await;
                }
                Err(e) if e.is_retryable() => {
                    warn!("ANBIMA request attempt {} failed ({}), giving up", attempt, e);
                    return Err(EngineError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_download(&self, form: &[(&str, String); 3]) -> Result<String, EngineError> {
        let response = self.client.post(&self.url).form(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::UpstreamStatus(status.as_u16()));
        }

        // ANBIMA serves ISO-8859-1 without a charset header
        let bytes = response.bytes().await?;
        Ok(text_encoding::decode_to_utf8(&bytes))
    }

    /// 解析XML内容，提取每个PARAMETRO元素的曲线参数
    fn parse_params(
        &self,
        xml: &str,
        date: NaiveDate,
    ) -> Result<Vec<TermStructureParams>, EngineError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut rows = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"PARAMETRO" {
                        rows.push(Self::parse_parametro(&e, date)?);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(EngineError::MalformedXml(e.to_string())),
            }
        }

        debug!("Parsed {} parameter rows for {}", rows.len(), date);
        Ok(rows)
    }

    fn parse_parametro(
        element: &BytesStart<'_>,
        date: NaiveDate,
    ) -> Result<TermStructureParams, EngineError> {
        let mut row = TermStructureParams {
            date,
            curve: CurveType::Other(String::new()),
            b1: None,
            b2: None,
            b3: None,
            b4: None,
            l1: None,
            l2: None,
        };

        for attr in element.attributes() {
            let attr = attr.map_err(|e| EngineError::MalformedXml(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| EngineError::MalformedXml(e.to_string()))?;

            match attr.key.as_ref() {
                b"Grupo" => row.curve = CurveType::from_group(&value),
                b"B1" => row.b1 = parse_decimal(&value)?,
                b"B2" => row.b2 = parse_decimal(&value)?,
                b"B3" => row.b3 = parse_decimal(&value)?,
                b"B4" => row.b4 = parse_decimal(&value)?,
                b"L1" => row.l1 = parse_decimal(&value)?,
                b"L2" => row.l2 = parse_decimal(&value)?,
                _ => {}
            }
        }

        Ok(row)
    }
}

/// 解析巴西十进制逗号格式的数值
///
/// 空字符串表示上游缺失该参数，映射为None；
/// 非空但无法解析的值视为XML格式错误。
fn parse_decimal(value: &str) -> Result<Option<f64>, EngineError> {
    if value.is_empty() {
        return Ok(None);
    }

    value
        .replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| EngineError::MalformedXml(format!("invalid decimal value: {value:?}")))
}

#[async_trait]
impl TermStructureEngine for AnbimaIrtsEngine {
    /// 下载并解析指定参考日的期限结构参数
    ///
    /// # 参数
    ///
    /// * `date` - 参考日期
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<TermStructureParams>)` - 当日发布的全部曲线参数
    /// * `Err(EngineError)` - 下载或解析过程中出现的错误
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<TermStructureParams>, EngineError> {
        let xml = self.download_xml(date).await?;
        self.parse_params(&xml, date)
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "anbima-irts"
    }
}

#[cfg(test)]
#[path = "anbima_irts_test.rs"]
mod tests;
