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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含ANBIMA接口、数据集存储和抓取窗口等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// ANBIMA接口配置
    pub anbima: AnbimaSettings,
    /// 数据集存储配置
    pub storage: StorageSettings,
    /// 抓取行为配置
    pub scrape: ScrapeSettings,
}

/// ANBIMA接口配置设置
#[derive(Debug, Deserialize)]
pub struct AnbimaSettings {
    /// ETTJ参数下载端点
    pub irts_url: String,
    /// 全国节假日工作簿地址
    pub holiday_url: String,
    /// 单次HTTP请求超时时间（秒）
    pub request_timeout: u64,
}

impl AnbimaSettings {
    /// 请求超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// 数据集存储配置设置
#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// 数据集目录
    pub data_dir: String,
    /// 数据集文件名
    pub dataset_file: String,
}

impl StorageSettings {
    /// 数据集文件完整路径
    pub fn dataset_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.dataset_file)
    }
}

/// 抓取行为配置设置
#[derive(Debug, Deserialize)]
pub struct ScrapeSettings {
    /// 允许回溯的最大工作日数
    pub max_age_business_days: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default(
                "anbima.irts_url",
                "https://www.anbima.com.br/informacoes/est-termo/CZ-down.asp",
            )?
            .set_default(
                "anbima.holiday_url",
                "https://www.anbima.com.br/feriados/arqs/feriados_nacionais.xls",
            )?
            .set_default("anbima.request_timeout", 15)?
            // Default storage settings
            .set_default("storage.data_dir", "data/scraped/anbima")?
            .set_default("storage.dataset_file", "irts_params.csv")?
            // Default scrape settings
            .set_default("scrape.max_age_business_days", 5)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("IRTSRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
