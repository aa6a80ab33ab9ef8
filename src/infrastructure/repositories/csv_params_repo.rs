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
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::models::term_structure::TermStructureParams;
use crate::domain::repositories::params_repository::ParamsRepository;
use crate::utils::errors::RepositoryError;

/// CSV文件参数仓库
///
/// 数据集以单个CSV文件存储。文件是纯文本的，提交到
/// 数据分支后每次更新的diff可以直接审阅。
pub struct CsvParamsRepository {
    path: PathBuf,
}

impl CsvParamsRepository {
    /// 创建新的CSV仓库实例
    ///
    /// # 参数
    ///
    /// * `path` - 数据集文件路径，父目录不存在时在保存前创建
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 数据集文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ParamsRepository for CsvParamsRepository {
    async fn load(&self) -> Result<Vec<TermStructureParams>, RepositoryError> {
        if !self.path.exists() {
            debug!("Dataset file {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let bytes = tokio::fs::read(&self.path).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for record in reader.deserialize::<TermStructureParams>() {
            rows.push(record?);
        }

        debug!("Loaded {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    async fn save(&self, rows: &[TermStructureParams]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        tokio::fs::write(&self.path, bytes).await?;
        debug!("Saved {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}
