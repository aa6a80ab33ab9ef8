// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::term_structure::TermStructureParams;
use crate::utils::errors::RepositoryError;

/// 期限结构参数仓库接口
///
/// 数据集作为整体读写：数据量为每个工作日每条曲线一行，
/// 全量加载远小于引入增量存储的复杂度。
#[async_trait]
pub trait ParamsRepository: Send + Sync {
    /// 加载完整数据集，数据集不存在时返回空集合
    async fn load(&self) -> Result<Vec<TermStructureParams>, RepositoryError>;

    /// 以给定行集合整体覆盖数据集
    async fn save(&self, rows: &[TermStructureParams]) -> Result<(), RepositoryError>;
}
