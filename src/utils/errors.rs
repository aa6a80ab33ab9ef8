// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV错误: {0}")]
    CsvError(#[from] csv::Error),

    #[error("内部错误: {0}")]
    InternalError(String),
}

/// 更新服务错误类型
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("引擎错误: {0}")]
    EngineError(#[from] crate::engines::traits::EngineError),

    #[error("仓库错误: {0}")]
    RepositoryError(#[from] RepositoryError),

    #[error("上游未返回任何参数: {0}")]
    EmptyResult(chrono::NaiveDate),
}
