// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 收益率曲线类型
///
/// ANBIMA按曲线分组发布期限结构参数，目前发布两条曲线：
/// 名义固定利率曲线（PREFIXADOS）和IPCA挂钩实际利率曲线。
/// 未知分组原样保留，避免静默丢弃上游新增的曲线。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CurveType {
    /// 固定利率曲线（PREFIXADOS）
    Pre,
    /// IPCA挂钩实际利率曲线
    Ipca,
    /// 其他未映射的曲线分组
    Other(String),
}

impl CurveType {
    /// 根据XML中的Grupo属性构造曲线类型
    pub fn from_group(group: &str) -> Self {
        match group {
            "PREFIXADOS" => CurveType::Pre,
            "IPCA" => CurveType::Ipca,
            other => CurveType::Other(other.to_string()),
        }
    }

    /// 曲线类型的数据集标签
    pub fn as_str(&self) -> &str {
        match self {
            CurveType::Pre => "pre",
            CurveType::Ipca => "ipca",
            CurveType::Other(s) => s,
        }
    }
}

impl From<String> for CurveType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pre" => CurveType::Pre,
            "ipca" => CurveType::Ipca,
            _ => CurveType::Other(s),
        }
    }
}

impl From<CurveType> for String {
    fn from(c: CurveType) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for CurveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 期限结构参数实体
///
/// 存储ANBIMA对单条曲线单个参考日发布的Svensson模型参数。
/// 上游缺失的参数以None表示，不做插值或填充。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructureParams {
    /// 参考日期
    pub date: NaiveDate,
    /// 曲线类型
    pub curve: CurveType,
    /// Svensson参数 beta1（长期水平）
    pub b1: Option<f64>,
    /// Svensson参数 beta2（斜率）
    pub b2: Option<f64>,
    /// Svensson参数 beta3（第一曲率）
    pub b3: Option<f64>,
    /// Svensson参数 beta4（第二曲率）
    pub b4: Option<f64>,
    /// Svensson衰减参数 lambda1
    pub l1: Option<f64>,
    /// Svensson衰减参数 lambda2
    pub l2: Option<f64>,
}
