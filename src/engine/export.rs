// ==========================================
// 试剂托盘配置系统 - 配置导出引擎
// ==========================================
// 职责: 完成态配置的序列化投影 (JSON / CSV)
// 红线: 只读投影,不改动配置;不支持的格式显式报错
// ==========================================

use crate::domain::configuration::TrayConfiguration;
use crate::engine::error::{ExportError, ExportResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

// ==========================================
// ExportFormat - 导出格式
// ==========================================

/// 支持的导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

// ==========================================
// 导出文档结构(扁平化,序列化友好)
// ==========================================

/// 槽位导出行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRow {
    pub location_number: usize,
    pub capacity_ml: Option<f64>,
    pub reagent_code: Option<String>,
    pub experiment_id: Option<u32>,
    pub tests_possible: Option<u32>,
    pub volume_per_test: Option<f64>,
}

/// 实验导出行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRow {
    pub experiment_id: u32,
    pub name: String,
    pub daily_count: f64,
    pub set_count: usize,
    pub total_tests: u32,
    pub actual_total_tests: u32,
    pub days_of_operation: f64,
}

/// 导出文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub overall_days_of_operation: f64,
    pub locations: Vec<LocationRow>,
    pub experiments: Vec<ExperimentRow>,
}

// ==========================================
// ConfigurationExporter - 导出引擎
// ==========================================

pub struct ConfigurationExporter;

impl ConfigurationExporter {
    pub fn new() -> Self {
        Self
    }

    /// 构建扁平化导出文档
    pub fn document(&self, config: &TrayConfiguration) -> ExportDocument {
        let locations = config
            .tray_locations
            .iter()
            .enumerate()
            .map(|(loc, slot)| LocationRow {
                location_number: loc + 1,
                capacity_ml: slot.as_ref().map(|s| s.capacity_ml),
                reagent_code: slot.as_ref().map(|s| s.reagent_code.clone()),
                experiment_id: slot.as_ref().map(|s| s.experiment_id),
                tests_possible: slot.as_ref().map(|s| s.tests_possible),
                volume_per_test: slot.as_ref().map(|s| s.volume_per_test),
            })
            .collect();

        let experiments = config
            .results
            .iter()
            .map(|(&id, result)| ExperimentRow {
                experiment_id: id,
                name: result.name.clone(),
                daily_count: result.daily_count,
                set_count: result.sets.len(),
                total_tests: result.total_tests,
                actual_total_tests: result.actual_total_tests,
                days_of_operation: result.days_of_operation,
            })
            .collect();

        ExportDocument {
            generated_at: Utc::now(),
            overall_days_of_operation: config.overall_days_of_operation,
            locations,
            experiments,
        }
    }

    /// 按格式名导出配置
    ///
    /// # 参数
    /// - `config`: 完成态配置
    /// - `format`: 格式名("json" / "csv",不区分大小写)
    ///
    /// # 返回
    /// 序列化文本;未知格式返回 `ExportError::UnsupportedFormat`
    pub fn export(&self, config: &TrayConfiguration, format: &str) -> ExportResult<String> {
        let format: ExportFormat = format.parse()?;
        debug!(?format, "导出托盘配置");
        let document = self.document(config);
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&document)?),
            ExportFormat::Csv => self.to_csv(&document),
        }
    }

    /// CSV 导出: 槽位明细段 + 实验汇总段
    fn to_csv(&self, document: &ExportDocument) -> ExportResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record([
            "location_number",
            "capacity_ml",
            "reagent_code",
            "experiment_id",
            "tests_possible",
            "volume_per_test",
        ])?;
        for row in &document.locations {
            writer.write_record([
                row.location_number.to_string(),
                row.capacity_ml.map(format_float).unwrap_or_default(),
                row.reagent_code.clone().unwrap_or_default(),
                row.experiment_id.map(|v| v.to_string()).unwrap_or_default(),
                row.tests_possible.map(|v| v.to_string()).unwrap_or_default(),
                row.volume_per_test.map(format_float).unwrap_or_default(),
            ])?;
        }

        writer.write_record([""])?;
        writer.write_record([
            "experiment_id",
            "name",
            "daily_count",
            "set_count",
            "total_tests",
            "actual_total_tests",
            "days_of_operation",
        ])?;
        for row in &document.experiments {
            writer.write_record([
                row.experiment_id.to_string(),
                row.name.clone(),
                format_float(row.daily_count),
                row.set_count.to_string(),
                row.total_tests.to_string(),
                row.actual_total_tests.to_string(),
                format_float(row.days_of_operation),
            ])?;
        }
        writer.write_record([
            "overall_days_of_operation",
            &format_float(document.overall_days_of_operation),
        ])?;

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ExportError::Serialization(e.to_string()))
    }
}

impl Default for ConfigurationExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
