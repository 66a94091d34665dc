// ==========================================
// 试剂托盘配置系统 - 命令行入口
// ==========================================
// 定位: 薄壳展示层,仅做请求解析与结果输出
// 用法: reagent-tray-dss <request.json> [格式]
//       或从标准输入读取请求 JSON
// ==========================================

use anyhow::{Context, Result};
use reagent_tray_dss::{Catalog, ConfigurationExporter, TrayOptimizer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

/// 优化请求
#[derive(Debug, Deserialize)]
struct OptimizeRequest {
    /// 选中的实验编号
    experiments: Vec<u32>,
    /// 实验编号 -> 日测试需求
    daily_counts: BTreeMap<u32, f64>,
    /// 导出格式(默认 json)
    #[serde(default)]
    format: Option<String>,
}

fn main() -> Result<()> {
    // 初始化日志系统
    reagent_tray_dss::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", reagent_tray_dss::APP_NAME);
    tracing::info!("系统版本: {}", reagent_tray_dss::VERSION);
    tracing::info!("==================================================");

    // 读取请求(文件参数或标准输入)
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("无法读取请求文件: {}", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("无法从标准输入读取请求")?;
            buffer
        }
    };
    let request: OptimizeRequest =
        serde_json::from_str(&raw).context("请求JSON解析失败")?;

    // 执行优化
    let optimizer = TrayOptimizer::new(Arc::new(Catalog::standard()));
    let config = optimizer
        .optimize(&request.experiments, &request.daily_counts)
        .context("托盘配置优化失败")?;

    tracing::info!(
        overall_days = config.overall_days_of_operation,
        occupied = config.occupied_count(),
        "优化成功"
    );

    // 导出结果
    let format = request.format.as_deref().unwrap_or("json");
    let exporter = ConfigurationExporter::new();
    let output = exporter.export(&config, format).context("结果导出失败")?;
    println!("{}", output);

    Ok(())
}
