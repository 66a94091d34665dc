// ==========================================
// 试剂托盘配置系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (前端仅做展示)
// 核心能力: 16槽位托盘的试剂套组分配优化
// 目标: 最大化所有实验中最小的可运行天数
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 托盘参数
pub mod config;

// 引擎层 - 分配优化
pub mod engine;

// API 层 - 面向前端的查询接口
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Catalog, Experiment, ExperimentResult, Reagent, ReagentSet, SetPlacement, SlotContent,
    TrayConfiguration, TrayLocations,
};

// 配置
pub use config::TrayProfile;

// 引擎
pub use engine::{
    ConfigurationExporter, ExportError, ExportFormat, ExperimentPrioritizer, OptimizeError,
    SetPlacer, SummaryEngine, TrayOptimizer, TraySummary,
};

// API
pub use api::{CatalogApi, ExperimentListing, LocationInfo, ReagentInfo};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "试剂托盘配置系统";
