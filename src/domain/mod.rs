// ==========================================
// 试剂托盘配置系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含优化逻辑,不含展示逻辑
// ==========================================

pub mod catalog;
pub mod configuration;
pub mod tray;

// 重导出核心类型
pub use catalog::{Catalog, Experiment, Reagent};
pub use configuration::{ExperimentResult, ReagentSet, SetPlacement, TrayConfiguration};
pub use tray::{calculate_tests, SlotContent, TrayLocations};
