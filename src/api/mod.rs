// ==========================================
// 试剂托盘配置系统 - API层
// ==========================================
// 职责: 面向展示层的只读查询接口
// 红线: 不含优化逻辑,仅做目录/槽位信息投影
// ==========================================

pub mod catalog_api;

// 重导出核心接口
pub use catalog_api::{CatalogApi, ExperimentListing, LocationInfo, ReagentInfo};
