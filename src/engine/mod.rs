// ==========================================
// 试剂托盘配置系统 - 引擎层
// ==========================================
// 职责: 托盘分配优化与结果投影
// 红线: 引擎无持久状态,每次调用独立构建工作状态
// ==========================================

pub mod error;
pub mod export;
pub mod optimizer;
pub mod placement;
pub mod priority;
pub mod summary;

// 重导出核心引擎
pub use error::{ExportError, ExportResult, OptimizeError, OptimizeResult};
pub use export::{ConfigurationExporter, ExportDocument, ExportFormat};
pub use optimizer::TrayOptimizer;
pub use placement::{SetPlacer, TrayState};
pub use priority::{ExperimentMetrics, ExperimentPrioritizer};
pub use summary::{ExperimentSummary, LocationSummary, SummaryEngine, TraySummary};
