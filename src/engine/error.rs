// ==========================================
// 试剂托盘配置系统 - 引擎层错误类型
// ==========================================
// 职责: 优化与导出的可区分错误类型
// 红线: 校验失败即整体中止,不返回部分配置
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 优化引擎错误类型
///
/// 四类错误均在 optimize() 内同步抛出,调用方可按变体
/// 程序化区分,不依赖错误文案。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    // ===== 输入校验错误 =====
    #[error("未知实验编号: {id}")]
    UnknownExperiment { id: u32 },

    #[error("实验{id}的日测试数无效(缺失或非正数)")]
    InvalidDailyCount { id: u32 },

    #[error("槽位容量不足: 所选实验一套共需{total_needed}个槽位, 托盘仅有{capacity}个")]
    CapacityExceeded {
        total_needed: usize,
        capacity: usize,
        /// 各实验的槽位需求明细 (实验编号, 试剂数)
        breakdown: Vec<(u32, usize)>,
    },

    // ===== 摆放阶段错误 =====
    /// 槽位等级耗尽等原因导致该实验无可行摆放
    #[error("实验{experiment_id}无可行槽位组合")]
    PlacementImpossible { experiment_id: u32 },
}

/// Result 类型别名
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// 导出辅助错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("不支持的导出格式: {format}")]
    UnsupportedFormat { format: String },

    #[error("导出序列化失败: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
