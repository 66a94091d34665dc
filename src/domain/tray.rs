// ==========================================
// 试剂托盘配置系统 - 托盘槽位模型
// ==========================================
// 职责: 槽位内容与测试数计算
// 不变式: 槽位容量由槽位编号唯一决定,运行期不变
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// SlotContent - 槽位内容
// ==========================================

/// 单个槽位的装载内容
///
/// 不变式:
/// - capacity_ml 与该槽位编号的固定容量一致
/// - tests_possible == floor(capacity_ml * 1000 / volume_per_test)
/// - 一个槽位同一时刻只属于一个实验的一种试剂
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotContent {
    pub reagent_code: String,  // 试剂代码
    pub experiment_id: u32,    // 所属实验编号
    pub tests_possible: u32,   // 该槽位可支撑的测试数
    pub volume_per_test: f64,  // 单测耗量 (µL)
    pub capacity_ml: f64,      // 槽位容量 (mL)
}

/// 托盘槽位数组(长度 = 槽位总数,空槽为 None)
pub type TrayLocations = Vec<Option<SlotContent>>;

// ==========================================
// 测试数计算
// ==========================================

/// 计算单槽位可支撑的测试数
///
/// tests = floor(capacity_mL * 1000 / volume_per_test_µL)
/// 向零截断(只计完整测试)。volume_per_test 为正数由目录保证,
/// 此处不重复校验。
pub fn calculate_tests(volume_per_test_ul: f64, capacity_ml: f64) -> u32 {
    (capacity_ml * 1000.0 / volume_per_test_ul) as u32
}
