// ==========================================
// 试剂托盘配置系统 - 配置结果模型
// ==========================================
// 职责: 优化引擎的输出结构(逐套摆放明细 + 运行天数)
// 红线: 引擎返回后不再修改,供展示层只读消费
// ==========================================

use crate::domain::tray::TrayLocations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SetPlacement - 单试剂摆放
// ==========================================

/// 一套试剂中单个试剂的摆放记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPlacement {
    pub reagent_code: String,  // 试剂代码
    pub location: usize,       // 槽位编号 (0起)
    pub tests: u32,            // 该槽位可支撑的测试数
    pub volume_per_test: f64,  // 单测耗量 (µL)
}

// ==========================================
// ReagentSet - 一整套摆放
// ==========================================

/// 一个实验的一整套试剂摆放(每试剂占一槽,原子提交)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReagentSet {
    pub placements: Vec<SetPlacement>,
    /// 本套可支撑的测试数 = 套内各试剂测试数的最小值
    pub tests_per_set: u32,
}

// ==========================================
// ExperimentResult - 单实验结果
// ==========================================

/// 单个实验的累计分配结果
///
/// total_tests 按试剂代码跨套合并计算:
/// 对实验的每种试剂代码,累加其占用槽位的 tests_possible,
/// 再取各代码累加值的最小值(瓶颈试剂决定整体)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub name: String,              // 实验名称
    pub daily_count: f64,          // 日测试需求
    pub sets: Vec<ReagentSet>,     // 已摆放套组(有序)
    pub total_tests: u32,          // 合并后可支撑测试总数
    /// 受整托盘运行天数封顶后的实际可用测试数
    pub actual_total_tests: u32,
    /// 运行天数 = total_tests / daily_count (保留1位小数)
    pub days_of_operation: f64,
}

// ==========================================
// TrayConfiguration - 托盘配置结果
// ==========================================

/// 一次优化调用的完整输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrayConfiguration {
    /// 槽位 -> 装载内容 (空槽为 None)
    pub tray_locations: TrayLocations,
    /// 实验编号 -> 分配结果
    pub results: BTreeMap<u32, ExperimentResult>,
    /// 整托盘运行天数 = 各实验运行天数的最小值(瓶颈实验决定)
    pub overall_days_of_operation: f64,
}

impl TrayConfiguration {
    /// 已占用槽位数
    pub fn occupied_count(&self) -> usize {
        self.tray_locations.iter().filter(|l| l.is_some()).count()
    }

    /// 空槽位编号列表
    pub fn empty_locations(&self) -> Vec<usize> {
        self.tray_locations
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.is_none().then_some(i))
            .collect()
    }
}
