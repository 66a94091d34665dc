// ==========================================
// 试剂托盘配置系统 - 配置摘要引擎
// ==========================================
// 职责: 完成态配置的只读投影(校验/摘要)
// 红线: 无状态引擎,所有方法都是纯函数,不改动配置
// ==========================================

use crate::config::TrayProfile;
use crate::domain::catalog::Catalog;
use crate::domain::configuration::TrayConfiguration;
use crate::domain::tray::calculate_tests;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 摘要报表结构
// ==========================================

/// 单实验摘要: 试剂代码 -> 占用槽位分组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub experiment_id: u32,
    pub name: String,
    /// 试剂代码 -> 占用槽位编号(升序)
    pub reagent_locations: BTreeMap<String, Vec<usize>>,
    pub set_count: usize,
    pub total_tests: u32,
    pub days_of_operation: f64,
}

/// 单槽位占用明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location: usize,
    /// 面向操作员的1起编号
    pub location_number: usize,
    pub capacity_ml: f64,
    pub is_high_capacity: bool,
    pub reagent_code: Option<String>,
    pub experiment_id: Option<u32>,
    pub tests_possible: Option<u32>,
}

/// 整托盘摘要报表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraySummary {
    pub experiments: Vec<ExperimentSummary>,
    pub locations: Vec<LocationSummary>,
    pub occupied_locations: usize,
    pub total_locations: usize,
    /// 已占用槽位容量占托盘总容量的比例 (0.0 - 1.0)
    pub capacity_utilization: f64,
    pub overall_days_of_operation: f64,
}

// ==========================================
// SummaryEngine - 摘要引擎
// ==========================================

pub struct SummaryEngine;

impl SummaryEngine {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 校验完成态配置的自洽性
    ///
    /// 检查项:
    /// 1) 每个结果实验的每种目录试剂至少占用一个槽位
    /// 2) 每个占用槽位的容量与槽位编号的固定容量一致
    /// 3) 每个占用槽位的测试数可由耗量与容量复算得出
    /// 4) 槽位数组长度与托盘参数一致
    pub fn validate(
        &self,
        catalog: &Catalog,
        profile: &TrayProfile,
        config: &TrayConfiguration,
    ) -> bool {
        if config.tray_locations.len() != profile.slot_count {
            return false;
        }

        for (&id, _result) in &config.results {
            let Some(experiment) = catalog.get(id) else {
                return false;
            };
            for reagent in &experiment.reagents {
                let covered = config.tray_locations.iter().flatten().any(|slot| {
                    slot.experiment_id == id && slot.reagent_code == reagent.code
                });
                if !covered {
                    return false;
                }
            }
        }

        for (loc, slot) in config.tray_locations.iter().enumerate() {
            let Some(slot) = slot else {
                continue;
            };
            if slot.capacity_ml != profile.capacity_of_location(loc) {
                return false;
            }
            if slot.tests_possible != calculate_tests(slot.volume_per_test, slot.capacity_ml) {
                return false;
            }
        }

        true
    }

    /// 生成整托盘摘要报表
    pub fn summarize(&self, profile: &TrayProfile, config: &TrayConfiguration) -> TraySummary {
        // 1. 实验维度: 试剂 -> 槽位分组
        let experiments = config
            .results
            .iter()
            .map(|(&id, result)| {
                let mut reagent_locations: BTreeMap<String, Vec<usize>> = BTreeMap::new();
                for (loc, slot) in config.tray_locations.iter().enumerate() {
                    if let Some(slot) = slot {
                        if slot.experiment_id == id {
                            reagent_locations
                                .entry(slot.reagent_code.clone())
                                .or_default()
                                .push(loc);
                        }
                    }
                }
                ExperimentSummary {
                    experiment_id: id,
                    name: result.name.clone(),
                    reagent_locations,
                    set_count: result.sets.len(),
                    total_tests: result.total_tests,
                    days_of_operation: result.days_of_operation,
                }
            })
            .collect();

        // 2. 槽位维度: 占用明细
        let locations: Vec<LocationSummary> = config
            .tray_locations
            .iter()
            .enumerate()
            .map(|(loc, slot)| LocationSummary {
                location: loc,
                location_number: loc + 1,
                capacity_ml: profile.capacity_of_location(loc),
                is_high_capacity: profile.is_high_capacity(loc),
                reagent_code: slot.as_ref().map(|s| s.reagent_code.clone()),
                experiment_id: slot.as_ref().map(|s| s.experiment_id),
                tests_possible: slot.as_ref().map(|s| s.tests_possible),
            })
            .collect();

        // 3. 容量利用率
        let occupied_capacity: f64 = locations
            .iter()
            .filter(|l| l.reagent_code.is_some())
            .map(|l| l.capacity_ml)
            .sum();
        let total_capacity = profile.total_capacity_ml();
        let capacity_utilization = if total_capacity > 0.0 {
            occupied_capacity / total_capacity
        } else {
            0.0
        };

        TraySummary {
            occupied_locations: config.occupied_count(),
            total_locations: profile.slot_count,
            experiments,
            locations,
            capacity_utilization,
            overall_days_of_operation: config.overall_days_of_operation,
        }
    }
}

impl Default for SummaryEngine {
    fn default() -> Self {
        Self::new()
    }
}
