// ==========================================
// 试剂托盘配置系统 - 套组摆放引擎
// ==========================================
// 职责: 单套试剂的槽位选择与原子提交
// 输入: 托盘工作状态 + 实验定义
// 输出: 选中槽位列表 / 提交后的摆放记录
// 红线: 一套要么整体提交,要么完全不动,无回滚路径
// ==========================================

use crate::config::TrayProfile;
use crate::domain::catalog::{Experiment, Reagent};
use crate::domain::configuration::{ExperimentResult, ReagentSet, SetPlacement};
use crate::domain::tray::{calculate_tests, SlotContent, TrayLocations};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;


// ==========================================
// TrayState - 托盘工作状态
// ==========================================

/// 单次优化调用内的托盘工作状态
///
/// 不变式: available 与已占用槽位互斥,两者并集恒为全部槽位
#[derive(Debug, Clone)]
pub struct TrayState {
    /// 槽位 -> 装载内容
    pub slots: TrayLocations,
    /// 仍可用的槽位编号
    pub available: BTreeSet<usize>,
}

impl TrayState {
    /// 构建空托盘状态
    pub fn new(profile: &TrayProfile) -> Self {
        Self {
            slots: vec![None; profile.slot_count],
            available: (0..profile.slot_count).collect(),
        }
    }

    /// 可用槽位数
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// 可用槽位编号(升序)
    pub fn available_sorted(&self) -> Vec<usize> {
        self.available.iter().copied().collect()
    }
}

// ==========================================
// SetPlacer - 套组摆放引擎
// ==========================================
// 红线: 无状态引擎,槽位选择有界(线性窗口扫描,不枚举组合)
pub struct SetPlacer;

impl SetPlacer {
    pub fn new() -> Self {
        Self
    }

    /// 为一整套试剂选择槽位(不提交)
    ///
    /// 选择规则:
    /// 1) 大用量试剂(达到阈值)优先整体匹配空闲大容量槽,
    ///    剩余试剂取编号最小的其余空槽
    /// 2) 否则在升序可用槽位上做连续窗口线性扫描,
    ///    取"套内最小测试数"最大的窗口
    ///
    /// 返回的槽位顺序与试剂按用量降序一一对应
    /// (最大试剂 -> 剩余容量最大的槽)。
    ///
    /// # 返回
    /// - `Some(locations)`: 可行槽位组合
    /// - `None`: 无可行组合(数量不足或所有窗口测试数为0)
    pub fn select_locations(
        &self,
        profile: &TrayProfile,
        state: &TrayState,
        experiment: &Experiment,
    ) -> Option<Vec<usize>> {
        let needed = experiment.reagent_count();
        // 空试剂清单违反目录不变式,按不可摆放处理(定制目录防护)
        if needed == 0 {
            return None;
        }
        let available = state.available_sorted();
        if available.len() < needed {
            return None;
        }

        let sorted_reagents = Self::sorted_by_volume_desc(experiment);

        // 规则1: 大用量试剂优先进大容量槽
        // 用量降序排列下,大用量试剂恰为前缀
        let high_count = sorted_reagents
            .iter()
            .filter(|r| profile.is_high_volume(r.volume_per_test))
            .count();
        if high_count > 0 {
            let high_free: Vec<usize> = available
                .iter()
                .copied()
                .filter(|&loc| profile.is_high_capacity(loc))
                .collect();
            if high_free.len() >= high_count {
                let used_high = &high_free[..high_count];
                let rest: Vec<usize> = available
                    .iter()
                    .copied()
                    .filter(|loc| !used_high.contains(loc))
                    .collect();
                let low_count = needed - high_count;
                if rest.len() >= low_count {
                    let mut locations = used_high.to_vec();
                    locations.extend_from_slice(&rest[..low_count]);
                    if Self::min_tests(profile, &sorted_reagents, &locations) > 0 {
                        return Some(locations);
                    }
                    // 有试剂连一次测试都装不下,交给窗口扫描统一拒绝
                }
            }
        }

        // 规则2: 连续窗口线性扫描(窗口数与槽位数同阶,杜绝组合爆炸)
        let mut best: Option<(u32, Vec<usize>)> = None;
        for window in available.windows(needed) {
            let min_tests = Self::min_tests(profile, &sorted_reagents, window);
            if min_tests > best.as_ref().map_or(0, |(tests, _)| *tests) {
                best = Some((min_tests, window.to_vec()));
            }
        }
        best.map(|(_, locations)| locations)
    }

    /// 套内最小测试数(试剂按用量降序与槽位一一对应)
    fn min_tests(profile: &TrayProfile, sorted_reagents: &[&Reagent], locations: &[usize]) -> u32 {
        sorted_reagents
            .iter()
            .zip(locations)
            .map(|(reagent, &loc)| {
                calculate_tests(reagent.volume_per_test, profile.capacity_of_location(loc))
            })
            .min()
            .unwrap_or(0)
    }

    /// 假设在给定槽位追加一套后,该实验合并测试总数会变成多少
    ///
    /// 纯函数,不修改状态。用于第二阶段的收益评估。
    pub fn simulate_total_tests(
        &self,
        profile: &TrayProfile,
        state: &TrayState,
        experiment: &Experiment,
        locations: &[usize],
    ) -> u32 {
        let sorted_reagents = Self::sorted_by_volume_desc(experiment);
        let mut added: BTreeMap<&str, u32> = BTreeMap::new();
        for (reagent, &loc) in sorted_reagents.iter().zip(locations) {
            let tests = calculate_tests(reagent.volume_per_test, profile.capacity_of_location(loc));
            *added.entry(reagent.code.as_str()).or_insert(0) += tests;
        }

        experiment
            .reagents
            .iter()
            .map(|reagent| {
                self.pooled_tests_for_code(state, experiment.id, &reagent.code)
                    + added.get(reagent.code.as_str()).copied().unwrap_or(0)
            })
            .min()
            .unwrap_or(0)
    }

    /// 原子提交一整套摆放
    ///
    /// 同时完成:
    /// (a) 写入全部槽位内容
    /// (b) 从可用集合移除槽位
    /// (c) 追加套组记录
    /// (d) 按试剂代码合并重算该实验的测试总数
    ///
    /// 调用方保证 locations 均为当前空槽(select_locations 的输出)。
    pub fn commit_set(
        &self,
        profile: &TrayProfile,
        state: &mut TrayState,
        experiment: &Experiment,
        locations: &[usize],
        result: &mut ExperimentResult,
    ) {
        let sorted_reagents = Self::sorted_by_volume_desc(experiment);
        debug_assert_eq!(sorted_reagents.len(), locations.len());

        let mut placements = Vec::with_capacity(locations.len());
        for (reagent, &loc) in sorted_reagents.iter().zip(locations) {
            debug_assert!(state.available.contains(&loc), "槽位{}已被占用", loc);
            let capacity = profile.capacity_of_location(loc);
            let tests = calculate_tests(reagent.volume_per_test, capacity);
            placements.push(SetPlacement {
                reagent_code: reagent.code.clone(),
                location: loc,
                tests,
                volume_per_test: reagent.volume_per_test,
            });
            state.slots[loc] = Some(SlotContent {
                reagent_code: reagent.code.clone(),
                experiment_id: experiment.id,
                tests_possible: tests,
                volume_per_test: reagent.volume_per_test,
                capacity_ml: capacity,
            });
            state.available.remove(&loc);
        }

        let tests_per_set = placements.iter().map(|p| p.tests).min().unwrap_or(0);
        debug!(
            experiment_id = experiment.id,
            set_no = result.sets.len() + 1,
            tests_per_set,
            locations = ?locations,
            "提交套组摆放"
        );

        result.sets.push(ReagentSet {
            placements,
            tests_per_set,
        });
        result.total_tests = self.pooled_total_tests(state, experiment);
    }

    /// 按试剂代码合并计算实验当前的测试总数
    ///
    /// 对每种试剂代码累加该实验占用槽位的测试数,取最小值。
    pub fn pooled_total_tests(&self, state: &TrayState, experiment: &Experiment) -> u32 {
        experiment
            .reagents
            .iter()
            .map(|reagent| self.pooled_tests_for_code(state, experiment.id, &reagent.code))
            .min()
            .unwrap_or(0)
    }

    fn pooled_tests_for_code(&self, state: &TrayState, experiment_id: u32, code: &str) -> u32 {
        state
            .slots
            .iter()
            .flatten()
            .filter(|s| s.experiment_id == experiment_id && s.reagent_code == code)
            .map(|s| s.tests_possible)
            .sum()
    }

    /// 试剂按用量降序(同量保持目录顺序)
    fn sorted_by_volume_desc(experiment: &Experiment) -> Vec<&Reagent> {
        let mut reagents: Vec<&Reagent> = experiment.reagents.iter().collect();
        reagents.sort_by(|a, b| b.volume_per_test.total_cmp(&a.volume_per_test));
        reagents
    }
}

impl Default for SetPlacer {
    fn default() -> Self {
        Self::new()
    }
}
