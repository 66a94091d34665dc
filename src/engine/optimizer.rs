// ==========================================
// 试剂托盘配置系统 - 托盘优化引擎
// ==========================================
// 职责: 两阶段贪心分配的编排
// 输入: 选中实验编号 + 日测试需求
// 输出: 完整托盘配置 (TrayConfiguration)
// 红线: 校验先行,校验失败不产生任何部分状态
// ==========================================

use crate::config::TrayProfile;
use crate::domain::catalog::{Catalog, Experiment};
use crate::domain::configuration::{ExperimentResult, TrayConfiguration};
use crate::engine::error::{OptimizeError, OptimizeResult};
use crate::engine::placement::{SetPlacer, TrayState};
use crate::engine::priority::ExperimentPrioritizer;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};


// ==========================================
// TrayOptimizer - 托盘优化引擎
// ==========================================

/// 托盘优化引擎
///
/// 目录与托盘参数在构建时注入且只读,每次 optimize 调用
/// 独立构建工作状态,可跨线程并发调用。
pub struct TrayOptimizer {
    catalog: Arc<Catalog>,
    profile: TrayProfile,
    prioritizer: ExperimentPrioritizer,
    placer: SetPlacer,
}

/// 第二阶段候选评估结果
struct FillCandidate {
    experiment_id: u32,
    locations: Vec<usize>,
    new_total_tests: u32,
    /// 该实验自身的天数增量
    improvement: f64,
    /// 提交后的整托盘运行天数(各实验天数最小值)
    new_overall_days: f64,
}

impl TrayOptimizer {
    /// 使用标准托盘参数创建优化引擎
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_profile(catalog, TrayProfile::default())
    }

    /// 使用指定托盘参数创建优化引擎
    pub fn with_profile(catalog: Arc<Catalog>, profile: TrayProfile) -> Self {
        Self {
            catalog,
            profile,
            prioritizer: ExperimentPrioritizer::new(),
            placer: SetPlacer::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn profile(&self) -> &TrayProfile {
        &self.profile
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行托盘配置优化
    ///
    /// 流程:
    /// 1) 输入校验 (未知实验 / 无效日测数 / 槽位总量)
    /// 2) 第一阶段: 按优先级为每个实验摆放一套(保底覆盖)
    /// 3) 第二阶段: 增量填充剩余槽位,优先抬升瓶颈实验
    /// 4) 收尾: 计算各实验与整托盘运行天数
    ///
    /// # 参数
    /// - `selected`: 选中的实验编号(重复编号自动去重)
    /// - `daily_counts`: 实验编号 -> 日测试需求(正数)
    ///
    /// # 返回
    /// 完整托盘配置;任何校验或摆放失败都中止整个调用
    #[instrument(skip(self, selected, daily_counts), fields(selected_count = selected.len()))]
    pub fn optimize(
        &self,
        selected: &[u32],
        daily_counts: &BTreeMap<u32, f64>,
    ) -> OptimizeResult<TrayConfiguration> {
        let selected: Vec<u32> = selected
            .iter()
            .copied()
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect();

        self.validate(&selected, daily_counts)?;

        let mut state = TrayState::new(&self.profile);
        let mut results: BTreeMap<u32, ExperimentResult> = BTreeMap::new();

        // ==========================================
        // 第一阶段: 保底覆盖(每实验一套)
        // ==========================================
        let order = self
            .prioritizer
            .sort(&self.catalog, &self.profile, &selected, daily_counts);
        debug!(order = ?order, "第一阶段摆放顺序");

        for id in &order {
            self.place_one_set(*id, daily_counts, &mut state, &mut results)?;
        }
        info!(
            occupied = self.profile.slot_count - state.available_count(),
            "第一阶段完成"
        );

        // ==========================================
        // 第二阶段: 增量填充剩余槽位
        // ==========================================
        while state.available_count() > 0 {
            let candidate = self.best_fill_candidate(&selected, daily_counts, &state, &results);
            let Some(candidate) = candidate else {
                debug!(
                    leftover = state.available_count(),
                    "无正收益候选,第二阶段结束"
                );
                break;
            };

            debug!(
                experiment_id = candidate.experiment_id,
                improvement = candidate.improvement,
                new_overall_days = candidate.new_overall_days,
                "第二阶段追加套组"
            );
            self.commit_candidate(&candidate, &mut state, &mut results)?;
        }

        // ==========================================
        // 收尾: 运行天数计算
        // ==========================================
        Ok(self.finalize(state, results, daily_counts))
    }

    // ==========================================
    // 输入校验
    // ==========================================

    /// 校验选中实验与日测试需求(失败即中止,不改动任何状态)
    fn validate(&self, selected: &[u32], daily_counts: &BTreeMap<u32, f64>) -> OptimizeResult<()> {
        for &id in selected {
            if !self.catalog.contains(id) {
                return Err(OptimizeError::UnknownExperiment { id });
            }
        }

        for &id in selected {
            match daily_counts.get(&id) {
                Some(&count) if count > 0.0 => {}
                _ => return Err(OptimizeError::InvalidDailyCount { id }),
            }
        }

        let breakdown: Vec<(u32, usize)> = selected
            .iter()
            .filter_map(|&id| self.catalog.get(id).map(|e| (id, e.reagent_count())))
            .collect();
        let total_needed: usize = breakdown.iter().map(|(_, count)| count).sum();
        if total_needed > self.profile.slot_count {
            return Err(OptimizeError::CapacityExceeded {
                total_needed,
                capacity: self.profile.slot_count,
                breakdown,
            });
        }

        Ok(())
    }

    // ==========================================
    // 摆放辅助
    // ==========================================

    fn experiment(&self, id: u32) -> OptimizeResult<&Experiment> {
        self.catalog
            .get(id)
            .ok_or(OptimizeError::UnknownExperiment { id })
    }

    /// 为实验追加一套摆放(选槽 + 原子提交)
    fn place_one_set(
        &self,
        id: u32,
        daily_counts: &BTreeMap<u32, f64>,
        state: &mut TrayState,
        results: &mut BTreeMap<u32, ExperimentResult>,
    ) -> OptimizeResult<()> {
        let experiment = self.experiment(id)?;
        let locations = self
            .placer
            .select_locations(&self.profile, state, experiment)
            .ok_or(OptimizeError::PlacementImpossible { experiment_id: id })?;

        let daily_count = daily_counts.get(&id).copied().unwrap_or(0.0);
        let result = results.entry(id).or_insert_with(|| ExperimentResult {
            name: experiment.name.clone(),
            daily_count,
            sets: Vec::new(),
            total_tests: 0,
            actual_total_tests: 0,
            days_of_operation: 0.0,
        });
        self.placer
            .commit_set(&self.profile, state, experiment, &locations, result);
        Ok(())
    }

    /// 评估第二阶段的最优追加候选
    ///
    /// 对每个"下一套仍放得下"的实验模拟追加一套,
    /// 选取提交后整托盘运行天数最大的候选(优先抬升瓶颈实验);
    /// 并列时取自身天数增量更大者,再取编号较小者。
    /// 无正收益候选时返回 None(剩余槽位永久留空)。
    fn best_fill_candidate(
        &self,
        selected: &[u32],
        daily_counts: &BTreeMap<u32, f64>,
        state: &TrayState,
        results: &BTreeMap<u32, ExperimentResult>,
    ) -> Option<FillCandidate> {
        let mut best: Option<FillCandidate> = None;

        for &id in selected {
            let Ok(experiment) = self.experiment(id) else {
                continue;
            };
            if experiment.reagent_count() > state.available_count() {
                continue;
            }
            let Some(locations) = self
                .placer
                .select_locations(&self.profile, state, experiment)
            else {
                continue;
            };

            let daily_count = daily_counts.get(&id).copied().unwrap_or(0.0);
            if daily_count <= 0.0 {
                continue;
            }
            let current_total = results.get(&id).map_or(0, |r| r.total_tests);
            let new_total =
                self.placer
                    .simulate_total_tests(&self.profile, state, experiment, &locations);
            let improvement = f64::from(new_total.saturating_sub(current_total)) / daily_count;
            if improvement <= 0.0 {
                continue;
            }

            // 提交后的整托盘运行天数: 本实验用新天数,其余实验用当前天数
            let new_days = f64::from(new_total) / daily_count;
            let new_overall_days = results
                .iter()
                .map(|(&other_id, other)| {
                    if other_id == id {
                        new_days
                    } else {
                        f64::from(other.total_tests) / other.daily_count
                    }
                })
                .fold(f64::INFINITY, f64::min);

            let is_better = match &best {
                None => true,
                Some(current_best) => {
                    match new_overall_days.total_cmp(&current_best.new_overall_days) {
                        std::cmp::Ordering::Greater => true,
                        std::cmp::Ordering::Less => false,
                        std::cmp::Ordering::Equal => improvement > current_best.improvement,
                    }
                }
            };
            if is_better {
                best = Some(FillCandidate {
                    experiment_id: id,
                    locations,
                    new_total_tests: new_total,
                    improvement,
                    new_overall_days,
                });
            }
        }

        best
    }

    fn commit_candidate(
        &self,
        candidate: &FillCandidate,
        state: &mut TrayState,
        results: &mut BTreeMap<u32, ExperimentResult>,
    ) -> OptimizeResult<()> {
        let experiment = self.experiment(candidate.experiment_id)?;
        let result = results
            .get_mut(&candidate.experiment_id)
            .ok_or(OptimizeError::PlacementImpossible {
                experiment_id: candidate.experiment_id,
            })?;
        self.placer
            .commit_set(&self.profile, state, experiment, &candidate.locations, result);
        debug_assert_eq!(result.total_tests, candidate.new_total_tests);
        Ok(())
    }

    // ==========================================
    // 收尾计算
    // ==========================================

    /// 计算各实验与整托盘的运行天数(保留1位小数)
    fn finalize(
        &self,
        state: TrayState,
        mut results: BTreeMap<u32, ExperimentResult>,
        daily_counts: &BTreeMap<u32, f64>,
    ) -> TrayConfiguration {
        for (id, result) in results.iter_mut() {
            if let Some(&daily) = daily_counts.get(id) {
                result.daily_count = daily;
                result.days_of_operation = round_days(f64::from(result.total_tests) / daily);
            }
        }

        let overall_days = if results.is_empty() {
            0.0
        } else {
            results
                .values()
                .map(|r| r.days_of_operation)
                .fold(f64::INFINITY, f64::min)
        };

        // 整托盘耗尽后,单实验多出的余量不再可用
        for result in results.values_mut() {
            let usable = (overall_days * result.daily_count).floor() as u32;
            result.actual_total_tests = result.total_tests.min(usable);
        }

        info!(
            overall_days,
            experiments = results.len(),
            "优化完成"
        );

        TrayConfiguration {
            tray_locations: state.slots,
            results,
            overall_days_of_operation: overall_days,
        }
    }
}

/// 运行天数统一保留1位小数
fn round_days(days: f64) -> f64 {
    (days * 10.0).round() / 10.0
}
