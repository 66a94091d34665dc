// ==========================================
// 试剂托盘配置系统 - 实验排序引擎
// ==========================================
// 职责: 第一阶段摆放前的实验优先级排序
// 输入: 选中实验 + 日测试需求
// 输出: 按优先级降序的实验编号列表
// ==========================================

use crate::config::TrayProfile;
use crate::domain::catalog::{Catalog, Experiment};
use crate::domain::tray::calculate_tests;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ==========================================
// ExperimentMetrics - 排序指标
// ==========================================

/// 单实验的优先级指标
#[derive(Debug, Clone)]
pub struct ExperimentMetrics {
    pub experiment_id: u32,
    pub reagent_count: usize,  // 一套所需槽位数
    pub daily_count: f64,      // 日测试需求
    pub max_volume: f64,       // 最大单测耗量 (µL)
    /// 以大容量槽为基准估算的单套运行天数(瓶颈试剂)
    pub potential_days: f64,
}

// ==========================================
// ExperimentPrioritizer - 实验排序引擎
// ==========================================
// 红线: 无状态引擎,排序必须是全序且确定性的
pub struct ExperimentPrioritizer;

impl ExperimentPrioritizer {
    pub fn new() -> Self {
        Self
    }

    /// 计算单实验的优先级指标
    ///
    /// potential_days 以大容量槽容量为基准:
    /// min over 试剂 of calculate_tests(vol, 大容量) / daily_count
    pub fn metrics(
        &self,
        experiment: &Experiment,
        daily_count: f64,
        profile: &TrayProfile,
    ) -> ExperimentMetrics {
        let potential_days = experiment
            .reagents
            .iter()
            .map(|r| {
                f64::from(calculate_tests(r.volume_per_test, profile.high_capacity_ml))
                    / daily_count
            })
            .fold(f64::INFINITY, f64::min);

        ExperimentMetrics {
            experiment_id: experiment.id,
            reagent_count: experiment.reagent_count(),
            daily_count,
            max_volume: experiment.max_volume(),
            potential_days,
        }
    }

    /// 按优先级排序实验编号
    ///
    /// 排序键(全序,高优先级在前):
    /// 1) reagent_count 升序 (占槽少的先放,降低后续不可行风险)
    /// 2) daily_count 降序 (日需求大的优先争取好槽位)
    /// 3) max_volume 降序 (大用量试剂优先匹配大容量槽)
    /// 4) potential_days 升序 (单套天数少的更受约束,优先)
    /// 5) experiment_id 升序 (最终决胜,保证确定性)
    pub fn sort(
        &self,
        catalog: &Catalog,
        profile: &TrayProfile,
        selected: &[u32],
        daily_counts: &BTreeMap<u32, f64>,
    ) -> Vec<u32> {
        let mut metrics: Vec<ExperimentMetrics> = selected
            .iter()
            .filter_map(|id| {
                let experiment = catalog.get(*id)?;
                let daily = daily_counts.get(id).copied()?;
                Some(self.metrics(experiment, daily, profile))
            })
            .collect();

        metrics.sort_by(|a, b| Self::compare(a, b));
        metrics.into_iter().map(|m| m.experiment_id).collect()
    }

    fn compare(a: &ExperimentMetrics, b: &ExperimentMetrics) -> Ordering {
        a.reagent_count
            .cmp(&b.reagent_count)
            .then_with(|| b.daily_count.total_cmp(&a.daily_count))
            .then_with(|| b.max_volume.total_cmp(&a.max_volume))
            .then_with(|| a.potential_days.total_cmp(&b.potential_days))
            .then_with(|| a.experiment_id.cmp(&b.experiment_id))
    }
}

impl Default for ExperimentPrioritizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Experiment, Reagent};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    /// 创建测试用的实验
    fn create_test_experiment(id: u32, volumes: &[f64]) -> Experiment {
        Experiment {
            id,
            name: format!("实验{}", id),
            reagents: volumes
                .iter()
                .enumerate()
                .map(|(i, v)| Reagent {
                    code: format!("R{}-{}", id, i + 1),
                    volume_per_test: *v,
                })
                .collect(),
        }
    }

    fn daily(entries: &[(u32, f64)]) -> BTreeMap<u32, f64> {
        entries.iter().copied().collect()
    }

    // ==========================================
    // 排序场景测试
    // ==========================================

    #[test]
    fn test_scenario_01_fewer_reagents_first() {
        // 场景1: 占槽少的实验优先
        let catalog = Catalog::from_experiments(vec![
            create_test_experiment(1, &[500.0, 500.0, 500.0]),
            create_test_experiment(2, &[500.0, 500.0]),
        ]);
        let sorter = ExperimentPrioritizer::new();
        let order = sorter.sort(
            &catalog,
            &TrayProfile::default(),
            &[1, 2],
            &daily(&[(1, 1.0), (2, 1.0)]),
        );
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_scenario_02_higher_daily_count_first() {
        // 场景2: 占槽数相同时,日需求大的优先
        let catalog = Catalog::from_experiments(vec![
            create_test_experiment(1, &[500.0, 500.0]),
            create_test_experiment(2, &[500.0, 500.0]),
        ]);
        let sorter = ExperimentPrioritizer::new();
        let order = sorter.sort(
            &catalog,
            &TrayProfile::default(),
            &[1, 2],
            &daily(&[(1, 1.0), (2, 10.0)]),
        );
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_scenario_03_higher_max_volume_first() {
        // 场景3: 前两键相同时,最大用量大的优先(争取大容量槽)
        let catalog = Catalog::from_experiments(vec![
            create_test_experiment(1, &[500.0, 300.0]),
            create_test_experiment(2, &[850.0, 300.0]),
        ]);
        let sorter = ExperimentPrioritizer::new();
        let order = sorter.sort(
            &catalog,
            &TrayProfile::default(),
            &[1, 2],
            &daily(&[(1, 2.0), (2, 2.0)]),
        );
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_scenario_04_id_breaks_ties() {
        // 场景4: 全指标相同时按编号升序,保证确定性
        let catalog = Catalog::from_experiments(vec![
            create_test_experiment(7, &[500.0]),
            create_test_experiment(3, &[500.0]),
        ]);
        let sorter = ExperimentPrioritizer::new();
        let order = sorter.sort(
            &catalog,
            &TrayProfile::default(),
            &[7, 3],
            &daily(&[(3, 1.0), (7, 1.0)]),
        );
        assert_eq!(order, vec![3, 7]);
    }

    #[test]
    fn test_metrics_potential_days() {
        // 850µL@270mL -> 317测试, 日需求2 -> 158.5天
        let exp = create_test_experiment(1, &[850.0, 300.0]);
        let sorter = ExperimentPrioritizer::new();
        let m = sorter.metrics(&exp, 2.0, &TrayProfile::default());
        assert_eq!(m.reagent_count, 2);
        assert_eq!(m.max_volume, 850.0);
        assert!((m.potential_days - 158.5).abs() < 1e-9);
    }
}
