// ==========================================
// 托盘优化端到端测试(公共API闭环)
// ==========================================
// 目标:
// - 单实验整盘填充 / 恰好满盘 / 超容量拒绝 / 瓶颈转移
// - 槽位互斥、瓶颈天数定律、配置自洽校验等不变式
// ==========================================

use reagent_tray_dss::{
    Catalog, ConfigurationExporter, OptimizeError, SummaryEngine, TrayConfiguration,
    TrayOptimizer, TrayProfile,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// ==========================================
// 测试辅助函数
// ==========================================

fn standard_optimizer() -> TrayOptimizer {
    reagent_tray_dss::logging::init_test();
    TrayOptimizer::new(Arc::new(Catalog::standard()))
}

fn daily(entries: &[(u32, f64)]) -> BTreeMap<u32, f64> {
    entries.iter().copied().collect()
}

/// 断言: 每个槽位至多出现在一条摆放记录中,且与槽位数组一致
fn assert_slot_exclusivity(config: &TrayConfiguration) {
    let mut seen = BTreeSet::new();
    for (id, result) in &config.results {
        for set in &result.sets {
            for placement in &set.placements {
                assert!(
                    seen.insert(placement.location),
                    "槽位{}被多条摆放记录引用",
                    placement.location
                );
                let slot = config.tray_locations[placement.location]
                    .as_ref()
                    .unwrap_or_else(|| panic!("槽位{}缺少装载内容", placement.location));
                assert_eq!(slot.experiment_id, *id);
                assert_eq!(slot.reagent_code, placement.reagent_code);
                assert_eq!(slot.tests_possible, placement.tests);
            }
        }
    }
    assert_eq!(seen.len(), config.occupied_count());
}

/// 断言: 整托盘天数 = 各实验天数的最小值
fn assert_bottleneck_law(config: &TrayConfiguration) {
    let min_days = config
        .results
        .values()
        .map(|r| r.days_of_operation)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(config.overall_days_of_operation, min_days);
}

// ==========================================
// 场景A: 单实验整盘填充
// ==========================================

#[test]
fn test_scenario_a_single_experiment_fills_tray() {
    let optimizer = standard_optimizer();
    // 实验1: 2试剂 (850µL / 300µL), 日需求1
    let config = optimizer.optimize(&[1], &daily(&[(1, 1.0)])).unwrap();

    // 16槽位全部被同一实验的8套占满
    assert_eq!(config.occupied_count(), 16);
    let result = &config.results[&1];
    assert_eq!(result.sets.len(), 8);

    // 前2套落大容量槽: 每套 850->317, 300->900
    // 后6套落标准槽:   每套 850->164, 300->466
    // KR1E合并: 2*317 + 6*164 = 1618 (瓶颈试剂)
    assert_eq!(result.total_tests, 1618);
    assert_eq!(result.days_of_operation, 1618.0);
    assert_eq!(config.overall_days_of_operation, 1618.0);

    assert_slot_exclusivity(&config);
    assert_bottleneck_law(&config);
}

// ==========================================
// 场景B: 一套合计恰好16槽
// ==========================================

#[test]
fn test_scenario_b_exact_capacity_fit() {
    let optimizer = standard_optimizer();
    // 4+3+3+3+3 = 16
    let ids = [16, 10, 28, 6, 19];
    let counts: Vec<(u32, f64)> = ids.iter().map(|&id| (id, 2.0)).collect();
    let config = optimizer.optimize(&ids, &daily(&counts)).unwrap();

    assert_eq!(config.occupied_count(), 16);
    assert!(config.empty_locations().is_empty());
    assert_eq!(config.results.len(), 5);
    for (id, result) in &config.results {
        assert_eq!(result.sets.len(), 1, "实验{}应恰有一套", id);
    }

    assert_slot_exclusivity(&config);
    assert_bottleneck_law(&config);
}

// ==========================================
// 场景C: 超出槽位容量
// ==========================================

#[test]
fn test_scenario_c_capacity_exceeded() {
    let optimizer = standard_optimizer();
    // 6个3试剂实验 = 18槽 > 16槽
    let ids = [6, 10, 12, 19, 28, 30];
    let counts: Vec<(u32, f64)> = ids.iter().map(|&id| (id, 1.0)).collect();
    let err = optimizer.optimize(&ids, &daily(&counts)).unwrap_err();

    match err {
        OptimizeError::CapacityExceeded {
            total_needed,
            capacity,
            breakdown,
        } => {
            assert_eq!(total_needed, 18);
            assert_eq!(capacity, 16);
            // 明细让调用方看清各实验的槽位需求
            let from_breakdown: usize = breakdown.iter().map(|(_, c)| c).sum();
            assert_eq!(from_breakdown, 18);
        }
        other => panic!("期望CapacityExceeded, 实际{:?}", other),
    }
}

// ==========================================
// 场景D: 高日需求实验优先获得追加套组
// ==========================================

#[test]
fn test_scenario_d_bottleneck_gets_additional_sets() {
    let optimizer = standard_optimizer();
    // 实验9与17各2试剂1000µL, 日需求10 vs 1
    let config = optimizer
        .optimize(&[9, 17], &daily(&[(9, 10.0), (17, 1.0)]))
        .unwrap();

    let busy = &config.results[&9];
    let idle = &config.results[&17];

    // 追加套组全部给了日需求大的瓶颈实验
    assert_eq!(busy.sets.len(), 7);
    assert_eq!(idle.sets.len(), 1);

    // 每代码: 270(大容量槽) + 6*140(标准槽) = 1110
    assert_eq!(busy.total_tests, 1110);
    assert_eq!(idle.total_tests, 270);
    assert_eq!(busy.days_of_operation, 111.0);
    assert_eq!(idle.days_of_operation, 270.0);
    assert_eq!(config.overall_days_of_operation, 111.0);

    assert_slot_exclusivity(&config);
    assert_bottleneck_law(&config);
}

// ==========================================
// 不变式: 瓶颈定律与配置自洽
// ==========================================

#[test]
fn test_bottleneck_law_on_mixed_selection() {
    let optimizer = standard_optimizer();
    let config = optimizer
        .optimize(
            &[1, 3, 11, 20],
            &daily(&[(1, 4.0), (3, 2.0), (11, 7.0), (20, 1.5)]),
        )
        .unwrap();

    assert_bottleneck_law(&config);
    assert_slot_exclusivity(&config);
}

#[test]
fn test_fresh_configurations_validate() {
    reagent_tray_dss::logging::init_test();
    let catalog = Arc::new(Catalog::standard());
    let profile = TrayProfile::default();
    let optimizer = TrayOptimizer::new(catalog.clone());
    let summary_engine = SummaryEngine::new();

    let selections: [(&[u32], &[(u32, f64)]); 3] = [
        (&[1], &[(1, 1.0)]),
        (&[9, 17], &[(9, 10.0), (17, 1.0)]),
        (&[2, 5, 14], &[(2, 3.0), (5, 1.0), (14, 6.0)]),
    ];
    for (ids, counts) in selections {
        let config = optimizer.optimize(ids, &daily(counts)).unwrap();
        assert!(
            summary_engine.validate(&catalog, &profile, &config),
            "选择{:?}的配置未通过自洽校验",
            ids
        );
    }
}

// ==========================================
// 不变式: 槽位增加不降低整托盘天数
// ==========================================

#[test]
fn test_monotonicity_with_extra_slot() {
    reagent_tray_dss::logging::init_test();
    let catalog = Arc::new(Catalog::standard());
    let selection = [1u32, 2u32];
    let counts = daily(&[(1, 5.0), (2, 3.0)]);

    let base = TrayOptimizer::new(catalog.clone())
        .optimize(&selection, &counts)
        .unwrap();

    let wider_profile = TrayProfile {
        slot_count: 17,
        ..TrayProfile::default()
    };
    let wider = TrayOptimizer::with_profile(catalog, wider_profile)
        .optimize(&selection, &counts)
        .unwrap();

    assert!(
        wider.overall_days_of_operation >= base.overall_days_of_operation,
        "17槽位({})不应低于16槽位({})",
        wider.overall_days_of_operation,
        base.overall_days_of_operation
    );
}

// ==========================================
// 导出与摘要的端到端串联
// ==========================================

#[test]
fn test_summary_and_export_pipeline() {
    let optimizer = standard_optimizer();
    let profile = TrayProfile::default();
    let config = optimizer
        .optimize(&[9, 17], &daily(&[(9, 10.0), (17, 1.0)]))
        .unwrap();

    let summary = SummaryEngine::new().summarize(&profile, &config);
    assert_eq!(summary.occupied_locations, 16);
    assert_eq!(summary.capacity_utilization, 1.0);
    assert_eq!(summary.experiments.len(), 2);

    let exporter = ConfigurationExporter::new();
    let json = exporter.export(&config, "json").unwrap();
    assert!(json.contains("overall_days_of_operation"));
    let csv = exporter.export(&config, "csv").unwrap();
    assert!(csv.contains("KR9E1"));
}
