// ==========================================
// 试剂托盘配置系统 - 实验目录
// ==========================================
// 职责: 标准化验套组的静态目录(实验 -> 试剂清单)
// 红线: 进程启动后只读,可跨调用安全共享
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Reagent - 试剂定义
// ==========================================

/// 试剂定义(目录内嵌,不做全局去重)
///
/// 同一试剂代码可能出现在多个实验中(共用物理试剂),
/// 但单测耗量以所属实验的条目为准。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reagent {
    pub code: String,          // 试剂代码 (如 KR1E)
    pub volume_per_test: f64,  // 单测耗量 (µL), 恒为正数(目录不变式)
}

// ==========================================
// Experiment - 化验实验定义
// ==========================================

/// 化验实验定义(静态目录条目)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub id: u32,                // 实验编号
    pub name: String,           // 实验名称
    pub reagents: Vec<Reagent>, // 试剂清单(有序,至少一项)
}

impl Experiment {
    /// 一整套所需试剂数(即占用槽位数)
    pub fn reagent_count(&self) -> usize {
        self.reagents.len()
    }

    /// 清单内最大单测耗量 (µL)
    pub fn max_volume(&self) -> f64 {
        self.reagents
            .iter()
            .map(|r| r.volume_per_test)
            .fold(0.0, f64::max)
    }
}

// ==========================================
// Catalog - 实验目录
// ==========================================

/// 实验目录
///
/// 进程启动时构建一次,之后只读。并发调用优化引擎时
/// 通过 Arc 共享,无需加锁。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    experiments: BTreeMap<u32, Experiment>,
}

impl Catalog {
    /// 从实验列表构建目录(测试与定制仪器场景)
    pub fn from_experiments(experiments: Vec<Experiment>) -> Self {
        Self {
            experiments: experiments.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    /// 标准仪器目录(32个化验实验)
    pub fn standard() -> Self {
        Self::from_experiments(vec![
            entry(1, "Copper (II) (LR)", &[("KR1E", 850.0), ("KR1S", 300.0)]),
            entry(2, "Lead (II) Cadmium (II)", &[("KR1E", 850.0), ("KR2S", 400.0)]),
            entry(3, "Arsenic (III)", &[("KR3E", 850.0), ("KR3S", 400.0)]),
            entry(4, "Nitrates-N (LR)", &[("KR4E", 850.0), ("KR4S", 300.0)]),
            entry(5, "Chromium (VI) (LR)", &[("KR5E", 500.0), ("KR5S", 400.0)]),
            entry(
                6,
                "Manganese (II) (LR)",
                &[("KR6E1", 500.0), ("KR6E2", 500.0), ("KR6E3", 300.0)],
            ),
            entry(7, "Boron (Dissolved)", &[("KR7E1", 1100.0), ("KR7E2", 1860.0)]),
            entry(8, "Silica (Dissolved)", &[("KR8E1", 500.0), ("KR8E2", 1600.0)]),
            entry(9, "Free Chlorine", &[("KR9E1", 1000.0), ("KR9E2", 1000.0)]),
            entry(
                10,
                "Total Hardness",
                &[("KR10E1", 2000.0), ("KR10E2", 2000.0), ("KR10E3", 1600.0)],
            ),
            entry(11, "Total Alkalinity (LR)", &[("KR11E", 1000.0)]),
            entry(
                12,
                "Orthophosphates-P (LR)",
                &[("KR12E1", 500.0), ("KR12E2", 500.0), ("KR12E3", 200.0)],
            ),
            entry(13, "Mercury (II)", &[("KR13E1", 850.0), ("KR13S", 300.0)]),
            entry(14, "Selenium (IV)", &[("KR14E", 500.0), ("KR14S", 300.0)]),
            entry(15, "Zinc (II) (LR)", &[("KR15E", 850.0), ("KR15S", 400.0)]),
            entry(
                16,
                "Iron (Dissolved)",
                &[
                    ("KR16E1", 1000.0),
                    ("KR16E2", 1000.0),
                    ("KR16E3", 1000.0),
                    ("KR16E4", 1000.0),
                ],
            ),
            entry(17, "Residual Chlorine", &[("KR17E1", 1000.0), ("KR17E2", 1000.0)]),
            entry(18, "Zinc (HR)", &[("KR18E1", 1000.0), ("KR18E2", 1000.0)]),
            entry(
                19,
                "Manganese (HR)",
                &[("KR19E1", 1000.0), ("KR19E2", 1000.0), ("KR19E3", 1000.0)],
            ),
            entry(20, "Orthophosphates-P (HR)", &[("KR20E", 1600.0)]),
            entry(21, "Total Alkalinity (HR)", &[("KR21E1", 1000.0)]),
            entry(22, "Fluoride", &[("KR22E1", 1000.0), ("KR22E2", 1000.0)]),
            entry(27, "Molybdenum", &[("KR27E1", 1000.0), ("KR27E2", 1000.0)]),
            entry(
                28,
                "Nitrates-N (HR)",
                &[("KR28E1", 1000.0), ("KR28E2", 2000.0), ("KR28E3", 2000.0)],
            ),
            entry(
                29,
                "Total Ammonia-N",
                &[("KR29E1", 850.0), ("KR29E2", 850.0), ("KR29E3", 850.0)],
            ),
            entry(
                30,
                "Chromium (HR)",
                &[("KR30E1", 1000.0), ("KR30E2", 1000.0), ("KR30E3", 1000.0)],
            ),
            entry(31, "Nitrite-N", &[("KR31E1", 1000.0), ("KR31E2", 1000.0)]),
            entry(34, "Nickel (HR)", &[("KR34E1", 500.0), ("KR34E2", 500.0)]),
            entry(35, "Copper (II) (HR)", &[("KR35E1", 1000.0), ("KR35E2", 1000.0)]),
            entry(36, "Sulfate", &[("KR36E1", 1000.0), ("KR36E2", 2300.0)]),
            entry(40, "Potassium", &[("KR40E1", 2000.0), ("KR40E2", 1000.0)]),
            entry(42, "Aluminum-BB", &[("KR42E1", 1000.0), ("KR42E2", 1000.0)]),
        ])
    }

    /// 按编号查询实验
    pub fn get(&self, id: u32) -> Option<&Experiment> {
        self.experiments.get(&id)
    }

    /// 实验编号是否存在
    pub fn contains(&self, id: u32) -> bool {
        self.experiments.contains_key(&id)
    }

    /// 按编号升序遍历全部实验
    pub fn iter(&self) -> impl Iterator<Item = &Experiment> {
        self.experiments.values()
    }

    /// 实验数量
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// 按试剂代码查找首个使用该试剂的实验
    pub fn find_reagent(&self, code: &str) -> Option<(&Experiment, &Reagent)> {
        self.experiments.values().find_map(|exp| {
            exp.reagents
                .iter()
                .find(|r| r.code == code)
                .map(|r| (exp, r))
        })
    }
}

/// 目录条目构造辅助函数
fn entry(id: u32, name: &str, reagents: &[(&str, f64)]) -> Experiment {
    Experiment {
        id,
        name: name.to_string(),
        reagents: reagents
            .iter()
            .map(|(code, volume)| Reagent {
                code: code.to_string(),
                volume_per_test: *volume,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_size() {
        // 编号1-22, 27-31, 34-36, 40, 42 共32个
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 32);
        assert!(catalog.contains(1));
        assert!(catalog.contains(42));
        assert!(!catalog.contains(23));
    }

    #[test]
    fn test_reagent_volumes_positive() {
        // 目录不变式: 单测耗量恒为正数
        let catalog = Catalog::standard();
        for exp in catalog.iter() {
            assert!(!exp.reagents.is_empty(), "实验{}无试剂清单", exp.id);
            for reagent in &exp.reagents {
                assert!(reagent.volume_per_test > 0.0);
            }
        }
    }

    #[test]
    fn test_shared_reagent_code_lookup() {
        // KR1E 同时出现在实验1和实验2,查找返回编号最小的实验
        let catalog = Catalog::standard();
        let (exp, reagent) = catalog.find_reagent("KR1E").unwrap();
        assert_eq!(exp.id, 1);
        assert_eq!(reagent.volume_per_test, 850.0);
    }

    #[test]
    fn test_max_volume() {
        let catalog = Catalog::standard();
        let exp = catalog.get(1).unwrap();
        assert_eq!(exp.max_volume(), 850.0);
        assert_eq!(exp.reagent_count(), 2);
    }
}
