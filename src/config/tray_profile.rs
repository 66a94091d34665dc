// ==========================================
// 试剂托盘配置系统 - 托盘参数
// ==========================================
// 职责: 描述仪器托盘的硬件参数(槽位数/容量等级/大容量阈值)
// 默认值对应标准16槽位仪器,不同型号通过参数覆写表达
// ==========================================

use serde::{Deserialize, Serialize};

/// 托盘硬件参数
///
/// 槽位容量是槽位编号的纯函数:
/// 编号 < high_capacity_slots 的槽位为大容量槽,其余为标准槽。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrayProfile {
    /// 槽位总数
    #[serde(default = "default_slot_count")]
    pub slot_count: usize,

    /// 大容量槽位数(占据编号最小的槽位)
    #[serde(default = "default_high_capacity_slots")]
    pub high_capacity_slots: usize,

    /// 大容量槽容量 (mL)
    #[serde(default = "default_high_capacity_ml")]
    pub high_capacity_ml: f64,

    /// 标准槽容量 (mL)
    #[serde(default = "default_standard_capacity_ml")]
    pub standard_capacity_ml: f64,

    /// 大用量试剂阈值 (µL): 单测耗量达到该值的试剂优先进大容量槽
    #[serde(default = "default_high_volume_threshold_ul")]
    pub high_volume_threshold_ul: f64,
}

fn default_slot_count() -> usize {
    16
}

fn default_high_capacity_slots() -> usize {
    4
}

fn default_high_capacity_ml() -> f64 {
    270.0
}

fn default_standard_capacity_ml() -> f64 {
    140.0
}

fn default_high_volume_threshold_ul() -> f64 {
    800.0
}

impl Default for TrayProfile {
    fn default() -> Self {
        Self {
            slot_count: default_slot_count(),
            high_capacity_slots: default_high_capacity_slots(),
            high_capacity_ml: default_high_capacity_ml(),
            standard_capacity_ml: default_standard_capacity_ml(),
            high_volume_threshold_ul: default_high_volume_threshold_ul(),
        }
    }
}

impl TrayProfile {
    /// 槽位容量 (mL),槽位编号的纯函数
    pub fn capacity_of_location(&self, location: usize) -> f64 {
        if location < self.high_capacity_slots {
            self.high_capacity_ml
        } else {
            self.standard_capacity_ml
        }
    }

    /// 是否大容量槽
    pub fn is_high_capacity(&self, location: usize) -> bool {
        location < self.high_capacity_slots
    }

    /// 托盘总容量 (mL)
    pub fn total_capacity_ml(&self) -> f64 {
        (0..self.slot_count)
            .map(|loc| self.capacity_of_location(loc))
            .sum()
    }

    /// 试剂是否应优先占用大容量槽
    pub fn is_high_volume(&self, volume_per_test_ul: f64) -> bool {
        volume_per_test_ul >= self.high_volume_threshold_ul
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity_classes() {
        let profile = TrayProfile::default();
        // 槽位0-3为大容量槽 (270 mL)
        for loc in 0..4 {
            assert_eq!(profile.capacity_of_location(loc), 270.0);
            assert!(profile.is_high_capacity(loc));
        }
        // 槽位4-15为标准槽 (140 mL)
        for loc in 4..16 {
            assert_eq!(profile.capacity_of_location(loc), 140.0);
            assert!(!profile.is_high_capacity(loc));
        }
    }

    #[test]
    fn test_total_capacity() {
        let profile = TrayProfile::default();
        assert_eq!(profile.total_capacity_ml(), 4.0 * 270.0 + 12.0 * 140.0);
    }

    #[test]
    fn test_high_volume_threshold_inclusive() {
        let profile = TrayProfile::default();
        assert!(profile.is_high_volume(800.0));
        assert!(profile.is_high_volume(850.0));
        assert!(!profile.is_high_volume(799.9));
    }

    #[test]
    fn test_profile_deserialize_with_defaults() {
        // 缺省字段回落到标准16槽位参数
        let profile: TrayProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.slot_count, 16);
        assert_eq!(profile.high_capacity_slots, 4);

        let profile: TrayProfile = serde_json::from_str(r#"{"slot_count": 17}"#).unwrap();
        assert_eq!(profile.slot_count, 17);
        assert_eq!(profile.high_capacity_ml, 270.0);
    }
}
