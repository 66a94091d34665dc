// ==========================================
// 试剂托盘配置系统 - 目录查询接口
// ==========================================
// 职责: 实验列表/试剂信息/槽位信息查询(供前端选择与展示)
// ==========================================

use crate::config::TrayProfile;
use crate::domain::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// 查询结果 DTO
// ==========================================

/// 实验列表项(选择界面用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentListing {
    pub id: u32,
    pub name: String,
}

/// 试剂信息(展示/调试用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReagentInfo {
    pub experiment_id: u32,
    pub experiment_name: String,
    pub volume: f64,
}

/// 槽位信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInfo {
    /// 面向操作员的1起编号
    pub location_number: usize,
    pub capacity: f64,
    pub is_high_capacity: bool,
}

// ==========================================
// CatalogApi - 目录查询接口
// ==========================================

/// 目录查询接口
///
/// 目录通过 Arc 共享,只读,可与优化引擎并发使用。
pub struct CatalogApi {
    catalog: Arc<Catalog>,
    profile: TrayProfile,
}

impl CatalogApi {
    pub fn new(catalog: Arc<Catalog>, profile: TrayProfile) -> Self {
        Self { catalog, profile }
    }

    /// 可选实验列表(按编号升序)
    pub fn get_available_experiments(&self) -> Vec<ExperimentListing> {
        self.catalog
            .iter()
            .map(|exp| ExperimentListing {
                id: exp.id,
                name: exp.name.clone(),
            })
            .collect()
    }

    /// 按试剂代码查询所属实验与耗量
    ///
    /// 试剂代码跨实验共用时返回编号最小的实验。
    pub fn get_reagent_info(&self, reagent_code: &str) -> Option<ReagentInfo> {
        self.catalog
            .find_reagent(reagent_code)
            .map(|(exp, reagent)| ReagentInfo {
                experiment_id: exp.id,
                experiment_name: exp.name.clone(),
                volume: reagent.volume_per_test,
            })
    }

    /// 查询槽位容量信息
    pub fn get_location_info(&self, location: usize) -> LocationInfo {
        LocationInfo {
            location_number: location + 1,
            capacity: self.profile.capacity_of_location(location),
            is_high_capacity: self.profile.is_high_capacity(location),
        }
    }
}
