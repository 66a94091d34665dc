// ==========================================
// 试剂托盘配置系统 - 配置层
// ==========================================
// 职责: 托盘硬件参数管理
// ==========================================

pub mod tray_profile;

// 重导出核心配置
pub use tray_profile::TrayProfile;
