// ==========================================
// 吊索具智能柜管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、纯业务规则
// 红线: 不含数据访问逻辑
// ==========================================

pub mod auth;
pub mod dict;
pub mod organization;
pub mod paging;
pub mod resource;
pub mod types;
pub mod usage;

// 重导出核心类型
pub use auth::{Role, RoleFunc, SessionClaims, User, UserCheckError, UserInfo, UserRoleRelation};
pub use dict::{DictData, GroupCount, ResourceOverview, SlingUsageRank};
pub use organization::{Company, Department, DepartmentQuery, Staff, StaffQuery};
pub use paging::{PageQuery, PageResult};
pub use resource::{Cabinet, CabinetGrid, GridSlot, Sling, SlingLocation, SlingQuery};
pub use types::{ReturnFilter, TakeReturnFlag, UseStatus, UserStatus, ROOT_ROW_ID};
pub use usage::{TakeReturnOutcome, TakeReturnRequest, UseLog, UseLogQuery};
