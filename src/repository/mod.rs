// ==========================================
// 吊索具智能柜管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务校验 (必填/唯一/根记录保护由 api 层负责)
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 多表变更在同一事务内完成
// ==========================================

pub mod cabinet_repo;
pub mod company_repo;
pub mod department_repo;
pub mod dict_repo;
pub mod error;
pub mod query_builder;
pub mod role_repo;
pub mod sling_repo;
pub mod staff_repo;
pub mod stats_repo;
pub mod use_log_repo;
pub mod user_repo;

// 重导出核心仓储
pub use cabinet_repo::CabinetRepository;
pub use company_repo::CompanyRepository;
pub use department_repo::DepartmentRepository;
pub use dict_repo::DictRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use role_repo::RoleRepository;
pub use sling_repo::SlingRepository;
pub use staff_repo::StaffRepository;
pub use stats_repo::StatsRepository;
pub use use_log_repo::UseLogRepository;
pub use user_repo::UserRepository;
