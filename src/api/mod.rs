// ==========================================
// 吊索具智能柜管理系统 - API 层
// ==========================================
// 职责: 参数校验 → 调用仓储 → 错误映射，供外部路由层调用
// ==========================================

pub mod error;
pub mod response;
pub mod validator;

pub mod auth_api;
pub mod dict_api;
pub mod home_api;
pub mod org_api;
pub mod resource_api;
pub mod role_api;
pub mod usage_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use response::{codes, ApiResponse};

pub use auth_api::AuthApi;
pub use dict_api::DictApi;
pub use home_api::HomeApi;
pub use org_api::OrgApi;
pub use resource_api::ResourceApi;
pub use role_api::RoleApi;
pub use usage_api::UsageApi;
