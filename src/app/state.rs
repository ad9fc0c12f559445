// ==========================================
// 吊索具智能柜管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{AuthApi, DictApi, HomeApi, OrgApi, ResourceApi, RoleApi, UsageApi};
use crate::config::AppConfig;
use crate::db;
use crate::repository::{
    CabinetRepository, CompanyRepository, DepartmentRepository, DictRepository, RoleRepository,
    SlingRepository, StaffRepository, StatsRepository, UseLogRepository, UserRepository,
};
use crate::storage::PhotoStore;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 启动时使用的配置
    pub config: AppConfig,

    /// 用户与登录API
    pub auth_api: Arc<AuthApi>,

    /// 角色与权限API
    pub role_api: Arc<RoleApi>,

    /// 组织机构API
    pub org_api: Arc<OrgApi>,

    /// 吊索具/智能柜API
    pub resource_api: Arc<ResourceApi>,

    /// 存放与借还API
    pub usage_api: Arc<UsageApi>,

    /// 数据字典API
    pub dict_api: Arc<DictApi>,

    /// 首页统计API
    pub home_api: Arc<HomeApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并执行建表/根记录初始化
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    ///
    /// # 返回
    /// - Err(String): 数据库无法打开或初始化失败
    pub fn new(config: AppConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        let conn = db::open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(conn, config)
    }

    /// 基于已打开的连接组装 (测试使用内存库)
    pub fn from_connection(conn: Connection, config: AppConfig) -> Result<Self, String> {
        db::bootstrap(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let company_repo = Arc::new(CompanyRepository::new(conn.clone()));
        let department_repo = Arc::new(DepartmentRepository::new(conn.clone()));
        let staff_repo = Arc::new(StaffRepository::new(conn.clone()));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let role_repo = Arc::new(RoleRepository::new(conn.clone()));
        let sling_repo = Arc::new(SlingRepository::new(conn.clone()));
        let cabinet_repo = Arc::new(CabinetRepository::new(conn.clone()));
        let use_log_repo = Arc::new(UseLogRepository::new(conn.clone()));
        let dict_repo = Arc::new(DictRepository::new(conn.clone()));
        let stats_repo = Arc::new(StatsRepository::new(conn));

        // 上传目录随配置传入
        let photo_store = Arc::new(PhotoStore::new(
            config.file_dir.clone(),
            config.temp_dir.clone(),
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let page_size = config.default_page_size;

        let auth_api = Arc::new(
            AuthApi::new(user_repo.clone(), role_repo.clone())
                .with_session_ttl(config.session_ttl_minutes)
                .with_default_page_size(page_size),
        );
        let role_api = Arc::new(
            RoleApi::new(role_repo, user_repo).with_default_page_size(page_size),
        );
        let org_api = Arc::new(
            OrgApi::new(company_repo, department_repo, staff_repo, photo_store)
                .with_default_page_size(page_size),
        );
        let resource_api = Arc::new(
            ResourceApi::new(sling_repo.clone(), cabinet_repo.clone())
                .with_default_page_size(page_size),
        );
        let usage_api = Arc::new(
            UsageApi::new(cabinet_repo, sling_repo, use_log_repo).with_default_page_size(page_size),
        );
        let dict_api = Arc::new(DictApi::new(dict_repo));
        let home_api = Arc::new(HomeApi::new(stats_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            auth_api,
            role_api,
            org_api,
            resource_api,
            usage_api,
            dict_api,
            home_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.config.db_path
    }
}
