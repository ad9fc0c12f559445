// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用测试环境
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

use cmkit::api::{AuthApi, DictApi, HomeApi, OrgApi, ResourceApi, RoleApi, UsageApi};
use cmkit::app::AppState;
use cmkit::config::app_config::DEFAULT_SESSION_TTL_MINUTES;
use cmkit::config::AppConfig;
use cmkit::domain::paging::DEFAULT_PAGE_SIZE;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 通过 AppState 组装全部 API，数据库与文件目录均为临时目录
pub struct ApiTestEnv {
    pub db_path: String,
    pub file_dir: PathBuf,
    pub temp_dir: PathBuf,

    pub auth_api: Arc<AuthApi>,
    pub role_api: Arc<RoleApi>,
    pub org_api: Arc<OrgApi>,
    pub resource_api: Arc<ResourceApi>,
    pub usage_api: Arc<UsageApi>,
    pub dict_api: Arc<DictApi>,
    pub home_api: Arc<HomeApi>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
    _work_dir: TempDir,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    pub fn new() -> Result<Self, String> {
        Self::with_config(|_| {})
    }

    /// 创建测试环境，允许调整配置 (如会话时长、默认页大小)
    pub fn with_config<F>(adjust: F) -> Result<Self, String>
    where
        F: FnOnce(&mut AppConfig),
    {
        cmkit::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;
        let work_dir = tempfile::tempdir().map_err(|e| format!("创建临时目录失败: {}", e))?;

        let mut config = AppConfig {
            db_path: db_path.clone(),
            file_dir: work_dir.path().join("webfiles"),
            temp_dir: work_dir.path().join("temp"),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            default_page_size: DEFAULT_PAGE_SIZE,
        };
        adjust(&mut config);

        let file_dir = config.file_dir.clone();
        let temp_dir = config.temp_dir.clone();
        let state = AppState::new(config)?;

        Ok(Self {
            db_path,
            file_dir,
            temp_dir,
            auth_api: state.auth_api,
            role_api: state.role_api,
            org_api: state.org_api,
            resource_api: state.resource_api,
            usage_api: state.usage_api,
            dict_api: state.dict_api,
            home_api: state.home_api,
            _temp_file: temp_file,
            _work_dir: work_dir,
        })
    }

    /// 打开一条独立连接，用于直接核对表数据
    pub fn conn(&self) -> Connection {
        test_helpers::open_test_conn(&self.db_path)
    }

    pub fn count_rows(&self, table: &str, condition: &str) -> i64 {
        test_helpers::count_rows(&self.conn(), table, condition)
    }
}
