// ==========================================
// 吊索具智能柜管理系统 - 应用配置
// ==========================================
// 来源: 环境变量 (CMKIT_*)，缺省时使用内置默认值
// 说明: 上传目录等路径随配置显式传入各组件，不使用全局变量
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::auth::MAX_SESSION_TTL_MINUTES;
use crate::domain::paging::DEFAULT_PAGE_SIZE;

/// 环境变量键
pub mod env_keys {
    pub const DB_PATH: &str = "CMKIT_DB_PATH";
    pub const FILE_DIR: &str = "CMKIT_FILE_DIR";
    pub const TEMP_DIR: &str = "CMKIT_TEMP_DIR";
    pub const SESSION_TTL_MINUTES: &str = "CMKIT_SESSION_TTL_MINUTES";
    pub const DEFAULT_PAGE_SIZE: &str = "CMKIT_DEFAULT_PAGE_SIZE";
}

pub const DEFAULT_FILE_DIR: &str = "./webfiles/";
pub const DEFAULT_TEMP_DIR: &str = "./temp/";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

const DB_FILE_NAME: &str = "cmkit.db";

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite 数据库文件路径
    pub db_path: String,
    /// 静态文件目录 (员工照片)
    pub file_dir: PathBuf,
    /// 上传暂存目录
    pub temp_dir: PathBuf,
    /// 会话有效期（分钟）
    pub session_ttl_minutes: i64,
    /// 列表默认页大小
    pub default_page_size: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: get_default_db_path(),
            file_dir: PathBuf::from(DEFAULT_FILE_DIR),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 空白值视为未设置；数值解析失败或 ≤0 时回退默认值。
    /// 会话有效期超过上限时取上限。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let read_positive = |key: &str, default: i64| {
            match read(key).map(|v| v.parse::<i64>()) {
                Some(Ok(v)) if v > 0 => v,
                Some(_) => {
                    tracing::warn!("配置项 {} 取值无效，使用默认值 {}", key, default);
                    default
                }
                None => default,
            }
        };

        let db_path = read(env_keys::DB_PATH).unwrap_or_else(default_db_file);
        let file_dir = read(env_keys::FILE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_DIR));
        let temp_dir = read(env_keys::TEMP_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR));

        let mut session_ttl_minutes =
            read_positive(env_keys::SESSION_TTL_MINUTES, DEFAULT_SESSION_TTL_MINUTES);
        if session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            tracing::warn!(
                "会话有效期 {} 分钟超过上限，使用 {}",
                session_ttl_minutes,
                MAX_SESSION_TTL_MINUTES
            );
            session_ttl_minutes = MAX_SESSION_TTL_MINUTES;
        }

        Self {
            db_path,
            file_dir,
            temp_dir,
            session_ttl_minutes,
            default_page_size: read_positive(env_keys::DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE),
        }
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 设置了 CMKIT_DB_PATH: 该路径
/// - 开发环境: 用户数据目录/cmkit-dev/cmkit.db
/// - 生产环境: 用户数据目录/cmkit/cmkit.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(env_keys::DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    default_db_file()
}

fn default_db_file() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("cmkit-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("cmkit");
        }

        // 目录创建失败时交由打开数据库时报错
        std::fs::create_dir_all(&path).ok();
        path = path.join(DB_FILE_NAME);
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert!(config.db_path.ends_with(".db"));
        assert_eq!(config.file_dir, PathBuf::from("./webfiles/"));
        assert_eq!(config.temp_dir, PathBuf::from("./temp/"));
        assert_eq!(config.session_ttl_minutes, 60);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (env_keys::DB_PATH, " /tmp/x.db "),
            (env_keys::FILE_DIR, "/srv/files"),
            (env_keys::SESSION_TTL_MINUTES, "15"),
        ]));
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.file_dir, PathBuf::from("/srv/files"));
        assert_eq!(config.session_ttl_minutes, 15);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (env_keys::SESSION_TTL_MINUTES, "abc"),
            (env_keys::DEFAULT_PAGE_SIZE, "-5"),
        ]));
        assert_eq!(config.session_ttl_minutes, DEFAULT_SESSION_TTL_MINUTES);
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_session_ttl_is_capped() {
        let config = AppConfig::from_lookup(lookup_from(&[(
            env_keys::SESSION_TTL_MINUTES,
            "9223372036854775807",
        )]));
        assert_eq!(config.session_ttl_minutes, MAX_SESSION_TTL_MINUTES);

        let config = AppConfig::from_lookup(lookup_from(&[(
            env_keys::SESSION_TTL_MINUTES,
            "10080",
        )]));
        assert_eq!(config.session_ttl_minutes, 10080);
    }
}
