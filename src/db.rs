// ==========================================
// 吊索具智能柜管理系统 - SQLite 连接与建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 幂等建表 + 根记录初始化 (id=1 的用户/角色/员工)
// - 提供事务工作单元: 闭包内全部成功才提交
// ==========================================

use chrono::{Local, NaiveDateTime, Timelike};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::time::Duration;

use crate::domain::auth::default_password_hash;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数据库时间格式
pub const DB_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// 根账号名
pub const ROOT_USER_NAME: &str = "admin";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys / busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 幂等建表
///
/// 软删除表带 deleted_at 列；唯一性约束只作用于未删除行 (部分索引)。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS t_sys_company (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 0,
            remark TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS t_sys_department (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            company_id INTEGER NOT NULL DEFAULT 0,
            status INTEGER NOT NULL DEFAULT 0,
            remark TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS t_sys_staff (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            company_id INTEGER NOT NULL DEFAULT 0,
            department_id INTEGER NOT NULL DEFAULT 0,
            post_name TEXT NOT NULL DEFAULT '',
            birthday TEXT,
            status INTEGER NOT NULL DEFAULT 0,
            remark TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );

        CREATE TABLE IF NOT EXISTS t_sys_dict (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key INTEGER NOT NULL DEFAULT 0,
            name TEXT NOT NULL DEFAULT '',
            type TEXT NOT NULL DEFAULT '',
            note TEXT NOT NULL DEFAULT '',
            scene TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS t_auth_user (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            password TEXT NOT NULL DEFAULT '',
            start_time TEXT,
            end_time TEXT,
            status INTEGER NOT NULL DEFAULT 0,
            remark TEXT NOT NULL DEFAULT '',
            staff_id INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_auth_user_name
            ON t_auth_user(name) WHERE deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS t_auth_role (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 0,
            remark TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_auth_role_name
            ON t_auth_role(name) WHERE deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS r_auth_role_func (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            role_id INTEGER NOT NULL,
            funcs TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS r_auth_user_role (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            role_id INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_auth_user_role_user ON r_auth_user_role(user_id);

        CREATE TABLE IF NOT EXISTS t_res_sling (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rf_id TEXT NOT NULL,
            name TEXT NOT NULL,
            sling_type INTEGER NOT NULL DEFAULT 0,
            max_tonnage INTEGER NOT NULL DEFAULT 0,
            use_status INTEGER NOT NULL DEFAULT 0,
            inspect_status INTEGER NOT NULL DEFAULT 0,
            put_time TEXT NOT NULL DEFAULT '',
            use_permission TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_res_sling_name
            ON t_res_sling(name) WHERE deleted_at IS NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS ux_res_sling_rf_id
            ON t_res_sling(rf_id) WHERE deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS t_res_cabinet (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            grid_count INTEGER NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            status INTEGER NOT NULL DEFAULT 0,
            remark TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_res_cabinet_name
            ON t_res_cabinet(name) WHERE deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS t_res_cabinet_grid (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            grid_no INTEGER NOT NULL,
            cabinet_id INTEGER NOT NULL,
            in_res_id INTEGER NOT NULL DEFAULT 0,
            is_out INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_res_grid_slot
            ON t_res_cabinet_grid(cabinet_id, grid_no) WHERE deleted_at IS NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS ux_res_grid_res
            ON t_res_cabinet_grid(in_res_id) WHERE in_res_id > 0 AND deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS t_res_use_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            res_id INTEGER NOT NULL,
            rf_id TEXT NOT NULL DEFAULT '',
            res_name TEXT NOT NULL DEFAULT '',
            take_staff_id INTEGER NOT NULL DEFAULT 0,
            take_staff_name TEXT NOT NULL DEFAULT '',
            take_time TEXT,
            return_plan_time TEXT,
            return_staff_id INTEGER NOT NULL DEFAULT 0,
            return_staff_name TEXT NOT NULL DEFAULT '',
            return_time TEXT,
            remark TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS ix_res_use_log_res ON t_res_use_log(res_id, created_at);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 初始化根记录 (幂等)
///
/// 根公司/部门/员工/账号/角色均占用 id=1；账号使用默认口令。
pub fn seed_root_rows(conn: &Connection) -> rusqlite::Result<()> {
    let now = to_db_datetime(&now_local());

    conn.execute(
        "INSERT OR IGNORE INTO t_sys_company (id, name) VALUES (1, '默认公司')",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO t_sys_department (id, name, company_id) VALUES (1, '默认部门', 1)",
        [],
    )?;
    conn.execute(
        r#"INSERT OR IGNORE INTO t_sys_staff (id, name, company_id, department_id, created_at, updated_at)
           VALUES (1, '管理员', 1, 1, ?1, ?1)"#,
        params![now],
    )?;
    conn.execute(
        r#"INSERT OR IGNORE INTO t_auth_user (id, name, password, status, staff_id, created_at, updated_at)
           VALUES (1, ?1, ?2, 0, 1, ?3, ?3)"#,
        params![ROOT_USER_NAME, default_password_hash(ROOT_USER_NAME), now],
    )?;
    conn.execute(
        r#"INSERT OR IGNORE INTO t_auth_role (id, name, created_at, updated_at)
           VALUES (1, '超级管理员', ?1, ?1)"#,
        params![now],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO r_auth_user_role (id, user_id, role_id) VALUES (1, 1, 1)",
        [],
    )?;
    Ok(())
}

/// 建表并初始化根记录
pub fn bootstrap(conn: &Connection) -> rusqlite::Result<()> {
    init_schema(conn)?;
    seed_root_rows(conn)?;
    Ok(())
}

/// 事务工作单元
///
/// 闭包返回 Err 时事务随 `Transaction` 析构回滚；全部成功才提交。
pub fn run_in_transaction<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.transaction()?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}

// ==========================================
// 时间工具
// ==========================================

/// 当前本地时间 (秒级)
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn to_db_datetime(value: &NaiveDateTime) -> String {
    value.format(DB_DATETIME_FMT).to_string()
}

/// 解析数据库时间，格式异常时返回 None
pub fn from_db_datetime(value: Option<String>) -> Option<NaiveDateTime> {
    value.and_then(|s| NaiveDateTime::parse_from_str(&s, DB_DATETIME_FMT).ok())
}
