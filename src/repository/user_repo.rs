// ==========================================
// 吊索具智能柜管理系统 - 用户仓储
// ==========================================
// 删除方式: 软删除 (deleted_at)
// 说明: 口令摘要由调用方计算，仓储只负责存取
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::db::{from_db_datetime, now_local, to_db_datetime};
use crate::domain::auth::User;
use crate::domain::paging::{PageQuery, PageResult};
use crate::domain::types::UserStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_page, FilterQuery};

const USER_FROM: &str = "FROM t_auth_user u LEFT JOIN t_sys_staff s ON s.id = u.staff_id";
const USER_COLUMNS: &str = r#"u.id, u.name, u.password, u.start_time, u.end_time, u.status,
    u.remark, u.staff_id, u.created_at, u.updated_at, s.name"#;

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增用户 (password 字段需为存储摘要)
    pub fn insert(&self, user: &User) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        conn.execute(
            r#"INSERT INTO t_auth_user (
                   name, password, start_time, end_time, status, remark, staff_id,
                   created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"#,
            params![
                user.name,
                user.password,
                user.start_time.as_ref().map(to_db_datetime),
                user.end_time.as_ref().map(to_db_datetime),
                user.status.to_db_value(),
                user.remark,
                user.staff_id,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新用户资料 (不含口令)
    pub fn update(&self, user: &User) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_auth_user
               SET name = ?1, start_time = ?2, end_time = ?3, status = ?4, remark = ?5,
                   staff_id = ?6, updated_at = ?7
               WHERE id = ?8 AND deleted_at IS NULL"#,
            params![
                user.name,
                user.start_time.as_ref().map(to_db_datetime),
                user.end_time.as_ref().map(to_db_datetime),
                user.status.to_db_value(),
                user.remark,
                user.staff_id,
                to_db_datetime(&now_local()),
                user.id,
            ],
        )?;
        Ok(affected)
    }

    pub fn update_password(&self, id: i64, password_hash: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_auth_user SET password = ?1, updated_at = ?2
               WHERE id = ?3 AND deleted_at IS NULL"#,
            params![password_hash, to_db_datetime(&now_local()), id],
        )?;
        Ok(affected)
    }

    /// 软删除
    pub fn soft_delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE t_auth_user SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![to_db_datetime(&now_local()), id],
        )?;
        Ok(affected)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        self.find_one("u.id = ?1", rusqlite::types::Value::from(id))
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<User>> {
        self.find_one("u.name = ?1", rusqlite::types::Value::from(name.to_string()))
    }

    fn find_one(&self, condition: &str, value: rusqlite::types::Value) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} {} WHERE {} AND u.deleted_at IS NULL",
                    USER_COLUMNS, USER_FROM, condition
                ),
                params![value],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// 是否存在同名的其他用户
    pub fn name_taken(&self, name: &str, exclude_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM t_auth_user
               WHERE name = ?1 AND id <> ?2 AND deleted_at IS NULL"#,
            params![name, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 分页查询 (用户名模糊)
    pub fn list_paged(&self, name: Option<&str>, page: PageQuery) -> RepositoryResult<PageResult<User>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new(USER_FROM)
            .where_clause("u.deleted_at IS NULL")
            .like_if("u.name", name);
        fetch_page(&conn, &query, USER_COLUMNS, "u.id", page, map_user)
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        password: row.get(2)?,
        start_time: from_db_datetime(row.get(3)?),
        end_time: from_db_datetime(row.get(4)?),
        status: UserStatus::from_db_value(row.get(5)?),
        remark: row.get(6)?,
        staff_id: row.get(7)?,
        created_at: from_db_datetime(row.get(8)?),
        updated_at: from_db_datetime(row.get(9)?),
        staff_name: row.get(10)?,
    })
}
