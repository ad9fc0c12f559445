// ==========================================
// 吊索具智能柜管理系统 - 角色仓储
// ==========================================
// 覆盖: 角色 (软删除) / 用户角色关系 / 角色权限 (物理删除)
// 关系表的设置为"整体替换"，在同一事务内完成
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::db::{from_db_datetime, now_local, run_in_transaction, to_db_datetime};
use crate::domain::auth::{Role, RoleFunc};
use crate::domain::paging::{PageQuery, PageResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_all, fetch_page, FilterQuery};

const ROLE_COLUMNS: &str = "id, name, status, remark, created_at, updated_at";

pub struct RoleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 角色
    // ==========================================

    pub fn insert(&self, role: &Role) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        conn.execute(
            r#"INSERT INTO t_auth_role (name, status, remark, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?4)"#,
            params![role.name, role.status, role.remark, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, role: &Role) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_auth_role SET name = ?1, status = ?2, remark = ?3, updated_at = ?4
               WHERE id = ?5 AND deleted_at IS NULL"#,
            params![
                role.name,
                role.status,
                role.remark,
                to_db_datetime(&now_local()),
                role.id
            ],
        )?;
        Ok(affected)
    }

    pub fn soft_delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE t_auth_role SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![to_db_datetime(&now_local()), id],
        )?;
        Ok(affected)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Role>> {
        let conn = self.get_conn()?;
        let role = conn
            .query_row(
                &format!(
                    "SELECT {} FROM t_auth_role WHERE id = ?1 AND deleted_at IS NULL",
                    ROLE_COLUMNS
                ),
                params![id],
                map_role,
            )
            .optional()?;
        Ok(role)
    }

    /// 是否存在同名的其他角色
    pub fn name_taken(&self, name: &str, exclude_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM t_auth_role
               WHERE name = ?1 AND id <> ?2 AND deleted_at IS NULL"#,
            params![name, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn list_paged(&self, name: Option<&str>, page: PageQuery) -> RepositoryResult<PageResult<Role>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new("FROM t_auth_role")
            .where_clause("deleted_at IS NULL")
            .like_if("name", name);
        fetch_page(&conn, &query, ROLE_COLUMNS, "id", page, map_role)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Role>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new("FROM t_auth_role").where_clause("deleted_at IS NULL");
        fetch_all(&conn, &query, ROLE_COLUMNS, "id", map_role)
    }

    // ==========================================
    // 用户角色关系
    // ==========================================

    /// 整体替换用户的角色
    pub fn set_user_roles(&self, user_id: i64, role_ids: &[i64]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        run_in_transaction(&mut conn, |tx| {
            tx.execute(
                "DELETE FROM r_auth_user_role WHERE user_id = ?1",
                params![user_id],
            )?;
            let mut stmt =
                tx.prepare("INSERT INTO r_auth_user_role (user_id, role_id) VALUES (?1, ?2)")?;
            for role_id in role_ids {
                stmt.execute(params![user_id, role_id])?;
            }
            Ok(role_ids.len())
        })
    }

    /// 用户当前拥有的 (未删除) 角色
    pub fn list_user_roles(&self, user_id: i64) -> RepositoryResult<Vec<Role>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT r.id, r.name, r.status, r.remark, r.created_at, r.updated_at
               FROM r_auth_user_role ur
               JOIN t_auth_role r ON r.id = ur.role_id AND r.deleted_at IS NULL
               WHERE ur.user_id = ?1
               ORDER BY r.id"#,
        )?;
        let roles = stmt
            .query_map(params![user_id], map_role)?
            .collect::<Result<Vec<Role>, _>>()?;
        Ok(roles)
    }

    // ==========================================
    // 角色权限
    // ==========================================

    /// 整体替换角色的权限串
    pub fn set_role_funcs(&self, role_id: i64, funcs: &[String]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        run_in_transaction(&mut conn, |tx| {
            tx.execute(
                "DELETE FROM r_auth_role_func WHERE role_id = ?1",
                params![role_id],
            )?;
            let mut stmt =
                tx.prepare("INSERT INTO r_auth_role_func (role_id, funcs) VALUES (?1, ?2)")?;
            for func in funcs {
                stmt.execute(params![role_id, func])?;
            }
            Ok(funcs.len())
        })
    }

    pub fn list_role_funcs(&self, role_id: i64) -> RepositoryResult<Vec<RoleFunc>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, role_id, funcs FROM r_auth_role_func WHERE role_id = ?1 ORDER BY id",
        )?;
        let funcs = stmt
            .query_map(params![role_id], |row| {
                Ok(RoleFunc {
                    id: row.get(0)?,
                    role_id: row.get(1)?,
                    funcs: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<RoleFunc>, _>>()?;
        Ok(funcs)
    }
}

fn map_role(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        remark: row.get(3)?,
        created_at: from_db_datetime(row.get(4)?),
        updated_at: from_db_datetime(row.get(5)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> RoleRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::bootstrap(&conn).unwrap();
        RoleRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_set_user_roles_replaces_previous() {
        let repo = setup();
        let a = repo.insert(&Role::new("仓管员")).unwrap();
        let b = repo.insert(&Role::new("检验员")).unwrap();

        repo.set_user_roles(5, &[a, b]).unwrap();
        assert_eq!(repo.list_user_roles(5).unwrap().len(), 2);

        repo.set_user_roles(5, &[b]).unwrap();
        let roles = repo.list_user_roles(5).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "检验员");

        repo.soft_delete(b).unwrap();
        assert!(repo.list_user_roles(5).unwrap().is_empty());
    }

    #[test]
    fn test_set_role_funcs_replaces_previous() {
        let repo = setup();
        repo.set_role_funcs(2, &["sling:view".to_string(), "sling:edit".to_string()])
            .unwrap();
        repo.set_role_funcs(2, &["cabinet:view".to_string()]).unwrap();

        let funcs = repo.list_role_funcs(2).unwrap();
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].funcs, "cabinet:view");
    }

    #[test]
    fn test_name_taken() {
        let repo = setup();
        assert!(repo.name_taken("超级管理员", 0).unwrap());
        assert!(!repo.name_taken("超级管理员", 1).unwrap());
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }
}
