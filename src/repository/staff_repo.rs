// ==========================================
// 吊索具智能柜管理系统 - 员工仓储
// ==========================================
// 删除方式: 软删除 (deleted_at)
// 查询: 关联公司、部门名称
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::db::{from_db_datetime, now_local, to_db_datetime};
use crate::domain::organization::{Staff, StaffQuery};
use crate::domain::paging::{PageQuery, PageResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_page, FilterQuery};

const STAFF_FROM: &str = r#"FROM t_sys_staff s
    LEFT JOIN t_sys_company c ON c.id = s.company_id
    LEFT JOIN t_sys_department d ON d.id = s.department_id"#;
const STAFF_COLUMNS: &str = r#"s.id, s.name, s.company_id, s.department_id, s.post_name,
    s.birthday, s.status, s.remark, s.created_at, s.updated_at, c.name, d.name"#;

pub struct StaffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增员工，返回新ID
    pub fn insert(&self, staff: &Staff) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        conn.execute(
            r#"INSERT INTO t_sys_staff (
                   name, company_id, department_id, post_name, birthday,
                   status, remark, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"#,
            params![
                staff.name,
                staff.company_id,
                staff.department_id,
                staff.post_name,
                staff.birthday.as_ref().map(to_db_datetime),
                staff.status,
                staff.remark,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, staff: &Staff) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_sys_staff
               SET name = ?1, company_id = ?2, department_id = ?3, post_name = ?4,
                   birthday = ?5, status = ?6, remark = ?7, updated_at = ?8
               WHERE id = ?9 AND deleted_at IS NULL"#,
            params![
                staff.name,
                staff.company_id,
                staff.department_id,
                staff.post_name,
                staff.birthday.as_ref().map(to_db_datetime),
                staff.status,
                staff.remark,
                to_db_datetime(&now_local()),
                staff.id,
            ],
        )?;
        Ok(affected)
    }

    /// 软删除
    pub fn soft_delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE t_sys_staff SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![to_db_datetime(&now_local()), id],
        )?;
        Ok(affected)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Staff>> {
        let conn = self.get_conn()?;
        let staff = conn
            .query_row(
                &format!(
                    "SELECT {} {} WHERE s.id = ?1 AND s.deleted_at IS NULL",
                    STAFF_COLUMNS, STAFF_FROM
                ),
                params![id],
                map_staff,
            )
            .optional()?;
        Ok(staff)
    }

    /// 分页查询 (姓名模糊 + 公司 + 部门)
    pub fn list_paged(&self, filter: &StaffQuery, page: PageQuery) -> RepositoryResult<PageResult<Staff>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new(STAFF_FROM)
            .where_clause("s.deleted_at IS NULL")
            .like_if("s.name", filter.name.as_deref())
            .eq_if("s.company_id", filter.company_id)
            .eq_if("s.department_id", filter.department_id);
        fetch_page(&conn, &query, STAFF_COLUMNS, "s.id", page, map_staff)
    }
}

fn map_staff(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        company_id: row.get(2)?,
        department_id: row.get(3)?,
        post_name: row.get(4)?,
        birthday: from_db_datetime(row.get(5)?),
        status: row.get(6)?,
        remark: row.get(7)?,
        created_at: from_db_datetime(row.get(8)?),
        updated_at: from_db_datetime(row.get(9)?),
        company_name: row.get(10)?,
        department_name: row.get(11)?,
    })
}
