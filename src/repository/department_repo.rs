// ==========================================
// 吊索具智能柜管理系统 - 部门仓储
// ==========================================
// 删除方式: 物理删除
// 查询: 关联公司信息
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::organization::{Company, Department, DepartmentQuery};
use crate::domain::paging::{PageQuery, PageResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_all, fetch_page, FilterQuery};

const DEPARTMENT_FROM: &str =
    "FROM t_sys_department d LEFT JOIN t_sys_company c ON c.id = d.company_id";
const DEPARTMENT_COLUMNS: &str =
    "d.id, d.name, d.company_id, d.status, d.remark, c.id, c.name, c.status, c.remark";

pub struct DepartmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DepartmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, department: &Department) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO t_sys_department (name, company_id, status, remark)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![
                department.name,
                department.company_id,
                department.status,
                department.remark
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, department: &Department) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_sys_department
               SET name = ?1, company_id = ?2, status = ?3, remark = ?4
               WHERE id = ?5"#,
            params![
                department.name,
                department.company_id,
                department.status,
                department.remark,
                department.id
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM t_sys_department WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Department>> {
        let conn = self.get_conn()?;
        let department = conn
            .query_row(
                &format!("SELECT {} {} WHERE d.id = ?1", DEPARTMENT_COLUMNS, DEPARTMENT_FROM),
                params![id],
                map_department,
            )
            .optional()?;
        Ok(department)
    }

    /// 分页查询 (名称模糊 + 公司)
    pub fn list_paged(
        &self,
        filter: &DepartmentQuery,
        page: PageQuery,
    ) -> RepositoryResult<PageResult<Department>> {
        let conn = self.get_conn()?;
        fetch_page(
            &conn,
            &build_filter(filter),
            DEPARTMENT_COLUMNS,
            "d.id",
            page,
            map_department,
        )
    }

    pub fn list_all(&self, filter: &DepartmentQuery) -> RepositoryResult<Vec<Department>> {
        let conn = self.get_conn()?;
        fetch_all(
            &conn,
            &build_filter(filter),
            DEPARTMENT_COLUMNS,
            "d.id",
            map_department,
        )
    }
}

fn build_filter(filter: &DepartmentQuery) -> FilterQuery {
    FilterQuery::new(DEPARTMENT_FROM)
        .like_if("d.name", filter.name.as_deref())
        .eq_if("d.company_id", filter.company_id)
}

fn map_department(row: &Row<'_>) -> rusqlite::Result<Department> {
    let company_id: Option<i64> = row.get(5)?;
    let company = match company_id {
        Some(id) => Some(Company {
            id,
            name: row.get(6)?,
            status: row.get(7)?,
            remark: row.get(8)?,
        }),
        None => None,
    };

    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        company_id: row.get(2)?,
        status: row.get(3)?,
        remark: row.get(4)?,
        company,
    })
}
