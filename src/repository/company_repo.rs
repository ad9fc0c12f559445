// ==========================================
// 吊索具智能柜管理系统 - 公司仓储
// ==========================================
// 删除方式: 物理删除
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::organization::Company;
use crate::domain::paging::{PageQuery, PageResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_all, fetch_page, FilterQuery};

const COMPANY_COLUMNS: &str = "id, name, status, remark";

pub struct CompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompanyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, company: &Company) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO t_sys_company (name, status, remark) VALUES (?1, ?2, ?3)",
            params![company.name, company.status, company.remark],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, company: &Company) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE t_sys_company SET name = ?1, status = ?2, remark = ?3 WHERE id = ?4",
            params![company.name, company.status, company.remark, company.id],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM t_sys_company WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let company = conn
            .query_row(
                &format!("SELECT {} FROM t_sys_company WHERE id = ?1", COMPANY_COLUMNS),
                params![id],
                map_company,
            )
            .optional()?;
        Ok(company)
    }

    /// 分页查询 (名称模糊匹配)
    pub fn list_paged(&self, name: Option<&str>, page: PageQuery) -> RepositoryResult<PageResult<Company>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new("FROM t_sys_company").like_if("name", name);
        fetch_page(&conn, &query, COMPANY_COLUMNS, "id", page, map_company)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Company>> {
        let conn = self.get_conn()?;
        fetch_all(
            &conn,
            &FilterQuery::new("FROM t_sys_company"),
            COMPANY_COLUMNS,
            "id",
            map_company,
        )
    }
}

fn map_company(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        remark: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> CompanyRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::bootstrap(&conn).unwrap();
        CompanyRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn company(name: &str) -> Company {
        Company {
            id: 0,
            name: name.to_string(),
            status: 0,
            remark: String::new(),
        }
    }

    #[test]
    fn test_crud_and_hard_delete() {
        let repo = setup();
        let id = repo.insert(&company("华东分公司")).unwrap();

        let mut found = repo.find_by_id(id).unwrap().unwrap();
        found.remark = "备注".to_string();
        assert_eq!(repo.update(&found).unwrap(), 1);
        assert_eq!(repo.find_by_id(id).unwrap().unwrap().remark, "备注");

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert!(repo.find_by_id(id).unwrap().is_none());
    }

    #[test]
    fn test_list_paged_with_name_filter() {
        let repo = setup();
        repo.insert(&company("华东分公司")).unwrap();
        repo.insert(&company("华南分公司")).unwrap();

        let page = repo.list_paged(Some("分公司"), PageQuery::default()).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.page_size, 10);

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 3);
    }
}
