// ==========================================
// 吊索具智能柜管理系统 - 吊索具仓储
// ==========================================
// 删除方式: 软删除；删除时同一事务内移除其箱格行
// 查询: 位置由箱格关联得出，使用次数由使用日志统计
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::db::{from_db_datetime, now_local, run_in_transaction, to_db_datetime};
use crate::domain::paging::{PageQuery, PageResult};
use crate::domain::resource::{Sling, SlingLocation, SlingQuery};
use crate::domain::types::UseStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_page, FilterQuery};

const SLING_FROM: &str = r#"FROM t_res_sling s
    LEFT JOIN t_res_cabinet_grid g ON g.in_res_id = s.id AND g.deleted_at IS NULL
    LEFT JOIN t_res_cabinet c ON c.id = g.cabinet_id AND c.deleted_at IS NULL"#;
const SLING_COLUMNS: &str = r#"s.id, s.rf_id, s.name, s.sling_type, s.max_tonnage, s.use_status,
    s.inspect_status, s.put_time, s.use_permission, s.created_at, s.updated_at,
    (SELECT COUNT(*) FROM t_res_use_log l WHERE l.res_id = s.id AND l.deleted_at IS NULL),
    g.cabinet_id, c.name, g.grid_no, g.is_out"#;

pub struct SlingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SlingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, sling: &Sling) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        conn.execute(
            r#"INSERT INTO t_res_sling (
                   rf_id, name, sling_type, max_tonnage, use_status, inspect_status,
                   put_time, use_permission, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"#,
            params![
                sling.rf_id,
                sling.name,
                sling.sling_type,
                sling.max_tonnage,
                sling.use_status.to_db_value(),
                sling.inspect_status,
                sling.put_time,
                sling.use_permission,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, sling: &Sling) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_res_sling
               SET rf_id = ?1, name = ?2, sling_type = ?3, max_tonnage = ?4, use_status = ?5,
                   inspect_status = ?6, put_time = ?7, use_permission = ?8, updated_at = ?9
               WHERE id = ?10 AND deleted_at IS NULL"#,
            params![
                sling.rf_id,
                sling.name,
                sling.sling_type,
                sling.max_tonnage,
                sling.use_status.to_db_value(),
                sling.inspect_status,
                sling.put_time,
                sling.use_permission,
                to_db_datetime(&now_local()),
                sling.id,
            ],
        )?;
        Ok(affected)
    }

    /// 是否存在名称或 RFID 相同的其他吊索具
    pub fn name_or_rf_id_taken(&self, name: &str, rf_id: &str, exclude_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM t_res_sling
               WHERE (name = ?1 OR rf_id = ?2) AND id <> ?3 AND deleted_at IS NULL"#,
            params![name, rf_id, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Sling>> {
        self.find_one("s.id = ?1", rusqlite::types::Value::from(id))
    }

    pub fn find_by_rf_id(&self, rf_id: &str) -> RepositoryResult<Option<Sling>> {
        self.find_one("s.rf_id = ?1", rusqlite::types::Value::from(rf_id.to_string()))
    }

    fn find_one(&self, condition: &str, value: rusqlite::types::Value) -> RepositoryResult<Option<Sling>> {
        let conn = self.get_conn()?;
        let sling = conn
            .query_row(
                &format!(
                    "SELECT {} {} WHERE {} AND s.deleted_at IS NULL",
                    SLING_COLUMNS, SLING_FROM, condition
                ),
                params![value],
                map_sling,
            )
            .optional()?;
        Ok(sling)
    }

    /// 删除吊索具及其箱格行 (同一事务)
    ///
    /// # 返回
    /// - (吊索具删除行数, 箱格删除行数)
    pub fn delete_with_grid(&self, id: i64) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        run_in_transaction(&mut conn, |tx| {
            let slings = tx.execute(
                "UPDATE t_res_sling SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                params![now, id],
            )?;
            let grids = tx.execute(
                r#"UPDATE t_res_cabinet_grid SET deleted_at = ?1
                   WHERE in_res_id = ?2 AND deleted_at IS NULL"#,
                params![now, id],
            )?;
            Ok((slings, grids))
        })
    }

    /// 分页查询
    ///
    /// 名称子串匹配；类型/吨位/使用状态/检验状态精确匹配 (0 表示不过滤)。
    pub fn list_paged(&self, filter: &SlingQuery, page: PageQuery) -> RepositoryResult<PageResult<Sling>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new(SLING_FROM)
            .where_clause("s.deleted_at IS NULL")
            .like_if("s.name", filter.name.as_deref())
            .eq_if("s.sling_type", filter.sling_type)
            .eq_if("s.max_tonnage", filter.max_tonnage)
            .eq_if("s.use_status", filter.use_status)
            .eq_if("s.inspect_status", filter.inspect_status);
        fetch_page(&conn, &query, SLING_COLUMNS, "s.id", page, map_sling)
    }
}

fn map_sling(row: &Row<'_>) -> rusqlite::Result<Sling> {
    let cabinet_id: Option<i64> = row.get(12)?;
    let location = match cabinet_id {
        Some(cabinet_id) => Some(SlingLocation {
            cabinet_id,
            cabinet_name: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
            grid_no: row.get(14)?,
            is_out: row.get::<_, i64>(15)? != 0,
        }),
        None => None,
    };

    Ok(Sling {
        id: row.get(0)?,
        rf_id: row.get(1)?,
        name: row.get(2)?,
        sling_type: row.get(3)?,
        max_tonnage: row.get(4)?,
        use_status: UseStatus::from_db_value(row.get(5)?),
        inspect_status: row.get(6)?,
        put_time: row.get(7)?,
        use_permission: row.get(8)?,
        created_at: from_db_datetime(row.get(9)?),
        updated_at: from_db_datetime(row.get(10)?),
        use_count: row.get(11)?,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> (Arc<Mutex<Connection>>, SlingRepository) {
        let conn = Connection::open_in_memory().unwrap();
        db::bootstrap(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), SlingRepository::new(conn))
    }

    #[test]
    fn test_name_or_rf_id_taken() {
        let (_, repo) = setup();
        let id = repo.insert(&Sling::new("RF-001", "钢丝绳 A")).unwrap();

        assert!(repo.name_or_rf_id_taken("钢丝绳 A", "RF-999", 0).unwrap());
        assert!(repo.name_or_rf_id_taken("其他", "RF-001", 0).unwrap());
        assert!(!repo.name_or_rf_id_taken("钢丝绳 A", "RF-001", id).unwrap());
    }

    #[test]
    fn test_location_and_use_count() {
        let (conn, repo) = setup();
        let id = repo.insert(&Sling::new("RF-002", "吊带 B")).unwrap();
        {
            let c = conn.lock().unwrap();
            c.execute(
                "INSERT INTO t_res_cabinet (id, name, grid_count) VALUES (5, '一号柜', 4)",
                [],
            )
            .unwrap();
            c.execute(
                "INSERT INTO t_res_cabinet_grid (grid_no, cabinet_id, in_res_id, is_out) VALUES (3, 5, ?1, 1)",
                [id],
            )
            .unwrap();
            c.execute("INSERT INTO t_res_use_log (res_id) VALUES (?1)", [id])
                .unwrap();
        }

        let sling = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(sling.use_count, 1);
        let location = sling.location.unwrap();
        assert_eq!(location.cabinet_name, "一号柜");
        assert_eq!(location.grid_no, 3);
        assert!(location.is_out);
    }

    #[test]
    fn test_delete_removes_grid_row() {
        let (conn, repo) = setup();
        let id = repo.insert(&Sling::new("RF-003", "卸扣 C")).unwrap();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO t_res_cabinet_grid (grid_no, cabinet_id, in_res_id) VALUES (1, 5, ?1)",
                [id],
            )
            .unwrap();

        assert_eq!(repo.delete_with_grid(id).unwrap(), (1, 1));
        assert!(repo.find_by_id(id).unwrap().is_none());
        assert!(repo.find_by_rf_id("RF-003").unwrap().is_none());
    }

    #[test]
    fn test_list_filters() {
        let (_, repo) = setup();
        let mut heavy = Sling::new("RF-010", "重型吊带");
        heavy.max_tonnage = 10;
        repo.insert(&heavy).unwrap();
        let mut light = Sling::new("RF-011", "轻型吊带");
        light.max_tonnage = 2;
        repo.insert(&light).unwrap();

        let filter = SlingQuery {
            name: Some("吊带".to_string()),
            max_tonnage: Some(10),
            ..Default::default()
        };
        let page = repo.list_paged(&filter, PageQuery::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].rf_id, "RF-010");
        assert!(page.list[0].location.is_none());
    }
}
