// ==========================================
// 吊索具智能柜管理系统 - 智能柜/箱格仓储
// ==========================================
// 箱格行按需落库: 只有被存放过资产的编号才有行
// 红线: 同一资产 (非 0) 同时最多占用一个未删除的箱格行
// 红线: 存放/删除柜子等多表变更必须在同一事务内完成
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

use crate::db::{from_db_datetime, now_local, run_in_transaction, to_db_datetime};
use crate::domain::paging::{PageQuery, PageResult};
use crate::domain::resource::{dense_grid_view, Cabinet, CabinetGrid, GridSlot, EMPTY_RESOURCE_ID};
use crate::domain::types::TakeReturnFlag;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_page, FilterQuery};

const CABINET_COLUMNS: &str = r#"c.id, c.name, c.grid_count, c.location, c.status, c.remark,
    c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM t_res_cabinet_grid g
      WHERE g.cabinet_id = c.id AND g.in_res_id > 0 AND g.deleted_at IS NULL)"#;
const GRID_COLUMNS: &str = "id, grid_no, cabinet_id, in_res_id, is_out";

pub struct CabinetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CabinetRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 智能柜
    // ==========================================

    pub fn insert(&self, cabinet: &Cabinet) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        conn.execute(
            r#"INSERT INTO t_res_cabinet (
                   name, grid_count, location, status, remark, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)"#,
            params![
                cabinet.name,
                cabinet.grid_count,
                cabinet.location,
                cabinet.status,
                cabinet.remark,
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, cabinet: &Cabinet) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_res_cabinet
               SET name = ?1, grid_count = ?2, location = ?3, status = ?4, remark = ?5,
                   updated_at = ?6
               WHERE id = ?7 AND deleted_at IS NULL"#,
            params![
                cabinet.name,
                cabinet.grid_count,
                cabinet.location,
                cabinet.status,
                cabinet.remark,
                to_db_datetime(&now_local()),
                cabinet.id
            ],
        )?;
        Ok(affected)
    }

    /// 是否存在同名的其他智能柜
    pub fn name_taken(&self, name: &str, exclude_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM t_res_cabinet
               WHERE name = ?1 AND id <> ?2 AND deleted_at IS NULL"#,
            params![name, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Cabinet>> {
        let conn = self.get_conn()?;
        let cabinet = conn
            .query_row(
                &format!(
                    "SELECT {} FROM t_res_cabinet c WHERE c.id = ?1 AND c.deleted_at IS NULL",
                    CABINET_COLUMNS
                ),
                params![id],
                map_cabinet,
            )
            .optional()?;
        Ok(cabinet)
    }

    /// 分页查询 (名称模糊)，附带已用/空闲箱格数
    pub fn list_paged(&self, name: Option<&str>, page: PageQuery) -> RepositoryResult<PageResult<Cabinet>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new("FROM t_res_cabinet c")
            .where_clause("c.deleted_at IS NULL")
            .like_if("c.name", name);
        fetch_page(&conn, &query, CABINET_COLUMNS, "c.id", page, map_cabinet)
    }

    /// 删除智能柜及其全部箱格行 (同一事务)
    ///
    /// # 返回
    /// - (智能柜删除行数, 箱格删除行数)
    pub fn delete_with_grids(&self, id: i64) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());
        run_in_transaction(&mut conn, |tx| {
            let cabinets = tx.execute(
                "UPDATE t_res_cabinet SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                params![now, id],
            )?;
            let grids = tx.execute(
                r#"UPDATE t_res_cabinet_grid SET deleted_at = ?1
                   WHERE cabinet_id = ?2 AND deleted_at IS NULL"#,
                params![now, id],
            )?;
            Ok((cabinets, grids))
        })
    }

    // ==========================================
    // 箱格
    // ==========================================

    /// 智能柜已落库的箱格行
    pub fn list_grid_rows(&self, cabinet_id: i64) -> RepositoryResult<Vec<CabinetGrid>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"SELECT {} FROM t_res_cabinet_grid
               WHERE cabinet_id = ?1 AND deleted_at IS NULL
               ORDER BY grid_no, id"#,
            GRID_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![cabinet_id], map_grid)?
            .collect::<Result<Vec<CabinetGrid>, _>>()?;
        Ok(rows)
    }

    /// 稠密箱格视图: 恰好 grid_count 项，编号 1..=grid_count
    pub fn list_grids(&self, cabinet_id: i64) -> RepositoryResult<Vec<GridSlot>> {
        let cabinet = self
            .find_by_id(cabinet_id)?
            .ok_or_else(|| RepositoryError::not_found("Cabinet", cabinet_id))?;
        let rows = self.list_grid_rows(cabinet_id)?;
        Ok(dense_grid_view(cabinet.id, cabinet.grid_count, &rows))
    }

    /// 资产当前所在的箱格行
    pub fn find_grid_by_resource(&self, res_id: i64) -> RepositoryResult<Option<CabinetGrid>> {
        let conn = self.get_conn()?;
        Ok(grid_by_resource(&conn, res_id)?)
    }

    /// 将资产存放到指定箱格
    ///
    /// - 目标箱格已存放其他资产: `GridOccupied`，不做任何变更
    /// - 资产已在其他箱格: 原箱格行迁移到目标编号 (目标处的空行被移除)
    /// - 否则: 复用目标处的空行或新建箱格行
    ///
    /// 调用方负责校验智能柜存在、编号在范围内。
    pub fn store(&self, cabinet_id: i64, grid_no: i64, res_id: i64) -> RepositoryResult<CabinetGrid> {
        let mut conn = self.get_conn()?;
        let now = to_db_datetime(&now_local());

        run_in_transaction(&mut conn, |tx| {
            let target = grid_at(tx, cabinet_id, grid_no)?;
            if let Some(slot) = &target {
                if slot.in_res_id != EMPTY_RESOURCE_ID && slot.in_res_id != res_id {
                    return Err(RepositoryError::GridOccupied {
                        cabinet_id,
                        grid_no,
                        in_res_id: slot.in_res_id,
                    });
                }
            }

            let current = grid_by_resource(tx, res_id)?;
            let grid_id = match (current, target) {
                // 已在目标箱格
                (Some(current), Some(target)) if current.id == target.id => current.id,
                (Some(current), target) => {
                    if let Some(placeholder) = target {
                        tx.execute(
                            "UPDATE t_res_cabinet_grid SET deleted_at = ?1 WHERE id = ?2",
                            params![now, placeholder.id],
                        )?;
                    }
                    tx.execute(
                        r#"UPDATE t_res_cabinet_grid
                           SET cabinet_id = ?1, grid_no = ?2, updated_at = ?3
                           WHERE id = ?4"#,
                        params![cabinet_id, grid_no, now, current.id],
                    )?;
                    tracing::debug!(
                        "箱格迁移: res_id={}, from=({}, {}), to=({}, {})",
                        res_id,
                        current.cabinet_id,
                        current.grid_no,
                        cabinet_id,
                        grid_no
                    );
                    current.id
                }
                (None, Some(placeholder)) => {
                    tx.execute(
                        r#"UPDATE t_res_cabinet_grid
                           SET in_res_id = ?1, is_out = 0, updated_at = ?2
                           WHERE id = ?3"#,
                        params![res_id, now, placeholder.id],
                    )?;
                    placeholder.id
                }
                (None, None) => {
                    tx.execute(
                        r#"INSERT INTO t_res_cabinet_grid (
                               grid_no, cabinet_id, in_res_id, is_out, created_at, updated_at
                           ) VALUES (?1, ?2, ?3, 0, ?4, ?4)"#,
                        params![grid_no, cabinet_id, res_id, now],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            let stored = tx.query_row(
                &format!("SELECT {} FROM t_res_cabinet_grid WHERE id = ?1", GRID_COLUMNS),
                params![grid_id],
                map_grid,
            )?;
            Ok(stored)
        })
    }

    /// 直接设置某个箱格的借出标记
    ///
    /// # 返回
    /// - 受影响行数 (箱格未落库时为 0)
    pub fn set_slot_out_flag(&self, cabinet_id: i64, grid_no: i64, flag: TakeReturnFlag) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_res_cabinet_grid SET is_out = ?1, updated_at = ?2
               WHERE cabinet_id = ?3 AND grid_no = ?4 AND deleted_at IS NULL"#,
            params![
                flag.out_flag(),
                to_db_datetime(&now_local()),
                cabinet_id,
                grid_no
            ],
        )?;
        Ok(affected)
    }
}

fn grid_at(conn: &Connection, cabinet_id: i64, grid_no: i64) -> rusqlite::Result<Option<CabinetGrid>> {
    conn.query_row(
        &format!(
            r#"SELECT {} FROM t_res_cabinet_grid
               WHERE cabinet_id = ?1 AND grid_no = ?2 AND deleted_at IS NULL
               ORDER BY id LIMIT 1"#,
            GRID_COLUMNS
        ),
        params![cabinet_id, grid_no],
        map_grid,
    )
    .optional()
}

pub(crate) fn grid_by_resource(conn: &Connection, res_id: i64) -> rusqlite::Result<Option<CabinetGrid>> {
    conn.query_row(
        &format!(
            r#"SELECT {} FROM t_res_cabinet_grid
               WHERE in_res_id = ?1 AND deleted_at IS NULL
               ORDER BY id LIMIT 1"#,
            GRID_COLUMNS
        ),
        params![res_id],
        map_grid,
    )
    .optional()
}

/// 在事务内更新资产所在箱格的借出标记 (资产无箱格时为空操作)
pub(crate) fn set_resource_out_flag(
    tx: &Transaction<'_>,
    res_id: i64,
    flag: TakeReturnFlag,
    now: &str,
) -> rusqlite::Result<usize> {
    tx.execute(
        r#"UPDATE t_res_cabinet_grid SET is_out = ?1, updated_at = ?2
           WHERE in_res_id = ?3 AND deleted_at IS NULL"#,
        params![flag.out_flag(), now, res_id],
    )
}

fn map_cabinet(row: &Row<'_>) -> rusqlite::Result<Cabinet> {
    let grid_count: i64 = row.get(2)?;
    let used_count: i64 = row.get(8)?;
    Ok(Cabinet {
        id: row.get(0)?,
        name: row.get(1)?,
        grid_count,
        location: row.get(3)?,
        status: row.get(4)?,
        remark: row.get(5)?,
        created_at: from_db_datetime(row.get(6)?),
        updated_at: from_db_datetime(row.get(7)?),
        used_count,
        unused_count: (grid_count - used_count).max(0),
    })
}

fn map_grid(row: &Row<'_>) -> rusqlite::Result<CabinetGrid> {
    Ok(CabinetGrid {
        id: row.get(0)?,
        grid_no: row.get(1)?,
        cabinet_id: row.get(2)?,
        in_res_id: row.get(3)?,
        is_out: row.get::<_, i64>(4)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> (Arc<Mutex<Connection>>, CabinetRepository) {
        let conn = Connection::open_in_memory().unwrap();
        db::bootstrap(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), CabinetRepository::new(conn))
    }

    fn live_rows_for(conn: &Arc<Mutex<Connection>>, res_id: i64) -> i64 {
        conn.lock()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM t_res_cabinet_grid WHERE in_res_id = ?1 AND deleted_at IS NULL",
                [res_id],
                |r| r.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_list_grids_dense_before_and_after_store() {
        let (_, repo) = setup();
        let id = repo.insert(&Cabinet::new("一号柜", 3)).unwrap();

        let view = repo.list_grids(id).unwrap();
        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|s| s.in_res_id == 0));

        repo.store(id, 2, 77).unwrap();
        let view = repo.list_grids(id).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].in_res_id, 0);
        assert_eq!(view[1].in_res_id, 77);
        assert_eq!(view[2].in_res_id, 0);
    }

    #[test]
    fn test_list_grids_unknown_cabinet() {
        let (_, repo) = setup();
        let err = repo.list_grids(404).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_store_moves_existing_row() {
        let (conn, repo) = setup();
        let a = repo.insert(&Cabinet::new("A柜", 4)).unwrap();
        let b = repo.insert(&Cabinet::new("B柜", 4)).unwrap();

        let first = repo.store(a, 1, 9).unwrap();
        let moved = repo.store(b, 4, 9).unwrap();
        assert_eq!(first.id, moved.id);
        assert_eq!(moved.cabinet_id, b);
        assert_eq!(moved.grid_no, 4);
        assert_eq!(live_rows_for(&conn, 9), 1);

        // 同一位置重复存放为幂等
        let again = repo.store(b, 4, 9).unwrap();
        assert_eq!(again.id, moved.id);
        assert_eq!(live_rows_for(&conn, 9), 1);
    }

    #[test]
    fn test_store_into_occupied_slot_fails_without_change() {
        let (conn, repo) = setup();
        let id = repo.insert(&Cabinet::new("C柜", 2)).unwrap();
        repo.store(id, 1, 10).unwrap();
        repo.store(id, 2, 11).unwrap();

        let err = repo.store(id, 1, 11).unwrap_err();
        assert!(matches!(err, RepositoryError::GridOccupied { in_res_id: 10, .. }));

        let view = repo.list_grids(id).unwrap();
        assert_eq!(view[0].in_res_id, 10);
        assert_eq!(view[1].in_res_id, 11);
        assert_eq!(live_rows_for(&conn, 11), 1);
    }

    #[test]
    fn test_store_reuses_and_replaces_empty_placeholder() {
        let (conn, repo) = setup();
        let id = repo.insert(&Cabinet::new("D柜", 3)).unwrap();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO t_res_cabinet_grid (grid_no, cabinet_id, in_res_id) VALUES (3, ?1, 0)",
                [id],
            )
            .unwrap();

        // 空行被复用
        let stored = repo.store(id, 3, 20).unwrap();
        assert_eq!(stored.in_res_id, 20);
        assert_eq!(repo.list_grid_rows(id).unwrap().len(), 1);

        // 迁移到另一个空行位置时，空行被移除
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO t_res_cabinet_grid (grid_no, cabinet_id, in_res_id) VALUES (1, ?1, 0)",
                [id],
            )
            .unwrap();
        repo.store(id, 1, 20).unwrap();
        let rows = repo.list_grid_rows(id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].grid_no, 1);
        assert_eq!(rows[0].in_res_id, 20);
    }

    #[test]
    fn test_delete_cascades_to_grids() {
        let (conn, repo) = setup();
        let id = repo.insert(&Cabinet::new("E柜", 5)).unwrap();
        for (no, res) in [(1, 31), (2, 32), (3, 33)] {
            repo.store(id, no, res).unwrap();
        }

        assert_eq!(repo.delete_with_grids(id).unwrap(), (1, 3));
        assert!(repo.find_by_id(id).unwrap().is_none());
        let live: i64 = conn
            .lock()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM t_res_cabinet_grid WHERE cabinet_id = ?1 AND deleted_at IS NULL",
                [id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(live, 0);
    }

    #[test]
    fn test_list_reports_used_counts() {
        let (_, repo) = setup();
        let id = repo.insert(&Cabinet::new("F柜", 6)).unwrap();
        repo.store(id, 1, 41).unwrap();
        repo.store(id, 5, 42).unwrap();

        let page = repo.list_paged(Some("F"), PageQuery::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].used_count, 2);
        assert_eq!(page.list[0].unused_count, 4);
        assert!(repo.name_taken("F柜", 0).unwrap());
    }

    #[test]
    fn test_list_paged_with_extreme_page_index() {
        let (_, repo) = setup();
        repo.insert(&Cabinet::new("J柜", 2)).unwrap();

        let page = repo.list_paged(None, PageQuery::new(i64::MAX, 10)).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.list.is_empty());
        assert_eq!(page.page_count, 1);

        let page = repo.list_paged(None, PageQuery::new(1, i64::MAX)).unwrap();
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.page_count, 1);
    }

    #[test]
    fn test_set_slot_out_flag() {
        let (_, repo) = setup();
        let id = repo.insert(&Cabinet::new("G柜", 2)).unwrap();
        assert_eq!(repo.set_slot_out_flag(id, 1, TakeReturnFlag::Take).unwrap(), 0);

        repo.store(id, 1, 51).unwrap();
        assert_eq!(repo.set_slot_out_flag(id, 1, TakeReturnFlag::Take).unwrap(), 1);
        assert!(repo.find_grid_by_resource(51).unwrap().unwrap().is_out);
    }

    #[test]
    fn test_delete_rolls_back_when_grid_delete_fails() {
        let (conn, repo) = setup();
        let id = repo.insert(&Cabinet::new("H柜", 5)).unwrap();
        for (no, res) in [(1, 61), (2, 62), (3, 63)] {
            repo.store(id, no, res).unwrap();
        }
        conn.lock()
            .unwrap()
            .execute_batch(
                r#"CREATE TRIGGER fail_grid_delete BEFORE UPDATE OF deleted_at ON t_res_cabinet_grid
                   BEGIN SELECT RAISE(ABORT, 'grid delete failed'); END;"#,
            )
            .unwrap();

        assert!(repo.delete_with_grids(id).is_err());

        // 智能柜删除随之撤销
        assert!(repo.find_by_id(id).unwrap().is_some());
        assert_eq!(repo.list_grid_rows(id).unwrap().len(), 3);
    }

    #[test]
    fn test_store_rolls_back_when_move_fails() {
        let (conn, repo) = setup();
        let id = repo.insert(&Cabinet::new("I柜", 4)).unwrap();
        repo.store(id, 1, 71).unwrap();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO t_res_cabinet_grid (grid_no, cabinet_id, in_res_id) VALUES (3, ?1, 0)",
                [id],
            )
            .unwrap();
        conn.lock()
            .unwrap()
            .execute_batch(
                r#"CREATE TRIGGER fail_grid_move BEFORE UPDATE OF cabinet_id ON t_res_cabinet_grid
                   BEGIN SELECT RAISE(ABORT, 'grid move failed'); END;"#,
            )
            .unwrap();

        // 先移除目标空行，再迁移资产所在行；迁移失败时空行移除也被撤销
        assert!(repo.store(id, 3, 71).is_err());

        let rows = repo.list_grid_rows(id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(repo.find_grid_by_resource(71).unwrap().unwrap().grid_no, 1);
        assert!(rows.iter().any(|g| g.grid_no == 3 && g.in_res_id == 0));
    }
}
