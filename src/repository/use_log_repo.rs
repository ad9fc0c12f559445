// ==========================================
// 吊索具智能柜管理系统 - 使用日志仓储
// ==========================================
// 借还工作单元 (同一事务):
//   1. 资产所在箱格的借出标记 (无箱格时为空操作)
//   2. 吊索具使用状态 (借出→借出中，归还→在库)
//   3. 借出: 新增日志；归还: 回填最近一条未归还日志
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

use crate::db::{from_db_datetime, now_local, run_in_transaction, to_db_datetime};
use crate::domain::paging::{PageQuery, PageResult};
use crate::domain::types::{ReturnFilter, TakeReturnFlag};
use crate::domain::usage::{TakeReturnOutcome, TakeReturnRequest, UseLog, UseLogQuery};
use crate::repository::cabinet_repo::set_resource_out_flag;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_page, FilterQuery};

const USE_LOG_COLUMNS: &str = r#"id, res_id, rf_id, res_name, take_staff_id, take_staff_name,
    take_time, return_plan_time, return_staff_id, return_staff_name, return_time, remark,
    created_at"#;

pub struct UseLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UseLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按资产借出/归还
    ///
    /// # 错误
    /// - `NotFound`: 吊索具不存在
    /// - `NoOpenUseLog`: 归还时没有未归还的日志，整个事务回滚
    pub fn take_return_by_resource(&self, req: &TakeReturnRequest) -> RepositoryResult<TakeReturnOutcome> {
        let mut conn = self.get_conn()?;
        let now = now_local();
        let now_text = to_db_datetime(&now);
        let event_time = to_db_datetime(&req.event_time.unwrap_or(now));

        run_in_transaction(&mut conn, |tx| {
            let (rf_id, res_name) = sling_identity(tx, req.res_id)?
                .ok_or_else(|| RepositoryError::not_found("Sling", req.res_id))?;
            let staff_name = if req.staff_name.trim().is_empty() {
                staff_name_of(tx, req.staff_id)?.unwrap_or_default()
            } else {
                req.staff_name.trim().to_string()
            };

            let grid_updated = set_resource_out_flag(tx, req.res_id, req.flag, &now_text)? > 0;

            tx.execute(
                "UPDATE t_res_sling SET use_status = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    req.flag.resulting_use_status().to_db_value(),
                    now_text,
                    req.res_id
                ],
            )?;

            let log_id = match req.flag {
                TakeReturnFlag::Take => {
                    tx.execute(
                        r#"INSERT INTO t_res_use_log (
                               res_id, rf_id, res_name, take_staff_id, take_staff_name, take_time,
                               return_plan_time, remark, created_at, updated_at
                           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"#,
                        params![
                            req.res_id,
                            rf_id,
                            res_name,
                            req.staff_id,
                            staff_name,
                            event_time,
                            req.return_plan_time.as_ref().map(to_db_datetime),
                            req.remark,
                            now_text,
                        ],
                    )?;
                    tx.last_insert_rowid()
                }
                TakeReturnFlag::Return => {
                    let open_id = open_log_id(tx, req.res_id)?
                        .ok_or(RepositoryError::NoOpenUseLog { res_id: req.res_id })?;
                    tx.execute(
                        r#"UPDATE t_res_use_log
                           SET return_staff_id = ?1, return_staff_name = ?2, return_time = ?3,
                               remark = CASE WHEN ?4 = '' THEN remark ELSE ?4 END,
                               updated_at = ?5
                           WHERE id = ?6"#,
                        params![
                            req.staff_id,
                            staff_name,
                            event_time,
                            req.remark,
                            now_text,
                            open_id
                        ],
                    )?;
                    open_id
                }
            };

            tracing::info!(
                "借还完成: res_id={}, flag={}, log_id={}, grid_updated={}",
                req.res_id,
                req.flag,
                log_id,
                grid_updated
            );

            Ok(TakeReturnOutcome {
                res_id: req.res_id,
                flag: req.flag,
                log_id,
                grid_updated,
            })
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<UseLog>> {
        let conn = self.get_conn()?;
        let log = conn
            .query_row(
                &format!(
                    "SELECT {} FROM t_res_use_log WHERE id = ?1 AND deleted_at IS NULL",
                    USE_LOG_COLUMNS
                ),
                params![id],
                map_use_log,
            )
            .optional()?;
        Ok(log)
    }

    /// 资产最近一条未归还的日志
    pub fn find_open_by_resource(&self, res_id: i64) -> RepositoryResult<Option<UseLog>> {
        let id = {
            let conn = self.get_conn()?;
            open_log_id(&conn, res_id)?
        };
        match id {
            Some(id) => self.find_by_id(id),
            None => Ok(None),
        }
    }

    /// 分页查询，按创建时间倒序
    pub fn list_paged(&self, filter: &UseLogQuery, page: PageQuery) -> RepositoryResult<PageResult<UseLog>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new("FROM t_res_use_log")
            .where_clause("deleted_at IS NULL")
            .like_if("res_name", filter.res_name.as_deref())
            .eq_if("take_staff_id", filter.take_staff_id)
            .eq_if("return_staff_id", filter.return_staff_id)
            .between_if(
                "created_at",
                filter.take_start_time.as_ref().map(to_db_datetime),
                filter.take_end_time.as_ref().map(to_db_datetime),
            );
        let query = match filter.return_filter {
            ReturnFilter::All => query,
            ReturnFilter::Returned => query.where_clause("return_time IS NOT NULL"),
            ReturnFilter::Outstanding => query.where_clause("return_time IS NULL"),
        };
        fetch_page(
            &conn,
            &query,
            USE_LOG_COLUMNS,
            "created_at DESC, id DESC",
            page,
            map_use_log,
        )
    }
}

fn sling_identity(tx: &Transaction<'_>, res_id: i64) -> rusqlite::Result<Option<(String, String)>> {
    tx.query_row(
        "SELECT rf_id, name FROM t_res_sling WHERE id = ?1 AND deleted_at IS NULL",
        params![res_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

fn staff_name_of(tx: &Transaction<'_>, staff_id: i64) -> rusqlite::Result<Option<String>> {
    tx.query_row(
        "SELECT name FROM t_sys_staff WHERE id = ?1",
        params![staff_id],
        |row| row.get(0),
    )
    .optional()
}

fn open_log_id(conn: &Connection, res_id: i64) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        r#"SELECT id FROM t_res_use_log
           WHERE res_id = ?1 AND return_time IS NULL AND deleted_at IS NULL
           ORDER BY created_at DESC, id DESC LIMIT 1"#,
        params![res_id],
        |row| row.get(0),
    )
    .optional()
}

fn map_use_log(row: &Row<'_>) -> rusqlite::Result<UseLog> {
    Ok(UseLog {
        id: row.get(0)?,
        res_id: row.get(1)?,
        rf_id: row.get(2)?,
        res_name: row.get(3)?,
        take_staff_id: row.get(4)?,
        take_staff_name: row.get(5)?,
        take_time: from_db_datetime(row.get(6)?),
        return_plan_time: from_db_datetime(row.get(7)?),
        return_staff_id: row.get(8)?,
        return_staff_name: row.get(9)?,
        return_time: from_db_datetime(row.get(10)?),
        remark: row.get(11)?,
        created_at: from_db_datetime(row.get(12)?),
    })
}
