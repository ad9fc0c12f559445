// ==========================================
// 吊索具智能柜管理系统 - 首页统计仓储
// ==========================================
// 只读聚合查询，统计口径均排除已删除行
// ==========================================

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use crate::domain::dict::{GroupCount, ResourceOverview, SlingUsageRank};
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct StatsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StatsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 资源总览
    pub fn overview(&self) -> RepositoryResult<ResourceOverview> {
        let conn = self.get_conn()?;
        let overview = conn.query_row(
            r#"SELECT
                 (SELECT COUNT(*) FROM t_res_sling WHERE deleted_at IS NULL),
                 (SELECT COUNT(*) FROM t_res_cabinet WHERE deleted_at IS NULL),
                 (SELECT COALESCE(SUM(grid_count), 0) FROM t_res_cabinet WHERE deleted_at IS NULL),
                 (SELECT COUNT(*) FROM t_res_cabinet_grid g
                    JOIN t_res_cabinet c ON c.id = g.cabinet_id AND c.deleted_at IS NULL
                   WHERE g.in_res_id > 0 AND g.deleted_at IS NULL),
                 (SELECT COUNT(*) FROM t_sys_staff WHERE deleted_at IS NULL),
                 (SELECT COUNT(*) FROM t_auth_user WHERE deleted_at IS NULL),
                 (SELECT COUNT(*) FROM t_res_use_log
                   WHERE return_time IS NULL AND deleted_at IS NULL)"#,
            [],
            |row| {
                Ok(ResourceOverview {
                    sling_count: row.get(0)?,
                    cabinet_count: row.get(1)?,
                    grid_total: row.get(2)?,
                    grid_used: row.get(3)?,
                    staff_count: row.get(4)?,
                    user_count: row.get(5)?,
                    outstanding_count: row.get(6)?,
                })
            },
        )?;
        Ok(overview)
    }

    /// 吊索具按最大吨位分组
    pub fn slings_by_tonnage(&self) -> RepositoryResult<Vec<GroupCount>> {
        self.group_slings_by("max_tonnage")
    }

    /// 吊索具按使用状态分组
    pub fn slings_by_use_status(&self) -> RepositoryResult<Vec<GroupCount>> {
        self.group_slings_by("use_status")
    }

    fn group_slings_by(&self, column: &str) -> RepositoryResult<Vec<GroupCount>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"SELECT {col}, COUNT(*) FROM t_res_sling
               WHERE deleted_at IS NULL
               GROUP BY {col} ORDER BY {col}"#,
            col = column
        ))?;
        let groups = stmt
            .query_map([], |row| {
                Ok(GroupCount {
                    key: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<GroupCount>, _>>()?;
        Ok(groups)
    }

    /// 使用次数前 N 的吊索具
    pub fn top_slings_by_use(&self, limit: i64) -> RepositoryResult<Vec<SlingUsageRank>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT s.id, s.name, COUNT(l.id) AS use_count
               FROM t_res_sling s
               JOIN t_res_use_log l ON l.res_id = s.id AND l.deleted_at IS NULL
               WHERE s.deleted_at IS NULL
               GROUP BY s.id, s.name
               ORDER BY use_count DESC, s.id
               LIMIT ?1"#,
        )?;
        let ranks = stmt
            .query_map(params![limit], |row| {
                Ok(SlingUsageRank {
                    res_id: row.get(0)?,
                    name: row.get(1)?,
                    use_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<SlingUsageRank>, _>>()?;
        Ok(ranks)
    }
}
