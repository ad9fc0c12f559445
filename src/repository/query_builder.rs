// ==========================================
// 吊索具智能柜管理系统 - 列表查询构建器
// ==========================================
// 职责: 按可选条件拼接 WHERE 子句，并同步收集参数
// 约束: 所有条件值都以 ?N 占位参数传入，不拼接到 SQL 文本
// 规则: None / 空白字符串 / 0 视为未设置，条件被省略
// ==========================================

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

use crate::domain::paging::{PageQuery, PageResult};
use crate::repository::error::RepositoryResult;

/// 列表查询构建器（流式 API）
///
/// # 示例
/// ```
/// use cmkit::repository::query_builder::FilterQuery;
///
/// let query = FilterQuery::new("FROM t_res_sling s")
///     .where_clause("s.deleted_at IS NULL")
///     .like_if("s.name", Some("钢丝"))
///     .eq_if("s.sling_type", Some(0));
///
/// assert_eq!(
///     query.count_sql(),
///     "SELECT COUNT(*) FROM t_res_sling s WHERE s.deleted_at IS NULL AND s.name LIKE ?1"
/// );
/// assert_eq!(query.values().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FilterQuery {
    from_clause: String,
    where_clauses: Vec<String>,
    values: Vec<Value>,
}

impl FilterQuery {
    /// 创建构建器，`from` 包含 FROM 及 JOIN 部分
    pub fn new(from: &str) -> Self {
        Self {
            from_clause: from.to_string(),
            where_clauses: Vec::new(),
            values: Vec::new(),
        }
    }

    /// 添加无参数条件
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// 整数等值条件，None 或 0 时省略
    pub fn eq_if(self, column: &str, value: Option<i64>) -> Self {
        match value.filter(|v| *v != 0) {
            Some(v) => self.bind(column, "=", Value::from(v)),
            None => self,
        }
    }

    /// 文本等值条件，空白时省略
    pub fn eq_text_if(self, column: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|s| !s.is_empty()) {
            Some(v) => self.bind(column, "=", Value::from(v.to_string())),
            None => self,
        }
    }

    /// 子串匹配条件，空白时省略
    pub fn like_if(self, column: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|s| !s.is_empty()) {
            Some(v) => self.bind(column, "LIKE", Value::from(format!("%{}%", v))),
            None => self,
        }
    }

    /// 闭区间条件，任一端为 None 时只保留另一端
    pub fn between_if(self, column: &str, from: Option<String>, to: Option<String>) -> Self {
        let query = match from {
            Some(v) => self.bind(column, ">=", Value::from(v)),
            None => self,
        };
        match to {
            Some(v) => query.bind(column, "<=", Value::from(v)),
            None => query,
        }
    }

    fn bind(mut self, column: &str, op: &str, value: Value) -> Self {
        self.values.push(value);
        self.where_clauses
            .push(format!("{} {} ?{}", column, op, self.values.len()));
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// 统计总行数的 SQL
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) {}{}", self.from_clause, self.where_sql())
    }

    /// 不分页的查询 SQL
    pub fn select_sql(&self, columns: &str, order_by: &str) -> String {
        format!(
            "SELECT {} {}{} ORDER BY {}",
            columns,
            self.from_clause,
            self.where_sql(),
            order_by
        )
    }

    /// 分页查询 SQL 及完整参数（LIMIT/OFFSET 追加在条件参数之后）
    pub fn page_sql(&self, columns: &str, order_by: &str, page: PageQuery) -> (String, Vec<Value>) {
        let idx = self.values.len() + 1;
        let sql = format!(
            "{} LIMIT ?{} OFFSET ?{}",
            self.select_sql(columns, order_by),
            idx,
            idx + 1
        );
        let mut values = self.values.clone();
        values.push(Value::from(page.page_size));
        values.push(Value::from(page.offset()));
        (sql, values)
    }
}

/// 按构建器执行 COUNT + 分页查询
///
/// 分页参数先归一化 (页码默认 1，页大小默认 10)。
pub fn fetch_page<T, F>(
    conn: &Connection,
    query: &FilterQuery,
    columns: &str,
    order_by: &str,
    page: PageQuery,
    map_row: F,
) -> RepositoryResult<PageResult<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let page = page.normalized();
    let total: i64 = conn.query_row(
        &query.count_sql(),
        params_from_iter(query.values().iter()),
        |row| row.get(0),
    )?;

    let (sql, values) = query.page_sql(columns, order_by, page);
    let mut stmt = conn.prepare(&sql)?;
    let list = stmt
        .query_map(params_from_iter(values), map_row)?
        .collect::<Result<Vec<T>, _>>()?;

    Ok(PageResult::new(page, total, list))
}

/// 按构建器执行不分页查询
pub fn fetch_all<T, F>(
    conn: &Connection,
    query: &FilterQuery,
    columns: &str,
    order_by: &str,
    map_row: F,
) -> RepositoryResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(&query.select_sql(columns, order_by))?;
    let list = stmt
        .query_map(params_from_iter(query.values().iter()), map_row)?
        .collect::<Result<Vec<T>, _>>()?;
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_filters_are_omitted() {
        let query = FilterQuery::new("FROM t_sys_staff")
            .where_clause("deleted_at IS NULL")
            .like_if("name", Some("   "))
            .eq_if("company_id", None)
            .eq_if("department_id", Some(0));

        assert_eq!(
            query.count_sql(),
            "SELECT COUNT(*) FROM t_sys_staff WHERE deleted_at IS NULL"
        );
        assert!(query.values().is_empty());
    }

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let query = FilterQuery::new("FROM t_res_use_log")
            .like_if("res_name", Some("A"))
            .eq_if("take_staff_id", Some(3))
            .between_if(
                "created_at",
                Some("2026-01-01 00:00:00".to_string()),
                Some("2026-01-31 23:59:59".to_string()),
            );

        let (sql, values) = query.page_sql("*", "created_at DESC", PageQuery::new(2, 10));
        assert!(sql.contains("res_name LIKE ?1"));
        assert!(sql.contains("take_staff_id = ?2"));
        assert!(sql.contains("created_at >= ?3 AND created_at <= ?4"));
        assert!(sql.ends_with("ORDER BY created_at DESC LIMIT ?5 OFFSET ?6"));
        assert_eq!(values.len(), 6);
        assert_eq!(values[4], Value::Integer(10));
        assert_eq!(values[5], Value::Integer(10));
        assert_eq!(values[0], Value::Text("%A%".to_string()));
    }

    #[test]
    fn test_fetch_page_counts_and_slices() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();
        for i in 1..=25 {
            conn.execute(
                "INSERT INTO t (name) VALUES (?1)",
                [format!("n{}", i)],
            )
            .unwrap();
        }

        let query = FilterQuery::new("FROM t");
        let page = fetch_page(&conn, &query, "id", "id", PageQuery::new(3, 0), |row| {
            row.get::<_, i64>(0)
        })
        .unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.list, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_no_where_when_unfiltered() {
        let query = FilterQuery::new("FROM t_sys_company");
        assert_eq!(
            query.select_sql("id, name", "id"),
            "SELECT id, name FROM t_sys_company ORDER BY id"
        );
    }
}
