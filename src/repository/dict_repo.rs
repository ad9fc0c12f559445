// ==========================================
// 吊索具智能柜管理系统 - 字典仓储
// ==========================================
// 删除方式: 物理删除
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::dict::DictData;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder::{fetch_all, FilterQuery};

const DICT_COLUMNS: &str = "id, key, name, type, note, scene";

pub struct DictRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DictRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, dict: &DictData) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO t_sys_dict (key, name, type, note, scene) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![dict.key, dict.name, dict.dict_type, dict.note, dict.scene],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, dict: &DictData) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE t_sys_dict SET key = ?1, name = ?2, type = ?3, note = ?4, scene = ?5
               WHERE id = ?6"#,
            params![
                dict.key,
                dict.name,
                dict.dict_type,
                dict.note,
                dict.scene,
                dict.id
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM t_sys_dict WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<DictData>> {
        let conn = self.get_conn()?;
        let dict = conn
            .query_row(
                &format!("SELECT {} FROM t_sys_dict WHERE id = ?1", DICT_COLUMNS),
                params![id],
                map_dict,
            )
            .optional()?;
        Ok(dict)
    }

    /// 按应用场景/类型查询 (空值不过滤)，按类型、键排序
    pub fn list(&self, scene: Option<&str>, dict_type: Option<&str>) -> RepositoryResult<Vec<DictData>> {
        let conn = self.get_conn()?;
        let query = FilterQuery::new("FROM t_sys_dict")
            .eq_text_if("scene", scene)
            .eq_text_if("type", dict_type);
        fetch_all(&conn, &query, DICT_COLUMNS, "type, key, id", map_dict)
    }
}

fn map_dict(row: &Row<'_>) -> rusqlite::Result<DictData> {
    Ok(DictData {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        dict_type: row.get(3)?,
        note: row.get(4)?,
        scene: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> DictRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::bootstrap(&conn).unwrap();
        DictRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn dict(key: i64, name: &str, dict_type: &str, scene: &str) -> DictData {
        DictData {
            id: 0,
            key,
            name: name.to_string(),
            dict_type: dict_type.to_string(),
            note: String::new(),
            scene: scene.to_string(),
        }
    }

    #[test]
    fn test_list_by_scene_and_type() {
        let repo = setup();
        repo.insert(&dict(2, "借出", "use_status", "sling")).unwrap();
        repo.insert(&dict(1, "在库", "use_status", "sling")).unwrap();
        repo.insert(&dict(1, "合格", "inspect_status", "sling")).unwrap();
        repo.insert(&dict(0, "正常", "status", "user")).unwrap();

        let sling = repo.list(Some("sling"), None).unwrap();
        assert_eq!(sling.len(), 3);

        let statuses = repo.list(Some("sling"), Some("use_status")).unwrap();
        assert_eq!(
            statuses.iter().map(|d| d.key).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(repo.list(None, Some("  ")).unwrap().len(), 4);
    }

    #[test]
    fn test_update_and_delete() {
        let repo = setup();
        let id = repo.insert(&dict(1, "在库", "use_status", "sling")).unwrap();
        let mut found = repo.find_by_id(id).unwrap().unwrap();
        found.note = "已入柜".to_string();
        repo.update(&found).unwrap();
        assert_eq!(repo.find_by_id(id).unwrap().unwrap().note, "已入柜");

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert!(repo.find_by_id(id).unwrap().is_none());
    }
}
