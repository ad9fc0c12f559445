// ==========================================
// 吊索具智能柜管理系统 - 角色与权限 API
// ==========================================
// 职责: 角色维护、用户角色分配、角色权限分配
// 红线: 根角色 (id=1) 不允许修改/删除
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    ensure_affected, ensure_deletable, ensure_updatable, require_id, require_non_empty,
};
use crate::domain::auth::{Role, RoleFunc};
use crate::domain::paging::{PageQuery, PageResult, DEFAULT_PAGE_SIZE};
use crate::repository::role_repo::RoleRepository;
use crate::repository::user_repo::UserRepository;

/// 角色API
pub struct RoleApi {
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
    default_page_size: i64,
}

impl RoleApi {
    pub fn new(role_repo: Arc<RoleRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            role_repo,
            user_repo,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    // ==========================================
    // 角色维护
    // ==========================================

    pub fn add_role(&self, mut role: Role) -> ApiResult<i64> {
        role.name = role.name.trim().to_string();
        self.validate_role(&role)?;
        let id = self.role_repo.insert(&role)?;
        tracing::info!("新增角色: id={}, name={}", id, role.name);
        Ok(id)
    }

    pub fn update_role(&self, mut role: Role) -> ApiResult<()> {
        ensure_updatable(role.id)?;
        role.name = role.name.trim().to_string();
        self.validate_role(&role)?;
        let affected = self.role_repo.update(&role)?;
        ensure_affected(affected, "Role", role.id)?;
        tracing::info!("更新角色: id={}", role.id);
        Ok(())
    }

    pub fn delete_role(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        ensure_deletable(id)?;
        let affected = self.role_repo.soft_delete(id)?;
        ensure_affected(affected, "Role", id)?;
        tracing::info!("删除角色: id={}", id);
        Ok(())
    }

    fn validate_role(&self, role: &Role) -> ApiResult<()> {
        require_non_empty(&role.name, "角色名称")?;
        if self.role_repo.name_taken(&role.name, role.id)? {
            tracing::warn!("角色名称重复: {}", role.name);
            return Err(ApiError::exists("角色"));
        }
        Ok(())
    }

    pub fn get_role(&self, id: i64) -> ApiResult<Role> {
        require_id(id)?;
        self.role_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Role", id))
    }

    pub fn list_roles(&self, name: Option<&str>, page: PageQuery) -> ApiResult<PageResult<Role>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.role_repo.list_paged(name, page)?)
    }

    /// 全部角色 (下拉选择用)
    pub fn all_roles(&self) -> ApiResult<Vec<Role>> {
        Ok(self.role_repo.list_all()?)
    }

    // ==========================================
    // 用户角色
    // ==========================================

    /// 整体替换用户的角色集合
    pub fn set_user_roles(&self, user_id: i64, role_ids: &[i64]) -> ApiResult<usize> {
        require_id(user_id)?;
        if self.user_repo.find_by_id(user_id)?.is_none() {
            return Err(ApiError::not_found("User", user_id));
        }

        let mut ids = role_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        for role_id in &ids {
            if self.role_repo.find_by_id(*role_id)?.is_none() {
                return Err(ApiError::not_found("Role", *role_id));
            }
        }

        let count = self.role_repo.set_user_roles(user_id, &ids)?;
        tracing::info!("设置用户角色: user_id={}, roles={:?}", user_id, ids);
        Ok(count)
    }

    pub fn get_user_roles(&self, user_id: i64) -> ApiResult<Vec<Role>> {
        require_id(user_id)?;
        Ok(self.role_repo.list_user_roles(user_id)?)
    }

    // ==========================================
    // 角色权限
    // ==========================================

    /// 整体替换角色的权限串
    pub fn set_role_funcs(&self, role_id: i64, funcs: &[String]) -> ApiResult<usize> {
        require_id(role_id)?;
        if self.role_repo.find_by_id(role_id)?.is_none() {
            return Err(ApiError::not_found("Role", role_id));
        }

        let funcs: Vec<String> = funcs
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        let count = self.role_repo.set_role_funcs(role_id, &funcs)?;
        tracing::info!("设置角色权限: role_id={}, count={}", role_id, count);
        Ok(count)
    }

    pub fn get_role_funcs(&self, role_id: i64) -> ApiResult<Vec<RoleFunc>> {
        require_id(role_id)?;
        Ok(self.role_repo.list_role_funcs(role_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::auth::User;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> (RoleApi, Arc<UserRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        db::bootstrap(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let api = RoleApi::new(Arc::new(RoleRepository::new(conn)), user_repo.clone());
        (api, user_repo)
    }

    #[test]
    fn test_role_validation() {
        let (api, _) = setup();
        assert!(matches!(
            api.add_role(Role::new("")),
            Err(ApiError::RequiredField(_))
        ));
        assert!(matches!(
            api.add_role(Role::new("超级管理员")),
            Err(ApiError::AlreadyExists(_))
        ));

        let id = api.add_role(Role::new("库管员")).unwrap();
        let mut role = api.get_role(id).unwrap();
        role.name = "超级管理员".to_string();
        assert!(matches!(api.update_role(role), Err(ApiError::AlreadyExists(_))));

        assert!(matches!(api.delete_role(1), Err(ApiError::DeleteNotAllowed)));
        api.delete_role(id).unwrap();
        assert!(matches!(api.get_role(id), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_set_user_roles_replaces() {
        let (api, user_repo) = setup();
        let mut user = User::new("keeper", 1);
        user.password = "x".to_string();
        let user_id = user_repo.insert(&user).unwrap();

        let a = api.add_role(Role::new("A")).unwrap();
        let b = api.add_role(Role::new("B")).unwrap();

        api.set_user_roles(user_id, &[a, b, a]).unwrap();
        assert_eq!(api.get_user_roles(user_id).unwrap().len(), 2);

        api.set_user_roles(user_id, &[b]).unwrap();
        let roles = api.get_user_roles(user_id).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].id, b);

        assert!(matches!(
            api.set_user_roles(user_id, &[999]),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.set_user_roles(999, &[a]),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_role_funcs() {
        let (api, _) = setup();
        let id = api.add_role(Role::new("查看员")).unwrap();
        let funcs = vec!["sling:view".to_string(), " ".to_string(), "cabinet:view".to_string()];
        assert_eq!(api.set_role_funcs(id, &funcs).unwrap(), 2);
        assert_eq!(api.get_role_funcs(id).unwrap().len(), 2);
    }
}
