// ==========================================
// 吊索具智能柜管理系统 - 用户与登录 API
// ==========================================
// 职责: 用户增删改查、口令重置/修改、登录/续期、当前用户信息
// 红线: 根用户 (id=1) 不允许修改/删除/重置口令
// 说明: 令牌的签名与校验由外部组件负责，这里只产出会话声明
// ==========================================

use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    ensure_affected, ensure_deletable, ensure_updatable, require_id, require_non_empty,
};
use crate::config::app_config::DEFAULT_SESSION_TTL_MINUTES;
use crate::db::now_local;
use crate::domain::auth::{
    default_password_hash, hash_password, SessionClaims, User, UserInfo, DEFAULT_AVATAR,
};
use crate::domain::paging::{PageQuery, PageResult, DEFAULT_PAGE_SIZE};
use crate::repository::role_repo::RoleRepository;
use crate::repository::user_repo::UserRepository;

/// 用户与登录API
pub struct AuthApi {
    user_repo: Arc<UserRepository>,
    role_repo: Arc<RoleRepository>,
    session_ttl_minutes: i64,
    default_page_size: i64,
}

impl AuthApi {
    pub fn new(user_repo: Arc<UserRepository>, role_repo: Arc<RoleRepository>) -> Self {
        Self {
            user_repo,
            role_repo,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_session_ttl(mut self, minutes: i64) -> Self {
        self.session_ttl_minutes = minutes;
        self
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    // ==========================================
    // 用户维护
    // ==========================================

    /// 新增用户，口令初始化为默认口令
    ///
    /// # 返回
    /// - Ok(i64): 新用户ID
    pub fn add_user(&self, mut user: User) -> ApiResult<i64> {
        user.name = user.name.trim().to_string();
        self.validate_user(&user)?;

        user.password = default_password_hash(&user.name);
        let id = self.user_repo.insert(&user)?;
        tracing::info!("新增用户: id={}, name={}", id, user.name);
        Ok(id)
    }

    /// 更新用户资料 (不修改口令)
    pub fn update_user(&self, mut user: User) -> ApiResult<()> {
        ensure_updatable(user.id)?;
        user.name = user.name.trim().to_string();
        self.validate_user(&user)?;

        let affected = self.user_repo.update(&user)?;
        ensure_affected(affected, "User", user.id)?;
        tracing::info!("更新用户: id={}", user.id);
        Ok(())
    }

    pub fn delete_user(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        ensure_deletable(id)?;
        let affected = self.user_repo.soft_delete(id)?;
        ensure_affected(affected, "User", id)?;
        tracing::info!("删除用户: id={}", id);
        Ok(())
    }

    fn validate_user(&self, user: &User) -> ApiResult<()> {
        require_non_empty(&user.name, "用户名")?;
        if user.staff_id <= 0 {
            return Err(ApiError::InvalidInput("用户员工未选择".to_string()));
        }
        if let (Some(start), Some(end)) = (user.start_time, user.end_time) {
            if start > end {
                return Err(ApiError::InvalidInput("生效时间晚于失效时间".to_string()));
            }
        }
        if self.user_repo.name_taken(&user.name, user.id)? {
            tracing::warn!("用户名重复: {}", user.name);
            return Err(ApiError::exists("用户"));
        }
        Ok(())
    }

    /// 重置为默认口令
    pub fn reset_password(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        ensure_updatable(id)?;
        let user = self.require_user(id)?;
        self.user_repo
            .update_password(id, &default_password_hash(&user.name))?;
        tracing::info!("重置口令: user_id={}", id);
        Ok(())
    }

    /// 修改口令 (需校验原口令)
    pub fn update_password(&self, id: i64, old_password: &str, new_password: &str) -> ApiResult<()> {
        require_id(id)?;
        ensure_updatable(id)?;
        require_non_empty(new_password, "新密码")?;

        let user = self.require_user(id)?;
        if !user.verify_password(old_password) {
            return Err(ApiError::PasswordMismatch);
        }
        self.user_repo
            .update_password(id, &hash_password(new_password, &user.name))?;
        tracing::info!("修改口令: user_id={}", id);
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_user(&self, id: i64) -> ApiResult<User> {
        require_id(id)?;
        self.require_user(id)
    }

    pub fn list_users(&self, name: Option<&str>, page: PageQuery) -> ApiResult<PageResult<User>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.user_repo.list_paged(name, page)?)
    }

    /// 当前用户信息 (角色名、员工姓名)
    pub fn user_info(&self, id: i64) -> ApiResult<UserInfo> {
        let user = self.require_user(id)?;
        let roles = self
            .role_repo
            .list_user_roles(id)?
            .into_iter()
            .map(|r| r.name)
            .collect();

        Ok(UserInfo {
            id: user.id,
            name: user.name,
            roles,
            introduction: user.remark,
            avatar: DEFAULT_AVATAR.to_string(),
            staff_name: user.staff_name,
        })
    }

    fn require_user(&self, id: i64) -> ApiResult<User> {
        self.user_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("User", id))
    }

    // ==========================================
    // 登录 / 续期
    // ==========================================

    pub fn login(&self, name: &str, password: &str) -> ApiResult<SessionClaims> {
        self.login_at(name, password, now_local())
    }

    /// 登录校验: 先核对用户名口令 (统一提示)，再检查账号状态与有效期
    pub fn login_at(&self, name: &str, password: &str, now: NaiveDateTime) -> ApiResult<SessionClaims> {
        let name = name.trim();
        if name.is_empty() || password.is_empty() {
            return Err(ApiError::BadQueryParams);
        }

        let user = match self.user_repo.find_by_name(name)? {
            Some(user) if user.verify_password(password) => user,
            _ => {
                tracing::warn!("登录失败: name={}", name);
                return Err(ApiError::CredentialMismatch);
            }
        };
        user.check(now)?;

        tracing::info!("登录成功: user_id={}", user.id);
        Ok(SessionClaims::issue(&user, now, self.session_ttl_minutes))
    }

    pub fn renew(&self, claims: &SessionClaims) -> ApiResult<SessionClaims> {
        self.renew_at(claims, now_local())
    }

    /// 以未过期的会话换发新会话，期间账号需仍然有效
    pub fn renew_at(&self, claims: &SessionClaims, now: NaiveDateTime) -> ApiResult<SessionClaims> {
        if claims.is_expired(now) {
            return Err(ApiError::SessionExpired);
        }
        let user = self
            .user_repo
            .find_by_id(claims.user_id)?
            .ok_or(ApiError::CredentialMismatch)?;
        user.check(now)?;
        Ok(SessionClaims::issue(&user, now, self.session_ttl_minutes))
    }
}
