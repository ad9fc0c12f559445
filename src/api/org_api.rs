// ==========================================
// 吊索具智能柜管理系统 - 组织机构 API
// ==========================================
// 职责: 公司 / 部门 / 员工维护与查询，员工照片上传
// 红线: 根员工 (id=1) 不允许修改/删除
// 照片: 新增员工成功后关联暂存照片，失败只记录告警不回滚员工
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    ensure_affected, ensure_deletable, ensure_updatable, require_id, require_non_empty,
};
use crate::domain::organization::{Company, Department, DepartmentQuery, Staff, StaffQuery};
use crate::domain::paging::{PageQuery, PageResult, DEFAULT_PAGE_SIZE};
use crate::repository::company_repo::CompanyRepository;
use crate::repository::department_repo::DepartmentRepository;
use crate::repository::staff_repo::StaffRepository;
use crate::storage::{PhotoStore, StagedPhoto};

/// 组织机构API
pub struct OrgApi {
    company_repo: Arc<CompanyRepository>,
    department_repo: Arc<DepartmentRepository>,
    staff_repo: Arc<StaffRepository>,
    photo_store: Arc<PhotoStore>,
    default_page_size: i64,
}

impl OrgApi {
    pub fn new(
        company_repo: Arc<CompanyRepository>,
        department_repo: Arc<DepartmentRepository>,
        staff_repo: Arc<StaffRepository>,
        photo_store: Arc<PhotoStore>,
    ) -> Self {
        Self {
            company_repo,
            department_repo,
            staff_repo,
            photo_store,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    // ==========================================
    // 公司
    // ==========================================

    pub fn add_company(&self, mut company: Company) -> ApiResult<i64> {
        company.name = company.name.trim().to_string();
        require_non_empty(&company.name, "公司名称")?;
        let id = self.company_repo.insert(&company)?;
        tracing::info!("新增公司: id={}, name={}", id, company.name);
        Ok(id)
    }

    pub fn update_company(&self, mut company: Company) -> ApiResult<()> {
        require_id(company.id)?;
        company.name = company.name.trim().to_string();
        require_non_empty(&company.name, "公司名称")?;
        let affected = self.company_repo.update(&company)?;
        ensure_affected(affected, "Company", company.id)
    }

    /// 删除公司 (物理删除)
    pub fn delete_company(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        ensure_deletable(id)?;
        let affected = self.company_repo.delete(id)?;
        ensure_affected(affected, "Company", id)?;
        tracing::info!("删除公司: id={}", id);
        Ok(())
    }

    pub fn get_company(&self, id: i64) -> ApiResult<Company> {
        require_id(id)?;
        self.company_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Company", id))
    }

    pub fn list_companies(&self, name: Option<&str>, page: PageQuery) -> ApiResult<PageResult<Company>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.company_repo.list_paged(name, page)?)
    }

    pub fn all_companies(&self) -> ApiResult<Vec<Company>> {
        Ok(self.company_repo.list_all()?)
    }

    // ==========================================
    // 部门
    // ==========================================

    pub fn add_department(&self, mut department: Department) -> ApiResult<i64> {
        department.name = department.name.trim().to_string();
        self.validate_department(&department)?;
        let id = self.department_repo.insert(&department)?;
        tracing::info!("新增部门: id={}, name={}", id, department.name);
        Ok(id)
    }

    pub fn update_department(&self, mut department: Department) -> ApiResult<()> {
        require_id(department.id)?;
        department.name = department.name.trim().to_string();
        self.validate_department(&department)?;
        let affected = self.department_repo.update(&department)?;
        ensure_affected(affected, "Department", department.id)
    }

    fn validate_department(&self, department: &Department) -> ApiResult<()> {
        require_non_empty(&department.name, "部门名称")?;
        if department.company_id <= 0 {
            return Err(ApiError::InvalidInput("部门所属公司未选择".to_string()));
        }
        if self.company_repo.find_by_id(department.company_id)?.is_none() {
            return Err(ApiError::not_found("Company", department.company_id));
        }
        Ok(())
    }

    /// 删除部门 (物理删除)
    pub fn delete_department(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        ensure_deletable(id)?;
        let affected = self.department_repo.delete(id)?;
        ensure_affected(affected, "Department", id)?;
        tracing::info!("删除部门: id={}", id);
        Ok(())
    }

    pub fn get_department(&self, id: i64) -> ApiResult<Department> {
        require_id(id)?;
        self.department_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Department", id))
    }

    pub fn list_departments(
        &self,
        filter: &DepartmentQuery,
        page: PageQuery,
    ) -> ApiResult<PageResult<Department>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.department_repo.list_paged(filter, page)?)
    }

    pub fn all_departments(&self, filter: &DepartmentQuery) -> ApiResult<Vec<Department>> {
        Ok(self.department_repo.list_all(filter)?)
    }

    // ==========================================
    // 员工
    // ==========================================

    /// 新增员工，并关联已上传的暂存照片
    pub fn add_staff(&self, mut staff: Staff) -> ApiResult<i64> {
        staff.name = staff.name.trim().to_string();
        require_non_empty(&staff.name, "员工姓名")?;

        let id = self.staff_repo.insert(&staff)?;
        tracing::info!("新增员工: id={}, name={}", id, staff.name);

        match self.photo_store.attach_staged(id) {
            Ok(Some(path)) => tracing::debug!("员工照片: staff_id={}, path={}", id, path.display()),
            Ok(None) => {}
            Err(e) => tracing::warn!("员工照片关联失败: staff_id={}, error={}", id, e),
        }
        Ok(id)
    }

    pub fn update_staff(&self, mut staff: Staff) -> ApiResult<()> {
        ensure_updatable(staff.id)?;
        require_id(staff.id)?;
        staff.name = staff.name.trim().to_string();
        require_non_empty(&staff.name, "员工姓名")?;

        let affected = self.staff_repo.update(&staff)?;
        ensure_affected(affected, "Staff", staff.id)?;
        tracing::info!("更新员工: id={}", staff.id);
        Ok(())
    }

    pub fn delete_staff(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        ensure_deletable(id)?;
        let affected = self.staff_repo.soft_delete(id)?;
        ensure_affected(affected, "Staff", id)?;
        tracing::info!("删除员工: id={}", id);
        Ok(())
    }

    pub fn get_staff(&self, id: i64) -> ApiResult<Staff> {
        require_id(id)?;
        self.staff_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Staff", id))
    }

    pub fn list_staff(&self, filter: &StaffQuery, page: PageQuery) -> ApiResult<PageResult<Staff>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.staff_repo.list_paged(filter, page)?)
    }

    /// 上传员工照片到暂存区
    pub fn upload_staff_photo(&self, content: &[u8], file_name: Option<&str>) -> ApiResult<StagedPhoto> {
        Ok(self.photo_store.stage(content, file_name)?)
    }
}
