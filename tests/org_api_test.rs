// ==========================================
// 组织机构集成测试
// ==========================================
// 测试范围:
// 1. 公司/部门: 新增、分页查询、物理删除
// 2. 员工: 根员工保护、关联名称、软删除
// 3. 员工照片: 暂存 → 新增员工时发布
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::staff;

use cmkit::api::ApiError;
use cmkit::domain::organization::{Company, Department, DepartmentQuery, StaffQuery};
use cmkit::domain::paging::PageQuery;

fn company(name: &str) -> Company {
    Company {
        id: 0,
        name: name.to_string(),
        status: 0,
        remark: String::new(),
    }
}

fn department(name: &str, company_id: i64) -> Department {
    Department {
        id: 0,
        name: name.to_string(),
        company_id,
        status: 0,
        remark: String::new(),
        company: None,
    }
}

#[test]
fn test_公司与部门() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let company_id = env.org_api.add_company(company("二分厂")).unwrap();
    assert!(matches!(
        env.org_api.add_company(company(" ")),
        Err(ApiError::RequiredField(_))
    ));

    let dept_id = env
        .org_api
        .add_department(department("设备科", company_id))
        .unwrap();
    env.org_api
        .add_department(department("安全科", company_id))
        .unwrap();

    let filter = DepartmentQuery {
        company_id: Some(company_id),
        ..Default::default()
    };
    let page = env
        .org_api
        .list_departments(&filter, PageQuery::new(1, 1))
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.page_count, 2);
    assert_eq!(page.list.len(), 1);

    let found = env.org_api.get_department(dept_id).unwrap();
    assert_eq!(found.company.map(|c| c.name).as_deref(), Some("二分厂"));

    env.org_api.delete_department(dept_id).unwrap();
    assert!(matches!(
        env.org_api.get_department(dept_id),
        Err(ApiError::NotFound(_))
    ));

    let companies = env
        .org_api
        .list_companies(Some("分厂"), PageQuery::default())
        .unwrap();
    assert_eq!(companies.total, 1);
}

#[test]
fn test_员工维护() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    match env.org_api.add_staff(staff("")) {
        Err(ApiError::RequiredField(field)) => assert_eq!(field, "员工姓名"),
        other => panic!("期望 RequiredField, 实际 {:?}", other),
    }

    let id = env.org_api.add_staff(staff("王五")).unwrap();
    let mut found = env.org_api.get_staff(id).unwrap();
    assert_eq!(found.company_name.as_deref(), Some("默认公司"));
    assert_eq!(found.department_name.as_deref(), Some("默认部门"));

    found.post_name = "班长".to_string();
    env.org_api.update_staff(found).unwrap();
    assert_eq!(env.org_api.get_staff(id).unwrap().post_name, "班长");

    let filter = StaffQuery {
        name: Some("王".to_string()),
        ..Default::default()
    };
    assert_eq!(
        env.org_api
            .list_staff(&filter, PageQuery::default())
            .unwrap()
            .total,
        1
    );

    env.org_api.delete_staff(id).unwrap();
    assert_eq!(
        env.org_api
            .list_staff(&filter, PageQuery::default())
            .unwrap()
            .total,
        0
    );
}

#[test]
fn test_根员工保护() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let root = env.org_api.get_staff(1).unwrap();
    assert!(matches!(
        env.org_api.update_staff(root),
        Err(ApiError::UpdateNotAllowed)
    ));
    assert!(matches!(
        env.org_api.delete_staff(1),
        Err(ApiError::DeleteNotAllowed)
    ));
}

#[test]
fn test_员工照片发布() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let staged = env
        .org_api
        .upload_staff_photo(b"\xff\xd8\xff\xe0photo", None)
        .unwrap();
    assert_eq!(staged.file_name, "temp.jpg");
    assert_eq!(staged.hash.len(), 64);
    assert!(env.temp_dir.join("temp.jpg").is_file());

    let id = env.org_api.add_staff(staff("赵六")).unwrap();
    let published = env.file_dir.join(format!("{:06}.jpg", id));
    assert!(published.is_file());
    assert!(!env.temp_dir.join("temp.jpg").exists());

    // 没有暂存照片时新增员工不受影响
    let next = env.org_api.add_staff(staff("孙七")).unwrap();
    assert!(!env.file_dir.join(format!("{:06}.jpg", next)).exists());

    assert!(matches!(
        env.org_api.upload_staff_photo(b"", None),
        Err(ApiError::InvalidInput(_))
    ));
}
