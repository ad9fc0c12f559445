// ==========================================
// 吊索具 / 智能柜查询集成测试
// ==========================================
// 测试范围:
// 1. 吊索具分页查询与过滤 (0 视为不过滤)
// 2. 智能柜分页查询与已用/空闲箱格数
// 3. 数据字典
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::*;

use cmkit::api::ApiError;
use cmkit::domain::dict::DictData;
use cmkit::domain::paging::PageQuery;
use cmkit::domain::resource::SlingQuery;

fn seed_slings(env: &ApiTestEnv) {
    let slings = vec![
        SlingBuilder::new("RF-1", "环眼吊带-3T").tonnage(3).sling_type(1).build(),
        SlingBuilder::new("RF-2", "环眼吊带-5T").tonnage(5).sling_type(1).build(),
        SlingBuilder::new("RF-3", "钢丝绳-5T").tonnage(5).sling_type(2).build(),
        SlingBuilder::new("RF-4", "链条-10T")
            .tonnage(10)
            .sling_type(3)
            .inspect_status(1)
            .build(),
    ];
    for sling in slings {
        env.resource_api.add_sling(sling).expect("新增吊索具失败");
    }
}

#[test]
fn test_list_slings_过滤() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_slings(&env);

    let all = env
        .resource_api
        .list_slings(&SlingQuery::default(), PageQuery::default())
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.page_size, 10);
    assert_eq!(all.page_count, 1);

    let by_name = SlingQuery {
        name: Some("吊带".to_string()),
        ..Default::default()
    };
    assert_eq!(
        env.resource_api
            .list_slings(&by_name, PageQuery::default())
            .unwrap()
            .total,
        2
    );

    let by_tonnage = SlingQuery {
        max_tonnage: Some(5),
        sling_type: Some(0),
        ..Default::default()
    };
    assert_eq!(
        env.resource_api
            .list_slings(&by_tonnage, PageQuery::default())
            .unwrap()
            .total,
        2,
        "类型为 0 时不参与过滤"
    );

    let combined = SlingQuery {
        max_tonnage: Some(5),
        sling_type: Some(2),
        ..Default::default()
    };
    let page = env
        .resource_api
        .list_slings(&combined, PageQuery::default())
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].rf_id, "RF-3");

    let inspected = SlingQuery {
        inspect_status: Some(1),
        ..Default::default()
    };
    assert_eq!(
        env.resource_api
            .list_slings(&inspected, PageQuery::default())
            .unwrap()
            .list[0]
            .name,
        "链条-10T"
    );
}

#[test]
fn test_list_slings_分页() {
    let env = ApiTestEnv::with_config(|c| c.default_page_size = 3).expect("无法创建测试环境");
    seed_slings(&env);

    let first = env
        .resource_api
        .list_slings(&SlingQuery::default(), PageQuery::new(0, 0))
        .unwrap();
    assert_eq!(first.page_index, 1);
    assert_eq!(first.page_size, 3);
    assert_eq!(first.page_count, 2);
    assert_eq!(first.list.len(), 3);

    let second = env
        .resource_api
        .list_slings(&SlingQuery::default(), PageQuery::new(2, 3))
        .unwrap();
    assert_eq!(second.list.len(), 1);
}

#[test]
fn test_更新吊索具唯一性() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_slings(&env);

    let mut sling = env.resource_api.get_sling_by_rf_id("RF-1").unwrap();
    sling.rf_id = "RF-2".to_string();
    match env.resource_api.update_sling(sling) {
        Err(ApiError::AlreadyExists(field)) => assert_eq!(field, "吊索具名称或RFID"),
        other => panic!("期望 AlreadyExists, 实际 {:?}", other),
    }
}

#[test]
fn test_list_cabinets_箱格统计() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let a = env
        .resource_api
        .add_cabinet(CabinetBuilder::new("东区一号柜", 6).build())
        .unwrap();
    env.resource_api
        .add_cabinet(CabinetBuilder::new("西区一号柜", 8).build())
        .unwrap();

    let res_id = env
        .resource_api
        .add_sling(SlingBuilder::new("RF-1", "吊带").build())
        .unwrap();
    env.usage_api.store(a, 4, res_id).unwrap();

    let page = env
        .resource_api
        .list_cabinets(Some("东区"), PageQuery::default())
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].used_count, 1);
    assert_eq!(page.list[0].unused_count, 5);

    match env
        .resource_api
        .add_cabinet(CabinetBuilder::new("西区一号柜", 2).build())
    {
        Err(ApiError::AlreadyExists(field)) => assert_eq!(field, "智能柜名称"),
        other => panic!("期望 AlreadyExists, 实际 {:?}", other),
    }
}

#[test]
fn test_数据字典() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    for (key, name) in [(1, "吊带"), (2, "钢丝绳"), (3, "链条")] {
        env.dict_api
            .add(DictData {
                id: 0,
                key,
                name: name.to_string(),
                dict_type: "sling_type".to_string(),
                note: String::new(),
                scene: "sling".to_string(),
            })
            .unwrap();
    }

    let items = env.dict_api.list(Some("sling"), Some("sling_type")).unwrap();
    assert_eq!(
        items.iter().map(|d| d.key).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    env.dict_api.delete(items[0].id).unwrap();
    assert_eq!(env.dict_api.list(None, None).unwrap().len(), 2);
}
