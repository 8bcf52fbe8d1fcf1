use dice_admin::models::{
    AuthContentRequest, PageParam, Paging, RouteItem, RouteMeta, SysUserView, UserRequest,
};
use serde_json::json;

#[test]
fn test_route_item_omits_inapplicable_meta_flags() {
    let item = RouteItem {
        path: "/dashboard".into(),
        component: Some("LAYOUT".into()),
        name: "Dashboard".into(),
        meta: RouteMeta {
            title: "Dashboard".into(),
            icon: Some("ant-design:home".into()),
            ..RouteMeta::default()
        },
        children: vec![],
    };

    let value = serde_json::to_value(&item).unwrap();

    assert_eq!(
        value,
        json!({
            "path": "/dashboard",
            "component": "LAYOUT",
            "name": "Dashboard",
            "meta": { "title": "Dashboard", "icon": "ant-design:home" },
            "children": []
        })
    );
}

#[test]
fn test_route_meta_uses_camel_case() {
    let meta = RouteMeta {
        title: "Docs".into(),
        icon: None,
        frame_src: Some("https://docs".into()),
        ignore_keep_alive: Some(true),
        hide_menu: Some(false),
    };

    let value = serde_json::to_value(&meta).unwrap();

    assert_eq!(value["frameSrc"], "https://docs");
    assert_eq!(value["ignoreKeepAlive"], true);
    assert_eq!(value["hideMenu"], false);
    assert!(value["icon"].is_null());
}

#[test]
fn test_page_param_defaults_and_clamping() {
    let parsed: PageParam = serde_json::from_value(json!({})).unwrap();
    assert_eq!(parsed.page_index(), 1);
    assert_eq!(parsed.page_size(), 10);
    assert_eq!(parsed.offset(), 0);
    assert_eq!(parsed.keyword(), None);

    let wild = PageParam {
        page_index: -3,
        page_size: 5000,
        keyword: Some("   ".into()),
    };
    assert_eq!(wild.page_index(), 1);
    assert_eq!(wild.page_size(), 100);
    assert_eq!(wild.keyword(), None);

    let third = PageParam {
        page_index: 3,
        page_size: 20,
        keyword: Some(" ops ".into()),
    };
    assert_eq!(third.offset(), 40);
    assert_eq!(third.keyword(), Some("ops"));
}

#[test]
fn test_page_param_offset_saturates_on_huge_page_index() {
    let parsed: PageParam =
        serde_json::from_value(json!({ "pageIndex": i64::MAX, "pageSize": 10 })).unwrap();

    assert_eq!(parsed.page_index(), i64::MAX);
    assert_eq!(parsed.offset(), i64::MAX);
}

#[test]
fn test_paging_serializes_camel_case() {
    let paging = Paging::new(&PageParam::default(), 1, vec![SysUserView::default()]);

    let value = serde_json::to_value(&paging).unwrap();

    assert_eq!(value["total"], 1);
    assert_eq!(value["pageIndex"], 1);
    assert_eq!(value["pageSize"], 10);
    assert!(value["records"][0].get("roleIds").is_some());
    assert!(value["records"][0].get("pwd").is_none());
}

#[test]
fn test_user_request_optional_fields() {
    let req: UserRequest = serde_json::from_value(json!({
        "username": "ann",
        "email": "ann@dice.test",
        "deptId": 4
    }))
    .unwrap();

    assert_eq!(req.dept_id, Some(4));
    assert_eq!(req.password, None);
    assert_eq!(req.role_ids, None);

    let cleared: UserRequest = serde_json::from_value(json!({
        "username": "ann",
        "email": "ann@dice.test",
        "roleIds": []
    }))
    .unwrap();
    assert_eq!(cleared.role_ids, Some(vec![]));
}

#[test]
fn test_auth_content_request_accepts_partial_payload() {
    let req: AuthContentRequest =
        serde_json::from_value(json!({ "contentType": "notice" })).unwrap();

    assert_eq!(req.content_type.as_deref(), Some("notice"));
    assert!(req.content_name.is_none());
    assert!(req.project_type.is_none());
}
