mod common;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{
    ADMIN_ID, EDITOR_ID, TEST_PASSWORD, admin, department, editor, guest, seeded_repo, state_with,
};
use dice_admin::{
    config::Env,
    error::AppError,
    handlers::{account, auth_content, departments, nav_types, users},
    models::{
        AssignRolesRequest, AuthContentRequest, DepartmentRequest, LoginRequest,
        NavTypeRequest, PageParam, ResetUserRequest, STATUS_DISABLED, STATUS_ENABLED,
        UserRequest,
    },
    password,
    repository::{MemoryRepository, Repository},
    services,
};

fn nav_request(name: &str, parent_id: Option<i64>, sort: i32) -> NavTypeRequest {
    NavTypeRequest {
        parent_id,
        name: name.to_string(),
        sort,
        description: None,
    }
}

fn content_request(project: Option<&str>, name: &str, value: &str) -> AuthContentRequest {
    AuthContentRequest {
        project_type: project.map(str::to_string),
        content_type: Some("notice".to_string()),
        content_name: Some(name.to_string()),
        content_value: Some(value.to_string()),
    }
}

// --- Account ---

#[tokio::test]
async fn test_login_success_and_failures() {
    let state = state_with(seeded_repo(), Env::Production);

    let Json(ok) = account::login(
        State(state.clone()),
        Json(LoginRequest {
            username: "editor".into(),
            password: TEST_PASSWORD.into(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(ok.user_id, EDITOR_ID);
    assert!(!ok.token.is_empty());
    assert_eq!(ok.roles[0].value, "editor");

    let wrong = account::login(
        State(state.clone()),
        Json(LoginRequest {
            username: "editor".into(),
            password: "nope".into(),
        }),
    )
    .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized)));

    let unknown = account::login(
        State(state),
        Json(LoginRequest {
            username: "nobody".into(),
            password: TEST_PASSWORD.into(),
        }),
    )
    .await;
    assert_eq!(
        unknown.unwrap_err().into_response().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_me_returns_profile_and_roles() {
    let state = state_with(seeded_repo(), Env::Local);

    let Json(me) = account::get_me(editor(), State(state)).await.unwrap();

    assert_eq!(me.id, EDITOR_ID);
    assert_eq!(me.username, "editor");
    assert_eq!(me.roles.len(), 1);
}

#[tokio::test]
async fn test_menu_for_editor_admin_and_guest() {
    let state = state_with(seeded_repo(), Env::Local);

    // Editor holds the section but not the page below it.
    let Json(editor_menu) = account::get_menu(editor(), State(state.clone())).await.unwrap();
    assert_eq!(editor_menu.len(), 1);
    assert!(editor_menu[0].children.is_empty());

    let Json(admin_menu) = account::get_menu(admin(), State(state.clone())).await.unwrap();
    assert_eq!(admin_menu[0].children.len(), 1);

    let Json(guest_menu) = account::get_menu(guest(), State(state)).await.unwrap();
    assert!(guest_menu.is_empty());
}

#[tokio::test]
async fn test_menu_store_failure_is_503() {
    let state = state_with(seeded_repo().failing_permission_lookup(), Env::Local);

    let err = account::get_menu(editor(), State(state)).await.unwrap_err();

    assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_perm_codes() {
    let state = state_with(seeded_repo(), Env::Local);

    let Json(codes) = account::get_perm_codes(editor(), State(state.clone()))
        .await
        .unwrap();
    assert_eq!(codes, vec!["nav:type:add".to_string()]);

    let Json(none) = account::get_perm_codes(guest(), State(state)).await.unwrap();
    assert!(none.is_empty());
}

// --- Nav types ---

#[tokio::test]
async fn test_nav_type_lifecycle() {
    let state = state_with(seeded_repo(), Env::Local);

    let (status, Json(created)) =
        nav_types::add_nav_type(editor(), State(state.clone()), Json(nav_request("Tools", None, 1)))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.creator, Some(EDITOR_ID));

    // The editor lacks nav:type:update and nav:type:delete.
    let denied = nav_types::update_nav_type(
        editor(),
        State(state.clone()),
        Path(created.id),
        Json(nav_request("Renamed", None, 1)),
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let Json(updated) = nav_types::update_nav_type(
        admin(),
        State(state.clone()),
        Path(created.id),
        Json(nav_request("Renamed", None, 1)),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.modifier, Some(ADMIN_ID));
    assert_eq!(updated.creator, Some(EDITOR_ID));

    let Json(info) = nav_types::get_nav_type(guest(), State(state.clone()), Path(created.id))
        .await
        .unwrap();
    assert_eq!(info.name, "Renamed");

    let status = nav_types::delete_nav_type(admin(), State(state.clone()), Path(created.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let missing = nav_types::get_nav_type(admin(), State(state), Path(created.id)).await;
    assert_eq!(
        missing.unwrap_err().into_response().status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_nav_type_update_keeps_omitted_fields() {
    let state = state_with(seeded_repo(), Env::Local);
    let (_, Json(root)) =
        nav_types::add_nav_type(admin(), State(state.clone()), Json(nav_request("Root", None, 1)))
            .await
            .unwrap();
    let (_, Json(child)) = nav_types::add_nav_type(
        admin(),
        State(state.clone()),
        Json(NavTypeRequest {
            description: Some("developer links".into()),
            ..nav_request("Dev", Some(root.id), 1)
        }),
    )
    .await
    .unwrap();

    let Json(updated) = nav_types::update_nav_type(
        admin(),
        State(state),
        Path(child.id),
        Json(nav_request("Development", None, 2)),
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Development");
    assert_eq!(updated.parent_id, Some(root.id));
    assert_eq!(updated.description.as_deref(), Some("developer links"));
}

#[tokio::test]
async fn test_nav_type_guest_cannot_add() {
    let state = state_with(seeded_repo(), Env::Local);

    let result =
        nav_types::add_nav_type(guest(), State(state), Json(nav_request("Tools", None, 1))).await;

    assert_eq!(
        result.unwrap_err().into_response().status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_nav_type_blank_name_is_bad_request() {
    let state = state_with(seeded_repo(), Env::Local);

    let result =
        nav_types::add_nav_type(admin(), State(state), Json(nav_request("  ", None, 1))).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_nav_type_tree_and_page() {
    let state = state_with(seeded_repo(), Env::Local);
    let add = |name: &'static str, parent: Option<i64>, sort: i32| {
        let state = state.clone();
        async move {
            nav_types::add_nav_type(admin(), State(state), Json(nav_request(name, parent, sort)))
                .await
                .unwrap()
                .1
                .0
        }
    };

    let root = add("Root", None, 1).await;
    add("Second", Some(root.id), 2).await;
    add("First", Some(root.id), 1).await;
    add("Orphan", Some(999), 0).await;

    let Json(tree) = nav_types::nav_type_tree(admin(), State(state.clone()))
        .await
        .unwrap();
    assert_eq!(tree.len(), 1);
    let names: Vec<&str> = tree[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);

    let Json(page) = nav_types::list_nav_types(
        admin(),
        State(state),
        Query(PageParam {
            page_index: 1,
            page_size: 2,
            keyword: Some("o".into()),
        }),
    )
    .await
    .unwrap();
    // "Root", "Second", "Orphan" match; "First" does not.
    assert_eq!(page.total, 3);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.page_size, 2);
}

// --- Departments ---

#[tokio::test]
async fn test_department_crud() {
    let state = state_with(seeded_repo(), Env::Local);
    let req = DepartmentRequest {
        parent_id: None,
        name: "R&D".into(),
        sort: 1,
        status: None,
        remark: Some("lab".into()),
    };

    let (status, Json(dept)) =
        departments::save_department(admin(), State(state.clone()), Json(req.clone()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dept.status, STATUS_ENABLED);

    let Json(enabled) =
        departments::is_department_enabled(admin(), State(state.clone()), Path(dept.id))
            .await
            .unwrap();
    assert!(enabled);

    let Json(updated) = departments::update_department(
        admin(),
        State(state.clone()),
        Path(dept.id),
        Json(DepartmentRequest {
            status: Some(STATUS_DISABLED),
            ..req.clone()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.status, STATUS_DISABLED);

    let Json(enabled) =
        departments::is_department_enabled(admin(), State(state.clone()), Path(dept.id))
            .await
            .unwrap();
    assert!(!enabled);

    let missing =
        departments::update_department(admin(), State(state.clone()), Path(404), Json(req)).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let denied = departments::delete_department(editor(), State(state.clone()), Path(dept.id)).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    departments::delete_department(admin(), State(state.clone()), Path(dept.id))
        .await
        .unwrap();
    let gone = departments::get_department(admin(), State(state), Path(dept.id)).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_department_update_keeps_omitted_fields() {
    let repo = MemoryRepository::new().with_department(department(1, None, 1, STATUS_ENABLED));
    let state = state_with(repo, Env::Local);
    let (_, Json(child)) = departments::save_department(
        admin(),
        State(state.clone()),
        Json(DepartmentRequest {
            parent_id: Some(1),
            name: "Ops".into(),
            sort: 2,
            status: None,
            remark: Some("night shift".into()),
        }),
    )
    .await
    .unwrap();

    let Json(updated) = departments::update_department(
        admin(),
        State(state),
        Path(child.id),
        Json(DepartmentRequest {
            name: "Operations".into(),
            sort: 3,
            ..DepartmentRequest::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Operations");
    assert_eq!(updated.sort, 3);
    assert_eq!(updated.parent_id, Some(1));
    assert_eq!(updated.remark.as_deref(), Some("night shift"));
    assert_eq!(updated.status, STATUS_ENABLED);
}

#[tokio::test]
async fn test_department_tree_only_enabled() {
    let repo = MemoryRepository::new()
        .with_department(department(1, None, 1, STATUS_ENABLED))
        .with_department(department(2, Some(1), 2, STATUS_ENABLED))
        .with_department(department(3, Some(1), 1, STATUS_DISABLED))
        .with_department(department(4, Some(3), 1, STATUS_ENABLED))
        .with_department(department(5, None, 0, STATUS_ENABLED));
    let state = state_with(repo, Env::Local);

    let Json(tree) = departments::department_tree(admin(), State(state.clone()))
        .await
        .unwrap();

    let roots: Vec<i64> = tree.iter().map(|d| d.id).collect();
    assert_eq!(roots, vec![5, 1]);
    let children: Vec<i64> = tree[1].children.iter().map(|d| d.id).collect();
    // 3 is disabled, so 4 hangs from nothing.
    assert_eq!(children, vec![2]);

    let Json(enabled) = departments::list_enabled_departments(admin(), State(state))
        .await
        .unwrap();
    assert_eq!(enabled.len(), 4);
}

#[tokio::test]
async fn test_department_tree_empty() {
    let state = state_with(MemoryRepository::new(), Env::Local);

    let Json(tree) = departments::department_tree(admin(), State(state))
        .await
        .unwrap();

    assert!(tree.is_empty());
}

#[tokio::test]
async fn test_department_page_newest_first() {
    let repo = MemoryRepository::new()
        .with_department(department(1, None, 1, STATUS_ENABLED))
        .with_department(department(2, None, 1, STATUS_ENABLED))
        .with_department(department(3, None, 1, STATUS_DISABLED));
    let state = state_with(repo, Env::Local);

    let Json(page) =
        departments::list_departments(admin(), State(state), Query(PageParam::default()))
            .await
            .unwrap();

    let ids: Vec<i64> = page.records.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(page.total, 3);
    assert_eq!(page.page_index, 1);
}

// --- Users ---

fn user_request(username: &str, email: &str) -> UserRequest {
    UserRequest {
        username: username.to_string(),
        email: email.to_string(),
        ..UserRequest::default()
    }
}

#[tokio::test]
async fn test_add_user_defaults_and_conflicts() {
    let state = state_with(seeded_repo(), Env::Local);

    let (status, Json(created)) = users::add_user(
        admin(),
        State(state.clone()),
        Json(UserRequest {
            role_ids: Some(vec![common::EDITOR_ROLE_ID]),
            ..user_request("newbie", "newbie@dice.test")
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.role_ids, vec![common::EDITOR_ROLE_ID]);
    assert_eq!(
        created.avatar.as_deref(),
        Some(state.config.login_init_avatar.as_str())
    );

    // Blank password falls back to the configured initial password.
    let stored = state.repo.get_user(created.id).await.unwrap().unwrap();
    assert!(password::verify_password(
        &state.config.login_init_password,
        &stored.pwd
    ));

    let dup_name = users::add_user(
        admin(),
        State(state.clone()),
        Json(user_request("newbie", "other@dice.test")),
    )
    .await;
    assert!(matches!(dup_name, Err(AppError::Conflict(_))));

    let dup_email = users::add_user(
        admin(),
        State(state),
        Json(user_request("other", "newbie@dice.test")),
    )
    .await;
    assert_eq!(
        dup_email.unwrap_err().into_response().status(),
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_add_user_with_disabled_department_still_succeeds() {
    let repo = seeded_repo().with_department(department(9, None, 1, STATUS_DISABLED));
    let state = state_with(repo, Env::Local);

    let result = users::add_user(
        admin(),
        State(state),
        Json(UserRequest {
            dept_id: Some(9),
            role_ids: Some(vec![common::EDITOR_ROLE_ID]),
            password: Some("chosen-pass".into()),
            ..user_request("staff", "staff@dice.test")
        }),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_department_and_role_check() {
    let repo = seeded_repo()
        .with_department(department(8, None, 1, STATUS_ENABLED))
        .with_department(department(9, None, 1, STATUS_DISABLED));
    let repo: &dyn Repository = &repo;

    services::users::check_department_and_role(repo, Some(8), common::EDITOR_ROLE_ID)
        .await
        .unwrap();

    for (dept_id, role_id) in [
        (None, common::EDITOR_ROLE_ID),
        (Some(9), common::EDITOR_ROLE_ID),
        (Some(404), common::EDITOR_ROLE_ID),
        (Some(8), 404),
    ] {
        let result = services::users::check_department_and_role(repo, dept_id, role_id).await;
        assert!(
            matches!(result, Err(AppError::BadRequest(_))),
            "dept {dept_id:?} role {role_id}"
        );
    }
}

#[tokio::test]
async fn test_add_user_without_department_keeps_roles() {
    let state = state_with(seeded_repo(), Env::Local);

    let (_, Json(created)) = users::add_user(
        admin(),
        State(state),
        Json(UserRequest {
            role_ids: Some(vec![common::EDITOR_ROLE_ID]),
            ..user_request("floater", "floater@dice.test")
        }),
    )
    .await
    .unwrap();

    assert_eq!(created.dept_id, None);
    assert_eq!(created.role_ids, vec![common::EDITOR_ROLE_ID]);
}

#[tokio::test]
async fn test_update_user_rebuilds_role_links() {
    let state = state_with(seeded_repo(), Env::Local);

    let Json(replaced) = users::update_user(
        admin(),
        State(state.clone()),
        Path(EDITOR_ID),
        Json(UserRequest {
            role_ids: Some(vec![common::ADMIN_ROLE_ID, common::EDITOR_ROLE_ID]),
            ..user_request("editor", "editor@dice.test")
        }),
    )
    .await
    .unwrap();
    let mut role_ids = replaced.role_ids;
    role_ids.sort_unstable();
    assert_eq!(role_ids, vec![common::ADMIN_ROLE_ID, common::EDITOR_ROLE_ID]);

    let Json(cleared) = users::update_user(
        admin(),
        State(state.clone()),
        Path(EDITOR_ID),
        Json(user_request("editor", "editor@dice.test")),
    )
    .await
    .unwrap();
    assert!(cleared.role_ids.is_empty());
    assert!(state.repo.get_user_roles(EDITOR_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_page_masks_phone_and_attaches_roles() {
    let state = state_with(seeded_repo(), Env::Local);

    let Json(page) = users::list_users(admin(), State(state), Query(PageParam::default()))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    // Newest first: guest (3), editor (2), root (1).
    assert_eq!(page.records[0].id, common::GUEST_ID);
    let editor_row = page.records.iter().find(|u| u.id == EDITOR_ID).unwrap();
    assert_eq!(editor_row.phone.as_deref(), Some("138****5678"));
    assert_eq!(editor_row.role_ids, vec![common::EDITOR_ROLE_ID]);
}

#[tokio::test]
async fn test_update_assign_and_delete_user() {
    let state = state_with(seeded_repo(), Env::Local);

    let missing = users::update_user(
        admin(),
        State(state.clone()),
        Path(404),
        Json(user_request("ghost", "ghost@dice.test")),
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let Json(updated) = users::update_user(
        admin(),
        State(state.clone()),
        Path(EDITOR_ID),
        Json(UserRequest {
            nickname: Some("Ed".into()),
            ..user_request("editor", "ed@dice.test")
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.nickname.as_deref(), Some("Ed"));
    assert_eq!(updated.email, "ed@dice.test");
    // No `roleIds` means no roles.
    assert!(updated.role_ids.is_empty());

    let status = users::assign_roles(
        admin(),
        State(state.clone()),
        Path(EDITOR_ID),
        Json(AssignRolesRequest {
            role_ids: vec![common::ADMIN_ROLE_ID],
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(view) = users::get_user(admin(), State(state.clone()), Path(EDITOR_ID))
        .await
        .unwrap();
    assert_eq!(view.role_ids, vec![common::ADMIN_ROLE_ID]);

    users::delete_user(admin(), State(state.clone()), Path(EDITOR_ID))
        .await
        .unwrap();
    let gone = users::get_user(admin(), State(state), Path(EDITOR_ID)).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_reset_user() {
    let state = state_with(seeded_repo(), Env::Local);

    users::reset_user(
        admin(),
        State(state.clone()),
        Json(ResetUserRequest {
            old_username: "guest".into(),
            new_username: "visitor".into(),
            email: "visitor@dice.test".into(),
        }),
    )
    .await
    .unwrap();

    let renamed = state
        .repo
        .get_user_by_username("visitor")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.email, "visitor@dice.test");

    let unknown = users::reset_user(
        admin(),
        State(state),
        Json(ResetUserRequest {
            old_username: "guest".into(),
            new_username: "again".into(),
            email: "again@dice.test".into(),
        }),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

// --- Auth content ---

#[tokio::test]
async fn test_auth_content_rules() {
    let state = state_with(seeded_repo(), Env::Local);

    let (_, Json(first)) = auth_content::save_auth_content(
        admin(),
        State(state.clone()),
        Json(content_request(Some("dice"), "welcome", "hello")),
    )
    .await
    .unwrap();

    // Same key in a different project is fine.
    auth_content::save_auth_content(
        admin(),
        State(state.clone()),
        Json(content_request(None, "welcome", "hello")),
    )
    .await
    .unwrap();

    let duplicate = auth_content::save_auth_content(
        admin(),
        State(state.clone()),
        Json(content_request(Some("dice"), "welcome", "again")),
    )
    .await;
    assert_eq!(
        duplicate.unwrap_err().into_response().status(),
        StatusCode::CONFLICT
    );

    let missing = auth_content::save_auth_content(
        admin(),
        State(state.clone()),
        Json(AuthContentRequest {
            content_value: None,
            ..content_request(Some("dice"), "other", "x")
        }),
    )
    .await;
    match missing {
        Err(AppError::BadRequest(message)) => assert_eq!(message, "missing parameters"),
        other => panic!("expected a bad request, got {other:?}"),
    }

    // Updating a row onto its own key is allowed.
    let Json(updated) = auth_content::update_auth_content(
        admin(),
        State(state.clone()),
        Path(first.id),
        Json(content_request(Some("dice"), "welcome", "changed")),
    )
    .await
    .unwrap();
    assert_eq!(updated.content_value, "changed");

    // Moving it onto the null-project row's key is a duplicate.
    let clash = auth_content::update_auth_content(
        admin(),
        State(state),
        Path(first.id),
        Json(content_request(None, "welcome", "changed")),
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));
}
