use crate::common::{Field, TestApp, TestOptions, routes};

/// Replace a creator's folder with a plain file so placing into it fails.
fn break_creator_folder(app: &TestApp, folder: &str) {
    let path = app.uploads.path().join("creators").join(folder);
    std::fs::remove_dir_all(&path).unwrap();
    std::fs::write(&path, b"not a directory").unwrap();
}

async fn failing_avatar_upload(app: &TestApp) -> crate::common::TestResponse {
    let creator = app.create_creator("Jane Doe", "janedoe").await;
    let id = creator["id"].as_str().unwrap().parse().unwrap();
    break_creator_folder(app, creator["folder_name"].as_str().unwrap());

    app.multipart(
        &routes::avatar(id),
        vec![Field::file("avatar", "me.png", "image/png", b"avatar")],
    )
    .await
}

#[tokio::test]
async fn storage_failure_hides_detail_by_default() {
    let app = TestApp::spawn().await;

    let res = failing_avatar_upload(&app).await;

    assert_eq!(res.status, 500, "{}", res.text);
    assert_eq!(res.code(), "IO_ERROR");
    assert_eq!(res.body["success"], false);
    assert!(res.body.get("debug").is_none(), "{}", res.text);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn storage_failure_exposes_detail_when_enabled() {
    let app = TestApp::spawn_with(TestOptions {
        expose_debug: true,
        ..Default::default()
    })
    .await;

    let res = failing_avatar_upload(&app).await;

    assert_eq!(res.status, 500, "{}", res.text);
    assert_eq!(res.code(), "IO_ERROR");
    assert!(res.body["debug"].as_str().is_some_and(|d| !d.is_empty()));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn client_errors_never_carry_debug() {
    let app = TestApp::spawn_with(TestOptions {
        expose_debug: true,
        ..Default::default()
    })
    .await;

    let res = app.get(&routes::creator(uuid::Uuid::new_v4())).await;

    assert_eq!(res.status, 404);
    assert!(res.body.get("debug").is_none());
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .post(format!("http://{}{}", app.addr, routes::CREATORS))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let res = crate::common::TestResponse::from_response(res).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn missing_asset_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get("/uploads/creators/nobody-0000/avatar.png").await;

    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["status"], "ok");
    assert_eq!(res.body["data"]["database"], true);
    assert_eq!(res.body["data"]["storage"], true);
}
