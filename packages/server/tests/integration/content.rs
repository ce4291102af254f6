use serde_json::json;
use uuid::Uuid;

use crate::common::{Field, MAX_UPLOAD_SIZE, TestApp, routes};

async fn creator_id(app: &TestApp) -> (Uuid, String) {
    let creator = app.create_creator("Jane Doe", "janedoe").await;
    let id = creator["id"].as_str().unwrap().parse().unwrap();
    let folder = creator["folder_name"].as_str().unwrap().to_string();
    (id, folder)
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn uploaded_file_is_served_back() {
        let app = TestApp::spawn().await;
        let (id, folder) = creator_id(&app).await;

        let res = app.upload_content(id, "pic.png", "image/png", b"png-bytes").await;

        assert_eq!(res.status, 201, "{}", res.text);
        let data = &res.body["data"];
        assert_eq!(data["content_type"], "image");
        assert_eq!(data["source"], "upload");
        assert_eq!(data["like_count"], 0);
        let url = data["url"].as_str().unwrap();
        assert!(
            url.starts_with(&format!("/uploads/creators/{folder}/content/")),
            "unexpected url {url}"
        );
        assert!(url.ends_with(".png"));

        let (status, bytes) = app.get_bytes(url).await;
        assert_eq!(status, 200);
        assert_eq!(bytes, b"png-bytes");
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn uploads_never_share_a_url() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;

        let first = app.upload_content(id, "a.mp4", "video/mp4", b"one").await;
        let second = app.upload_content(id, "a.mp4", "video/mp4", b"two").await;

        assert_eq!(first.status, 201);
        assert_eq!(second.status, 201);
        assert_ne!(first.body["data"]["url"], second.body["data"]["url"]);
        assert_eq!(second.body["data"]["content_type"], "video");
    }

    #[tokio::test]
    async fn media_count_tracks_uploads() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;

        app.upload_content(id, "a.png", "image/png", b"a").await;
        app.upload_content(id, "b.png", "image/png", b"b").await;

        let res = app.get(&routes::creator(id)).await;
        assert_eq!(res.body["data"]["media_count"], 2);

        let listed = app.get(&routes::creator_content(id)).await;
        assert_eq!(listed.status, 200);
        assert_eq!(listed.body["data"]["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn file_at_limit_is_accepted() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;
        let bytes = vec![7u8; MAX_UPLOAD_SIZE as usize];

        let res = app.upload_content(id, "full.png", "image/png", &bytes).await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn file_over_limit_leaves_nothing_behind() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;
        let bytes = vec![7u8; MAX_UPLOAD_SIZE as usize + 1];

        let res = app.upload_content(id, "big.png", "image/png", &bytes).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(app.staged_files(), 0);
        assert_eq!(app.count("content").await, 0);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found_and_cleans_up() {
        let app = TestApp::spawn().await;
        let user_id = Uuid::new_v4().to_string();

        let res = app
            .multipart(
                routes::CONTENT_UPLOAD,
                vec![
                    Field::Text("userId", &user_id),
                    Field::Text("title", "Hello"),
                    Field::file("contentFile", "pic.png", "image/png", b"data"),
                ],
            )
            .await;

        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(res.code(), "NOT_FOUND");
        assert_eq!(app.staged_files(), 0);
        assert_eq!(app.count("content").await, 0);
    }

    #[tokio::test]
    async fn user_id_matching_creator_id_is_accepted() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;
        let user_id = id.to_string();

        let res = app
            .multipart(
                routes::CONTENT_UPLOAD,
                vec![
                    Field::Text("userId", &user_id),
                    Field::Text("title", "Hello"),
                    Field::Text("isPremium", "true"),
                    Field::file("contentFile", "pic.png", "image/png", b"data"),
                ],
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["is_premium"], true);
        assert_eq!(res.body["data"]["creator_id"], user_id);
    }

    #[tokio::test]
    async fn non_media_files_are_rejected() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;

        let res = app
            .upload_content(id, "notes.pdf", "application/pdf", b"%PDF")
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;
        let id = id.to_string();

        let res = app
            .multipart(
                routes::CONTENT_UPLOAD,
                vec![
                    Field::Text("creatorId", &id),
                    Field::Text("title", "Hello"),
                ],
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("contentFile"));
    }

    #[tokio::test]
    async fn failed_insert_removes_placed_file() {
        let app = TestApp::spawn().await;
        let (id, folder) = creator_id(&app).await;
        app.reject_writes("reject_content", "BEFORE INSERT ON content")
            .await;

        let res = app.upload_content(id, "pic.png", "image/png", b"png").await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.code(), "REMOTE_STORE_ERROR");
        assert_eq!(app.count("content").await, 0);
        assert_eq!(app.staged_files(), 0);
        let placed = app.placed_files();
        assert!(
            !placed.iter().any(|f| f.starts_with(&format!("{folder}/content/"))),
            "{placed:?}"
        );
    }
}

mod register {
    use super::*;

    #[tokio::test]
    async fn registers_external_url() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;

        let res = app
            .post(
                routes::CONTENT_REGISTER,
                &json!({
                    "creator_id": id,
                    "title": "Elsewhere",
                    "url": "https://cdn.example.com/clip.mp4",
                    "content_type": "video",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["source"], "external");
        assert_eq!(res.body["data"]["url"], "https://cdn.example.com/clip.mp4");

        let fetched = app.get(&routes::content(res.data_id())).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["data"]["title"], "Elsewhere");
    }

    #[tokio::test]
    async fn relative_url_is_rejected() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;

        let res = app
            .post(
                routes::CONTENT_REGISTER,
                &json!({
                    "creator_id": id,
                    "title": "Elsewhere",
                    "url": "/local/file.mp4",
                    "content_type": "video",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.count("content").await, 0);
    }
}

mod likes {
    use super::*;

    #[tokio::test]
    async fn like_lifecycle() {
        let app = TestApp::spawn().await;
        let (id, _) = creator_id(&app).await;
        let content_id = app
            .upload_content(id, "a.png", "image/png", b"a")
            .await
            .data_id();
        let fan_id = app.create_fan("alice").await;
        let body = json!({ "fan_id": fan_id });

        let liked = app.post(&routes::like(content_id), &body).await;
        assert_eq!(liked.status, 201, "{}", liked.text);
        assert_eq!(liked.body["data"]["like_count"], 1);

        let again = app.post(&routes::like(content_id), &body).await;
        assert_eq!(again.status, 409);
        assert_eq!(again.code(), "CONFLICT");

        let unliked = app.delete(&routes::like(content_id), &body).await;
        assert_eq!(unliked.status, 200, "{}", unliked.text);
        assert_eq!(unliked.body["data"]["like_count"], 0);

        let missing = app.delete(&routes::like(content_id), &body).await;
        assert_eq!(missing.status, 404);

        let content = app.get(&routes::content(content_id)).await;
        assert_eq!(content.body["data"]["like_count"], 0);
    }

    #[tokio::test]
    async fn liking_unknown_content_is_not_found() {
        let app = TestApp::spawn().await;
        let fan_id = app.create_fan("alice").await;

        let res = app
            .post(&routes::like(Uuid::new_v4()), &json!({ "fan_id": fan_id }))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.count("content_like").await, 0);
    }
}
