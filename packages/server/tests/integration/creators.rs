use uuid::Uuid;

use crate::common::{Field, MAX_IMAGE_SIZE, TestApp, routes};

fn is_folder_for(folder: &str, prefix: &str) -> bool {
    folder
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|suffix| {
            suffix.len() == 4
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        })
}

fn id_of(value: &serde_json::Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn folder_name_is_sanitized_display_name_plus_suffix() {
        let app = TestApp::spawn().await;

        let creator = app.create_creator("Jane Doe!!", "janedoe").await;

        let folder = creator["folder_name"].as_str().unwrap();
        assert!(is_folder_for(folder, "janedoe"), "unexpected folder {folder}");
        assert!(app.uploads.path().join("creators").join(folder).is_dir());
    }

    #[tokio::test]
    async fn long_display_names_are_truncated() {
        let app = TestApp::spawn().await;

        let creator = app
            .create_creator("An Extraordinarily Long Creator Name", "longname")
            .await;

        let folder = creator["folder_name"].as_str().unwrap();
        assert!(is_folder_for(folder, "anextraordinarilylon"), "unexpected folder {folder}");
        assert!(folder.len() <= 25);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let app = TestApp::spawn().await;
        app.create_creator("Jane", "jane_one").await;

        let res = app
            .post(
                routes::CREATORS,
                &serde_json::json!({
                    "display_name": "Other Jane",
                    "username": "jane_two",
                    "email": "jane_one@example.com",
                }),
            )
            .await;

        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(res.code(), "CONFLICT");
        assert_eq!(res.body["success"], false);
    }

    #[tokio::test]
    async fn invalid_fields_are_all_reported() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::CREATORS,
                &serde_json::json!({
                    "display_name": "",
                    "username": "x",
                    "email": "not-an-email",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn list_returns_newest_first_with_pagination() {
        let app = TestApp::spawn().await;
        app.create_creator("First", "first").await;
        app.create_creator("Second", "second").await;

        let res = app.get(&format!("{}?per_page=1", routes::CREATORS)).await;

        assert_eq!(res.status, 200);
        let data = &res.body["data"];
        assert_eq!(data["items"].as_array().unwrap().len(), 1);
        assert_eq!(data["items"][0]["username"], "second");
        assert_eq!(data["pagination"]["total"], 2);
        assert_eq!(data["pagination"]["total_pages"], 2);
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn renaming_keeps_folder_name() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("Jane Doe", "janedoe").await;
        let id = id_of(&creator);

        let res = app
            .patch(
                &routes::creator(id),
                &serde_json::json!({ "display_name": "Someone Else", "bio": "hi" }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["display_name"], "Someone Else");
        assert_eq!(res.body["data"]["bio"], "hi");
        assert_eq!(res.body["data"]["folder_name"], creator["folder_name"]);
    }

    #[tokio::test]
    async fn null_bio_clears_it() {
        let app = TestApp::spawn().await;
        let id = id_of(&app.create_creator("Jane", "janedoe").await);
        app.patch(&routes::creator(id), &serde_json::json!({ "bio": "hello" }))
            .await;

        let res = app
            .patch(&routes::creator(id), &serde_json::json!({ "bio": null }))
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["data"]["bio"].is_null());
    }

    #[tokio::test]
    async fn unknown_creator_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::creator(Uuid::new_v4())).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }
}

mod images {
    use super::*;

    #[tokio::test]
    async fn second_avatar_replaces_first_at_same_url() {
        let app = TestApp::spawn().await;
        let id = id_of(&app.create_creator("Jane Doe", "janedoe").await);

        let first = app
            .multipart(
                &routes::avatar(id),
                vec![Field::file("avatar", "me.png", "image/png", b"first-avatar")],
            )
            .await;
        let second = app
            .multipart(
                &routes::avatar(id),
                vec![Field::file("avatar", "me.png", "image/png", b"second-avatar")],
            )
            .await;

        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(second.status, 200, "{}", second.text);
        let url = second.body["data"]["url"].as_str().unwrap();
        assert_eq!(first.body["data"]["url"].as_str().unwrap(), url);
        assert!(url.ends_with("/avatar.png"));
        assert_eq!(second.body["data"]["creator"]["avatar_url"], url);

        let (status, bytes) = app.get_bytes(url).await;
        assert_eq!(status, 200);
        assert_eq!(bytes, b"second-avatar");
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn changing_extension_serves_the_new_file() {
        let app = TestApp::spawn().await;
        let id = id_of(&app.create_creator("Jane Doe", "janedoe").await);

        let first = app
            .multipart(
                &routes::avatar(id),
                vec![Field::file("avatar", "me.png", "image/png", b"png-avatar")],
            )
            .await;
        let second = app
            .multipart(
                &routes::avatar(id),
                vec![Field::file("avatar", "me.jpg", "image/jpeg", b"jpg-avatar")],
            )
            .await;

        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(second.status, 200, "{}", second.text);
        let old_url = first.body["data"]["url"].as_str().unwrap();
        let new_url = second.body["data"]["url"].as_str().unwrap();
        assert!(old_url.ends_with("/avatar.png"));
        assert!(new_url.ends_with("/avatar.jpg"));

        let fetched = app.get(&routes::creator(id)).await;
        assert_eq!(fetched.body["data"]["avatar_url"], new_url);
        let (status, bytes) = app.get_bytes(new_url).await;
        assert_eq!(status, 200);
        assert_eq!(bytes, b"jpg-avatar");
        let (status, _) = app.get_bytes(old_url).await;
        assert_eq!(status, 404);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_avatars_agree_with_stored_url() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("Jane Doe", "janedoe").await;
        let id = id_of(&creator);
        let folder = creator["folder_name"].as_str().unwrap().to_string();

        for _ in 0..10 {
            let avatar_route = routes::avatar(id);
            let (png, jpg) = tokio::join!(
                app.multipart(
                    &avatar_route,
                    vec![Field::file("avatar", "me.png", "image/png", b"png-avatar")],
                ),
                app.multipart(
                    &avatar_route,
                    vec![Field::file("avatar", "me.jpg", "image/jpeg", b"jpg-avatar")],
                ),
            );
            assert_eq!(png.status, 200, "{}", png.text);
            assert_eq!(jpg.status, 200, "{}", jpg.text);

            let avatars: Vec<String> = app
                .placed_files()
                .into_iter()
                .filter(|f| f.starts_with(&format!("{folder}/avatar.")))
                .collect();
            assert_eq!(avatars.len(), 1, "{avatars:?}");

            let fetched = app.get(&routes::creator(id)).await;
            let url = fetched.body["data"]["avatar_url"].as_str().unwrap();
            assert_eq!(url, format!("/uploads/creators/{}", avatars[0]));

            let (status, bytes) = app.get_bytes(url).await;
            assert_eq!(status, 200);
            let expected: &[u8] = if url.ends_with(".png") {
                b"png-avatar"
            } else {
                b"jpg-avatar"
            };
            assert_eq!(bytes, expected);
        }
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn banner_lands_next_to_avatar() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("Jane Doe", "janedoe").await;
        let id = id_of(&creator);
        let folder = creator["folder_name"].as_str().unwrap();

        let res = app
            .multipart(
                &routes::banner(id),
                vec![Field::file("banner", "wide.jpg", "image/jpeg", b"banner")],
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body["data"]["url"],
            format!("/uploads/creators/{folder}/banner.jpg")
        );
    }

    #[tokio::test]
    async fn avatar_must_be_an_image() {
        let app = TestApp::spawn().await;
        let id = id_of(&app.create_creator("Jane", "janedoe").await);

        let res = app
            .multipart(
                &routes::avatar(id),
                vec![Field::file("avatar", "clip.mp4", "video/mp4", b"video")],
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn avatar_over_image_limit_is_rejected() {
        let app = TestApp::spawn().await;
        let id = id_of(&app.create_creator("Jane", "janedoe").await);
        let bytes = vec![1u8; MAX_IMAGE_SIZE as usize + 1];

        let res = app
            .multipart(
                &routes::avatar(id),
                vec![Field::file("avatar", "big.png", "image/png", &bytes)],
            )
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn avatar_for_unknown_creator_leaves_nothing_behind() {
        let app = TestApp::spawn().await;

        let res = app
            .multipart(
                &routes::avatar(Uuid::new_v4()),
                vec![Field::file("avatar", "me.png", "image/png", b"x")],
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.staged_files(), 0);
    }
}

mod provisioning {
    use super::*;

    #[tokio::test]
    async fn provisions_creator_with_both_images() {
        let app = TestApp::spawn().await;

        let res = app
            .multipart(
                routes::PROVISION,
                vec![
                    Field::Text("display_name", "Test Creator"),
                    Field::Text("username", "testcreator"),
                    Field::Text("email", "test@example.com"),
                    Field::file("avatar", "a.png", "image/png", b"avatar"),
                    Field::file("banner", "b.webp", "image/webp", b"banner"),
                ],
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let data = &res.body["data"];
        let folder = data["folder_name"].as_str().unwrap();
        assert!(is_folder_for(folder, "testcreator"));
        assert_eq!(
            data["avatar_url"],
            format!("/uploads/creators/{folder}/avatar.png")
        );
        assert_eq!(
            data["banner_url"],
            format!("/uploads/creators/{folder}/banner.webp")
        );
        let (_, bytes) = app
            .get_bytes(data["banner_url"].as_str().unwrap())
            .await;
        assert_eq!(bytes, b"banner");
    }

    #[tokio::test]
    async fn provisioning_requires_avatar() {
        let app = TestApp::spawn().await;

        let res = app
            .multipart(
                routes::PROVISION,
                vec![
                    Field::Text("display_name", "Test Creator"),
                    Field::Text("username", "testcreator"),
                    Field::Text("email", "test@example.com"),
                ],
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.count("creator").await, 0);
    }

    #[tokio::test]
    async fn failed_image_write_removes_files_and_creator() {
        let app = TestApp::spawn().await;
        app.reject_writes(
            "reject_banner",
            "BEFORE UPDATE ON creator WHEN (NEW.banner_url IS DISTINCT FROM OLD.banner_url)",
        )
        .await;

        let res = app
            .multipart(
                routes::PROVISION,
                vec![
                    Field::Text("display_name", "Test Creator"),
                    Field::Text("username", "testcreator"),
                    Field::Text("email", "test@example.com"),
                    Field::file("avatar", "a.png", "image/png", b"avatar"),
                    Field::file("banner", "b.webp", "image/webp", b"banner"),
                ],
            )
            .await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(app.count("creator").await, 0);
        assert_eq!(app.placed_files(), Vec::<String>::new());
        assert_eq!(app.staged_files(), 0);
    }
}
