use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes};

mod wallet {
    use super::*;

    #[tokio::test]
    async fn top_ups_accumulate() {
        let app = TestApp::spawn().await;
        let fan_id = app.create_fan("alice").await;

        let first = app
            .post(&routes::top_up(fan_id), &json!({ "amount": 500 }))
            .await;
        let second = app
            .post(&routes::top_up(fan_id), &json!({ "amount": 250 }))
            .await;

        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["data"]["wallet_balance"], 500);
        assert_eq!(second.body["data"]["wallet_balance"], 750);
        assert_ne!(
            first.body["data"]["transaction_id"],
            second.body["data"]["transaction_id"]
        );
        assert_eq!(app.count("wallet_transaction").await, 2);

        let fan = app.get(&routes::fan(fan_id)).await;
        assert_eq!(fan.body["data"]["wallet_balance"], 750);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let app = TestApp::spawn().await;
        let fan_id = app.create_fan("alice").await;

        let res = app
            .post(&routes::top_up(fan_id), &json!({ "amount": 0 }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.count("wallet_transaction").await, 0);
    }

    #[tokio::test]
    async fn unknown_fan_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post(&routes::top_up(Uuid::new_v4()), &json!({ "amount": 100 }))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.count("wallet_transaction").await, 0);
    }

    #[tokio::test]
    async fn duplicate_fan_is_conflict() {
        let app = TestApp::spawn().await;
        app.create_fan("alice").await;

        let res = app
            .post(
                routes::FANS,
                &json!({
                    "username": "alice",
                    "email": "other@fans.example.com",
                    "display_name": "Alice",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
    }
}

mod subscriptions {
    use super::*;

    #[tokio::test]
    async fn subscription_lifecycle() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("Jane Doe", "janedoe").await;
        let creator_id: Uuid = creator["id"].as_str().unwrap().parse().unwrap();
        let fan_id = app.create_fan("alice").await;
        let body = json!({ "fan_id": fan_id, "creator_id": creator_id });

        let subscribed = app.post(routes::SUBSCRIPTIONS, &body).await;
        assert_eq!(subscribed.status, 201, "{}", subscribed.text);

        let again = app.post(routes::SUBSCRIPTIONS, &body).await;
        assert_eq!(again.status, 409);

        let creator = app.get(&routes::creator(creator_id)).await;
        assert_eq!(creator.body["data"]["subscriber_count"], 1);

        let listed = app.get(&routes::fan_subscriptions(fan_id)).await;
        assert_eq!(listed.status, 200);
        let items = listed.body["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["creator_id"], creator_id.to_string());

        let removed = app.delete(routes::SUBSCRIPTIONS, &body).await;
        assert_eq!(removed.status, 200, "{}", removed.text);
        assert_eq!(removed.body["success"], true);

        let missing = app.delete(routes::SUBSCRIPTIONS, &body).await;
        assert_eq!(missing.status, 404);

        let creator = app.get(&routes::creator(creator_id)).await;
        assert_eq!(creator.body["data"]["subscriber_count"], 0);
    }

    #[tokio::test]
    async fn subscribing_to_unknown_creator_is_not_found() {
        let app = TestApp::spawn().await;
        let fan_id = app.create_fan("alice").await;

        let res = app
            .post(
                routes::SUBSCRIPTIONS,
                &json!({ "fan_id": fan_id, "creator_id": Uuid::new_v4() }),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.count("subscription").await, 0);
    }
}
