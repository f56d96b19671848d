//! Public catalog endpoints over a real socket.

mod common;

use common::{call, start, start_with_books};
use serde_json::json;

#[tokio::test]
async fn health_check() {
    let server = start().await;
    let (status, body) = call(server.get("/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "OK");
}

#[tokio::test]
async fn lists_seeded_collections_with_count() {
    let server = start().await;

    let (status, body) = call(server.get("/api/books")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = call(server.get("/api/quotes")).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"][0]["id"], 1);
}

#[tokio::test]
async fn fetches_one_record() {
    let server = start().await;
    let (status, body) = call(server.get("/api/quotes/2")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], 2);
    assert!(body["data"]["text"].is_string());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn missing_record_is_404_envelope() {
    let server = start().await;
    let (status, body) = call(server.get("/api/books/99")).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "book 99 not found");

    let (status, _) = call(server.get("/api/books/abc")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn unknown_collection_is_404() {
    let server = start().await;
    let (status, body) = call(server.get("/api/recipes")).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);

    let (status, _) = call(server.get("/api/recipes/1")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn random_quote_is_one_of_the_seeds() {
    let server = start().await;
    let (status, body) = call(server.get("/api/quotes/random")).await;
    assert_eq!(status, 200);
    let id = body["data"]["id"].as_u64().unwrap();
    assert!((1..=3).contains(&id));
}

#[tokio::test]
async fn stats_flag_enriches_records() {
    let server = start().await;
    let user = server.register("lea").await;
    let (status, _) = call(
        server
            .post("/api/books/1/ratings")
            .json(&json!({ "user_id": user, "value": 4 })),
    )
    .await;
    assert_eq!(status, 201);

    let (_, plain) = call(server.get("/api/books")).await;
    assert!(plain["data"][0].get("ratings_count").is_none());

    let (_, enriched) = call(server.get("/api/books?stats=true")).await;
    assert_eq!(enriched["data"][0]["ratings_count"], 1);
    assert_eq!(enriched["data"][0]["average_rating"], 4.0);
    assert_eq!(enriched["data"][1]["ratings_count"], 0);
    assert_eq!(enriched["data"][1]["comments_count"], 0);

    let (_, one) = call(server.get("/api/books/1?stats=true")).await;
    assert_eq!(one["data"]["title"], enriched["data"][0]["title"]);
    assert_eq!(one["data"]["ratings_count"], 1);
}

#[tokio::test]
async fn rating_twice_keeps_latest_value() {
    let server = start().await;
    let user = server.register("tom").await;
    for value in [2, 5] {
        call(
            server
                .post("/api/quotes/1/ratings")
                .json(&json!({ "user_id": user, "value": value })),
        )
        .await;
    }
    let (status, body) = call(server.get("/api/quotes/1/stats")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["ratings_count"], 1);
    assert_eq!(body["data"]["average_rating"], 5.0);
}

#[tokio::test]
async fn invalid_ratings_and_comments_are_rejected() {
    let server = start().await;
    let user = server.register("zoe").await;

    let (status, _) = call(
        server
            .post("/api/quotes/1/ratings")
            .json(&json!({ "user_id": user, "value": 9 })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = call(
        server
            .post("/api/quotes/1/comments")
            .json(&json!({ "user_id": user, "body": "  " })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = call(
        server
            .post("/api/quotes/42/comments")
            .json(&json!({ "user_id": user, "body": "hello" })),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = call(
        server
            .post("/api/quotes/1/comments")
            .json(&json!({ "user_id": 999, "body": "hello" })),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn users_register_and_fetch() {
    let server = start().await;
    let id = server.register("ines").await;

    let (status, body) = call(server.get(&format!("/api/users/{id}"))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["username"], "ines");
    assert_eq!(body["data"]["is_admin"], false);

    let (status, _) = call(
        server
            .post("/api/users")
            .json(&json!({ "username": "ines", "email": "other@example.com" })),
    )
    .await;
    assert_eq!(status, 409);

    let (status, _) = call(server.get("/api/users/12345")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn featured_media_starts_empty() {
    let server = start().await;
    let (status, body) = call(server.get("/api/featured-media")).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn books_with_null_fields_are_still_listed() {
    let server = start_with_books(
        r#"[{"id": 1, "title": "A", "pages": null, "price": 10}, {"id": 2, "title": "B"}]"#,
    )
    .await;
    let (status, body) = call(server.get("/api/books")).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["price"], 10);
    assert!(body["data"][0].get("pages").is_none());

    let token = server.login().await;
    let (status, body) = call(
        server
            .put("/api/admin/books/2")
            .bearer_auth(&token)
            .json(&json!({ "price": 4 })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["price"], 4);
}
