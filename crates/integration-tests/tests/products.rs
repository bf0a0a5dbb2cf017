//! Product and category endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use store_integration_tests::TestApp;

fn ids(body: &serde_json::Value) -> Vec<i64> {
    let mut ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn create_returns_location_and_joined_category() {
    let app = TestApp::new();
    let books = app.category("Books").await;

    let response = app
        .post(
            "/products",
            json!({ "name": "Dune", "description": "Sci-fi", "price": "12.50", "categoryId": books }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.id();
    assert_eq!(response.location(), Some(format!("/products/{id}").as_str()));
    assert_eq!(response.body["name"], "Dune");
    assert_eq!(response.body["categoryId"], books);
    assert_eq!(response.body["category"], json!({ "id": books, "name": "Books" }));

    let fetched = app.get(&format!("/products/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, response.body);
}

#[tokio::test]
async fn prices_always_carry_two_decimal_places() {
    let app = TestApp::new();
    let books = app.category("Books").await;

    for (price, expected) in [
        (json!(150), "150.00"),
        (json!("150"), "150.00"),
        (json!(150.5), "150.50"),
        (json!("1.500"), "1.50"),
    ] {
        let response = app
            .post(
                "/products",
                json!({ "name": "Dune", "price": price, "categoryId": books }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        assert_eq!(response.body["price"], expected);

        let fetched = app.get(&format!("/products/{}", response.id())).await;
        assert_eq!(fetched.body["price"], expected);
    }
}

#[tokio::test]
async fn create_with_missing_category_is_rejected_without_insert() {
    let app = TestApp::new();
    let books = app.category("Books").await;
    app.product("Dune", "12.50", books).await;

    let response = app
        .post(
            "/products",
            json!({ "name": "Ghost", "price": "1.00", "categoryId": 99 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.get("categoryId").is_some(), "{}", response.body);
    assert_eq!(app.get("/products").await.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_fields_return_field_map() {
    let app = TestApp::new();
    let books = app.category("Books").await;

    let response = app
        .post(
            "/products",
            json!({ "name": "  ", "price": "-1", "categoryId": books }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["name"], "Name is required.");
    assert_eq!(response.body["price"], "Price must be zero or greater.");
    assert!(app.get("/products").await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_replaces_fields_and_moves_category() {
    let app = TestApp::new();
    let books = app.category("Books").await;
    let music = app.category("Music").await;
    let id = app.product("Dune", "12.50", books).await;

    let response = app
        .put(
            &format!("/products/{id}"),
            json!({ "name": "Dune (vinyl)", "description": "Soundtrack", "price": "30.00", "categoryId": music }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id);
    assert_eq!(response.body["name"], "Dune (vinyl)");
    assert_eq!(response.body["categoryId"], music);

    let in_books = app.get(&format!("/products?categoryId={books}")).await;
    assert!(in_books.body.as_array().unwrap().is_empty());
    let in_music = app.get(&format!("/products?categoryId={music}")).await;
    assert_eq!(ids(&in_music.body), vec![id]);
}

#[tokio::test]
async fn update_to_missing_category_leaves_product_unchanged() {
    let app = TestApp::new();
    let books = app.category("Books").await;
    let id = app.product("Dune", "12.50", books).await;
    let before = app.get(&format!("/products/{id}")).await;

    let response = app
        .put(
            &format!("/products/{id}"),
            json!({ "name": "Renamed", "price": "1.00", "categoryId": 42 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get(&format!("/products/{id}")).await.body, before.body);
}

#[tokio::test]
async fn update_missing_product_is_not_found_before_category_check() {
    let app = TestApp::new();

    let response = app
        .put(
            "/products/500",
            json!({ "name": "Nope", "price": "1.00", "categoryId": 42 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = TestApp::new();
    let books = app.category("Books").await;
    let keep = app.product("Dune", "12.50", books).await;
    let gone = app.product("Emma", "8.00", books).await;

    assert_eq!(
        app.delete(&format!("/products/{gone}")).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get(&format!("/products/{gone}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete(&format!("/products/{gone}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(ids(&app.get("/products").await.body), vec![keep]);
}

#[tokio::test]
async fn category_filter_partitions_the_listing() {
    let app = TestApp::new();
    let books = app.category("Books").await;
    let music = app.category("Music").await;
    let a = app.product("Dune", "12.50", books).await;
    let b = app.product("Emma", "8.00", books).await;
    let c = app.product("Kind of Blue", "20.00", music).await;

    let in_books = ids(&app.get(&format!("/products?categoryId={books}")).await.body);
    let in_music = ids(&app.get(&format!("/products?categoryId={music}")).await.body);
    assert_eq!(in_books, vec![a, b]);
    assert_eq!(in_music, vec![c]);

    let mut union = [in_books, in_music].concat();
    union.sort_unstable();
    assert_eq!(ids(&app.get("/products").await.body), union);

    let unknown = app.get("/products?categoryId=9999").await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(unknown.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn category_lifecycle() {
    let app = TestApp::new();

    let created = app.post("/categories", json!({ "name": "Garden" })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.id();
    assert_eq!(created.location(), Some(format!("/categories/{id}").as_str()));

    let renamed = app
        .put(&format!("/categories/{id}"), json!({ "name": "Outdoor" }))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body, json!({ "id": id, "name": "Outdoor" }));

    let listed = app.get("/categories").await;
    assert_eq!(listed.body, json!([{ "id": id, "name": "Outdoor" }]));

    assert_eq!(
        app.delete(&format!("/categories/{id}")).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get(&format!("/categories/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = TestApp::new();
    let books = app.category("Books").await;
    let id = app.product("Dune", "12.50", books).await;

    let response = app.delete(&format!("/categories/{books}")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(response.body["error"].is_string());

    app.delete(&format!("/products/{id}")).await;
    assert_eq!(
        app.delete(&format!("/categories/{books}")).await.status,
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn category_ids_outside_range_are_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/categories/300").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/categories/-1").await.status, StatusCode::NOT_FOUND);
}
