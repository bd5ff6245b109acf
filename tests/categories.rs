use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, App};
use chrono::Duration;
use minimal_api::auth::{AuthService, TokenService};
use minimal_api::models::{Category, CategoryDto};
use minimal_api::routes::{self, AppState};
use minimal_api::store::{CategoryRepository, InMemoryCategoryRepository, InMemoryIdentityStore};
use minimal_api::ApiResponse;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn state_with(repo: Arc<dyn CategoryRepository>) -> AppState {
    let tokens = TokenService::new("categories_test_secret", Duration::days(7));
    AppState {
        categories: repo,
        auth: AuthService::new(Arc::new(InMemoryIdentityStore::new()), tokens.clone(), 4),
        tokens,
    }
}

macro_rules! app {
    ($repo:expr) => {
        test::init_service(
            App::new()
                .wrap(Logger::default())
                .configure(routes::configure(state_with($repo))),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_create_on_empty_store_then_duplicate() {
    let app = app!(Arc::new(InMemoryCategoryRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/category")
        .set_json(json!({ "name": "Electronics" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "isSuccessful": true,
            "result": { "id": 1, "name": "Electronics" },
            "statusCode": 200,
            "errors": []
        })
    );

    let req = test::TestRequest::post()
        .uri("/api/category")
        .set_json(json!({ "name": "electronics" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["isSuccessful"], false);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["errors"], json!(["Name already exists"]));
}

#[actix_rt::test]
async fn test_created_id_exceeds_previous_maximum() {
    let app = app!(Arc::new(InMemoryCategoryRepository::seeded()));

    let req = test::TestRequest::post()
        .uri("/api/category")
        .set_json(json!({ "name": "Books" }))
        .to_request();
    let body: ApiResponse<CategoryDto> = test::call_and_read_body_json(&app, req).await;
    assert!(body.is_successful);
    let created = body.result.unwrap();
    assert_eq!(created.name, "Books");
    assert_eq!(created.id, 4);

    let req = test::TestRequest::get()
        .uri(&format!("/api/category/{}", created.id))
        .to_request();
    let body: ApiResponse<CategoryDto> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.result, Some(created));
}

#[actix_rt::test]
async fn test_create_validation_failures() {
    let app = app!(Arc::new(InMemoryCategoryRepository::new()));

    for payload in [json!({ "name": "" }), json!({ "name": "   " }), json!({})] {
        let req = test::TestRequest::post()
            .uri("/api/category")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"], json!(["'Name' must not be empty."]));
    }

    let req = test::TestRequest::get().uri("/api/categories").to_request();
    let body: ApiResponse<Vec<CategoryDto>> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.result, Some(Vec::new()));
}

#[actix_rt::test]
async fn test_malformed_json_is_enveloped() {
    let app = app!(Arc::new(InMemoryCategoryRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/category")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["isSuccessful"], false);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_list_returns_every_category() {
    let app = app!(Arc::new(InMemoryCategoryRepository::seeded()));

    let req = test::TestRequest::get().uri("/api/categories").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isSuccessful"], true);
    assert_eq!(
        body["result"],
        json!([
            { "id": 1, "name": "1" },
            { "id": 2, "name": "2" },
            { "id": 3, "name": "3" }
        ])
    );
}

#[actix_rt::test]
async fn test_get_rejects_non_positive_ids() {
    let app = app!(Arc::new(InMemoryCategoryRepository::seeded()));

    for id in [0, -1, -250] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/category/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"], json!(["Id is zero or negative"]));
    }

    let req = test::TestRequest::get().uri("/api/category/404").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_update_renames_and_preserves_creation_stamps() {
    let repo = Arc::new(InMemoryCategoryRepository::new());
    let app = app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/api/category")
        .set_json(json!({ "name": "Books" }))
        .to_request();
    let body: ApiResponse<CategoryDto> = test::call_and_read_body_json(&app, req).await;
    let id = body.result.unwrap().id;
    let before: Category = repo.get_by_id(id).await.unwrap().unwrap();

    let req = test::TestRequest::put()
        .uri("/api/category")
        .set_json(json!({ "id": id, "name": "Novels" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<CategoryDto> = test::read_body_json(resp).await;
    assert_eq!(body.result, Some(CategoryDto { id, name: "Novels".into() }));

    let after = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.name, "Novels");
    assert_eq!(after.created_by, before.created_by);
    assert_eq!(after.created_on, before.created_on);
    assert_eq!(after.last_modified_by.as_deref(), Some("anonymous"));
    assert!(after.last_modified_on.is_some());
    assert!(after.last_modified_on >= before.created_on);
}

#[actix_rt::test]
async fn test_update_failures() {
    let app = app!(Arc::new(InMemoryCategoryRepository::seeded()));

    let cases = vec![
        (
            json!({ "id": 0, "name": "" }),
            StatusCode::BAD_REQUEST,
            json!([
                "'Id' must not be empty.",
                "'Id' must be greater than '0'.",
                "'Name' must not be empty."
            ]),
            "invalid id and blank name",
        ),
        (
            json!({ "name": "Books" }),
            StatusCode::BAD_REQUEST,
            json!(["'Id' must not be empty.", "'Id' must be greater than '0'."]),
            "missing id",
        ),
        (
            json!({ "id": -3, "name": "Books" }),
            StatusCode::BAD_REQUEST,
            json!(["'Id' must be greater than '0'."]),
            "negative id",
        ),
        (
            json!({ "id": 1, "name": "2" }),
            StatusCode::BAD_REQUEST,
            json!(["Name already exists"]),
            "name held by another category",
        ),
        (
            json!({ "id": 99, "name": "Books" }),
            StatusCode::NOT_FOUND,
            json!(["Invalid Id"]),
            "unknown id",
        ),
    ];

    for (payload, expected_status, expected_errors, description) in cases {
        let req = test::TestRequest::put()
            .uri("/api/category")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "case: {}", description);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["isSuccessful"], false, "case: {}", description);
        assert_eq!(body["errors"], expected_errors, "case: {}", description);
    }

    // Re-submitting its own name in another case is not a clash.
    let req = test::TestRequest::put()
        .uri("/api/category")
        .set_json(json!({ "id": 1, "name": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_delete_then_get_is_not_found() {
    let app = app!(Arc::new(InMemoryCategoryRepository::seeded()));

    let req = test::TestRequest::delete().uri("/api/category/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["isSuccessful"], true);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["result"], json!({ "id": 2, "name": "2" }));

    let req = test::TestRequest::get().uri("/api/category/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri("/api/category/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"], json!(["Invalid Id"]));

    let req = test::TestRequest::delete().uri("/api/category/0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"], json!(["Id is zero or negative"]));
}
