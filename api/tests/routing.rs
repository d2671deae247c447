//! Integration tests for enveloped routing and the OpenAPI document

use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zd_api::{payload, ApiRouter, OpenApi};
use zd_shared::{ApiError, ApiResponse, PageParams, PagedResponse};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Debug, Serialize)]
struct ErrorMessage {
    detail: String,
}

payload!(User, ErrorMessage);

async fn get_user(path: web::Path<i64>) -> Result<User, ApiError> {
    let id = path.into_inner();
    if id == 0 {
        return Err(ApiError::not_found().with_message("User 0 does not exist"));
    }
    Ok(User {
        id,
        name: format!("user-{}", id),
    })
}

async fn create_user(body: web::Json<User>) -> Result<ApiResponse<User>, ApiError> {
    let user = body.into_inner();
    if user.name == "taken" {
        return Err(ApiError::conflict().with_code(40901).with_message("Name already taken"));
    }
    Ok(ApiResponse::created(Some(user)))
}

async fn list_users(query: web::Query<PageParams>) -> PagedResponse<User> {
    let params = query.into_inner();
    let items = vec![User {
        id: 1,
        name: "alice".to_string(),
    }];
    PagedResponse::create(items, 1, &params)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn crash() -> anyhow::Result<User> {
    Err(anyhow::anyhow!("secret connection string leaked"))
}

fn user_router() -> ApiRouter {
    ApiRouter::new("/users")
        .tag("users")
        .get("/{id:\\d+}", get_user)
        .summary("Get a user")
        .response::<ApiResponse<ErrorMessage>>(404, "Not Found")
        .post("", create_user)
        .response::<ErrorMessage>(409, "Conflict")
        .get("", list_users)
        .get("/crash", crash)
}

fn documented() -> (OpenApi, actix_web::Scope) {
    let mut openapi = OpenApi::new("users", "1.0.0");
    let scope = openapi.mount(user_router());
    (openapi, scope)
}

async fn read_json(resp: actix_web::dev::ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn test_payload_is_wrapped() {
    let (_, scope) = documented();
    let app = test::init_service(App::new().service(scope)).await;

    let req = test::TestRequest::get().uri("/users/7").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        read_json(resp).await,
        json!({"code": 0, "data": {"id": 7, "name": "user-7"}, "message": "Success"})
    );
}

#[actix_web::test]
async fn test_hand_built_envelope_is_not_wrapped_again() {
    let (_, scope) = documented();
    let app = test::init_service(App::new().service(scope)).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"id": 3, "name": "carol"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "Created");
    assert_eq!(body["data"], json!({"id": 3, "name": "carol"}));
}

#[actix_web::test]
async fn test_business_errors_become_envelopes() {
    let (_, scope) = documented();
    let app = test::init_service(App::new().service(scope)).await;

    let req = test::TestRequest::get().uri("/users/0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        read_json(resp).await,
        json!({"code": 404, "data": null, "message": "User 0 does not exist"})
    );

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"id": 4, "name": "taken"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        read_json(resp).await,
        json!({"code": 40901, "data": null, "message": "Name already taken"})
    );
}

#[actix_web::test]
async fn test_unexpected_error_hides_details() {
    let (_, scope) = documented();
    let app = test::init_service(App::new().service(scope)).await;

    let req = test::TestRequest::get().uri("/users/crash").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(resp).await,
        json!({"code": 500, "data": null, "message": "Internal Server Error"})
    );
}

#[actix_web::test]
async fn test_paged_payload() {
    let (_, scope) = documented();
    let app = test::init_service(App::new().service(scope)).await;

    let req = test::TestRequest::get().uri("/users?page=2&size=5").to_request();
    let resp = test::call_service(&app, req).await;
    let body = read_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["size"], 5);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "alice");
}

#[actix_web::test]
async fn test_raw_response_passes_through() {
    let router = ApiRouter::new("").get("/health", health);
    let (scope, routes) = router.into_parts();
    let app = test::init_service(App::new().service(scope)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"ok");
    assert_eq!(routes[0].responses[0].doc.component_name(), None);
}

#[actix_web::test]
async fn test_openapi_document() {
    let (openapi, _) = documented();
    let document = openapi.document();

    assert_eq!(document["openapi"], "3.1.0");
    let get_user = &document["paths"]["/users/{id}"]["get"];
    assert_eq!(get_user["summary"], "Get a user");
    assert_eq!(get_user["tags"], json!(["users"]));
    assert_eq!(get_user["parameters"][0]["name"], "id");
    assert_eq!(
        get_user["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Response_User"
    );
    assert_eq!(get_user["responses"]["200"]["description"], "Successful Response");
    assert_eq!(
        get_user["responses"]["404"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Response_ErrorMessage"
    );

    let create_user = &document["paths"]["/users"]["post"];
    assert_eq!(
        create_user["responses"]["409"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Response_ErrorMessage"
    );
    let list_users = &document["paths"]["/users"]["get"];
    assert_eq!(
        list_users["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Response_Paged_User"
    );

    let schemas = &document["components"]["schemas"];
    let user = &schemas["Response_User"];
    assert_eq!(user["properties"]["code"]["type"], "integer");
    assert_eq!(user["properties"]["message"]["type"], "string");
    assert_eq!(user["properties"]["data"]["anyOf"][0]["title"], "User");
    assert_eq!(user["properties"]["data"]["anyOf"][1]["type"], "null");
    assert!(schemas.get("Response_Response_User").is_none());
}

#[actix_web::test]
async fn test_openapi_is_served() {
    let (openapi, scope) = documented();
    let app = test::init_service(
        App::new()
            .service(openapi.service("/openapi.json"))
            .service(scope),
    )
    .await;

    let req = test::TestRequest::get().uri("/openapi.json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let document = read_json(resp).await;
    assert!(document["paths"]["/users/{id}"].is_object());
}

async fn count_users() -> i64 {
    2
}

async fn service_label() -> String {
    "users".to_string()
}

async fn oldest_user_age() -> i64 {
    97
}

#[actix_web::test]
async fn test_generic_payloads_get_distinct_components() {
    let mut openapi = OpenApi::new("users", "1.0.0");
    let _scope = openapi.mount(
        ApiRouter::new("/stats")
            .get("/count", count_users)
            .get("/label", service_label)
            .get("/oldest", oldest_user_age),
    );
    let document = openapi.document();

    let schema_ref = |path: &str| {
        document["paths"][path]["get"]["responses"]["200"]["content"]["application/json"]["schema"]
            ["$ref"]
            .as_str()
            .unwrap()
            .to_string()
    };
    assert_eq!(schema_ref("/stats/count"), "#/components/schemas/Response_Data");
    assert_eq!(schema_ref("/stats/label"), "#/components/schemas/Response_Data_2");
    assert_eq!(schema_ref("/stats/oldest"), "#/components/schemas/Response_Data");

    let schemas = &document["components"]["schemas"];
    assert_eq!(
        schemas["Response_Data"]["properties"]["data"]["anyOf"][0],
        json!({"type": "integer"})
    );
    assert_eq!(
        schemas["Response_Data_2"]["properties"]["data"]["anyOf"][0],
        json!({"type": "string"})
    );
}
