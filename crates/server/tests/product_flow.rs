use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> Option<Router> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match models::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    // Parallel tests may race on the migration table; already-applied is fine
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            eprintln!("skip: migrate up failed: {}", msg);
            return None;
        }
    }
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 12 },
    };
    Some(routes::build_router(cors(), state))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    builder.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a fresh user and return its id plus a bearer token.
async fn signup(app: &Router, name: &str) -> anyhow::Result<(Uuid, String)> {
    let email = format!("{}_{}@example.com", name, Uuid::new_v4());
    let resp = app
        .clone()
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"email": email, "name": name, "password": "S3curePass!"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    let id = Uuid::parse_str(body["data"]["id"].as_str().unwrap())?;

    let resp = app
        .clone()
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": email, "password": "S3curePass!"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    Ok((id, token))
}

async fn create_product(app: &Router, token: &str, name: &str, price: &str) -> anyhow::Result<Uuid> {
    let resp = app
        .clone()
        .call(json_request(
            "POST",
            "/api/products",
            Some(token),
            json!({"name": name, "description": "test item", "price": price, "stock": 3}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    Ok(Uuid::parse_str(body["data"]["id"].as_str().unwrap())?)
}

#[tokio::test]
async fn test_product_crud_flow_with_ownership() -> anyhow::Result<()> {
    let Some(app) = build_app().await else { return Ok(()) };

    let (owner_id, owner_token) = signup(&app, "owner").await?;
    let (_stranger_id, stranger_token) = signup(&app, "stranger").await?;

    let product_id = create_product(&app, &owner_token, "Walnut Desk", "349.99").await?;

    // Detail includes the owner summary
    let resp = app.clone().call(get_request(&format!("/api/products/{}", product_id), &owner_token)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["name"], "Walnut Desk");
    assert_eq!(body["data"]["user"]["id"], owner_id.to_string());

    // A non-owner cannot update
    let resp = app
        .clone()
        .call(json_request(
            "PUT",
            &format!("/api/products/{}", product_id),
            Some(&stranger_token),
            json!({"name": "Hijacked"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = read_json(resp).await;
    assert_eq!(body["success"], false);

    // A non-owner cannot delete
    let resp = app
        .clone()
        .call(json_request(
            "DELETE",
            &format!("/api/products/{}", product_id),
            Some(&stranger_token),
            json!({}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The owner can update
    let resp = app
        .clone()
        .call(json_request(
            "PUT",
            &format!("/api/products/{}", product_id),
            Some(&owner_token),
            json!({"stock": 10}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["stock"], 10);

    // The owner can delete; the row is then gone
    let resp = app
        .clone()
        .call(json_request(
            "DELETE",
            &format!("/api/products/{}", product_id),
            Some(&owner_token),
            json!({}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().call(get_request(&format!("/api/products/{}", product_id), &owner_token)).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_product_list_price_filters() -> anyhow::Result<()> {
    let Some(app) = build_app().await else { return Ok(()) };

    let (owner_id, token) = signup(&app, "filter").await?;

    let cheap = create_product(&app, &token, "Cheap Mug", "5.00").await?;
    let mid = create_product(&app, &token, "Mid Kettle", "15.00").await?;
    let dear = create_product(&app, &token, "Dear Grinder", "95.00").await?;

    let uri = format!(
        "/api/products?user_id={}&min_price=5.00&max_price=15.00",
        owner_id
    );
    let resp = app.clone().call(get_request(&uri, &token)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&cheap.to_string().as_str()));
    assert!(ids.contains(&mid.to_string().as_str()));
    assert!(!ids.contains(&dear.to_string().as_str()));

    Ok(())
}

#[tokio::test]
async fn test_product_validation_errors() -> anyhow::Result<()> {
    let Some(app) = build_app().await else { return Ok(()) };

    let (_id, token) = signup(&app, "invalid").await?;

    // One-letter name and negative price both fail
    let resp = app
        .clone()
        .call(json_request(
            "POST",
            "/api/products",
            Some(&token),
            json!({"name": "x", "price": "-1.00", "stock": 0}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["success"], false);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price"));

    Ok(())
}

#[tokio::test]
async fn test_missing_product_is_404() -> anyhow::Result<()> {
    let Some(app) = build_app().await else { return Ok(()) };

    let (_id, token) = signup(&app, "missing").await?;
    let resp = app
        .clone()
        .call(get_request(&format!("/api/products/{}", Uuid::new_v4()), &token))
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "product not found");

    Ok(())
}
