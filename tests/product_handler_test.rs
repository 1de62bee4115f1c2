mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};

use common::TestApp;

fn amber_jar() -> Value {
    json!({
        "name": "Amber Jar",
        "description": "Warm amber in a glass jar",
        "price": 24.5,
        "category": "scented",
        "scent": "amber",
        "burnTime": "40 hours",
        "stockQuantity": 12,
        "images": "https://cdn.lume.test/amber.jpg"
    })
}

#[tokio::test]
async fn test_only_admins_create_products() {
    let app = TestApp::new();
    let (_, customer) = app.customer("june").await;

    let (status, body) = app.call("POST", "/api/products", None, Some(amber_jar())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token required!");

    let (status, body) = app.call("POST", "/api/products", Some(&customer), Some(amber_jar())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");
}

#[tokio::test]
async fn test_create_list_get_update_delete() {
    let app = TestApp::new();
    let (admin, token) = app.admin().await;

    let (status, body) = app.call("POST", "/api/products", Some(&token), Some(amber_jar())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product created successfully");
    let product = &body["product"];
    assert_eq!(product["size"], "medium");
    assert_eq!(product["inStock"], true);
    assert_eq!(product["images"], json!(["https://cdn.lume.test/amber.jpg"]));
    assert_eq!(product["createdBy"], admin.id.unwrap().to_hex());
    let id = product["_id"].as_str().unwrap().to_string();

    let (status, body) = app.call("GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["name"], "Amber Jar");
    assert_eq!(body["products"][0]["createdBy"], json!({ "_id": admin.id.unwrap().to_hex(), "username": "admin" }));

    let (status, body) = app.call("GET", &format!("/api/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["price"], 24.5);
    assert_eq!(body["product"]["createdBy"]["username"], "admin");
    assert!(body.get("message").is_none());

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/products/{}", id),
            Some(&token),
            Some(json!({ "price": 19.0, "inStock": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["price"], 19.0);
    assert_eq!(body["product"]["images"], json!(["https://cdn.lume.test/amber.jpg"]));

    let (_, body) = app.call("GET", "/api/products", None, None).await;
    assert_eq!(body["count"], 0);

    let (status, body) = app.call("DELETE", &format!("/api/products/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = app.call("GET", &format!("/api/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let app = TestApp::new();
    let (_, token) = app.admin().await;

    let (status, body) = app
        .call("POST", "/api/products", Some(&token), Some(json!({ "name": "Nameless" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name, description, price, category and burnTime are required");

    let mut negative = amber_jar();
    negative["price"] = json!(-1.0);
    let (status, _) = app.call("POST", "/api/products", Some(&token), Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown = amber_jar();
    unknown["category"] = json!("edible");
    let (status, body) = app.call("POST", "/api/products", Some(&token), Some(unknown)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid category: edible");

    let (status, _) = app.call("GET", "/api/products/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_multipart_create_stores_uploaded_image() {
    let app = TestApp::new();
    let (_, token) = app.admin().await;

    let boundary = "lumeboundary";
    let mut body = String::new();
    for (name, value) in [
        ("name", "Linen Pillar"),
        ("description", "Clean linen"),
        ("price", "18"),
        ("category", "unscented"),
        ("burnTime", "30 hours"),
        ("inStock", "true"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"pillar.PNG\"\r\nContent-Type: image/png\r\n\r\nfakepng\r\n--{boundary}--\r\n"
    ));

    let req = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["price"], 18.0);

    let image = body["product"]["images"][0].as_str().unwrap();
    assert!(image.starts_with("uploads/"));
    assert!(image.ends_with(".png"));
    let stored = app.uploads_dir.join(image.trim_start_matches("uploads/"));
    assert_eq!(std::fs::read(stored).unwrap(), b"fakepng");
}

#[tokio::test]
async fn test_multipart_rejects_non_image_file() {
    let app = TestApp::new();
    let (_, token) = app.admin().await;

    let boundary = "lumeboundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nBad\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nBad\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"price\"\r\n\r\n5\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\nscented\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"burnTime\"\r\n\r\n5 hours\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n\
         --{boundary}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed!");
}

#[tokio::test]
async fn test_created_by_falls_back_to_id_when_creator_is_gone() {
    let app = TestApp::new();
    let (admin, token) = app.admin().await;
    let (_, body) = app.call("POST", "/api/products", Some(&token), Some(amber_jar())).await;
    let id = body["product"]["_id"].as_str().unwrap().to_string();

    app.users.users.lock().unwrap().clear();
    let (status, body) = app.call("GET", &format!("/api/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["createdBy"], admin.id.unwrap().to_hex());
}
