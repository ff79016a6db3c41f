mod common;

use axum::http::{Method, StatusCode, header};
use common::{call, signup, test_app};
use serde_json::json;

#[tokio::test]
async fn signup_sets_cookie_and_normalises_fields() {
    let (_, app) = test_app();
    let res = call(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "full_name": "  ada lovelace ",
            "email": " Ada@Example.COM ",
            "password": "secret1"
        })),
    )
    .await;

    assert_eq!(res.status, StatusCode::CREATED);
    let user = &res.data()["user"];
    assert_eq!(user["full_name"], "Ada lovelace");
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["role"], "student");
    assert!(user.get("password_hash").is_none());

    let cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn signup_accepts_camel_case_fields() {
    let (_, app) = test_app();
    let res = call(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "fullName": "Alice",
            "email": "alice@x.com",
            "password": "secret1",
            "curRole": "Engineer"
        })),
    )
    .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["user"]["full_name"], "Alice");
    assert_eq!(res.data()["user"]["cur_role"], "Engineer");
    let token = res.data()["token"].as_str().unwrap().to_string();

    let res = call(
        &app,
        Method::PUT,
        "/api/auth/update-profile",
        Some(&token),
        Some(json!({"fullName": "Alice Smith", "profilePic": "https://img.example.com/a.png"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["full_name"], "Alice Smith");
    assert_eq!(res.data()["profile_pic"], "https://img.example.com/a.png");
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let (_, app) = test_app();
    signup(&app, "Ada", "Ada@Example.com").await;

    let res = call(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({"full_name": "Other", "email": "ada@example.com ", "password": "secret1"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], 1001);
    assert_eq!(res.msg(), "User already exists");
}

#[tokio::test]
async fn signup_validates_input() {
    let (_, app) = test_app();

    let cases = [
        (json!({"email": "a@b.c", "password": "secret1"}), "Name, email and password are required"),
        (json!({"full_name": "A", "email": "a@b.c", "password": "123"}), "Password must be at least 6 characters"),
        (json!({"full_name": "A", "email": "a@b.c", "password": "secret1", "role": "admin"}), "Role must be student or alumni"),
    ];
    for (body, msg) in cases {
        let res = call(&app, Method::POST, "/api/auth/signup", None, Some(body)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.msg(), msg);
    }
}

#[tokio::test]
async fn login_and_check_with_bearer_token() {
    let (_, app) = test_app();
    let (_, id) = signup(&app, "Ada", "ada@example.com").await;

    let res = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "ADA@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.data()["token"].as_str().unwrap().to_string();
    assert!(res.data()["user"]["last_login"].is_null());

    let res = call(&app, Method::GET, "/api/auth/check", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["id"], id.to_string());
    assert!(!res.data()["last_login"].is_null());
}

#[tokio::test]
async fn wrong_password_and_missing_fields() {
    let (_, app) = test_app();
    signup(&app, "Ada", "ada@example.com").await;

    let res = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "wrong-one"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.msg(), "Invalid credentials");

    let res = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "ada@example.com"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.msg(), "All fields are required");
}

#[tokio::test]
async fn protected_routes_require_a_valid_session() {
    let (_, app) = test_app();

    let res = call(&app, Method::GET, "/api/auth/check", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = call(&app, Method::GET, "/api/users", Some("not-a-jwt"), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let (_, app) = test_app();
    let res = call(&app, Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn profile_update_is_partial() {
    let (_, app) = test_app();
    let (token, _) = signup(&app, "Ada", "ada@example.com").await;

    let res = call(
        &app,
        Method::PUT,
        "/api/auth/update-profile",
        Some(&token),
        Some(json!({"company": "Analytical Engines", "profile_pic": "https://img.example.com/ada.png"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["company"], "Analytical Engines");
    assert_eq!(res.data()["batch"], 2020);
    assert_eq!(res.data()["full_name"], "Ada");

    let res = call(
        &app,
        Method::PUT,
        "/api/auth/update-profile",
        Some(&token),
        Some(json!({"profile_pic": "data:image/png;base64,AAAA"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_directory_excludes_caller() {
    let (_, app) = test_app();
    let (token, me) = signup(&app, "Ada", "ada@example.com").await;
    let (_, bob) = signup(&app, "Bob", "bob@example.com").await;

    let res = call(&app, Method::GET, "/api/users", Some(&token), None).await;
    let users = res.data().as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], bob.to_string());
    assert!(users[0].get("password_hash").is_none());

    let res = call(&app, Method::GET, &format!("/api/users/{}", me), Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = call(
        &app,
        Method::GET,
        &format!("/api/users/{}", uuid::Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.msg(), "User not found");
}
