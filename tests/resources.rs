mod common;

use axum::http::{Method, StatusCode};
use common::{call, signup, signup_admin, test_app};
use serde_json::json;
use uuid::Uuid;

fn club_body() -> serde_json::Value {
    json!({
        "name": "Robotics Club",
        "description": "Build bots",
        "tag": "Technical",
        "icon": "Code",
        "members": ["Tony Stark"]
    })
}

#[tokio::test]
async fn club_writes_require_admin() {
    let (_, app) = test_app();
    let (token, _) = signup(&app, "Bob", "bob@example.com").await;

    let res = call(&app, Method::POST, "/api/clubs", None, Some(club_body())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = call(&app, Method::POST, "/api/clubs", Some(&token), Some(club_body())).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.msg(), "Access denied. Admin only.");
}

#[tokio::test]
async fn admin_manages_clubs() {
    let (state, app) = test_app();
    let (token, _) = signup_admin(&state, &app).await;

    let res = call(&app, Method::POST, "/api/clubs", Some(&token), Some(json!({"name": "No icon"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::POST, "/api/clubs", Some(&token), Some(club_body())).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.data()["id"].as_str().unwrap().to_string();

    // 公开读取
    let res = call(&app, Method::GET, &format!("/api/clubs/{}", id), None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["members"][0], "Tony Stark");

    let res = call(
        &app,
        Method::PUT,
        &format!("/api/clubs/{}", id),
        Some(&token),
        Some(json!({"member_count": "80+ members"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["member_count"], "80+ members");
    assert_eq!(res.data()["name"], "Robotics Club");

    let res = call(
        &app,
        Method::PUT,
        &format!("/api/clubs/{}", id),
        Some(&token),
        Some(json!({"name": " "})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::DELETE, &format!("/api/clubs/{}", id), Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Club deleted successfully");

    let res = call(&app, Method::GET, &format!("/api/clubs/{}", id), None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.msg(), "Club not found");

    let res = call(&app, Method::GET, "/api/clubs", None, None).await;
    assert!(res.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn events_are_open_crud() {
    let (_, app) = test_app();

    let res = call(&app, Method::POST, "/api/events", None, Some(json!({"location": "Hall"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.msg(), "Title is required");

    let res = call(
        &app,
        Method::POST,
        "/api/events",
        None,
        Some(json!({"title": "Alumni Meet", "date": "2026-12-01T10:00:00Z", "location": "Hall"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.data()["id"].as_str().unwrap().to_string();

    let res = call(
        &app,
        Method::PUT,
        &format!("/api/events/{}", id),
        None,
        Some(json!({"organizer": "Alumni Cell"})),
    )
    .await;
    assert_eq!(res.data()["organizer"], "Alumni Cell");
    assert_eq!(res.data()["title"], "Alumni Meet");

    let res = call(
        &app,
        Method::PUT,
        &format!("/api/events/{}", id),
        None,
        Some(json!({"location": null})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data()["location"].is_null());
    assert_eq!(res.data()["organizer"], "Alumni Cell");

    let res = call(&app, Method::DELETE, &format!("/api/events/{}", id), None, None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = call(&app, Method::DELETE, &format!("/api/events/{}", id), None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.msg(), "Event not found");
}

#[tokio::test]
async fn opportunities_record_poster_from_session() {
    let (_, app) = test_app();
    let (token, me) = signup(&app, "Grace", "grace@example.com").await;
    let body = json!({
        "title": "SDE Intern",
        "company": "Acme",
        "role": "Backend",
        "location": "Remote",
        "description": "Build APIs",
        "type": "Internship",
        "skills": ["rust", "sql"],
        "posted_by": Uuid::new_v4()
    });

    let res = call(&app, Method::POST, "/api/opportunities", None, Some(body.clone())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = call(&app, Method::POST, "/api/opportunities", Some(&token), Some(body)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["posted_by"], me.to_string());
    let id = res.data()["id"].as_str().unwrap().to_string();

    let res = call(&app, Method::GET, "/api/opportunities", None, None).await;
    let listed = &res.data()[0];
    assert_eq!(listed["type"], "Internship");
    assert_eq!(listed["posted_by_user"]["full_name"], "Grace");
    assert_eq!(listed["posted_by_user"]["batch"], 2020);

    // 修改和删除不需要会话，发布者不会被请求体改写
    let res = call(
        &app,
        Method::PUT,
        &format!("/api/opportunities/{}", id),
        None,
        Some(json!({"type": "Full-time", "posted_by": Uuid::new_v4()})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["type"], "Full-time");
    assert_eq!(res.data()["posted_by"], me.to_string());

    let res = call(
        &app,
        Method::DELETE,
        &format!("/api/opportunities/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(res.data()["message"], "Opportunity deleted");

    let res = call(&app, Method::GET, &format!("/api/opportunities/{}", id), None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.msg(), "Opportunity not found");
}
