mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{create_post, register, send, test_app};

#[tokio::test]
async fn upsert_then_me_returns_split_skills() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "go,rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "dev");
    assert_eq!(body["skills"], json!(["go", "rust"]));
    Ok(())
}

#[tokio::test]
async fn skills_are_trimmed_but_not_deduplicated() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": " rust , go , rust " })),
    )
    .await;
    assert_eq!(body["skills"], json!(["rust", "go", "rust"]));
    Ok(())
}

#[tokio::test]
async fn repeated_identical_upsert_is_idempotent() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let payload = json!({ "status": "dev", "skills": "rust", "company": "Acme" });
    let (_, first) = send(&app, "POST", "/api/profile", Some(&token), Some(payload.clone())).await;
    let (_, second) = send(&app, "POST", "/api/profile", Some(&token), Some(payload)).await;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_omitted_fields() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust", "company": "Acme", "twitter": "https://twitter.com/ada" })),
    )
    .await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "lead", "skills": "rust,go" })),
    )
    .await;

    assert_eq!(body["status"], "lead");
    assert_eq!(body["company"], "Acme");
    assert_eq!(body["social"]["twitter"], "https://twitter.com/ada");
    Ok(())
}

#[tokio::test]
async fn upsert_requires_status_and_skills() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(&app, "POST", "/api/profile", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msgs: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["msg"].as_str().unwrap())
        .collect();
    assert_eq!(msgs, vec!["status is required", "skills is required"]);
    Ok(())
}

#[tokio::test]
async fn me_without_profile_is_not_found() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(&app, "GET", "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "profile not found");
    Ok(())
}

#[tokio::test]
async fn profiles_are_publicly_listable_and_fetchable() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;

    // no token on either read
    let (status, body) = send(&app, "GET", "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let profiles = body.as_array().unwrap();
    assert_eq!(profiles.len(), 1);

    let user_id = profiles[0]["user"]["id"].as_str().unwrap().to_string();
    let (status, body) = send(&app, "GET", &format!("/api/profile/user/{}", user_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "dev");
    Ok(())
}

#[tokio::test]
async fn profile_reads_attach_owner_name_and_avatar() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/profile/me", Some(&token), None).await;
    assert_eq!(body["user"]["name"], "Ada");
    assert!(body["user"]["avatar"]
        .as_str()
        .unwrap()
        .starts_with("https://www.gravatar.com/avatar/"));

    let (_, body) = send(&app, "GET", "/api/profile", None, None).await;
    assert_eq!(body[0]["user"]["name"], "Ada");
    Ok(())
}

#[tokio::test]
async fn profile_by_malformed_user_id_is_not_found() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/profile/user/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "profile not found");
    Ok(())
}

#[tokio::test]
async fn experience_entries_prepend_and_remove_by_id() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;

    for (title, from) in [("first", "2018-01-01"), ("second", "2019-01-01"), ("third", "2020-01-01")] {
        let (status, _) = send(
            &app,
            "PUT",
            "/api/profile/experience",
            Some(&token),
            Some(json!({ "title": title, "company": "Acme", "from": from })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, "GET", "/api/profile/me", Some(&token), None).await;
    let entries = body["experience"].as_array().unwrap();
    assert_eq!(entries[0]["title"], "third");
    let middle_id = entries[1]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/profile/experience?exp_id={}", middle_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "first"]);
    Ok(())
}

#[tokio::test]
async fn removing_an_absent_experience_id_is_a_noop() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;
    send(
        &app,
        "PUT",
        "/api/profile/experience",
        Some(&token),
        Some(json!({ "title": "dev", "company": "Acme", "from": "2020-01-01" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/profile/experience?exp_id={}", uuid::Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn malformed_experience_id_query_is_a_validation_error() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "DELETE",
        "/api/profile/experience?exp_id=not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["msg"], "invalid query string");
    Ok(())
}

#[tokio::test]
async fn experience_requires_title_company_and_from() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/profile/experience",
        Some(&token),
        Some(json!({ "location": "Remote" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msgs: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["msg"].as_str().unwrap())
        .collect();
    assert_eq!(msgs, vec!["title is required", "company is required", "from date is required"]);
    Ok(())
}

#[tokio::test]
async fn education_entries_work_like_experience() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/profile/education",
        Some(&token),
        Some(json!({
            "school": "MIT",
            "degree": "BSc",
            "fieldofstudy": "CS",
            "from": "2015-09-01",
            "to": "2019-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entry_id = body["education"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/profile/education?edu_id={}", entry_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_an_account_removes_profile_user_and_posts() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    let other = register(&app, "Bob", "bob@example.com").await;
    send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;
    create_post(&app, &token, "goodbye world").await;

    let (status, body) = send(&app, "DELETE", "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "user removed");

    // user record is gone
    let (status, _) = send(&app, "GET", "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // profile is gone from the public list
    let (_, body) = send(&app, "GET", "/api/profile", None, None).await;
    assert!(body.as_array().unwrap().is_empty());

    // posts are cascaded
    let (_, body) = send(&app, "GET", "/api/posts", Some(&other), None).await;
    assert!(body.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn upserting_with_a_stale_token_after_deletion_is_not_found() -> Result<()> {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    send(&app, "DELETE", "/api/profile", Some(&token), None).await;

    // the token still verifies, but the account is gone
    let (status, body) = send(
        &app,
        "POST",
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "dev", "skills": "rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "user not found");

    let (_, body) = send(&app, "GET", "/api/profile", None, None).await;
    assert!(body.as_array().unwrap().is_empty());
    Ok(())
}
