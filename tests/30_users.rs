mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn get_users_lists_registered_users() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    server.register("Username123", "username123@example.com", "First User").await?;
    let token = server.register_and_login("user1").await?;

    let res = server.get_with_token("/users/", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let users: Vec<Value> = res.json().await?;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "Username123");
    assert_eq!(users[1]["username"], "user1");
    assert!(users.iter().all(|u| u.get("hashed_password").is_none()));
    Ok(())
}

#[tokio::test]
async fn get_users_honours_skip_and_limit() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for name in ["alpha", "bravo", "charlie"] {
        server.register(name, &format!("{name}@example.com"), name).await?;
    }
    let token = server.register_and_login("delta").await?;

    let res = server.get_with_token("/users/?skip=1&limit=2", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let users: Vec<Value> = res.json().await?;
    let names: Vec<&str> = users.iter().filter_map(|u| u["username"].as_str()).collect();
    assert_eq!(names, ["bravo", "charlie"]);

    let res = server.get_with_token("/users/?skip=-1", &token).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn get_users_requires_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/users/")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Not authenticated");
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_not_authenticated() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .get(server.url("/users/"))
        .basic_auth("someone", Some("secret"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");

    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Not authenticated");
    Ok(())
}

#[tokio::test]
async fn get_current_user() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    server
        .register("currentuser", "currentuser@example.com", "Current User")
        .await?;
    let res = server.login("currentuser", common::PASSWORD).await?;
    let body: Value = res.json().await?;
    let token = body["access_token"].as_str().expect("access_token");

    let res = server.get_with_token("/users/me", token).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["username"], "currentuser");
    assert_eq!(body["email"], "currentuser@example.com");
    assert_eq!(body["full_name"], "Current User");
    Ok(())
}

#[tokio::test]
async fn get_user_by_id() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.register_and_login("viewer").await?;

    let me: Value = server.get_with_token("/users/me", &token).await?.json().await?;
    let id = me["id"].as_i64().expect("id");

    let res = server.get_with_token(&format!("/users/{id}"), &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["username"], "viewer");

    let res = server.get_with_token("/users/9999", &token).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "User not found");

    let res = server.get_with_token("/users/not-a-number", &token).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn delete_user() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let token = server.register_and_login("deleteuser").await?;

    let res = server.get_with_token("/users/", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let users: Vec<Value> = res.json().await?;
    let user_id = users
        .iter()
        .find(|u| u["username"] == "deleteuser")
        .and_then(|u| u["id"].as_i64())
        .expect("User 'deleteuser' not found");

    let res = server
        .client
        .delete(server.url(&format!("/users/{user_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["username"], "deleteuser");

    // The deleted user's token no longer resolves
    let res = server.get_with_token("/users/", &token).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Could not validate credentials");
    Ok(())
}

#[tokio::test]
async fn deleted_user_disappears_from_listing() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let admin = server.register_and_login("admin").await?;
    let victim: Value = server
        .register("victim", "victim@example.com", "Victim")
        .await?
        .json()
        .await?;
    let victim_id = victim["id"].as_i64().expect("id");

    let res = server
        .client
        .delete(server.url(&format!("/users/{victim_id}")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let users: Vec<Value> = server.get_with_token("/users/", &admin).await?.json().await?;
    assert!(users.iter().all(|u| u["username"] != "victim"));

    let res = server
        .client
        .delete(server.url(&format!("/users/{victim_id}")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn reregistered_username_does_not_revive_old_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let old_token = server.register_and_login("phoenix").await?;
    let me: Value = server.get_with_token("/users/me", &old_token).await?.json().await?;
    let id = me["id"].as_i64().expect("id");

    server
        .client
        .delete(server.url(&format!("/users/{id}")))
        .bearer_auth(&old_token)
        .send()
        .await?;
    server.register("phoenix", "phoenix@example.com", "Phoenix Again").await?;

    let res = server.get_with_token("/users/me", &old_token).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
