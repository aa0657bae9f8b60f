mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_requires_bearer_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/posts"))
        .json(&json!({ "title": "Hello", "content": "World" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/posts"))
        .bearer_auth("garbage")
        .json(&json!({ "title": "Hello", "content": "World" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let user = server.register("alice", "alice@example.com").await?;

    let res = server
        .client
        .post(server.url("/posts"))
        .bearer_auth(user["refreshToken"].as_str().unwrap_or_default())
        .json(&json!({ "title": "Hello", "content": "World" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn created_post_has_populated_owner() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.access_token("alice").await?;
    let id = server.create_post(&token, "Hello").await?;

    let res = server.client.get(server.url(&format!("/posts/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["owner"]["username"], "alice");
    assert!(body["owner"].get("password").is_none());
    assert!(body["owner"].get("refreshTokens").is_none());
    Ok(())
}

#[tokio::test]
async fn create_requires_title_and_content() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.access_token("alice").await?;

    let res = server
        .client
        .post(server.url("/posts"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Only a title" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn posts_are_listed_newest_first() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.access_token("alice").await?;

    server.create_post(&token, "first").await?;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    server.create_post(&token, "second").await?;

    let posts = server.client.get(server.url("/posts")).send().await?.json::<Vec<Value>>().await?;
    let titles: Vec<&str> = posts.iter().filter_map(|p| p["title"].as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
    Ok(())
}

#[tokio::test]
async fn only_owner_can_update_or_delete() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = server.access_token("alice").await?;
    let other = server.access_token("mallory").await?;
    let id = server.create_post(&owner, "Hello").await?;
    let path = format!("/posts/{}", id);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&other)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.delete(server.url(&path)).bearer_auth(&other).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&owner)
        .json(&json!({ "title": "Edited" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["title"], "Edited");
    assert_eq!(body["content"], "Some content");

    let res = server.client.delete(server.url(&path)).bearer_auth(&owner).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "Post deleted successfully");

    let res = server.client.get(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_post_id_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.access_token("alice").await?;

    let res = server.client.get(server.url("/posts/12345")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(server.url("/posts/12345")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn post_of_deleted_owner_has_null_owner() -> Result<()> {
    let server = common::spawn_server().await?;
    let user = server.register("alice", "alice@example.com").await?;
    let token = user["accessToken"].as_str().unwrap_or_default();
    let id = server.create_post(token, "Orphan").await?;

    server
        .client
        .delete(server.url(&format!("/users/{}", user["_id"].as_str().unwrap_or_default())))
        .send()
        .await?;

    let body = server.client.get(server.url(&format!("/posts/{}", id))).send().await?.json::<Value>().await?;
    assert!(body["owner"].is_null());
    Ok(())
}
