//! Create, rename, list and archive flows for a single owner.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use openwaitlist_integration_tests::{Credentials, TestApp};

fn has_random_suffix(slug: &str, base: &str) -> bool {
    slug.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|suffix| {
            suffix.len() == 6
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[tokio::test]
async fn test_end_to_end_lifecycle() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;

    // Create
    let created = app
        .request(
            Method::POST,
            "/waitlists",
            Some(json!({ "name": "Beta Launch", "is_public": true })),
            &alice,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let slug = created.body["slug"].as_str().unwrap().to_owned();
    assert!(has_random_suffix(&slug, "beta-launch"), "{slug}");
    assert_eq!(created.body["name"], "Beta Launch");
    assert_eq!(created.body["is_public"], true);
    assert_eq!(created.body["show_vendor_branding"], false);
    assert!(created.body.get("archived_at").is_none());

    let list = app.request(Method::GET, "/waitlists", None, &alice).await;
    assert_eq!(list.body["total"], 1);
    assert_eq!(list.body["waitlists"][0]["slug"], slug.as_str());

    // Read
    let shown = app
        .request(Method::GET, &format!("/waitlists/{slug}"), None, &alice)
        .await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["id"], created.body["id"]);

    // Rename regenerates the slug
    let renamed = app
        .request(
            Method::PUT,
            &format!("/waitlists/{slug}"),
            Some(json!({ "name": "Beta Launch v2" })),
            &alice,
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    let new_slug = renamed.body["slug"].as_str().unwrap().to_owned();
    assert!(has_random_suffix(&new_slug, "beta-launch-v2"), "{new_slug}");
    assert_eq!(renamed.body["id"], created.body["id"]);
    assert_eq!(renamed.body["is_public"], false);

    let new = app
        .request(Method::GET, &format!("/waitlists/{new_slug}"), None, &alice)
        .await;
    assert_eq!(new.status, StatusCode::OK);
    let old = app
        .request(Method::GET, &format!("/waitlists/{slug}"), None, &alice)
        .await;
    assert_eq!(old.status, StatusCode::NOT_FOUND);
    assert_eq!(old.body["message"], "Waitlist not found");

    // Archive
    let deleted = app
        .request(Method::DELETE, &format!("/waitlists/{new_slug}"), None, &alice)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    for gone in [&slug, &new_slug] {
        let uri = format!("/waitlists/{gone}");
        let get = app.request(Method::GET, &uri, None, &alice).await;
        let put = app
            .request(Method::PUT, &uri, Some(json!({ "name": "Again" })), &alice)
            .await;
        assert_eq!(get.status, StatusCode::NOT_FOUND);
        assert_eq!(put.status, StatusCode::NOT_FOUND);
    }

    let list = app.request(Method::GET, "/waitlists", None, &alice).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["total"], 0);

    // Archived rows are retained
    let rows = app.store.all_waitlists();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].state.archived_at().is_some());
}

#[tokio::test]
async fn test_delete_archived_waitlist_is_not_found() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;
    let slug = app.create_waitlist(&alice, "Beta").await;

    let first = app
        .request(Method::DELETE, &format!("/waitlists/{slug}"), None, &alice)
        .await;
    let second = app
        .request(Method::DELETE, &format!("/waitlists/{slug}"), None, &alice)
        .await;

    assert_eq!(first.status, StatusCode::NO_CONTENT);
    assert_eq!(second.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_name() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;

    for body in [json!({}), json!({ "name": "   " })] {
        let response = app
            .request(Method::POST, "/waitlists", Some(body), &alice)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["message"], "Name is required");
    }
    assert!(app.store.all_waitlists().is_empty());
}

#[tokio::test]
async fn test_update_requires_name() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;
    let slug = app.create_waitlist(&alice, "Beta").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/waitlists/{slug}"),
            Some(json!({ "name": "" })),
            &alice,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let unchanged = app
        .request(Method::GET, &format!("/waitlists/{slug}"), None, &alice)
        .await;
    assert_eq!(unchanged.body["name"], "Beta");
}

#[tokio::test]
async fn test_unsluggable_name_keeps_suffix_only() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;

    let slug = app.create_waitlist(&alice, "!!!").await;

    assert!(has_random_suffix(&slug, ""), "{slug}");
}

#[tokio::test]
async fn test_same_name_gets_distinct_slugs() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;

    let first = app.create_waitlist(&alice, "Launch").await;
    let second = app.create_waitlist(&alice, "Launch").await;

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_list_search_and_order() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;
    app.create_waitlist(&alice, "Alpha Program").await;
    app.create_waitlist(&alice, "Beta Program").await;
    app.create_waitlist(&alice, "Newsletter").await;

    let all = app.request(Method::GET, "/waitlists", None, &alice).await;
    assert_eq!(all.body["total"], 3);
    let names: Vec<&str> = all.body["waitlists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Newsletter", "Beta Program", "Alpha Program"]);

    let found = app
        .request(Method::GET, "/waitlists?search=program", None, &alice)
        .await;
    assert_eq!(found.body["total"], 2);

    let literal = app
        .request(Method::GET, "/waitlists?search=%25", None, &alice)
        .await;
    assert_eq!(literal.status, StatusCode::OK);
    assert_eq!(literal.body["total"], 0);
}

#[tokio::test]
async fn test_session_cookie_can_manage_waitlists() {
    let app = TestApp::new();
    let alice = app.session_user("alice@example.com").await;

    let slug = app.create_waitlist(&alice, "Cookie Launch").await;
    let shown = app
        .request(Method::GET, &format!("/waitlists/{slug}"), None, &alice)
        .await;

    assert_eq!(shown.status, StatusCode::OK);
}

#[tokio::test]
async fn test_waitlists_require_auth() {
    let app = TestApp::new();

    let list = app
        .request(Method::GET, "/waitlists", None, &Credentials::Anonymous)
        .await;
    let create = app
        .request(
            Method::POST,
            "/waitlists",
            Some(json!({ "name": "Beta" })),
            &Credentials::Anonymous,
        )
        .await;

    assert_eq!(list.status, StatusCode::UNAUTHORIZED);
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
    assert!(app.store.all_waitlists().is_empty());
}
