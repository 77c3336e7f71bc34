//! The staff permission gate, exercised end to end over HTTP.
//!
//! Every test seeds fresh users, drives `/users/<username>/permission/` as a
//! browser would, and checks both the response and the stored flag.

use crate::common::TestApp;

const HOME: &str = "/";
const USER_LIST: &str = "/users/";

fn permission_url(username: &str) -> String {
    format!("/users/{username}/permission/")
}

#[tokio::test]
async fn non_staff_get_is_sent_home() {
    let app = TestApp::start().await;
    app.seed("carol", false, false).await;
    app.seed("bob", false, false).await;

    let reply = app.get(&permission_url("bob"), Some("carol")).await;
    assert_eq!(reply.status, 302);
    assert_eq!(reply.location(), Some(HOME));

    let home = app.follow(&reply, Some("carol")).await;
    assert_eq!(home.status, 200);
    assert_eq!(home.template(), Some("pages/home"));

    app.shutdown().await;
}

#[tokio::test]
async fn non_staff_post_is_sent_home_and_changes_nothing() {
    let app = TestApp::start().await;
    app.seed("carol", false, false).await;
    app.seed("bob", false, false).await;

    let reply = app
        .post_form(&permission_url("bob"), Some("carol"), &[("staff_member", "on")])
        .await;
    assert_eq!(reply.status, 302);
    assert_eq!(reply.location(), Some(HOME));
    assert_eq!(app.follow(&reply, Some("carol")).await.status, 200);
    assert!(!app.user("bob").await.staff_member);

    app.shutdown().await;
}

#[tokio::test]
async fn staff_get_renders_form() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("bob", false, false).await;

    let reply = app.get(&permission_url("bob"), Some("alice")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.template(), Some("users/user_change_permission"));
    assert!(reply.body.contains("bob"));
    assert!(reply.body.contains("name=\"staff_member\""));
    assert!(!reply.body.contains("checked"), "bob is not staff yet");

    app.shutdown().await;
}

#[tokio::test]
async fn form_shows_current_flag() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("dave", true, false).await;

    let reply = app.get(&permission_url("dave"), Some("alice")).await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("checked"));

    app.shutdown().await;
}

#[tokio::test]
async fn staff_post_grants_flag() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("bob", false, false).await;

    let reply = app
        .post_form(&permission_url("bob"), Some("alice"), &[("staff_member", "on")])
        .await;
    assert_eq!(reply.status, 302);
    assert_eq!(reply.location(), Some(USER_LIST));
    assert!(app.user("bob").await.staff_member);

    let list = app.follow(&reply, Some("alice")).await;
    assert_eq!(list.status, 200);
    assert_eq!(list.template(), Some("users/user_list"));

    app.shutdown().await;
}

#[tokio::test]
async fn staff_post_without_field_revokes_flag() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("dave", true, false).await;

    let reply = app.post_form(&permission_url("dave"), Some("alice"), &[]).await;
    assert_eq!(reply.status, 302);
    assert_eq!(reply.location(), Some(USER_LIST));
    assert!(!app.user("dave").await.staff_member);

    app.shutdown().await;
}

#[tokio::test]
async fn explicit_false_revokes_flag() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("dave", true, false).await;

    let reply = app
        .post_form(&permission_url("dave"), Some("alice"), &[("staff_member", "False")])
        .await;
    assert_eq!(reply.status, 302);
    assert!(!app.user("dave").await.staff_member);

    app.shutdown().await;
}

#[tokio::test]
async fn superuser_target_is_out_of_reach() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("root", false, true).await;

    let get = app.get(&permission_url("root"), Some("alice")).await;
    assert_eq!(get.status, 302);
    assert_eq!(get.location(), Some(HOME));

    let post = app
        .post_form(&permission_url("root"), Some("alice"), &[("staff_member", "on")])
        .await;
    assert_eq!(post.status, 302);
    assert_eq!(post.location(), Some(HOME));
    assert_eq!(app.follow(&post, Some("alice")).await.status, 200);
    assert!(!app.user("root").await.staff_member);

    app.shutdown().await;
}

/// Superusers cannot reach each other either, even with the staff flag.
#[tokio::test]
async fn staff_superuser_cannot_change_another_superuser() {
    let app = TestApp::start().await;
    app.seed("admin", true, true).await;
    app.seed("root", true, true).await;

    let reply = app.post_form(&permission_url("root"), Some("admin"), &[]).await;
    assert_eq!(reply.location(), Some(HOME));
    assert!(app.user("root").await.staff_member);

    app.shutdown().await;
}

/// Being a superuser does not stand in for the staff flag.
#[tokio::test]
async fn superuser_without_staff_flag_is_sent_home() {
    let app = TestApp::start().await;
    app.seed("root", false, true).await;
    app.seed("bob", false, false).await;

    let reply = app
        .post_form(&permission_url("bob"), Some("root"), &[("staff_member", "on")])
        .await;
    assert_eq!(reply.location(), Some(HOME));
    assert!(!app.user("bob").await.staff_member);

    app.shutdown().await;
}

#[tokio::test]
async fn staff_can_revoke_own_flag() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;

    let reply = app.post_form(&permission_url("alice"), Some("alice"), &[]).await;
    assert_eq!(reply.location(), Some(USER_LIST));
    assert!(!app.user("alice").await.staff_member);

    // The flag is read fresh, so the next attempt is already denied.
    let again = app
        .post_form(&permission_url("alice"), Some("alice"), &[("staff_member", "on")])
        .await;
    assert_eq!(again.location(), Some(HOME));
    assert!(!app.user("alice").await.staff_member);

    app.shutdown().await;
}

#[tokio::test]
async fn unknown_target_is_404_for_staff_only() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("carol", false, false).await;

    let staff = app.get(&permission_url("nobody"), Some("alice")).await;
    assert_eq!(staff.status, 404);

    let non_staff = app.get(&permission_url("nobody"), Some("carol")).await;
    assert_eq!(non_staff.status, 302);
    assert_eq!(non_staff.location(), Some(HOME));

    app.shutdown().await;
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let app = TestApp::start().await;
    app.seed("bob", false, false).await;

    assert_eq!(app.get(&permission_url("bob"), None).await.status, 401);
    let post = app
        .post_form(&permission_url("bob"), None, &[("staff_member", "on")])
        .await;
    assert_eq!(post.status, 401);
    assert!(!app.user("bob").await.staff_member);

    app.shutdown().await;
}

/// A valid token for a username with no row identifies nobody.
#[tokio::test]
async fn token_for_missing_user_is_rejected() {
    let app = TestApp::start().await;
    app.seed("bob", false, false).await;

    let reply = app
        .post_form(&permission_url("bob"), Some("ghost"), &[("staff_member", "on")])
        .await;
    assert_eq!(reply.status, 401);
    assert!(!app.user("bob").await.staff_member);

    app.shutdown().await;
}

#[tokio::test]
async fn session_cookie_identifies_actor() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("bob", false, false).await;

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nCookie: theme=dark; {}={}\r\nConnection: close\r\n\r\n",
        permission_url("bob"),
        app.config.auth.cookie_name,
        app.token("alice"),
    );
    let reply = crate::common::parse(&crate::common::raw_request(app.addr(), request.as_bytes()).await);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.template(), Some("users/user_change_permission"));

    app.shutdown().await;
}

/// Usernames outside ASCII travel percent-encoded and still reach the form.
#[tokio::test]
async fn encoded_username_reaches_target() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("émile", false, false).await;

    let path = "/users/%C3%A9mile/permission/";
    let get = app.get(path, Some("alice")).await;
    assert_eq!(get.status, 200);
    assert_eq!(get.template(), Some("users/user_change_permission"));
    assert!(get.body.contains(&format!("action=\"{path}\"")));

    let post = app.post_form(path, Some("alice"), &[("staff_member", "on")]).await;
    assert_eq!(post.status, 302);
    assert_eq!(post.location(), Some(USER_LIST));
    assert!(app.user("émile").await.staff_member);

    let list = app.follow(&post, Some("alice")).await;
    assert!(list.body.contains(&format!("href=\"{path}\"")));

    let detail = app.get("/users/%C3%A9mile/", Some("alice")).await;
    assert_eq!(detail.status, 200);

    app.shutdown().await;
}

#[tokio::test]
async fn escaped_plus_reaches_target() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;
    app.seed("a+b", false, false).await;

    let reply = app.get("/users/a%2Bb/permission/", Some("alice")).await;
    assert_eq!(reply.status, 200);

    app.shutdown().await;
}

#[tokio::test]
async fn undecodable_username_is_bad_request() {
    let app = TestApp::start().await;
    app.seed("alice", true, false).await;

    let reply = app.get("/users/%FF%FE/permission/", Some("alice")).await;
    assert_eq!(reply.status, 400);

    app.shutdown().await;
}
