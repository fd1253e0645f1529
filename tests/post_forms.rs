mod common;

use axum::http::StatusCode;
use common::{json, location, TestApp};
use yatube::store::Store;

#[tokio::test]
async fn anonymous_create_redirects_to_login() {
    let app = TestApp::new();

    let response = app.post_form("/create/", "text=Hello", None).await;

    assert_eq!(location(&response), "/auth/login/?next=/create/");
    assert_eq!(app.post_count().await, 0);

    let response = app.get("/create/", None).await;
    assert_eq!(location(&response), "/auth/login/?next=/create/");
}

#[tokio::test]
async fn create_form_lists_groups() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cookie = app.login(&leo).await;
    app.group("cats").await;
    app.group("dogs").await;

    let response = app.get("/create/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = json(response).await;

    assert_eq!(view["template"], "posts/create_post.html");
    assert_eq!(view["context"]["is_edit"], false);
    assert_eq!(view["context"]["groups"].as_array().unwrap().len(), 2);
    assert_eq!(view["context"]["form"]["text"], "");
}

#[tokio::test]
async fn valid_create_stores_post_and_redirects_to_profile() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cats = app.group("cats").await;
    let cookie = app.login(&leo).await;

    let response = app
        .post_form(
            "/create/",
            &format!("text=Fresh+post+text&group={}", cats.id),
            Some(&cookie),
        )
        .await;

    assert_eq!(location(&response), "/profile/leo/");
    assert_eq!(app.post_count().await, 1);

    let view = json(app.get("/", None).await).await;
    let post = &view["context"]["page_obj"]["object_list"][0];
    assert_eq!(post["text"], "Fresh post text");
    assert_eq!(post["author"]["username"], "leo");
    assert_eq!(post["group"]["slug"], "cats");
}

#[tokio::test]
async fn create_without_group() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cookie = app.login(&leo).await;

    let response = app
        .post_form("/create/", "text=No+group&group=", Some(&cookie))
        .await;

    assert_eq!(location(&response), "/profile/leo/");
    let post = app.store.get_post(1).await.unwrap().unwrap();
    assert_eq!(post.text, "No group");
    assert!(post.group.is_none());
}

#[tokio::test]
async fn blank_text_redisplays_form_with_errors() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cookie = app.login(&leo).await;

    let response = app
        .post_form("/create/", "text=+++&group=", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let view = json(response).await;
    assert_eq!(view["template"], "posts/create_post.html");
    assert_eq!(view["context"]["errors"]["text"][0], "This field is required.");
    assert_eq!(app.post_count().await, 0);
}

#[tokio::test]
async fn unknown_group_redisplays_form_with_errors() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cookie = app.login(&leo).await;

    let response = app
        .post_form("/create/", "text=Hello&group=42", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let view = json(response).await;
    assert!(view["context"]["errors"]["group"].is_array());
    assert_eq!(view["context"]["form"]["text"], "Hello");
    assert_eq!(app.post_count().await, 0);
}

#[tokio::test]
async fn author_edits_post() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cats = app.group("cats").await;
    let post = app.post(&leo, "Original text", Some(&cats)).await;
    let cookie = app.login(&leo).await;

    let uri = format!("/posts/{}/edit/", post.id);

    let view = json(app.get(&uri, Some(&cookie)).await).await;
    assert_eq!(view["context"]["is_edit"], true);
    assert_eq!(view["context"]["form"]["text"], "Original text");
    assert_eq!(view["context"]["form"]["group"], cats.id.to_string());

    let response = app
        .post_form(&uri, "text=Edited+text&group=", Some(&cookie))
        .await;

    assert_eq!(location(&response), format!("/posts/{}/", post.id));
    assert_eq!(app.post_count().await, 1);

    let edited = app.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(edited.text, "Edited text");
    assert!(edited.group.is_none());
    assert_eq!(edited.author.id, leo.id);
}

#[tokio::test]
async fn invalid_edit_keeps_post() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let post = app.post(&leo, "Original text", None).await;
    let cookie = app.login(&leo).await;

    let response = app
        .post_form(&format!("/posts/{}/edit/", post.id), "text=", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let view = json(response).await;
    assert_eq!(view["context"]["is_edit"], true);
    assert!(view["context"]["errors"]["text"].is_array());

    let stored = app.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original text");
}

#[tokio::test]
async fn other_user_cannot_edit() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let mallory = app.user("mallory").await;
    let post = app.post(&leo, "Original text", None).await;
    let cookie = app.login(&mallory).await;

    let uri = format!("/posts/{}/edit/", post.id);
    let detail = format!("/posts/{}/", post.id);

    let response = app.get(&uri, Some(&cookie)).await;
    assert_eq!(location(&response), detail);

    let response = app
        .post_form(&uri, "text=Hijacked", Some(&cookie))
        .await;
    assert_eq!(location(&response), detail);

    let stored = app.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original text");
}

#[tokio::test]
async fn anonymous_edit_redirects_to_login() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let post = app.post(&leo, "Original text", None).await;

    let uri = format!("/posts/{}/edit/", post.id);
    let response = app.post_form(&uri, "text=Anonymous", None).await;

    assert_eq!(
        location(&response),
        format!("/auth/login/?next=/posts/{}/edit/", post.id)
    );
}

#[tokio::test]
async fn editing_missing_post_is_not_found() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let cookie = app.login(&leo).await;

    let response = app.get("/posts/77/edit/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_appear_on_the_post() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let reader = app.user("reader").await;
    let post = app.post(&leo, "Post", None).await;
    let cookie = app.login(&reader).await;

    let uri = format!("/posts/{}/comment/", post.id);
    let detail = format!("/posts/{}/", post.id);

    let response = app.post_form(&uri, "text=Nice+one", Some(&cookie)).await;
    assert_eq!(location(&response), detail);

    let response = app.post_form(&uri, "text=+", Some(&cookie)).await;
    assert_eq!(location(&response), detail);

    let view = json(app.get(&detail, None).await).await;
    let comments = view["context"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Nice one");
    assert_eq!(comments[0]["author"]["username"], "reader");
}

#[tokio::test]
async fn comments_are_shown_oldest_first() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let reader = app.user("reader").await;
    let post = app.post(&leo, "Post", None).await;

    let uri = format!("/posts/{}/comment/", post.id);
    let leo_cookie = app.login(&leo).await;
    let reader_cookie = app.login(&reader).await;

    app.post_form(&uri, "text=First", Some(&reader_cookie)).await;
    app.post_form(&uri, "text=Second", Some(&leo_cookie)).await;
    app.post_form(&uri, "text=Third", Some(&reader_cookie)).await;

    let view = json(app.get(&format!("/posts/{}/", post.id), None).await).await;
    let texts: Vec<&str> = view["context"]["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|comment| comment["text"].as_str().unwrap())
        .collect();

    assert_eq!(texts, ["First", "Second", "Third"]);
    assert_eq!(view["context"]["comments"][1]["author"]["username"], "leo");
}

#[tokio::test]
async fn malformed_post_ids_are_not_found() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let post = app.post(&leo, "Post", None).await;
    let cookie = app.login(&leo).await;

    for id in ["abc", "-1", "1.5", "99999999999999999999"] {
        let response = app.get(&format!("/posts/{id}/"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{id}");

        let response = app.get(&format!("/posts/{id}/edit/"), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{id}");

        let response = app
            .post_form(&format!("/posts/{id}/edit/"), "text=Changed", Some(&cookie))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{id}");

        let response = app
            .post_form(&format!("/posts/{id}/comment/"), "text=Hi", Some(&cookie))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{id}");
    }

    let response = app.get("/posts/abc/edit/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.store.get_post(post.id).await.unwrap().unwrap().text, "Post");
    assert!(app.store.list_comments(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn commenting_needs_login_and_a_post() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let post = app.post(&leo, "Post", None).await;

    let uri = format!("/posts/{}/comment/", post.id);
    let response = app.post_form(&uri, "text=Hi", None).await;
    assert_eq!(
        location(&response),
        format!("/auth/login/?next=/posts/{}/comment/", post.id)
    );

    let cookie = app.login(&leo).await;
    let response = app
        .post_form("/posts/999/comment/", "text=Hi", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.store.list_comments(post.id).await.unwrap().is_empty());
}
