use httpmock::Method::{DELETE, GET, POST};
use httpmock::MockServer;
use serde_json::json;
use social_feed_client::{FeedClient, FeedError, NewPost};
use url::Url;

fn client(server: &MockServer) -> FeedClient {
    let base = Url::parse(&server.url("/")).unwrap();
    FeedClient::new(base, "test-agent").unwrap()
}

#[tokio::test]
async fn lists_posts_in_either_schema() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/posts");
        then.status(200).json_body(json!([
            {
                "id": 2,
                "username": "Luis",
                "image": "https://img.example/2.jpg",
                "description": "New project",
                "comments": [{"username": "Elena", "text": "Congrats"}],
                "likes": 0
            },
            {
                "id": 1,
                "usuario": "Ana",
                "foto": "https://img.example/1.jpg",
                "descripcion": "Sunset",
                "comentarios": [],
                "megusta": 1
            }
        ]));
    });

    let posts = client(&server).list_posts().await.unwrap();
    mock.assert();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 2);
    assert_eq!(posts[0].comments[0].username, "Elena");
    assert_eq!(posts[1].username, "Ana");
    assert_eq!(posts[1].image_url, "https://img.example/1.jpg");
    assert_eq!(posts[1].like_count, 1);
}

#[tokio::test]
async fn non_success_status_is_a_network_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/posts");
        then.status(503).body("down");
    });

    let err = client(&server).list_posts().await.unwrap_err();
    assert!(err.is_network());
    assert!(matches!(err, FeedError::Status { status, .. } if status.as_u16() == 503));
}

#[tokio::test]
async fn undecodable_body_is_a_network_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/posts");
        then.status(200).body("<html>not json</html>");
    });

    let err = client(&server).list_posts().await.unwrap_err();
    assert!(matches!(err, FeedError::Transport { .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let base = Url::parse("http://127.0.0.1:9/").unwrap();
    let err = FeedClient::new(base, "test-agent")
        .unwrap()
        .list_posts()
        .await
        .unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn create_post_sends_wire_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/posts").json_body(json!({
            "username": "Sofia",
            "image": "https://img.example/9.jpg",
            "description": "New camera"
        }));
        then.status(201).json_body(json!({
            "id": 9,
            "username": "Sofia",
            "image": "https://img.example/9.jpg",
            "description": "New camera",
            "comments": [],
            "likes": 0
        }));
    });

    let draft = NewPost::new(" Sofia ", "https://img.example/9.jpg", "New camera");
    let post = client(&server).create_post(&draft).await.unwrap();
    mock.assert();
    assert_eq!(post.id, 9);
    assert_eq!(post.username, "Sofia");
}

#[tokio::test]
async fn create_post_with_blank_field_never_hits_the_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/posts");
        then.status(201).json_body(json!({}));
    });

    let draft = NewPost::new("Sofia", "", "New camera");
    let err = client(&server).create_post(&draft).await.unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, FeedError::Validation { field: "image" }));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn set_like_picks_method_from_direction() {
    let server = MockServer::start();
    let add = server.mock(|when, then| {
        when.method(POST).path("/posts/4/like");
        then.status(200).json_body(json!({"likes": 1}));
    });
    let remove = server.mock(|when, then| {
        when.method(DELETE).path("/posts/4/like");
        then.status(200).json_body(json!({"likes": 0}));
    });

    let client = client(&server);
    assert_eq!(client.set_like(4, true).await.unwrap(), 1);
    add.assert_hits(1);
    assert_eq!(remove.hits(), 0);

    assert_eq!(client.set_like(4, false).await.unwrap(), 0);
    remove.assert_hits(1);
    add.assert_hits(1);
}

#[tokio::test]
async fn base_path_prefix_is_kept() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/posts");
        then.status(200).json_body(json!([]));
    });

    let base = Url::parse(&server.url("/api")).unwrap();
    let posts = FeedClient::new(base, "test-agent")
        .unwrap()
        .list_posts()
        .await
        .unwrap();
    mock.assert();
    assert!(posts.is_empty());
}
