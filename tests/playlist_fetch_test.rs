use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

use plartists::Error;
use plartists::spotify::MAX_ATTEMPTS;
use plartists::spotify::playlist::{
    artist_count_for_playlist_at, fetch_playlist_at, get_user_playlists_at,
};

// Binds a local listener, builds the mock API for its base URL and serves it.
async fn serve(build: impl FnOnce(String) -> Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = build(base.clone());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    base
}

fn item(id: &str, name: &str, artists: &[&str]) -> Value {
    json!({
        "track": {
            "id": id,
            "name": name,
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
            "album": { "name": "Album" },
            "popularity": 50,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") }
        }
    })
}

fn paged_playlist(base: String) -> Router {
    let first = json!({
        "id": "p1",
        "name": "Mixed",
        "description": "",
        "owner": { "display_name": "Tester" },
        "images": [],
        "external_urls": { "spotify": "https://open.spotify.com/playlist/p1" },
        "tracks": {
            "total": 5,
            "items": [
                item("t1", "One", &["A"]),
                { "track": null },
                item("t2", "Two", &["B", "A"]),
            ],
            "next": format!("{base}/playlists/p1/tracks?offset=3&limit=3")
        }
    });
    let second = json!({
        "items": [
            item("t3", "Three", &["C"]),
            { "track": { "id": "t4", "name": "Four", "artists": [] } },
        ],
        "next": null
    });

    Router::new()
        .route(
            "/playlists/p1",
            get(move |headers: HeaderMap| {
                let first = first.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    if auth != "Bearer test-token" {
                        return (StatusCode::UNAUTHORIZED, Json(json!({
                            "error": { "status": 401, "message": "Invalid access token" }
                        })));
                    }
                    (StatusCode::OK, Json(first))
                }
            }),
        )
        .route(
            "/playlists/p1/tracks",
            get(move || {
                let second = second.clone();
                async move { Json(second) }
            }),
        )
}

#[tokio::test]
async fn test_fetch_playlist_follows_track_pages() {
    let base = serve(paged_playlist).await;

    let playlist = fetch_playlist_at(&base, "test-token", "p1").await.unwrap();

    assert_eq!(playlist.id, "p1");
    assert_eq!(playlist.name.as_deref(), Some("Mixed"));
    let tracks = playlist.tracks.as_ref().unwrap();
    assert_eq!(tracks.items.len(), 5);
    assert_eq!(tracks.total, Some(5));
    assert!(tracks.next.is_none());

    let names: Vec<Option<&str>> = playlist
        .tracks()
        .map(|t| t.and_then(|t| t.name.as_deref()))
        .collect();
    assert_eq!(
        names,
        vec![Some("One"), None, Some("Two"), Some("Three"), Some("Four")]
    );
}

#[tokio::test]
async fn test_artist_count_for_playlist() {
    let base = serve(paged_playlist).await;

    let counts = artist_count_for_playlist_at(&base, "test-token", "p1")
        .await
        .unwrap();

    let entries: Vec<(&str, u32)> = counts.iter().collect();
    assert_eq!(entries, vec![("A", 2), ("B", 1), ("C", 1)]);
    assert_eq!(counts.total(), 4);
}

#[tokio::test]
async fn test_wrong_token_is_an_api_error() {
    let base = serve(paged_playlist).await;

    let err = fetch_playlist_at(&base, "other-token", "p1")
        .await
        .unwrap_err();

    match &err {
        Error::Api { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Invalid access token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_token_expired());
}

#[tokio::test]
async fn test_expired_token_is_detected() {
    let base = serve(|_| {
        Router::new().route(
            "/playlists/{id}",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": { "status": 401, "message": "The access token expired" }
                    })),
                )
            }),
        )
    })
    .await;

    let err = fetch_playlist_at(&base, "stale", "p1").await.unwrap_err();
    assert!(err.is_token_expired());
}

#[tokio::test]
async fn test_error_without_json_body_uses_reason_phrase() {
    let base = serve(|_| Router::new()).await;

    let err = fetch_playlist_at(&base, "tok", "missing").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_an_http_error() {
    // Grab a free port and release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = fetch_playlist_at(&base, "tok", "p1").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn test_user_playlists_are_paged_and_skip_null_entries() {
    let base = serve(|base| {
        let first = json!({
            "items": [
                { "id": "p1", "name": "First", "tracks": { "total": 3 } },
                null
            ],
            "next": format!("{base}/me/playlists/page2")
        });
        let second = json!({
            "items": [ { "id": "p2", "name": "Second" } ],
            "next": null
        });
        Router::new()
            .route(
                "/me/playlists",
                get(move || {
                    let first = first.clone();
                    async move { Json(first) }
                }),
            )
            .route(
                "/me/playlists/page2",
                get(move || {
                    let second = second.clone();
                    async move { Json(second) }
                }),
            )
    })
    .await;

    let playlists = get_user_playlists_at(&base, "tok").await.unwrap();
    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
}

fn rate_limited(retry_after: &'static str) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("retry-after", retry_after)],
        Json(json!({ "error": { "status": 429, "message": "API rate limit exceeded" } })),
    )
        .into_response()
}

// Answers 429 with `retry_after` for the first `limited` requests, then the playlist.
fn rate_limited_playlist(hits: Arc<AtomicU32>, limited: u32, retry_after: &'static str) -> Router {
    Router::new().route(
        "/playlists/{id}",
        get(move || {
            let hits = Arc::clone(&hits);
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) < limited {
                    return rate_limited(retry_after);
                }
                Json(json!({ "id": "p1", "name": "After the wait" })).into_response()
            }
        }),
    )
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&hits);
    let base = serve(move |_| rate_limited_playlist(counter, 1, "0")).await;

    let playlist = fetch_playlist_at(&base, "tok", "p1").await.unwrap();

    assert_eq!(playlist.name.as_deref(), Some("After the wait"));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_long_retry_after_is_not_waited_for() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&hits);
    let base = serve(move |_| rate_limited_playlist(counter, u32::MAX, "121")).await;

    let err = fetch_playlist_at(&base, "tok", "p1").await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rate_limit_retries_are_capped() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&hits);
    let base = serve(move |_| rate_limited_playlist(counter, u32::MAX, "0")).await;

    let err = fetch_playlist_at(&base, "tok", "p1").await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 429, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), MAX_ATTEMPTS);
}
