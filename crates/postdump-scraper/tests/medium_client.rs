//! Integration tests for `MediumClient` article and sitemap fetching.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postdump_scraper::{LoadError, MediumClient, ScraperError};

const TEST_UA: &str = "postdump-test/0.1";

fn test_client(server: &MockServer) -> MediumClient {
    MediumClient::new(&server.uri(), 5, TEST_UA).expect("failed to build test MediumClient")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn article_page() -> String {
    let state = json!({
        "Post:8ad73582d912": {
            "title": "Being a junior developer",
            "clapCount": 152,
            "voterCount": 21,
            "postResponses": {"count": 4},
            "readingTime": 4.3,
            "topics": [{"name": "Programming"}],
            "tags": [{"__ref": "Tag:programming"}],
            "collection": null,
            "creator": {"__ref": "User:7"}
        },
        "User:7": {
            "id": "7",
            "name": "Khoa",
            "socialStats": {"followerCount": 87, "followingCount": 12}
        },
        "ImageMetadata:1*abc.png": {"originalHeight": 640}
    });
    format!(
        "<!doctype html><html><head><title>Post</title>\
         <script>window.main();</script>\
         <script>window.__APOLLO_STATE__ = {state}</script>\
         </head><body><article>text</article></body></html>"
    )
}

fn sitemap(entries: &[(&str, &str)]) -> String {
    let urls: String = entries
        .iter()
        .map(|(loc, priority)| {
            format!("<url><loc>{loc}</loc><changefreq>monthly</changefreq><priority>{priority}</priority></url>")
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">{urls}</urlset>"
    )
}

// ---------------------------------------------------------------------------
// Article pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extract_article_normalizes_the_post_in_the_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/@ddkhoa/being-a-junior-developer-8ad73582d912"))
        .and(header("user-agent", TEST_UA))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page()))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let url = format!("{}/@ddkhoa/being-a-junior-developer-8ad73582d912", server.uri());
    let record = client.extract_article(&url).await;

    assert_eq!(record.id, "8ad73582d912");
    assert!(!record.is_deleted, "expected a live record, got: {record:?}");
    assert_eq!(record.clap_count, Some(152));
    assert_eq!(record.post_responses, Some(4));
    assert_eq!(record.image_count, Some(1));
    assert_eq!(record.topics, Some(vec!["Programming".to_string()]));
    assert_eq!(record.tags, Some(vec!["programming".to_string()]));
    assert_eq!(record.creator_id.as_deref(), Some("7"));
}

#[tokio::test]
async fn missing_page_yields_fetch_error_and_deleted_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let url = format!("{}/p/gone-post-123abc", server.uri());

    let fetched = client.fetch_article(&url).await;
    assert_eq!(fetched.id, "123abc");
    assert!(
        matches!(
            fetched.store,
            Err(LoadError::Fetch(ScraperError::NotFound { .. }))
        ),
        "expected NotFound, got: {:?}",
        fetched.store
    );

    let record = fetched.to_record();
    assert!(record.is_deleted);
    assert_eq!(record, postdump_core::PostRecord::deleted("123abc"));
}

#[tokio::test]
async fn server_error_is_reported_as_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .fetch_article_store(&format!("{}/p/post-1", server.uri()))
        .await;

    assert!(
        matches!(
            result,
            Err(LoadError::Fetch(ScraperError::UnexpectedStatus { status: 503, .. }))
        ),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

#[tokio::test]
async fn page_without_state_blob_is_a_parse_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><script>var a = 1;</script></html>"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let fetched = client
        .fetch_article(&format!("{}/p/post-77", server.uri()))
        .await;

    assert!(matches!(fetched.store, Err(LoadError::MarkerNotFound)));
    assert_eq!(fetched.to_record(), postdump_core::PostRecord::deleted("77"));
}

// ---------------------------------------------------------------------------
// Sitemaps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_sitemap_urls_filters_by_priority() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2021/posts-2021-03-07.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(&[
            ("https://medium.com/p/keep-a1", "0.8"),
            ("https://medium.com/p/drop-b2", "0.2"),
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let urls = client
        .fetch_sitemap_urls(day(2021, 3, 7))
        .await
        .expect("sitemap should load");

    assert_eq!(urls, vec!["https://medium.com/p/keep-a1".to_string()]);
}

#[tokio::test]
async fn discover_post_urls_dedupes_and_skips_failed_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2021/posts-2021-12-31.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(&[
            ("https://medium.com/p/first-a1", "0.9"),
            ("https://medium.com/p/shared-c3", "0.5"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2022/posts-2022-01-01.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2022/posts-2022-01-02.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(&[
            ("https://medium.com/p/shared-c3", "0.6"),
            ("https://medium.com/p/last-d4", "1.0"),
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let urls = client
        .discover_post_urls(day(2021, 12, 31), day(2022, 1, 2))
        .await;

    assert_eq!(
        urls,
        vec![
            "https://medium.com/p/first-a1".to_string(),
            "https://medium.com/p/shared-c3".to_string(),
            "https://medium.com/p/last-d4".to_string(),
        ]
    );
}

#[tokio::test]
async fn malformed_sitemap_returns_xml_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset><url></loc></urlset>"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_sitemap_urls(day(2021, 1, 1)).await;

    assert!(
        matches!(result, Err(ScraperError::Xml(_))),
        "expected Xml error, got: {result:?}"
    );
}

#[tokio::test]
async fn walk_sitemaps_skips_known_urls_and_reports_failed_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2021/posts-2021-05-01.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(&[
            ("https://medium.com/p/known-a1", "0.9"),
            ("https://medium.com/p/fresh-b2", "0.7"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2021/posts-2021-05-02.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap/posts/2021/posts-2021-05-03.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(&[
            ("https://medium.com/p/fresh-b2", "0.8"),
            ("https://medium.com/p/later-c3", "0.5"),
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut seen: std::collections::HashSet<String> =
        ["https://medium.com/p/known-a1".to_string()].into();
    let mut days: Vec<(NaiveDate, Vec<String>)> = Vec::new();

    let failed = client
        .walk_sitemaps(day(2021, 5, 1), day(2021, 5, 3), &mut seen, |date, urls| {
            days.push((date, urls));
            Ok::<(), std::convert::Infallible>(())
        })
        .await
        .expect("walk never fails with an infallible sink");

    assert_eq!(failed, 1);
    assert_eq!(
        days,
        vec![
            (day(2021, 5, 1), vec!["https://medium.com/p/fresh-b2".to_string()]),
            (day(2021, 5, 3), vec!["https://medium.com/p/later-c3".to_string()]),
        ]
    );
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn walk_sitemaps_stops_at_the_first_sink_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(&[(
            "https://medium.com/p/any-a1",
            "0.9",
        )])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut calls = 0;
    let result = client
        .walk_sitemaps(
            day(2021, 5, 1),
            day(2021, 5, 3),
            &mut std::collections::HashSet::new(),
            |_, _| {
                calls += 1;
                Err("disk full")
            },
        )
        .await;

    assert_eq!(result, Err("disk full"));
    assert_eq!(calls, 1);
}
