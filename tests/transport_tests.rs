use org_pulls::github::GithubService;
use org_pulls::transport::OctocrabTransport;
use org_pulls::{FetchError, TransportError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> GithubService {
    let transport = Arc::new(OctocrabTransport::new(&server.uri()).expect("should build transport"));
    GithubService::new(transport, "valid-token", &server.uri(), Duration::from_secs(5))
        .expect("should build service")
}

#[tokio::test]
async fn test_walks_link_header_over_http() {
    let server = MockServer::start().await;
    let next_url = format!("{}/orgs/test-org/repos?page=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/orgs/test-org/repos"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer valid-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "node_id": "R_3", "name": "repo3", "full_name": "test-org/repo3"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/test-org/repos"))
        .and(header("authorization", "Bearer valid-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", format!(r#"<{}>; rel="next""#, next_url).as_str())
                .set_body_json(json!([
                    {"id": 1, "node_id": "R_1", "name": "repo1", "full_name": "test-org/repo1"},
                    {"id": 2, "node_id": "R_2", "name": "repo2", "full_name": "test-org/repo2"}
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut progress = Vec::new();
    let repos = service(&server)
        .fetch_repositories("test-org", |n| progress.push(n))
        .await
        .expect("should fetch repositories");

    let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["repo1", "repo2", "repo3"]);
    assert_eq!(progress, vec![2, 3]);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/o/repos"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = service(&server)
        .fetch_repositories("o", |_| {})
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        FetchError::Repositories {
            source: TransportError::Status { status: 500, .. },
            ..
        }
    ));
    server.verify().await;
}

#[tokio::test]
async fn test_not_found_is_a_status_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/missing/repos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let err = service(&server)
        .fetch_repositories("missing", |_| {})
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        FetchError::Repositories {
            source: TransportError::Status { status: 404, .. },
            ..
        }
    ));
}
