//! `ArtifactoryClient` and `LazyClient` against a mock Artifactory server.

use bytes::Bytes;
use dlstats::{AqlClient, ArtifactoryClient, ArtifactorySettings, LazyClient, StatsError, api};
use wiremock::matchers::{basic_auth, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AQL_PATH: &str = "/artifactory/api/search/aql";

const ANSWER: &str = r#"{
  "results" : [ {
    "repo" : "jcenter-cache",
    "name" : "struts2-core-2.3.14.pom",
    "stats" : [ { "downloads" : 27, "remote_downloads" : 0 } ]
  }, {
    "repo" : "jcenter-cache",
    "name" : "struts-master-9.pom",
    "stats" : [ { "downloads" : 30, "remote_downloads" : 0 } ]
  } ],
  "range" : { "start_pos" : 0, "end_pos" : 2, "total" : 2, "limit" : 2 }
}"#;

fn settings(server: &MockServer, user: &str, password: &str) -> ArtifactorySettings {
    ArtifactorySettings {
        url: format!("{}/artifactory", server.uri()),
        user: user.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn posts_query_as_plain_text_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AQL_PATH))
        .and(header("content-type", "text/plain"))
        .and(basic_auth("admin", "password"))
        .and(body_string("items.find()"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .expect(1)
        .mount(&server)
        .await;

    let client = ArtifactoryClient::new(settings(&server, "admin", "password")).unwrap();
    let body = client.execute("items.find()").await.unwrap();

    assert_eq!(body, Bytes::from_static(ANSWER.as_bytes()));
}

#[tokio::test]
async fn anonymous_client_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = ArtifactoryClient::new(settings(&server, "", "")).unwrap();
    client.execute("items.find()").await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn non_success_status_is_a_query_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AQL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Failed to parse query\n"))
        .mount(&server)
        .await;

    let client = ArtifactoryClient::new(settings(&server, "", "")).unwrap();
    let err = client.execute("items.find(").await.unwrap_err();

    assert!(matches!(err, StatsError::Query(_)));
    assert_eq!(
        err.to_string(),
        "Executing AQL query: server answered 400: Failed to parse query"
    );
}

#[tokio::test]
async fn unreachable_server_is_a_query_error() {
    let server = MockServer::start().await;
    let settings = settings(&server, "", "");
    drop(server);

    let client = ArtifactoryClient::new(settings).unwrap();
    let err = client.execute("items.find()").await.unwrap_err();
    assert!(matches!(err, StatsError::Query(_)));
}

#[tokio::test]
async fn lazy_client_serves_the_downloads_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .expect(2)
        .mount(&server)
        .await;

    let lazy = LazyClient::new(settings(&server, "admin", "password"));
    assert!(!lazy.is_initialised());
    let app = api::router(lazy);

    for _ in 0..2 {
        let req = http::Request::get("/v1/stats/downloads/jcenter-cache?limit=1")
            .body(Bytes::new())
            .unwrap();
        let res = app.oneshot(req).await;

        assert_eq!(res.status_code(), 200);
        assert_eq!(
            res.body(),
            br#"[{"repoName":"jcenter-cache","artifactName":"struts-master-9.pom","downloads":30}]"#
        );
    }

    let received = server.received_requests().await.unwrap();
    let query = String::from_utf8(received[0].body.clone()).unwrap();
    assert!(query.contains(r#".sort({"$desc":["stat.downloads"]}).limit(1)"#), "{query}");
}
