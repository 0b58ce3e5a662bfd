// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use std::time::Duration;

use common::{
    mount_login, mount_search, registry_settings, requests_to, settings, AUTH_PATH, DATA_PATH,
    GRAPHQL_PATH,
};
use fair_submit_proxy::{
    error::{ConfigError, Error},
    flows::SubmitFlow,
    registry::{
        client::RegistryClient, resolve_all, AuthenticationError, IdKind, IdResolver,
        RegistryIdResolver, RegistrySubmissionError,
    },
    settings::RegistrySettings,
    tools,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{any, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client() -> reqwest::Client {
    tools::create_client(tools::USER_AGENT).unwrap()
}

#[tokio::test]
async fn resolves_the_first_candidate() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "searchDomains",
        "http://x/d",
        json!([{ "id": "7", "iri": "http://x/d" }, { "id": "8", "iri": "http://x/d2" }]),
    )
    .await;

    let resolver = RegistryIdResolver::new(registry_settings(&server), client());
    assert_eq!(
        resolver.resolve("http://x/d", IdKind::Domain).await,
        Some(json!("7"))
    );

    let queries = requests_to(&server, "POST", GRAPHQL_PATH).await;
    assert!(queries[0]["query"]
        .as_str()
        .unwrap()
        .contains("searchDomains(q: $q)"));
}

#[tokio::test]
async fn sends_the_graphql_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("x-graphql-key", "key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "searchSubjects": [{ "id": 3 }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = registry_settings(&server);
    settings.graphql_key = Some("key-1".into());
    let resolver = RegistryIdResolver::new(settings, client());
    assert_eq!(
        resolver.resolve("http://x/s", IdKind::Subject).await,
        Some(json!(3))
    );
}

#[tokio::test]
async fn failed_lookups_resolve_to_nothing() {
    let server = MockServer::start().await;
    mount_search(&server, "searchSubjects", "http://x/empty", json!([])).await;
    mount_search(&server, "searchSubjects", "http://x/null", json!([{ "id": null }])).await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(wiremock::matchers::body_partial_json(
            json!({ "variables": { "q": "http://x/error" } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "boom" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(wiremock::matchers::body_partial_json(
            json!({ "variables": { "q": "http://x/down" } }),
        ))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resolver = RegistryIdResolver::new(registry_settings(&server), client());
    for iri in ["http://x/empty", "http://x/null", "http://x/error", "http://x/down"] {
        assert_eq!(resolver.resolve(iri, IdKind::Subject).await, None, "{iri}");
    }
}

#[tokio::test]
async fn resolution_keeps_order_and_drops_failures() {
    let server = MockServer::start().await;
    mount_search(&server, "searchSubjects", "http://x/1", json!([{ "id": "11" }])).await;
    mount_search(&server, "searchSubjects", "http://x/2", json!([])).await;
    mount_search(&server, "searchSubjects", "http://x/3", json!([{ "id": "33" }])).await;

    let resolver = RegistryIdResolver::new(registry_settings(&server), client());
    let resolution = resolve_all(
        &resolver,
        vec![json!("http://x/1"), json!("http://x/2"), json!(5), json!("http://x/3")],
        IdKind::Subject,
        2,
    )
    .await;

    assert_eq!(resolution.resolved, vec![json!("11"), json!(5), json!("33")]);
    assert_eq!(resolution.dropped, vec![json!("http://x/2")]);
}

#[tokio::test]
async fn authenticates_and_submits() {
    let server = MockServer::start().await;
    mount_login(&server, json!({ "jwt": "session-token" })).await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": 99 } })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = RegistryClient::new(registry_settings(&server), client());
    let record = json!({ "fairsharing_record": { "name": "Metric" } });
    let response = registry.submit(&record).await.unwrap();

    assert_eq!(response.status_code, 201);
    assert_eq!(response.body, json!({ "data": { "id": 99 } }));
    assert_eq!(requests_to(&server, "POST", DATA_PATH).await, vec![record]);
}

#[tokio::test]
async fn non_json_registry_responses_are_passed_on_as_text() {
    let server = MockServer::start().await;
    mount_login(&server, json!({ "jwt": "t" })).await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("created"))
        .mount(&server)
        .await;

    let registry = RegistryClient::new(registry_settings(&server), client());
    let response = registry.submit(&json!({})).await.unwrap();
    assert_eq!(response.body, json!("created"));
}

#[tokio::test]
async fn missing_jwt_prevents_the_submission() {
    let server = MockServer::start().await;
    mount_login(&server, json!({ "error": "invalid credentials" })).await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let registry = RegistryClient::new(registry_settings(&server), client());
    let err = registry.submit(&json!({})).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Authentication(AuthenticationError::MissingToken)
    ));
    assert_eq!(
        err.to_string(),
        "FAIRsharing authentication failed: Missing jwt token"
    );
}

#[tokio::test]
async fn refused_login_prevents_the_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let registry = RegistryClient::new(registry_settings(&server), client());
    let err = registry.submit(&json!({})).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Authentication(AuthenticationError::Status(status, _)) if status.as_u16() == 401
    ));
}

#[tokio::test]
async fn rejected_submission_carries_status_and_body() {
    let server = MockServer::start().await;
    mount_login(&server, json!({ "jwt": "t" })).await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_string("name is missing"))
        .expect(1)
        .mount(&server)
        .await;

    let registry = RegistryClient::new(registry_settings(&server), client());
    let err = registry.submit(&json!({})).await.unwrap_err();
    match err {
        Error::Submission(RegistrySubmissionError::Status(status, body)) => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(body, "name is missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unconfigured_registry_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = RegistrySettings::builder()
        .graphql_url(common::server_url(&server, GRAPHQL_PATH))
        .build();
    let flow = SubmitFlow::from_settings(
        &fair_submit_proxy::settings::Settings::builder()
            .registry(settings)
            .build(),
        client(),
    );
    let err = flow
        .submit(json!({ "fairsharing_record": { "subject_ids": ["http://x/1"] } }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Missing(_))));
}

#[tokio::test]
async fn submit_flow_resolves_then_sanitizes_then_sends() {
    let server = MockServer::start().await;
    mount_search(&server, "searchSubjects", "http://x/1", json!([])).await;
    mount_search(&server, "searchSubjects", "http://x/2", json!([{ "id": "42" }])).await;
    mount_search(&server, "searchDomains", "http://x/d", json!([])).await;
    mount_login(&server, json!({ "jwt": "t" })).await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = SubmitFlow::from_settings(&settings(&server), client());
    let outcome = flow
        .submit(json!({
            "fairsharing_record": {
                "name": "Metric",
                "description": "",
                "subject_ids": ["http://x/1", "http://x/2"],
                "domain_ids": ["http://x/d"],
                "metadata": { "contacts": [{ "email": null }] },
            }
        }))
        .await
        .unwrap();

    assert_eq!(outcome.data_status_code, 201);
    assert_eq!(outcome.response, json!({ "ok": true }));
    assert_eq!(outcome.unresolved, vec![json!("http://x/1"), json!("http://x/d")]);
    assert_eq!(
        requests_to(&server, "POST", DATA_PATH).await,
        vec![json!({
            "fairsharing_record": {
                "name": "Metric",
                "subject_ids": ["42"],
            }
        })]
    );
}

#[tokio::test]
async fn slow_lookups_time_out_and_get_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "searchSubjects": [{ "id": "1" }] } }))
                .set_delay(Duration::from_millis(2_000)),
        )
        .mount(&server)
        .await;

    let mut settings = registry_settings(&server);
    settings.resolve_timeout = Some(100);
    let resolver = RegistryIdResolver::new(settings, client());

    assert_eq!(resolver.resolve("http://x/slow", IdKind::Subject).await, None);
    let resolution = resolve_all(
        &resolver,
        vec![json!("http://x/slow"), json!(3)],
        IdKind::Subject,
        2,
    )
    .await;
    assert_eq!(resolution.resolved, vec![json!(3)]);
    assert_eq!(resolution.dropped, vec![json!("http://x/slow")]);
}

#[tokio::test]
async fn login_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jwt": "late" }))
                .set_delay(Duration::from_millis(2_000)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = registry_settings(&server);
    settings.auth_timeout = Some(100);
    let registry = RegistryClient::new(settings, client());
    let err = registry.submit(&json!({})).await.unwrap_err();

    match err {
        Error::Authentication(AuthenticationError::Transport(source)) => {
            assert!(source.is_timeout());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
