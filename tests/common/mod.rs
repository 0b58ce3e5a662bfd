// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

#![allow(dead_code)]

use fair_submit_proxy::settings::{ContentStoreSettings, RegistrySettings, Settings};
use serde_json::{json, Value};
use url::Url;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const OWNER: &str = "OSTrails";
pub const REPO: &str = "records";
pub const TOKEN: &str = "test-token";
pub const AUTH_PATH: &str = "/users/sign_in";
pub const DATA_PATH: &str = "/fairsharing_records";
pub const GRAPHQL_PATH: &str = "/graphql";

pub fn rdf_record(subject: &str) -> String {
    format!(
        r#"@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix ftr: <https://w3id.org/ftr#> .

<{subject}> a ftr:Test ;
    dcterms:title "A test" ;
    dcterms:identifier "{subject}" .
"#
    )
}

pub fn contents_path(file_path: &str) -> String {
    format!("/repos/{OWNER}/{REPO}/contents/{file_path}")
}

pub fn server_url(server: &MockServer, url_path: &str) -> Url {
    Url::parse(&format!("{}{url_path}", server.uri())).unwrap()
}

pub fn store_settings(server: &MockServer) -> ContentStoreSettings {
    ContentStoreSettings::builder()
        .api_base(Url::parse(&server.uri()).unwrap())
        .token(TOKEN)
        .owner(OWNER)
        .repository(REPO)
        .build()
}

pub fn registry_settings(server: &MockServer) -> RegistrySettings {
    RegistrySettings::builder()
        .auth_url(server_url(server, AUTH_PATH))
        .data_url(server_url(server, DATA_PATH))
        .username("curator")
        .password("secret")
        .graphql_url(server_url(server, GRAPHQL_PATH))
        .resolve_timeout(2_000)
        .build()
}

pub fn settings(server: &MockServer) -> Settings {
    Settings::builder()
        .content_store(store_settings(server))
        .registry(registry_settings(server))
        .build()
}

pub fn written_response(file_path: &str, commit: &str) -> Value {
    json!({
        "content": {
            "path": file_path,
            "sha": format!("sha-of-{commit}"),
            "html_url": format!("https://github.com/{OWNER}/{REPO}/blob/main/{file_path}"),
        },
        "commit": {
            "sha": commit,
            "html_url": format!("https://github.com/{OWNER}/{REPO}/commit/{commit}"),
        },
    })
}

/// Makes the GraphQL endpoint answer a search for `iri`
/// with the given candidates.
pub async fn mount_search(server: &MockServer, field: &str, iri: &str, candidates: Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "variables": { "q": iri } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { field: candidates }
        })))
        .mount(server)
        .await;
}

pub async fn mount_login(server: &MockServer, response: Value) {
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(body_partial_json(json!({
            "user": { "login": "curator", "password": "secret" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn requests_to(server: &MockServer, http_method: &str, url_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|req| req.method.as_str() == http_method && req.url.path() == url_path)
        .map(|req| serde_json::from_slice(&req.body).unwrap_or(Value::Null))
        .collect()
}
