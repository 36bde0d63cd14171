//! In-memory DoubleCloud API served by wiremock.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use doublecloud_provider::api::{ApiClient, AuthorizedKey, ClientOptions};
use doublecloud_provider::testing::ProviderTester;
use doublecloud_provider::DoubleCloudProvider;
use serde_json::{json, Map, Value};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const KEY_JSON: &str = include_str!("../fixtures/authorized_key.json");
pub const TOKEN: &str = "t1.9euelZqKk5GWmJCLlpyQ";
pub const POLL_INTERVAL_MS: u64 = 5;
pub const PROJECT_ID: &str = "prj_acc";
pub const WORKBOOKS: &str = "/visualization/v1/workbooks";

/// One REST collection, e.g. `/clickhouse/v1/clusters`.
struct Collection {
    prefix: &'static str,
    field: &'static str,
    id_prefix: &'static str,
    defaults: Value,
    items: BTreeMap<String, Value>,
}

/// A recorded API call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct State {
    collections: Vec<Collection>,
    operations: BTreeMap<String, String>,
    /// Workbook connections by workbook id, then by name.
    connections: BTreeMap<String, BTreeMap<String, Value>>,
    failing: HashSet<String>,
    calls: Vec<Call>,
    next: usize,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}{:04}", prefix, self.next)
    }

    fn operation(&mut self, resource_id: &str) -> ResponseTemplate {
        let id = self.next_id("op");
        self.operations.insert(id.clone(), resource_id.to_string());
        ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "done": false,
            "resourceId": resource_id
        }))
    }
}

/// Stateful fake of the REST API.
#[derive(Clone)]
pub struct FakeCloud {
    state: Arc<Mutex<State>>,
}

/// Recursively merge `patch` into `target`; objects merge, other values replace.
pub fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

fn not_found(what: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"code": 5, "message": format!("{} not found", what)}))
}

impl FakeCloud {
    fn new() -> Self {
        let collections = vec![
            Collection {
                prefix: "/clickhouse/v1/clusters",
                field: "clusters",
                id_prefix: "chc",
                defaults: json!({
                    "status": "RUNNING",
                    "version": "23.8",
                    "config": {"logLevel": "LOG_LEVEL_INFORMATION", "maxConnections": "100"},
                }),
                items: BTreeMap::new(),
            },
            Collection {
                prefix: "/kafka/v1/clusters",
                field: "clusters",
                id_prefix: "cka",
                defaults: json!({"status": "RUNNING", "version": "3.5"}),
                items: BTreeMap::new(),
            },
            Collection {
                prefix: "/network/v1/networks",
                field: "networks",
                id_prefix: "net",
                defaults: json!({
                    "status": "ACTIVE",
                    "ipv6CidrBlock": "2a05:d014:1::/56",
                    "isExternal": false
                }),
                items: BTreeMap::new(),
            },
            Collection {
                prefix: "/transfer/v1/transfers",
                field: "transfers",
                id_prefix: "dtt",
                defaults: json!({"status": "CREATED"}),
                items: BTreeMap::new(),
            },
            Collection {
                prefix: "/transfer/v1/endpoints",
                field: "endpoints",
                id_prefix: "dte",
                defaults: json!({}),
                items: BTreeMap::new(),
            },
            Collection {
                prefix: WORKBOOKS,
                field: "workbooks",
                id_prefix: "wb",
                defaults: json!({"config": {}}),
                items: BTreeMap::new(),
            },
        ];
        Self {
            state: Arc::new(Mutex::new(State {
                collections,
                ..Default::default()
            })),
        }
    }

    /// Store an object directly, returning its id.
    pub fn seed(&self, prefix: &str, object: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let id_prefix = state
            .collections
            .iter()
            .find(|c| c.prefix == prefix)
            .map(|c| c.id_prefix)
            .unwrap();
        let id = state.next_id(id_prefix);
        let mut object = object;
        object["id"] = json!(id);
        let collection = state
            .collections
            .iter_mut()
            .find(|c| c.prefix == prefix)
            .unwrap();
        collection.items.insert(id.clone(), object);
        id
    }

    /// Stored object, if any.
    pub fn get(&self, prefix: &str, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .iter()
            .find(|c| c.prefix == prefix)
            .and_then(|c| c.items.get(id).cloned())
    }

    /// Ids stored under `prefix`.
    pub fn ids(&self, prefix: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .iter()
            .find(|c| c.prefix == prefix)
            .map(|c| c.items.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Connections stored for a workbook, by name.
    pub fn connections(&self, workbook_id: &str) -> BTreeMap<String, Value> {
        let state = self.state.lock().unwrap();
        state
            .connections
            .get(workbook_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every mutating call on `id` fail with 503.
    pub fn fail_mutations(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.to_string());
    }

    /// Recorded calls with the given method whose path starts with `prefix`.
    pub fn calls(&self, method: &str, prefix: &str) -> Vec<Call> {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .filter(|c| c.method == method && c.path.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn handle(&self, state: &mut State, request: &Request, body: Value) -> ResponseTemplate {
        let path = request.url.path().to_string();
        let verb = request.method.as_str().to_string();

        if let Some(op_id) = path.strip_prefix("/operation/v1/operations/") {
            return match state.operations.get(op_id) {
                Some(resource_id) => ResponseTemplate::new(200).set_body_json(json!({
                    "id": op_id,
                    "done": true,
                    "resourceId": resource_id
                })),
                None => not_found("operation"),
            };
        }

        if let Some(rest) = path.strip_prefix(WORKBOOKS) {
            if let Some(response) = self.handle_workbook(state, &verb, rest, &body) {
                return response;
            }
        }

        let Some(index) = state
            .collections
            .iter()
            .position(|c| path.starts_with(c.prefix))
        else {
            return not_found(&path);
        };
        let rest = path[state.collections[index].prefix.len()..].to_string();

        if rest.is_empty() {
            return match verb.as_str() {
                "GET" => {
                    let project: Option<String> = request
                        .url
                        .query_pairs()
                        .find(|(k, _)| k == "projectId")
                        .map(|(_, v)| v.into_owned());
                    let collection = &state.collections[index];
                    let items: Vec<Value> = collection
                        .items
                        .values()
                        .filter(|item| {
                            project
                                .as_deref()
                                .map_or(true, |p| item["projectId"] == p)
                        })
                        .cloned()
                        .collect();
                    ResponseTemplate::new(200).set_body_json(json!({ collection.field: items }))
                }
                "POST" => {
                    let id_prefix = state.collections[index].id_prefix;
                    let id = state.next_id(id_prefix);
                    let mut object = state.collections[index].defaults.clone();
                    merge(&mut object, body);
                    object["id"] = json!(id);
                    match state.collections[index].prefix {
                        "/clickhouse/v1/clusters" => {
                            object["connectionInfo"] = json!({
                                "host": format!("rw.{}.at.double.cloud", id),
                                "user": "admin",
                                "password": "generated-password",
                                "httpsPort": "8443",
                                "tcpPortSecure": "9440"
                            });
                        }
                        "/kafka/v1/clusters" => {
                            object["connectionInfo"] = json!({
                                "connectionString": format!("rw.{}.at.double.cloud:9091", id),
                                "user": "admin",
                                "password": "generated-password"
                            });
                        }
                        _ => {}
                    }
                    state.collections[index].items.insert(id.clone(), object);
                    state.operation(&id)
                }
                _ => ResponseTemplate::new(405),
            };
        }

        let target = rest.trim_start_matches('/');
        let (id, action) = match target.split_once(':') {
            Some((id, action)) => (id.to_string(), Some(action.to_string())),
            None => (target.to_string(), None),
        };
        if !state.collections[index].items.contains_key(&id) {
            return not_found(&id);
        }
        if verb != "GET" && state.failing.contains(&id) {
            return ResponseTemplate::new(503)
                .set_body_json(json!({"code": 14, "message": "backend unavailable"}));
        }

        match (verb.as_str(), action.as_deref()) {
            ("GET", None) => {
                ResponseTemplate::new(200).set_body_json(state.collections[index].items[&id].clone())
            }
            ("PATCH", None) => {
                if let Some(item) = state.collections[index].items.get_mut(&id) {
                    merge(item, body);
                }
                state.operation(&id)
            }
            ("DELETE", None) => {
                state.collections[index].items.remove(&id);
                state.connections.remove(&id);
                state.operation(&id)
            }
            ("POST", Some(action @ ("activate" | "deactivate"))) => {
                let status = if action == "activate" { "RUNNING" } else { "STOPPED" };
                if let Some(item) = state.collections[index].items.get_mut(&id) {
                    item["status"] = json!(status);
                }
                state.operation(&id)
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

impl FakeCloud {
    /// Workbook calls whose shape differs from the other collections:
    /// wrapped GET, config and connections. Everything else falls through.
    fn handle_workbook(
        &self,
        state: &mut State,
        verb: &str,
        rest: &str,
        body: &Value,
    ) -> Option<ResponseTemplate> {
        let rest = rest.strip_prefix('/')?;
        let (id, sub) = match rest.split_once('/') {
            Some((id, sub)) => (id, Some(sub)),
            None => (rest, None),
        };
        let index = state.collections.iter().position(|c| c.prefix == WORKBOOKS)?;
        let Some(workbook) = state.collections[index].items.get_mut(id) else {
            return Some(not_found(id));
        };

        match (verb, sub) {
            ("GET", None) => Some(ResponseTemplate::new(200).set_body_json(json!({"workbook": workbook}))),
            ("PUT", Some("config")) => {
                workbook["config"] = body["config"].clone();
                Some(state.operation(id))
            }
            ("GET", Some("connections")) => {
                let connections: Vec<Value> = state
                    .connections
                    .get(id)
                    .map(|by_name| {
                        by_name
                            .iter()
                            .map(|(name, config)| json!({"name": name, "config": config}))
                            .collect()
                    })
                    .unwrap_or_default();
                Some(ResponseTemplate::new(200).set_body_json(json!({"connections": connections})))
            }
            (verb, Some(sub)) => {
                let name = urlencoding::decode(sub.strip_prefix("connections/")?)
                    .ok()?
                    .into_owned();
                match verb {
                    "PUT" => {
                        state
                            .connections
                            .entry(id.to_string())
                            .or_default()
                            .insert(name, body["config"].clone());
                        Some(state.operation(id))
                    }
                    "DELETE" => match state.connections.get_mut(id).and_then(|c| c.remove(&name)) {
                        Some(_) => Some(state.operation(id)),
                        None => Some(not_found(&name)),
                    },
                    _ => Some(ResponseTemplate::new(405)),
                }
            }
            _ => None,
        }
    }
}

impl Respond for FakeCloud {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == format!("Bearer {}", TOKEN));
        if !authorized {
            return ResponseTemplate::new(401).set_body_json(json!({"message": "unauthenticated"}));
        }

        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            method: request.method.as_str().to_string(),
            path: request.url.path().to_string(),
            body: body.clone(),
        });
        self.handle(&mut state, request, body)
    }
}

/// A mock server with the token endpoint and the fake API mounted.
pub struct Cloud {
    pub server: MockServer,
    pub fake: FakeCloud,
}

impl Cloud {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        mount_token(&server).await;

        let fake = FakeCloud::new();
        Mock::given(any())
            .respond_with(fake.clone())
            .with_priority(10)
            .mount(&server)
            .await;

        Self { server, fake }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.server.uri())
    }

    /// Provider configuration pointing at the mock server.
    pub fn provider_config(&self) -> Value {
        json!({
            "authorized_key": KEY_JSON,
            "endpoint": self.server.uri(),
            "auth_endpoint": self.token_url()
        })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::default()
            .with_endpoint(self.server.uri())
            .with_auth_endpoint(self.token_url())
            .with_poll_interval(Duration::from_millis(POLL_INTERVAL_MS))
    }

    /// A configured provider talking to the fake API.
    pub async fn tester(&self) -> ProviderTester<DoubleCloudProvider> {
        let provider = DoubleCloudProvider::new("test").with_client_options(
            ClientOptions::default().with_poll_interval(Duration::from_millis(POLL_INTERVAL_MS)),
        );
        let tester = ProviderTester::new(provider);
        tester.configure(self.provider_config()).await.unwrap();
        tester
    }

    /// A raw API client for the fake API.
    pub fn client(&self) -> ApiClient {
        let key = AuthorizedKey::from_json_bytes(KEY_JSON.as_bytes()).unwrap();
        ApiClient::new(key, self.client_options()).unwrap()
    }
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 3600
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Object fields the fake API should store, for seeding.
pub fn object(fields: &[(&str, Value)]) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<Map<String, Value>>(),
    )
}
