use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, address};
use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use lisk_autotx::proxy::http_client;
use lisk_autotx::tasks::{ClaimSummary, TaskClient, TaskId};
use serde_json::{Value, json};

const ACCOUNT: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[derive(Clone, Default)]
struct Portal {
    claims: Arc<Mutex<Vec<Value>>>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

async fn graphql(State(portal): State<Portal>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    if let Some(agent) = headers.get("user-agent").and_then(|v| v.to_str().ok()) {
        portal.user_agents.lock().unwrap().push(agent.to_string());
    }

    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("UpdateAirdropTaskStatus") {
        let input = body["variables"]["input"].clone();
        let success = input["taskID"] == json!(2);
        portal.claims.lock().unwrap().push(input);
        return Json(json!({
            "data": { "userdrop": { "updateTaskStatus": {
                "success": success,
                "progress": { "isCompleted": success, "completedAt": null }
            }}}
        }));
    }

    Json(json!({
        "data": { "userdrop": { "user": { "tasks": [
            { "tasks": [
                { "id": 1, "description": "Bridge to Lisk", "progress": { "isCompleted": true } },
                { "id": 2, "description": "Swap on Lisk", "progress": { "isCompleted": false } }
            ]},
            { "tasks": [
                { "id": 3, "description": "Supply on Ionic", "progress": { "isCompleted": false } }
            ]}
        ]}}}
    }))
}

async fn spawn_portal(portal: Portal) -> String {
    let app = Router::new().route("/graphql", post(graphql)).with_state(portal);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/graphql")
}

#[tokio::test]
async fn fetches_only_open_tasks() {
    let endpoint = spawn_portal(Portal::default()).await;
    let client = TaskClient::new(http_client(None).unwrap(), endpoint);

    let tasks = client.fetch_open_tasks(ACCOUNT).await.unwrap();
    let ids: Vec<TaskId> = tasks.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![TaskId::Number(2), TaskId::Number(3)]);
}

#[tokio::test]
async fn claims_each_open_task_in_order() {
    let portal = Portal::default();
    let endpoint = spawn_portal(portal.clone()).await;
    let client = TaskClient::new(http_client(None).unwrap(), endpoint);

    let summary = client.process_tasks(ACCOUNT).await;
    assert_eq!(summary, ClaimSummary { claimed: 1, failed: 1 });

    let claims = portal.claims.lock().unwrap().clone();
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0]["taskID"], json!(2));
    assert_eq!(claims[1]["taskID"], json!(3));
    assert_eq!(claims[0]["address"], json!(ACCOUNT.to_checksum(None)));

    let agents = portal.user_agents.lock().unwrap().clone();
    assert!(agents.iter().all(|agent| agent == "Mozilla/5.0"));
}

#[tokio::test]
async fn unreachable_portal_claims_nothing() {
    let client = TaskClient::new(http_client(None).unwrap(), "http://127.0.0.1:9/graphql");

    assert!(client.fetch_open_tasks(ACCOUNT).await.is_err());
    assert_eq!(client.process_tasks(ACCOUNT).await, ClaimSummary::default());
}
