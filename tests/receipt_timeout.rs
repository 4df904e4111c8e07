use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::U256;
use alloy::rpc::types::TransactionRequest;
use axum::{Json, Router, extract::State, routing::post};
use lisk_autotx::accounts::{Account, parse_key};
use lisk_autotx::client::{Chain, ChainClient};
use reqwest::Url;
use serde_json::{Value, json};

const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Node that accepts every transaction and never mines any of them.
#[derive(Clone, Default)]
struct Node {
    methods: Arc<Mutex<Vec<String>>>,
}

async fn rpc(State(node): State<Node>, Json(body): Json<Value>) -> Json<Value> {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    node.methods.lock().unwrap().push(method.clone());

    let result = match method.as_str() {
        "eth_chainId" => json!("0x46f"),
        "eth_getTransactionCount" => json!("0x0"),
        "eth_estimateGas" => json!("0x5208"),
        "eth_gasPrice" | "eth_maxPriorityFeePerGas" => json!("0x3b9aca00"),
        "eth_blockNumber" => json!("0x1"),
        "eth_feeHistory" => json!({
            "oldestBlock": "0x1",
            "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
            "gasUsedRatio": [0.5],
            "reward": [["0x3b9aca00"]]
        }),
        "eth_sendRawTransaction" => json!(format!("0x{}", "ab".repeat(32))),
        "eth_newBlockFilter" => json!("0x1"),
        "eth_getFilterChanges" => json!([]),
        _ => Value::Null,
    };
    Json(json!({ "jsonrpc": "2.0", "id": body["id"], "result": result }))
}

async fn spawn_node(node: Node) -> Url {
    let app = Router::new().route("/", post(rpc)).with_state(node);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

#[tokio::test]
async fn missing_receipt_fails_instead_of_hanging() {
    let node = Node::default();
    let url = spawn_node(node.clone()).await;
    let account = Account {
        index: 1,
        signer: parse_key(DEV_KEY).unwrap(),
    };
    let client = ChainClient::connect(&url, account, Duration::from_secs(1));
    let tx = TransactionRequest::default()
        .with_to(client.address())
        .with_value(U256::from(1u64));

    let outcome = tokio::time::timeout(Duration::from_secs(20), client.send(tx))
        .await
        .expect("send should give up on the receipt");

    let err = outcome.unwrap_err();
    assert!(format!("{err:#}").contains("no receipt for"), "{err:#}");
    assert!(node.methods.lock().unwrap().iter().any(|m| m == "eth_sendRawTransaction"));
}
