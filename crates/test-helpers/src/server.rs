// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{fake_crs_hex, fake_public_key_hex, FakePackedList};
use alloy::primitives::{keccak256, U256};
use anyhow::Result;
use axum::{extract::State, http::Uri, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

pub const PUBLIC_KEY_ROUTE: &str = "/GetNetworkPublicKey";
pub const CRS_ROUTE: &str = "/GetCrs";
pub const VERIFY_ROUTE: &str = "/verify";
pub const SEAL_OUTPUT_ROUTE: &str = "/sealoutput";

struct ServerState {
    public_key: String,
    crs: String,
    overrides: HashMap<String, Value>,
    requests: HashMap<String, Vec<Value>>,
}

type SharedState = Arc<Mutex<ServerState>>;

/// In-process stand-in for the key endpoint, the zk verifier and the threshold network.
///
/// Every route counts its hits and records the request bodies. By default the verifier signs
/// each item as `"{account_addr}-{security_zone}-{chain_id}-"` and the threshold network
/// "seals" a handle by echoing its 32 bytes.
pub struct FakeCofheServer {
    url: String,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl FakeCofheServer {
    pub async fn start() -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let state = Arc::new(Mutex::new(ServerState {
            public_key: fake_public_key_hex(),
            crs: fake_crs_hex(),
            overrides: HashMap::new(),
            requests: HashMap::new(),
        }));

        let router = Router::new()
            .route(PUBLIC_KEY_ROUTE, post(handler))
            .route(CRS_ROUTE, post(handler))
            .route(VERIFY_ROUTE, post(handler))
            .route(SEAL_OUTPUT_ROUTE, post(handler))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Fake cofhe server stopped: {e}");
            }
        });
        debug!(%url, "Fake cofhe server listening");

        Ok(Self { url, state, handle })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn hits(&self, route: &str) -> usize {
        self.requests(route).len()
    }

    pub fn total_hits(&self) -> usize {
        self.state
            .lock()
            .map(|s| s.requests.values().map(Vec::len).sum())
            .unwrap_or_default()
    }

    /// Request bodies received on `route`, oldest first
    pub fn requests(&self, route: &str) -> Vec<Value> {
        self.state
            .lock()
            .map(|s| s.requests.get(route).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Answer `route` with `response` from now on
    pub fn set_response(&self, route: &str, response: Value) {
        if let Ok(mut state) = self.state.lock() {
            state.overrides.insert(route.to_owned(), response);
        }
    }

    pub fn set_public_key(&self, public_key: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.public_key = public_key.to_owned();
        }
    }

    pub fn set_crs(&self, crs: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.crs = crs.to_owned();
        }
    }
}

impl Drop for FakeCofheServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handler(
    State(state): State<SharedState>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Json<Value> {
    let route = uri.path().to_owned();
    let Ok(mut state) = state.lock() else {
        return Json(json!({ "error": "state poisoned" }));
    };
    state
        .requests
        .entry(route.clone())
        .or_default()
        .push(body.clone());

    if let Some(response) = state.overrides.get(&route) {
        return Json(response.clone());
    }

    Json(match route.as_str() {
        PUBLIC_KEY_ROUTE => json!({ "publicKey": state.public_key }),
        CRS_ROUTE => json!({ "crs": state.crs }),
        VERIFY_ROUTE => verify_response(&body),
        SEAL_OUTPUT_ROUTE => seal_output_response(&body),
        _ => json!({ "error": format!("no handler for {route}") }),
    })
}

fn verify_response(body: &Value) -> Value {
    let packed = body["packed_list"]
        .as_str()
        .and_then(|hex_list| hex::decode(hex_list).ok())
        .and_then(|bytes| FakePackedList::from_bytes(&bytes).ok());
    let Some(packed) = packed else {
        return json!({ "status": "error", "data": [], "error": "unreadable packed list" });
    };

    let signature = format!(
        "{}-{}-{}-",
        body["account_addr"].as_str().unwrap_or_default(),
        body["security_zone"],
        body["chain_id"]
    );
    let data: Vec<Value> = packed
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let seed = format!("{index}:{}:{}:{signature}", item.bits, item.value);
            let ct_hash = U256::from_be_bytes(keccak256(seed.as_bytes()).0);
            json!({ "ct_hash": ct_hash.to_string(), "signature": signature })
        })
        .collect();

    json!({ "status": "success", "data": data, "error": null })
}

fn seal_output_response(body: &Value) -> Value {
    match body["ct_tempkey"].as_str().map(hex::decode) {
        Some(Ok(data)) => json!({
            "sealed": { "data": data, "public_key": [], "nonce": [] },
            "error_message": null,
        }),
        _ => json!({ "sealed": null, "error_message": "invalid ct_tempkey" }),
    }
}
