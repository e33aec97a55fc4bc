//! Shared helpers for integration tests
#![allow(dead_code)]

use adctl::entity::{DetectorRequest, UpdateDetectorUserInput};
use adctl::gateway::{error_reason, GatewayCall, GatewayError};
use adctl::{Confirmation, DetectorController, MockGateway, MockPlatform};
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::sync::Arc;

pub const CREATED_ID: &str = "m4ccEnIBTXsGi3mvMt9p";
pub const DETECTOR_ID: &str = "detectorID";
pub const LAST_UPDATE_TIME: i64 = 1589441737319;
pub const NAME_CLASH: &str = "Cannot create anomaly detector with name [testdata-detector] as it's already used by detector [wR_1XXMBs3q1IVz33Sk-]";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/ad")
        .join(name)
}

pub fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", name, e))
}

pub fn create_request() -> DetectorRequest {
    serde_json::from_slice(&fixture("create_request.json")).unwrap()
}

pub fn update_request() -> UpdateDetectorUserInput {
    serde_json::from_slice(&fixture("update_request.json")).unwrap()
}

/// The error a real gateway reports for the duplicate-name fixture
pub fn name_clash() -> GatewayError {
    let body = String::from_utf8(fixture("create_failed_response.json")).unwrap();
    GatewayError::remote(Some(400), error_reason(&body))
}

/// Controller wired to recording doubles, answering prompts from `input`
pub struct Harness {
    pub controller: DetectorController,
    pub gateway: Arc<MockGateway>,
    pub platform: Arc<MockPlatform>,
}

impl Harness {
    pub fn new(input: &str) -> Self {
        let gateway = Arc::new(MockGateway::new());
        let platform = Arc::new(MockPlatform::new());
        let prompt = Confirmation::new(Cursor::new(input.as_bytes().to_vec()), io::sink());
        let controller = DetectorController::new(prompt, platform.clone(), gateway.clone());
        Self {
            controller,
            gateway,
            platform,
        }
    }

    /// Recorded calls with payloads reduced to the detector name
    pub fn call_names(&self) -> Vec<String> {
        self.gateway
            .calls()
            .into_iter()
            .map(|call| match call {
                GatewayCall::Create(payload) => format!("create:{}", payload.name),
                GatewayCall::Get(id) => format!("get:{}", id),
                GatewayCall::Update(id, _) => format!("update:{}", id),
                GatewayCall::Delete(id) => format!("delete:{}", id),
                GatewayCall::Start(id) => format!("start:{}", id),
                GatewayCall::Stop(id) => format!("stop:{}", id),
                GatewayCall::Search(pattern) => format!("search:{}", pattern),
            })
            .collect()
    }
}
