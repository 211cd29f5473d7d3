// Attack orchestration API client
//
// Blocking HTTP client for the external orchestration service. Only
// the control worker calls it, never the UI thread.

use crate::app::config::API_TIMEOUT;
use crate::model::{AttackStatus, AttackType};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the orchestration API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Could not reach the service at all
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("{endpoint} returned {code}: {detail}")]
    Status {
        endpoint: String,
        code: u16,
        detail: String,
    },

    /// The body was not the JSON we expected
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Base URL is not http:// or https://
    #[error("unsupported API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Red team machine as reported by the API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VmStatus {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub role: String,
    pub status: String,
}

impl VmStatus {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Blue team target as reported by the API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    pub name: String,
    pub ip: String,
    #[serde(default)]
    pub ports: Vec<u16>,
}

/// Body of POST /api/attacks/execute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackRequest {
    pub attack_type: AttackType,
    pub source_vms: Vec<String>,
    pub target_id: String,
    pub target_port: u16,
    pub duration: u32,
    pub workers: u32,
    pub sockets: u32,
    pub enable_ip_spoofing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoofed_ips: Option<Vec<String>>,
}

/// Response of a successful launch
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttackLaunch {
    pub attack_id: String,
    pub status: AttackStatus,
    #[serde(default)]
    pub message: String,
}

/// A named source-address range offered for spoofing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpRange {
    pub name: String,
    pub range: String,
}

/// Body of POST /api/spoofing/generate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpoofRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<String>,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_ip: Option<String>,
    pub use_sequential: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpoofResponse {
    pub spoofed_ips: Vec<String>,
    pub count: usize,
}

#[derive(Deserialize)]
struct Health {
    status: String,
}

#[derive(Deserialize)]
struct RedTeam {
    vms: Vec<VmStatus>,
}

#[derive(Deserialize)]
struct BlueTeam {
    targets: Vec<TargetInfo>,
}

#[derive(Deserialize)]
struct Ranges {
    ranges: Vec<IpRange>,
}

/// Client for one orchestration service
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a client for `base_url` (http:// or https://)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let http = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.clone(),
                source,
            })?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /api/health; true when the service reports itself healthy
    pub fn health(&self) -> Result<bool, ApiError> {
        let health: Health = self.get("/api/health")?;
        Ok(health.status == "healthy")
    }

    pub fn red_team(&self) -> Result<Vec<VmStatus>, ApiError> {
        let body: RedTeam = self.get("/api/vms/red-team")?;
        Ok(body.vms)
    }

    pub fn blue_team(&self) -> Result<Vec<TargetInfo>, ApiError> {
        let body: BlueTeam = self.get("/api/vms/blue-team")?;
        Ok(body.targets)
    }

    pub fn execute(&self, request: &AttackRequest) -> Result<AttackLaunch, ApiError> {
        self.post("/api/attacks/execute", Some(request))
    }

    pub fn stop(&self, attack_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/attacks/{attack_id}/stop");
        let _: serde_json::Value = self.post::<(), _>(&path, None)?;
        Ok(())
    }

    pub fn spoofing_ranges(&self) -> Result<Vec<IpRange>, ApiError> {
        let body: Ranges = self.get("/api/spoofing/ranges")?;
        Ok(body.ranges)
    }

    pub fn generate_spoofed_ips(&self, request: &SpoofRequest) -> Result<SpoofResponse, ApiError> {
        self.post("/api/spoofing/generate", Some(request))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&endpoint)
            .send()
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        decode(endpoint, response)
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&endpoint);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        decode(endpoint, response)
    }
}

fn decode<T: DeserializeOwned>(endpoint: String, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ApiError::Status {
            endpoint,
            code: status.as_u16(),
            detail: error_detail(&body),
        });
    }

    response
        .json::<T>()
        .map_err(|source| ApiError::Decode { endpoint, source })
}

/// Human-readable failure text from an error body
///
/// The service answers failures with `{"detail": "..."}`; anything else
/// is passed through, or "Unknown error" when empty.
pub fn error_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<Detail>(body) {
        Ok(Detail {
            detail: serde_json::Value::String(text),
        }) => text,
        Ok(Detail { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Derive the live-feed URL from an http(s) base URL
pub fn feed_url(base_url: &str, attack_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{ws_base}/api/attacks/{attack_id}/ws")
}
