// Live event feed decoding
//
// Messages arrive as JSON text frames tagged by a `type` field. This
// module turns them into typed messages, operator log lines and attack
// status changes. Nothing here touches the animation; the feed only
// moves the attack between running and finished.

use crate::model::{AttackStatus, LogLevel};
use serde::Deserialize;
use thiserror::Error;

/// Characters of tool stdout kept in a log line
pub const STDOUT_PREVIEW_CHARS: usize = 500;

/// Characters of tool stderr kept in a log line
pub const STDERR_PREVIEW_CHARS: usize = 300;

/// Errors from the live feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// Non-JSON text, unknown or missing `type`
    #[error("malformed feed message: {0}")]
    Malformed(String),

    #[error("feed read failed: {0}")]
    Read(#[source] tungstenite::Error),
}

/// Attack record carried by a `status` message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttackSnapshot {
    pub attack_id: String,
    pub status: AttackStatus,
    #[serde(default)]
    pub target_ip: Option<String>,
    #[serde(default)]
    pub target_port: Option<u16>,
}

/// One decoded feed message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Connected {
        attack_id: Option<String>,
        message: Option<String>,
    },
    Status {
        attack: AttackSnapshot,
    },
    Log {
        message: String,
        source: Option<String>,
        stdout: Option<String>,
        stderr: Option<String>,
    },
    Complete {
        attack_id: Option<String>,
        message: Option<String>,
    },
    Stopped {
        attack_id: Option<String>,
    },
    /// Keep-alive only
    Heartbeat {
        timestamp: Option<String>,
    },
}

/// A line for the operator log
#[derive(Debug, Clone, PartialEq)]
pub struct FeedLine {
    pub level: LogLevel,
    pub message: String,
    pub source: Option<String>,
}

impl FeedLine {
    fn new(level: LogLevel, message: impl Into<String>, source: Option<&str>) -> Self {
        Self {
            level,
            message: message.into(),
            source: source.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

/// Decode one text frame
pub fn parse(text: &str) -> Result<FeedMessage, FeedError> {
    serde_json::from_str(text).map_err(|e| {
        let preview: String = text.chars().take(80).collect();
        FeedError::Malformed(format!("{e} in {preview:?}"))
    })
}

/// Severity of a tool log message, from its status marker
pub fn classify(message: &str) -> LogLevel {
    if message.contains('✅') {
        LogLevel::Success
    } else if message.contains('❌') {
        LogLevel::Error
    } else {
        LogLevel::Info
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

impl FeedMessage {
    /// Attack status implied by this message, if it changes one
    pub fn attack_status(&self) -> Option<AttackStatus> {
        match self {
            Self::Status { attack } => Some(attack.status),
            Self::Complete { .. } => Some(AttackStatus::Completed),
            Self::Stopped { .. } => Some(AttackStatus::Stopped),
            _ => None,
        }
    }

    /// Operator log lines for this message; heartbeats produce none
    pub fn log_lines(&self) -> Vec<FeedLine> {
        match self {
            Self::Connected { .. } => {
                vec![FeedLine::new(LogLevel::Success, "Connected to attack stream", None)]
            }
            Self::Status { attack } => vec![FeedLine::new(
                LogLevel::Info,
                format!("Attack status: {}", attack.status.label()),
                None,
            )],
            Self::Log {
                message,
                source,
                stdout,
                stderr,
            } => {
                let source = source.as_deref();
                let mut lines = vec![FeedLine::new(classify(message), message.as_str(), source)];
                if let Some(out) = stdout.as_deref().filter(|s| !s.is_empty()) {
                    lines.push(FeedLine::new(
                        LogLevel::Info,
                        format!("Output: {}", preview(out, STDOUT_PREVIEW_CHARS)),
                        source,
                    ));
                }
                if let Some(err) = stderr.as_deref().filter(|s| !s.is_empty()) {
                    lines.push(FeedLine::new(
                        LogLevel::Warning,
                        format!("Stderr: {}", preview(err, STDERR_PREVIEW_CHARS)),
                        source,
                    ));
                }
                lines
            }
            Self::Complete { .. } => {
                vec![FeedLine::new(LogLevel::Success, "Attack completed successfully", None)]
            }
            Self::Stopped { .. } => {
                vec![FeedLine::new(LogLevel::Warning, "Attack stopped by user", None)]
            }
            Self::Heartbeat { .. } => Vec::new(),
        }
    }
}
