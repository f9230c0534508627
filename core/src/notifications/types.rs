//! Notifications API payloads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelType {
    #[default]
    Webhook,
}

/// Severity levels a channel can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSeverity {
    #[serde(alias = "CRITICAL")]
    Critical,
    #[serde(alias = "HIGH")]
    High,
    #[serde(alias = "MEDIUM")]
    Medium,
    #[serde(alias = "LOW")]
    Low,
}

/// Findings of these types from this provider are forwarded by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSource {
    pub provider_name: String,
    #[serde(default)]
    pub finding_types: Vec<String>,
}

/// Request body for creating or replacing a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub severity: BTreeSet<ChannelSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alert_source: Vec<AlertSource>,
}

impl NotificationChannel {
    pub fn webhook(name: &str, endpoint: &str) -> Self {
        Self {
            name: name.to_string(),
            channel_type: ChannelType::Webhook,
            endpoint: endpoint.to_string(),
            description: None,
            severity: BTreeSet::new(),
            enabled: None,
            alert_source: Vec::new(),
        }
    }
}

/// Severity filter as reported back by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelSeverityFlags {
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub high: bool,
    #[serde(default)]
    pub medium: bool,
    #[serde(default)]
    pub low: bool,
}

impl ChannelSeverityFlags {
    pub fn contains(&self, severity: ChannelSeverity) -> bool {
        match severity {
            ChannelSeverity::Critical => self.critical,
            ChannelSeverity::High => self.high,
            ChannelSeverity::Medium => self.medium,
            ChannelSeverity::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub severity: ChannelSeverityFlags,
    pub endpoint: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub alert_source: Vec<AlertSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelsList {
    #[serde(default)]
    pub channels: Vec<ChannelInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChannelsResponse {
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateChannelResponse {
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteChannelsResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteChannelResponse {
    pub channel_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetChannelResponse {
    pub channel: ChannelInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestChannelResponse {
    pub test: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyGet {
    pub public_key: String,
}
