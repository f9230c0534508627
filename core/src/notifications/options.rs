//! Per-operation parameters for [`NotificationsClient`](super::NotificationsClient).

use super::types::NotificationChannel;

#[derive(Debug, Clone, Default)]
pub struct ListAllChannelsOptions {
    pub account_id: String,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub transaction_id: Option<String>,
}

impl ListAllChannelsOptions {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateNotificationChannelOptions {
    pub account_id: String,
    pub channel: NotificationChannel,
    pub transaction_id: Option<String>,
}

impl CreateNotificationChannelOptions {
    pub fn new(account_id: &str, channel: NotificationChannel) -> Self {
        Self {
            account_id: account_id.to_string(),
            channel,
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteNotificationChannelsOptions {
    pub account_id: String,
    /// Channel ids, sent as a bare JSON array.
    pub body: Vec<String>,
    pub transaction_id: Option<String>,
}

impl DeleteNotificationChannelsOptions {
    pub fn new<I, S>(account_id: &str, channel_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            account_id: account_id.to_string(),
            body: channel_ids.into_iter().map(Into::into).collect(),
            transaction_id: None,
        }
    }
}

/// Identifies one channel; used by get, delete and test.
#[derive(Debug, Clone, Default)]
pub struct ChannelOptions {
    pub account_id: String,
    pub channel_id: String,
    pub transaction_id: Option<String>,
}

impl ChannelOptions {
    pub fn new(account_id: &str, channel_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            channel_id: channel_id.to_string(),
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateNotificationChannelOptions {
    pub account_id: String,
    pub channel_id: String,
    pub channel: NotificationChannel,
    pub transaction_id: Option<String>,
}

impl UpdateNotificationChannelOptions {
    pub fn new(account_id: &str, channel_id: &str, channel: NotificationChannel) -> Self {
        Self {
            account_id: account_id.to_string(),
            channel_id: channel_id.to_string(),
            channel,
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetPublicKeyOptions {
    pub account_id: String,
    pub transaction_id: Option<String>,
}

impl GetPublicKeyOptions {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            transaction_id: None,
        }
    }
}
