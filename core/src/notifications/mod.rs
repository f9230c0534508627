//! Notifications API: alert channels, channel tests and the signing key.

mod options;
mod types;

pub use options::*;
pub use types::*;

use crate::auth::Authenticator;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::request::{require, require_list, Endpoint, RequestSpec};
use crate::response::DetailedResponse;
use crate::service::BaseService;
use crate::transport::{Transport, UreqTransport};

pub const SERVICE_NAME: &str = "NOTIFICATIONS_API";
pub const DEFAULT_SERVICE_URL: &str = "https://us-south.secadvisor.cloud.ibm.com/notifications";

const TRANSACTION_ID: &str = "Transaction-Id";

const LIST_ALL_CHANNELS: Endpoint = Endpoint::new(
    "list_all_channels",
    HttpMethod::Get,
    "/v1/{account_id}/notifications/channels",
);
const CREATE_CHANNEL: Endpoint = Endpoint::new(
    "create_notification_channel",
    HttpMethod::Post,
    "/v1/{account_id}/notifications/channels",
);
const DELETE_CHANNELS: Endpoint = Endpoint::new(
    "delete_notification_channels",
    HttpMethod::Delete,
    "/v1/{account_id}/notifications/channels",
);
const DELETE_CHANNEL: Endpoint = Endpoint::new(
    "delete_notification_channel",
    HttpMethod::Delete,
    "/v1/{account_id}/notifications/channels/{channel_id}",
);
const GET_CHANNEL: Endpoint = Endpoint::new(
    "get_notification_channel",
    HttpMethod::Get,
    "/v1/{account_id}/notifications/channels/{channel_id}",
);
const UPDATE_CHANNEL: Endpoint = Endpoint::new(
    "update_notification_channel",
    HttpMethod::Put,
    "/v1/{account_id}/notifications/channels/{channel_id}",
);
const TEST_CHANNEL: Endpoint = Endpoint::new(
    "test_notification_channel",
    HttpMethod::Get,
    "/v1/{account_id}/notifications/channels/{channel_id}/test",
);
const GET_PUBLIC_KEY: Endpoint = Endpoint::new(
    "get_public_key",
    HttpMethod::Get,
    "/v1/{account_id}/notifications/public_key",
);

/// Client for the Notifications API.
#[derive(Debug, Clone)]
pub struct NotificationsClient<A, T = UreqTransport> {
    service: BaseService<A, T>,
}

impl<A: Authenticator> NotificationsClient<A, UreqTransport> {
    /// Client backed by the default `ureq` transport.
    pub fn new(config: ServiceConfig, authenticator: A) -> Self {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, authenticator, transport)
    }

    /// Client configured from `NOTIFICATIONS_API_*` environment variables.
    pub fn from_env(authenticator: A) -> Result<Self> {
        let config = ServiceConfig::from_env(SERVICE_NAME, DEFAULT_SERVICE_URL)?;
        Ok(Self::new(config, authenticator))
    }
}

impl<A: Authenticator, T: Transport> NotificationsClient<A, T> {
    pub fn with_transport(config: ServiceConfig, authenticator: A, transport: T) -> Self {
        Self {
            service: BaseService::new(config, authenticator, transport),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        self.service.config()
    }

    pub async fn list_all_channels(&self, options: &ListAllChannelsOptions) -> Result<DetailedResponse<ChannelsList>> {
        let spec = RequestSpec::new(LIST_ALL_CHANNELS)
            .path("account_id", &options.account_id)
            .query("limit", options.limit)
            .query("skip", options.skip)
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn create_notification_channel(
        &self,
        options: &CreateNotificationChannelOptions,
    ) -> Result<DetailedResponse<CreateChannelsResponse>> {
        validate_channel(&options.channel)?;
        let spec = RequestSpec::new(CREATE_CHANNEL)
            .path("account_id", &options.account_id)
            .json_body(&options.channel)?
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    /// Delete several channels at once.
    pub async fn delete_notification_channels(
        &self,
        options: &DeleteNotificationChannelsOptions,
    ) -> Result<DetailedResponse<BulkDeleteChannelsResponse>> {
        require_list("body", &options.body)?;
        let spec = RequestSpec::new(DELETE_CHANNELS)
            .path("account_id", &options.account_id)
            .json_body(&options.body)?
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn delete_notification_channel(
        &self,
        options: &ChannelOptions,
    ) -> Result<DetailedResponse<DeleteChannelResponse>> {
        self.service.send_json(channel_spec(DELETE_CHANNEL, options)).await
    }

    pub async fn get_notification_channel(
        &self,
        options: &ChannelOptions,
    ) -> Result<DetailedResponse<GetChannelResponse>> {
        self.service.send_json(channel_spec(GET_CHANNEL, options)).await
    }

    pub async fn update_notification_channel(
        &self,
        options: &UpdateNotificationChannelOptions,
    ) -> Result<DetailedResponse<UpdateChannelResponse>> {
        validate_channel(&options.channel)?;
        let spec = RequestSpec::new(UPDATE_CHANNEL)
            .path("account_id", &options.account_id)
            .path("channel_id", &options.channel_id)
            .json_body(&options.channel)?
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    /// Ask the service to deliver a test notification through the channel.
    pub async fn test_notification_channel(
        &self,
        options: &ChannelOptions,
    ) -> Result<DetailedResponse<TestChannelResponse>> {
        self.service.send_json(channel_spec(TEST_CHANNEL, options)).await
    }

    /// Key used to verify signed notification payloads.
    pub async fn get_public_key(&self, options: &GetPublicKeyOptions) -> Result<DetailedResponse<PublicKeyGet>> {
        let spec = RequestSpec::new(GET_PUBLIC_KEY)
            .path("account_id", &options.account_id)
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }
}

fn channel_spec(endpoint: Endpoint, options: &ChannelOptions) -> RequestSpec {
    RequestSpec::new(endpoint)
        .path("account_id", &options.account_id)
        .path("channel_id", &options.channel_id)
        .header(TRANSACTION_ID, options.transaction_id.as_deref())
}

fn validate_channel(channel: &NotificationChannel) -> Result<()> {
    require("name", &channel.name)?;
    require("endpoint", &channel.endpoint)
}
