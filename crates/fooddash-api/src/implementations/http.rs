//! REST implementation of the backend interface.
//!
//! Every request reads the bearer token from client storage right before it
//! is sent, so a token written by `fooddash token set` applies to the next
//! request without restarting anything.

use crate::{ApiError, BackendInterface};
use async_trait::async_trait;
use fooddash_config::Config;
use fooddash_storage::StorageService;
use fooddash_types::{
	Delivery, DeliveryUpdate, ErrorBody, Order, OrderEnvelope, OrdersEnvelope,
	StatusUpdateRequest,
};
use reqwest::{
	header::{HeaderValue, AUTHORIZATION},
	Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Registry name of this backend.
pub const NAME: &str = "http";

pub struct HttpBackend {
	client: Client,
	base_url: String,
	storage: Arc<StorageService>,
	token_key: String,
}

impl HttpBackend {
	pub fn new(
		client: Client,
		base_url: impl Into<String>,
		storage: Arc<StorageService>,
		token_key: impl Into<String>,
	) -> Self {
		Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			storage,
			token_key: token_key.into(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
		let token = self.storage.access_token(&self.token_key).await;
		let header = bearer_value(&token.bearer_header())?;
		Ok(request.header(AUTHORIZATION, header))
	}

	async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
		let response = self
			.authorized(request)
			.await?
			.send()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;

		if response.status().is_success() {
			return Ok(response);
		}
		Err(rejection(response).await)
	}

	async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
		let response = self.send(request).await?;
		response
			.json::<T>()
			.await
			.map_err(|e| ApiError::Malformed(e.to_string()))
	}
}

/// `Authorization` value marked sensitive, so it prints as `Sensitive` in
/// debug output.
fn bearer_value(header: &str) -> Result<HeaderValue, ApiError> {
	let mut value = HeaderValue::from_str(header).map_err(|_| {
		ApiError::Configuration("Access token is not a valid header value".into())
	})?;
	value.set_sensitive(true);
	Ok(value)
}

/// Turns a non-success response into [`ApiError::Rejected`], preferring the
/// backend's `message`/`error` field over the raw body.
async fn rejection(response: Response) -> ApiError {
	let status = response.status().as_u16();
	let body = response.text().await.unwrap_or_default();
	let message = serde_json::from_str::<ErrorBody>(&body)
		.ok()
		.and_then(|b| b.message)
		.unwrap_or_else(|| body.trim().to_string());
	ApiError::Rejected { status, message }
}

/// Accepts a bare delivery, `{ "delivery": .. }`, or `null`.
fn parse_delivery(value: serde_json::Value) -> Result<Option<Delivery>, ApiError> {
	let value = match value {
		serde_json::Value::Object(mut map) if map.contains_key("delivery") => map
			.remove("delivery")
			.unwrap_or(serde_json::Value::Null),
		other => other,
	};
	if value.is_null() {
		return Ok(None);
	}
	serde_json::from_value(value)
		.map(Some)
		.map_err(|e| ApiError::Malformed(e.to_string()))
}

#[async_trait]
impl BackendInterface for HttpBackend {
	async fn get_order(&self, order_id: u64) -> Result<Order, ApiError> {
		let request = self
			.client
			.get(self.url(&format!("/orders/getOrder/{}", order_id)));
		let envelope: OrderEnvelope = self.send_json(request).await?;
		Ok(envelope.order)
	}

	async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
		let request = self.client.get(self.url("/orders/getAll"));
		let envelope: OrdersEnvelope = self.send_json(request).await?;
		Ok(envelope.orders)
	}

	async fn update_order_status(
		&self,
		order_id: u64,
		request: &StatusUpdateRequest,
	) -> Result<Order, ApiError> {
		let request = self
			.client
			.put(self.url(&format!("/orders/update/{}", order_id)))
			.json(request);
		let envelope: OrderEnvelope = self.send_json(request).await?;
		Ok(envelope.order)
	}

	async fn get_delivery_by_user(&self, user_id: u64) -> Result<Option<Delivery>, ApiError> {
		let request = self
			.client
			.get(self.url(&format!("/delivery/getDeliveryByUser/{}", user_id)));
		let response = match self.send(request).await {
			Ok(response) => response,
			Err(ApiError::Rejected { status: 404, .. }) => return Ok(None),
			Err(e) => return Err(e),
		};

		let body = response
			.bytes()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}
		let value = serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
		parse_delivery(value)
	}

	async fn update_delivery(
		&self,
		delivery_id: u64,
		update: &DeliveryUpdate,
	) -> Result<Delivery, ApiError> {
		let request = self
			.client
			.put(self.url(&format!("/delivery/update/{}", delivery_id)))
			.json(update);
		let value: serde_json::Value = self.send_json(request).await?;
		parse_delivery(value)?
			.ok_or_else(|| ApiError::Malformed("update returned no delivery".into()))
	}
}

/// Factory function to create the HTTP backend from configuration.
pub fn create_backend(
	config: &Config,
	storage: Arc<StorageService>,
) -> Result<Box<dyn BackendInterface>, ApiError> {
	let client = Client::builder()
		.timeout(config.request_timeout())
		.build()
		.map_err(|e| ApiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

	Ok(Box::new(HttpBackend::new(
		client,
		config.api.base_url.clone(),
		storage,
		config.auth.token_key.clone(),
	)))
}
