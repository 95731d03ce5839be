//! HTTP live broker adapter implementing `LiveBrokerPort`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use super::config::LiveBrokerConfig;
use super::error::LiveBrokerError;
use super::http_client::GatewayHttpClient;
use crate::application::ports::{
    BrokerError, LiveBrokerPort, ModifyPositionRequest, OrderAck, PlaceOrderRequest, PositionAck,
};
use crate::domain::shared::PositionId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClosePositionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    qty: Option<Decimal>,
}

/// Live broker reached through a JSON gateway.
///
/// - `POST  /orders`
/// - `POST  /positions/{id}/close`
/// - `PATCH /positions/{id}`
#[derive(Debug, Clone)]
pub struct HttpLiveBroker {
    client: GatewayHttpClient,
}

impl HttpLiveBroker {
    /// Create an adapter from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &LiveBrokerConfig) -> Result<Self, LiveBrokerError> {
        Ok(Self {
            client: GatewayHttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl LiveBrokerPort for HttpLiveBroker {
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<OrderAck, BrokerError> {
        tracing::info!(
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            side = %request.side,
            "Placing live order"
        );
        let ack: OrderAck = self.client.post("/orders", &request).await.map_err(|e| {
            tracing::error!(client_order_id = %request.client_order_id, error = %e, "Order failed");
            BrokerError::from(e)
        })?;
        tracing::info!(order_id = %ack.order_id, "Live order acknowledged");
        Ok(ack)
    }

    async fn close_position(
        &self,
        position_id: &PositionId,
        qty: Option<Decimal>,
    ) -> Result<PositionAck, BrokerError> {
        tracing::info!(%position_id, ?qty, "Closing live position");
        let path = format!("/positions/{position_id}/close");
        Ok(self
            .client
            .post(&path, &ClosePositionBody { qty })
            .await?)
    }

    async fn modify_position(
        &self,
        position_id: &PositionId,
        request: ModifyPositionRequest,
    ) -> Result<PositionAck, BrokerError> {
        tracing::info!(
            %position_id,
            sl_price = ?request.sl_price,
            tp_price = ?request.tp_price,
            "Modifying live position"
        );
        let path = format!("/positions/{position_id}");
        Ok(self.client.patch(&path, &request).await?)
    }
}
