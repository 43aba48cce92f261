//! Real-time event channel message types
//!
//! 服务端每次状态变更成功后广播一条 [`EventMessage`]，
//! 订阅端（出餐屏、员工看板）按事件名分发处理。
//!
//! Delivery is best-effort: there is no replay, and clients are expected to
//! reconcile by re-fetching after a reconnect.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Event catalog
///
/// Every mutating operation on tables, orders and service calls publishes
/// exactly one of these after persistence succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    /// 开台（生成会话）
    #[serde(rename = "table.activated")]
    TableActivated,
    /// 进入结账
    #[serde(rename = "table.checkoutStarted")]
    TableCheckoutStarted,
    /// 结账完成，桌台释放
    #[serde(rename = "table.checkoutCompleted")]
    TableCheckoutCompleted,
    /// 强制重置桌台
    #[serde(rename = "table.forceReset")]
    TableForceReset,
    /// 新订单
    #[serde(rename = "order.created")]
    OrderCreated,
    /// 订单已出餐
    #[serde(rename = "order.served")]
    OrderServed,
    /// 订单已完成（结账）
    #[serde(rename = "order.completed")]
    OrderCompleted,
    /// 订单已取消
    #[serde(rename = "order.cancelled")]
    OrderCancelled,
    /// 呼叫服务
    #[serde(rename = "service_call.created")]
    ServiceCallCreated,
    /// 呼叫已处理
    #[serde(rename = "service_call.handled")]
    ServiceCallHandled,
}

impl EventName {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::TableActivated => "table.activated",
            EventName::TableCheckoutStarted => "table.checkoutStarted",
            EventName::TableCheckoutCompleted => "table.checkoutCompleted",
            EventName::TableForceReset => "table.forceReset",
            EventName::OrderCreated => "order.created",
            EventName::OrderServed => "order.served",
            EventName::OrderCompleted => "order.completed",
            EventName::OrderCancelled => "order.cancelled",
            EventName::ServiceCallCreated => "service_call.created",
            EventName::ServiceCallHandled => "service_call.handled",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broadcast message envelope
///
/// `payload` carries the affected record (orders, service calls) or a minimal
/// identifying payload such as `{"tableNumber": 5}` for table transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// 消息追踪 ID
    pub event_id: Uuid,
    pub event: EventName,
    pub payload: serde_json::Value,
}

impl EventMessage {
    /// Create a new event message from any serializable payload
    pub fn new<T: Serialize>(event: EventName, payload: &T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event,
            payload: serde_json::to_value(payload).expect("Failed to serialize event payload"),
        }
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// 序列化为 JSON 文本（WebSocket 帧）
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_wire_format() {
        assert_eq!(EventName::TableActivated.to_string(), "table.activated");
        assert_eq!(
            serde_json::to_string(&EventName::TableCheckoutStarted).unwrap(),
            "\"table.checkoutStarted\""
        );
        let parsed: EventName = serde_json::from_str("\"order.cancelled\"").unwrap();
        assert_eq!(parsed, EventName::OrderCancelled);
    }

    #[test]
    fn test_event_message_round_trip() {
        let msg = EventMessage::new(
            EventName::TableActivated,
            &serde_json::json!({ "table_number": 5 }),
        );
        assert!(!msg.event_id.is_nil());

        let json = msg.to_json().unwrap();
        let recovered = EventMessage::from_json(&json).unwrap();
        assert_eq!(recovered.event, EventName::TableActivated);
        assert_eq!(recovered.event_id, msg.event_id);
        assert_eq!(recovered.payload["table_number"], 5);
    }

    #[test]
    fn test_parse_payload() {
        #[derive(Serialize, Deserialize)]
        struct TablePayload {
            table_number: u32,
        }

        let msg = EventMessage::new(EventName::TableForceReset, &TablePayload { table_number: 3 });
        let parsed: TablePayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.table_number, 3);
    }
}
