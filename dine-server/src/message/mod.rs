//! 事件广播器
//!
//! # 消息流
//!
//! ```text
//! SessionService ─┐
//! OrderService   ─┼─▶ publish() ──▶ broadcast::Sender ──▶ 所有订阅者
//! ServiceCallSvc ─┘                                      (WebSocket 连接等)
//! ```
//!
//! 每个状态变更在持久化成功后同步调用一次 [`EventBroadcaster::publish`]。
//! 投递是尽力而为：没有订阅者、订阅者落后或断开都不会阻塞或失败调用方。

use serde::Serialize;
use tokio::sync::broadcast;

use shared::message::{EventMessage, EventName};

/// Default capacity of the broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Fan-out publisher for state-change events
///
/// Cheap to clone; every clone publishes into the same channel. Subscribers
/// that fall more than the channel capacity behind lose the oldest messages
/// (no replay).
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<EventMessage>,
}

impl EventBroadcaster {
    /// 创建默认容量的广播器
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// 创建指定容量的广播器
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event (fire-and-forget)
    ///
    /// Never blocks and never fails the caller: a send error just means no
    /// subscriber is currently connected.
    pub fn publish<T: Serialize>(&self, event: EventName, payload: &T) {
        let msg = EventMessage::new(event, payload);
        match self.tx.send(msg) {
            Ok(subscribers) => {
                tracing::debug!(event = %event, subscribers, "Event published");
            }
            Err(_) => {
                tracing::debug!(event = %event, "Event published with no subscribers");
            }
        }
    }

    /// 订阅事件流
    pub fn subscribe(&self) -> broadcast::Receiver<EventMessage> {
        self.tx.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[tokio::test]
    async fn test_publish_without_subscribers_is_swallowed() {
        let broadcaster = EventBroadcaster::new();
        // Must not panic or error in any observable way
        broadcaster.publish(
            EventName::TableActivated,
            &serde_json::json!({ "table_number": 1 }),
        );
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_events() {
        let broadcaster = EventBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        broadcaster.publish(
            EventName::OrderCreated,
            &serde_json::json!({ "table_number": 2 }),
        );

        let msg1 = rx1.recv().await.unwrap();
        let msg2 = rx2.recv().await.unwrap();
        assert_eq!(msg1.event, EventName::OrderCreated);
        assert_eq!(msg2.event, EventName::OrderCreated);
        assert_eq!(msg1.event_id, msg2.event_id);
    }

    #[tokio::test]
    async fn test_slow_subscriber_never_blocks_publisher() {
        let broadcaster = EventBroadcaster::with_capacity(4);
        let mut rx = broadcaster.subscribe();

        // Publish far past the channel capacity without ever receiving
        for _ in 0..32 {
            broadcaster.publish(
                EventName::OrderServed,
                &serde_json::json!({ "table_number": 3 }),
            );
        }

        // The lagging subscriber is told how much it missed, then resumes
        match rx.recv().await {
            Err(RecvError::Lagged(missed)) => assert!(missed > 0),
            other => panic!("expected lag error, got {other:?}"),
        }
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_after_publish_sees_nothing() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.publish(
            EventName::TableForceReset,
            &serde_json::json!({ "table_number": 4 }),
        );

        // No replay: a late subscriber starts from the next message
        let mut rx = broadcaster.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
