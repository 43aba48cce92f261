//! 桌台会话端到端测试
//!
//! 使用 ServerState::initialize 完整初始化 (临时工作目录 + 嵌入式数据库)，
//! 覆盖 开台 -> 下单 -> 出餐 -> 结账 -> 释放 的完整流程。

use dine_server::db::models::{OrderCreate, OrderItem, OrderStatus, TableStatus};
use dine_server::services::{OrderService, SessionService};
use dine_server::{AppError, Config, ServerState};
use rust_decimal::Decimal;
use shared::message::EventName;

async fn init_state(work_dir: &tempfile::TempDir) -> ServerState {
    let config = Config::with_overrides(work_dir.path().to_string_lossy().to_string(), 0);
    ServerState::initialize(&config).await
}

fn order_payload(table_number: u32, token: &str, price: i64, quantity: u32) -> OrderCreate {
    let subtotal = Decimal::from(price * quantity as i64);
    OrderCreate {
        table_number,
        items: vec![OrderItem {
            menu_item_id: "menu_item:hotpot".to_string(),
            name: "Sichuan Hotpot".to_string(),
            price: Decimal::from(price),
            quantity,
            customization: None,
            subtotal,
        }],
        total: subtotal,
        token: token.to_string(),
    }
}

#[tokio::test]
async fn test_full_session_round_trip() {
    let work_dir = tempfile::tempdir().unwrap();
    let state = init_state(&work_dir).await;

    let sessions = SessionService::from_state(&state);
    let orders = OrderService::from_state(&state);
    let mut rx = state.broadcaster.subscribe();

    // 开台
    let table = sessions.activate(5).await.unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
    let token = table.session_token.clone();
    assert!(!token.is_empty());
    assert!(table.session_url.contains(&format!("table=5&token={token}")));
    assert!(table.session_qr_image.starts_with("data:image/png;base64,"));

    // 下单: 2 x 100 = 200
    let order = orders.create(order_payload(5, &token, 100, 2)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::from(200));
    let order_id = order.id.as_ref().unwrap().to_string();

    // 出餐
    let served = orders.mark_served(&order_id).await.unwrap();
    assert_eq!(served.status, OrderStatus::Served);

    // 进入结账: 聚合已出餐订单
    let table = sessions.start_checkout(5).await.unwrap();
    assert_eq!(table.status, TableStatus::Checkout);
    assert_eq!(table.aggregate_total, Decimal::from(200));
    assert_eq!(table.order_refs, vec![order_id.clone()]);

    // 结账完成: 订单完结，桌台释放
    let table = sessions.complete_checkout(5).await.unwrap();
    assert_eq!(table.status, TableStatus::Available);
    assert!(table.session_token.is_empty());
    assert_eq!(table.aggregate_total, Decimal::ZERO);
    assert!(table.order_refs.is_empty());

    let finalized = orders
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.id.as_ref().unwrap().to_string() == order_id)
        .unwrap();
    assert_eq!(finalized.status, OrderStatus::Completed);
    assert!(finalized.completed_at.is_some());

    // 事件序列: 每次状态变更恰好一条
    let mut events = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        events.push(msg.event);
    }
    assert_eq!(
        events,
        vec![
            EventName::TableActivated,
            EventName::OrderCreated,
            EventName::OrderServed,
            EventName::TableCheckoutStarted,
            EventName::TableCheckoutCompleted,
        ]
    );
}

#[tokio::test]
async fn test_checkout_excludes_orders_cancelled_before_aggregation() {
    let work_dir = tempfile::tempdir().unwrap();
    let state = init_state(&work_dir).await;

    let sessions = SessionService::from_state(&state);
    let orders = OrderService::from_state(&state);

    let token = sessions.activate(2).await.unwrap().session_token;

    // 两单都出餐，其中一单在结账前取消
    let keep = orders.create(order_payload(2, &token, 80, 1)).await.unwrap();
    let keep_id = keep.id.as_ref().unwrap().to_string();
    orders.mark_served(&keep_id).await.unwrap();

    let dropped = orders.create(order_payload(2, &token, 50, 1)).await.unwrap();
    let dropped_id = dropped.id.as_ref().unwrap().to_string();
    orders.mark_served(&dropped_id).await.unwrap();
    orders.cancel(&dropped_id).await.unwrap();

    let table = sessions.start_checkout(2).await.unwrap();
    assert_eq!(table.aggregate_total, Decimal::from(80));
    assert_eq!(table.order_refs, vec![keep_id]);
}

#[tokio::test]
async fn test_rejected_transitions_and_bindings() {
    let work_dir = tempfile::tempdir().unwrap();
    let state = init_state(&work_dir).await;

    let sessions = SessionService::from_state(&state);
    let orders = OrderService::from_state(&state);

    // 空闲桌直接结账被拒
    assert!(matches!(
        sessions.start_checkout(3).await.unwrap_err(),
        AppError::InvalidState(_)
    ));

    // 重复开台被拒，会话保持不变
    let first = sessions.activate(4).await.unwrap();
    assert!(matches!(
        sessions.activate(4).await.unwrap_err(),
        AppError::InvalidState(_)
    ));
    let tables = sessions.list_tables().await.unwrap();
    let table = tables.iter().find(|t| t.number == 4).unwrap();
    assert_eq!(table.session_token, first.session_token);

    // 令牌不匹配: 桌台在线令牌是新生成的，"abc" 必须被拒
    assert!(matches!(
        orders
            .create(order_payload(4, "abc", 10, 1))
            .await
            .unwrap_err(),
        AppError::InvalidSessionBinding
    ));

    // 未知桌号同样返回会话绑定错误，而非 NotFound
    assert!(matches!(
        orders
            .create(order_payload(99, "abc", 10, 1))
            .await
            .unwrap_err(),
        AppError::InvalidSessionBinding
    ));
}
