//! 业务服务模块
//!
//! # 结构
//!
//! - [`session`] - 桌台会话生命周期 (开台、结账、重置)
//! - [`orders`] - 订单接收与状态流转
//! - [`service_calls`] - 呼叫服务
//! - [`qr`] - 会话二维码生成

pub mod orders;
pub mod qr;
pub mod service_calls;
pub mod session;

pub use orders::OrderService;
pub use service_calls::ServiceCallService;
pub use session::SessionService;
