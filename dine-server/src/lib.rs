//! Dine-in ordering edge service
//!
//! # 架构概述
//!
//! 桌台扫码点餐服务：开台生成一次性会话，客人对会话下单，员工推进订单状态，
//! 结账聚合已出餐订单后释放桌台。
//!
//! # 模块结构
//!
//! ```text
//! dine-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── utils/         # 错误、日志、校验
//! ├── db/            # 嵌入式 SurrealDB 存储与仓储
//! ├── message/       # 事件广播器
//! ├── services/      # 会话、订单、呼叫服务
//! └── api/           # HTTP 路由和处理器
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod message;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use self::core::{Config, Server, ServerState};
pub use message::EventBroadcaster;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置环境 (dotenv, 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ____  _            ____
   / __ \(_)___  ___  /  _/___
  / / / / / __ \/ _ \ / // __ \
 / /_/ / / / / /  __// // / / /
/_____/_/_/ /_/\___/___/_/ /_/
    "#
    );
}
