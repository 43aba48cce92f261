use std::sync::Arc;

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::message::EventName;

use crate::core::Config;
use crate::db::{DbService, seed};
use crate::message::EventBroadcaster;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是服务的核心数据结构，使用 Arc 实现浅拷贝，
/// 每个请求处理器克隆一份即可访问数据库和事件广播器。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | broadcaster | Arc<EventBroadcaster> | 事件广播器 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 事件广播器
    pub broadcaster: Arc<EventBroadcaster>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/dinein.db)
    /// 3. 事件广播器
    /// 4. 桌台播种 (保证 1..=table_count 号桌存在)
    ///
    /// # Panics
    ///
    /// 数据库初始化或播种失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("dinein.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let broadcaster = Arc::new(EventBroadcaster::with_capacity(
            config.event_channel_capacity,
        ));

        let state = Self {
            config: config.clone(),
            db: db_service.db,
            broadcaster,
        };

        seed::seed_tables(&state.db, state.config.table_count)
            .await
            .expect("Failed to seed dining tables");

        state
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取事件广播器
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// 发布事件 (fire-and-forget)
    pub fn publish_event<T: Serialize>(&self, event: EventName, payload: &T) {
        self.broadcaster.publish(event, payload);
    }
}
