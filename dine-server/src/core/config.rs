/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/dinein | 工作目录 |
/// | HTTP_PORT | 4000 | HTTP 服务端口 |
/// | FRONTEND_URL | http://localhost:4200 | 点餐前端地址 (二维码链接) |
/// | TABLE_COUNT | 12 | 桌台数量 (启动时播种) |
/// | ENVIRONMENT | development | 运行环境 |
/// | EVENT_CHANNEL_CAPACITY | 1024 | 事件广播通道容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/dinein HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 点餐前端地址，用于生成会话 URL 和二维码
    pub frontend_url: String,
    /// 桌台数量，启动时保证 1..=N 号桌存在
    pub table_count: u32,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 事件广播通道容量
    pub event_channel_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/dinein".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:4200".into()),
            table_count: std::env::var("TABLE_COUNT")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(12),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
