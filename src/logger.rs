// 日志 - 控制台 + 按天轮转文件,另附一个广播层供前端日志面板订阅

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::field::{Field, Visit};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// 推送给日志面板的单条日志
#[derive(Clone, Debug, serde::Serialize)]
pub struct LogLine {
    pub at: String,
    pub level: String,
    pub target: String,
    pub body: String,
}

/// 日志面板订阅入口
///
/// 无订阅者时发送失败属于正常情况;可整体开关
pub struct LogFeed {
    sender: broadcast::Sender<LogLine>,
    enabled: AtomicBool,
}

impl LogFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            sender,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogLine> {
        self.sender.subscribe()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn push(&self, line: LogLine) {
        if self.is_enabled() {
            let _ = self.sender.send(line);
        }
    }
}

impl Default for LogFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// 把 tracing 事件转成 LogLine 投入 LogFeed 的层
pub struct FeedLayer {
    feed: Arc<LogFeed>,
}

impl FeedLayer {
    pub fn new(feed: Arc<LogFeed>) -> Self {
        Self { feed }
    }
}

/// 只提取 message 字段的访问器
#[derive(Default)]
struct BodyVisitor(String);

impl Visit for BodyVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
            // Debug 渲染的字符串带首尾引号
            if self.0.len() >= 2 && self.0.starts_with('"') && self.0.ends_with('"') {
                self.0 = self.0[1..self.0.len() - 1].to_string();
            }
        }
    }
}

impl<S: Subscriber> Layer<S> for FeedLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = BodyVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.feed.push(LogLine {
            at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string(),
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            body: visitor.0,
        });
    }
}

/// 平台默认日志目录
pub fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    if cfg!(target_os = "macos") {
        PathBuf::from(home).join("Library/Logs/selection-assistant")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("selection-assistant").join("logs")
    } else {
        PathBuf::from(home).join(".local/share/selection-assistant/logs")
    }
}

/// 初始化全局日志:stdout + 按天轮转文件 + 日志面板广播层
///
/// 返回的 WorkerGuard 需由调用方持有到进程结束,否则文件日志会丢尾
pub fn init(feed: Arc<LogFeed>, log_dir: PathBuf) -> Result<WorkerGuard, SetGlobalDefaultError> {
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&log_dir, "app.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let timer = LocalTime::new(
        time::format_description::parse(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
        )
        .expect("日志时间格式为编译期常量"),
    );

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stdout.and(file_writer))
        .with_timer(timer)
        .with_ansi(cfg!(debug_assertions))
        .finish()
        .with(FeedLayer::new(feed));

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
