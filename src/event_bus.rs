// 事件总线 - 核心状态变化的发布/订阅出口
//
// 外壳层（托盘、前端面板）订阅这里的事件观察核心,
// 而不直接耦合到 AssistantActor

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// 核心对外广播的事件
#[derive(Debug, Clone)]
pub enum AppEvent {
    // --- 手势事件 ---

    /// 双击手势触发
    TriggerFired {
        at: DateTime<Utc>,
    },

    // --- 浮窗事件 ---

    /// 浮窗已显示
    OverlayShown {
        /// 捕获到的选区字符数
        selection_chars: usize,
    },

    /// 浮窗已关闭
    OverlayClosed,

    // --- 补全事件 ---

    /// 补全请求已发出
    CompletionStarted,

    /// 补全结果已应用到浮窗
    CompletionFinished {
        success: bool,
    },

    /// 过期结果被丢弃（实例令牌不匹配）
    CompletionDiscarded,

    // --- 系统事件 ---

    /// 配置更新事件
    ConfigUpdated,
}

/// 事件总线
///
/// broadcast 通道的薄封装;无订阅者时发布即丢弃,属正常情况
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// `capacity` 是每个订阅者的事件缓冲深度
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: AppEvent) {
        if let Ok(count) = self.sender.send(event) {
            tracing::trace!("事件已广播给 {} 个订阅者", count);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new(100);
        let mut receiver = bus.subscribe();

        bus.publish(AppEvent::CompletionStarted);

        match receiver.recv().await {
            Ok(AppEvent::CompletionStarted) => {}
            other => panic!("未收到预期事件: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_a_copy() {
        let bus = EventBus::new(100);
        let mut receiver1 = bus.subscribe();
        let mut receiver2 = bus.subscribe();

        bus.publish(AppEvent::OverlayShown { selection_chars: 42 });

        assert!(receiver1.try_recv().is_ok());
        assert!(receiver2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new(16);
        // 无订阅者时发布不应报错
        bus.publish(AppEvent::OverlayClosed);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
