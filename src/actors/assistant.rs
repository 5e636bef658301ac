// 助手 Actor - 使用Actor模式管理手势与浮窗状态
//
// GestureState、OverlayState 和未完成请求都只归本 Actor 所有,
// 两个按键监视器、外显"打开"动作、失焦通知与补全结果
// 全部以消息投递,消除锁与竞态

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::event_bus::{AppEvent, EventBus};
use crate::gesture::GestureDetector;
use crate::llm::{build_command, CompletionApi, CompletionError};
use crate::models::{AssistantConfig, KeyEvent};
use crate::overlay::{OverlayController, OverlayState, OverlaySurface};
use crate::selection::SelectionCapture;
use crate::settings::SettingsManager;

/// 未完成的补全请求
///
/// 逻辑上同一时刻至多一个为"当前";新触发或新提交使旧请求失效,
/// 但不取消其在途网络调用,迟到的结果靠实例令牌比对丢弃
#[derive(Debug)]
pub struct PendingRequest {
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub instance_token: Uuid,
}

/// 助手命令
pub enum AssistantCommand {
    /// 原始按键事件（两个监视器共用的入口）
    Key(KeyEvent),

    /// 外显的"打开"动作,与手势触发走完全相同的捕获+显示路径
    Open,

    /// 用户提交提示词
    Submit { prompt: String },

    /// 浮窗失焦
    FocusLost,

    /// 显式关闭浮窗
    Close,

    /// 补全结果送达（由请求任务跨上下文投递回来）
    CompletionDelivered {
        token: Uuid,
        outcome: Result<String, CompletionError>,
    },

    /// 读取当前浮窗状态
    GetOverlayState { reply: oneshot::Sender<OverlayState> },

    /// 重新读取配置（手势窗口热更新）
    ReloadSettings { reply: oneshot::Sender<()> },

    /// 健康检查（Ping）
    HealthCheck { reply: oneshot::Sender<()> },
}

/// 助手 Actor（无需外层Mutex）
pub struct AssistantActor {
    receiver: mpsc::Receiver<AssistantCommand>,
    /// 供请求任务把结果投递回本 Actor
    self_sender: mpsc::Sender<AssistantCommand>,
    detector: GestureDetector,
    capture: SelectionCapture,
    overlay: OverlayController,
    completion: Arc<dyn CompletionApi>,
    settings: Arc<SettingsManager>,
    event_bus: Arc<EventBus>,
    pending: Option<PendingRequest>,
}

impl AssistantActor {
    /// 创建新的Actor
    pub fn new(
        config: &AssistantConfig,
        capture: SelectionCapture,
        surface: Box<dyn OverlaySurface>,
        completion: Arc<dyn CompletionApi>,
        settings: Arc<SettingsManager>,
        event_bus: Arc<EventBus>,
    ) -> (Self, AssistantHandle) {
        let (sender, receiver) = mpsc::channel(200);
        let detector = GestureDetector::new(
            config.gesture.trigger_key,
            Duration::from_millis(config.gesture.debounce_window_ms),
        );
        let overlay = OverlayController::new(surface, config.overlay.max_text_width);
        let actor = Self {
            receiver,
            self_sender: sender.clone(),
            detector,
            capture,
            overlay,
            completion,
            settings,
            event_bus,
            pending: None,
        };
        let handle = AssistantHandle { sender };
        (actor, handle)
    }

    /// 运行Actor（在单独的任务中运行）
    pub async fn run(mut self) {
        info!("助手 Actor 已启动");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                AssistantCommand::Key(event) => {
                    if let Some(trigger) = self.detector.on_event(&event) {
                        self.event_bus.publish(AppEvent::TriggerFired { at: Utc::now() });
                        debug!("手势触发: {:?}", trigger.at);
                        self.open_overlay();
                    }
                }

                AssistantCommand::Open => {
                    self.open_overlay();
                }

                AssistantCommand::Submit { prompt } => {
                    self.submit(prompt);
                }

                AssistantCommand::FocusLost => {
                    debug!("浮窗失焦,自动关闭");
                    self.close_overlay();
                }

                AssistantCommand::Close => {
                    self.close_overlay();
                }

                AssistantCommand::CompletionDelivered { token, outcome } => {
                    self.apply_completion(token, outcome);
                }

                AssistantCommand::GetOverlayState { reply } => {
                    let _ = reply.send(self.overlay.state().clone());
                }

                AssistantCommand::ReloadSettings { reply } => {
                    let config = self.settings.get().await;
                    self.detector
                        .set_window(Duration::from_millis(config.gesture.debounce_window_ms));
                    self.event_bus.publish(AppEvent::ConfigUpdated);
                    let _ = reply.send(());
                }

                AssistantCommand::HealthCheck { reply } => {
                    // 立即响应，表明Actor正常运行
                    let _ = reply.send(());
                }
            }
        }

        info!("助手 Actor 已停止");
    }

    /// 捕获选区并显示浮窗（手势触发与外显打开的公共路径）
    fn open_overlay(&mut self) {
        // 新触发使先前未完成请求的结果失效;其网络调用继续,结果到达后被丢弃
        if self.pending.take().is_some() {
            debug!("新触发使先前的未完成请求失效");
        }

        let selection = self.capture.capture_selection();
        self.event_bus.publish(AppEvent::OverlayShown {
            selection_chars: selection.text.chars().count(),
        });
        self.overlay.show(selection.text);
    }

    /// 构建指令并把补全调用移出状态上下文
    fn submit(&mut self, prompt: String) {
        if !self.overlay.is_visible() {
            warn!("浮窗不可见,忽略提交");
            return;
        }

        let command = build_command(&self.overlay.state().displayed_text, &prompt);
        self.overlay.begin_loading(&prompt);

        let token = Uuid::new_v4();
        self.pending = Some(PendingRequest {
            command: command.clone(),
            started_at: Utc::now(),
            instance_token: token,
        });
        self.event_bus.publish(AppEvent::CompletionStarted);

        // 出站请求是唯一的无界时长操作,不得阻塞本 Actor;
        // 完成后以消息形式带令牌送回
        let api = Arc::clone(&self.completion);
        let tx = self.self_sender.clone();
        tokio::spawn(async move {
            let outcome = api.complete(&command).await;
            let _ = tx
                .send(AssistantCommand::CompletionDelivered { token, outcome })
                .await;
        });
    }

    /// 仅当实例令牌仍与当前请求匹配时应用结果
    fn apply_completion(&mut self, token: Uuid, outcome: Result<String, CompletionError>) {
        match &self.pending {
            Some(pending) if pending.instance_token == token => {
                self.pending = None;
                let success = outcome.is_ok();
                let text = match outcome {
                    Ok(answer) => answer,
                    Err(e) => format!("Error: {}", e),
                };
                self.overlay.finish(text);
                self.event_bus
                    .publish(AppEvent::CompletionFinished { success });
            }
            _ => {
                debug!("丢弃过期的补全结果: token={}", token);
                self.event_bus.publish(AppEvent::CompletionDiscarded);
            }
        }
    }

    fn close_overlay(&mut self) {
        // 关闭即结束会话:在途请求的结果此后一律按过期丢弃
        self.pending = None;
        self.overlay.close();
        self.event_bus.publish(AppEvent::OverlayClosed);
    }
}

/// 助手 Handle（用于与Actor通信，可克隆）
#[derive(Clone)]
pub struct AssistantHandle {
    sender: mpsc::Sender<AssistantCommand>,
}

impl AssistantHandle {
    /// 投递一个原始按键事件（两个监视器共用）
    pub async fn key_event(&self, event: KeyEvent) -> Result<()> {
        self.sender
            .send(AssistantCommand::Key(event))
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 外显的"打开"动作
    pub async fn open(&self) -> Result<()> {
        self.sender
            .send(AssistantCommand::Open)
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 提交提示词
    pub async fn submit(&self, prompt: &str) -> Result<()> {
        self.sender
            .send(AssistantCommand::Submit {
                prompt: prompt.to_string(),
            })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 浮窗失焦通知
    pub async fn focus_lost(&self) -> Result<()> {
        self.sender
            .send(AssistantCommand::FocusLost)
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 显式关闭浮窗
    pub async fn close(&self) -> Result<()> {
        self.sender
            .send(AssistantCommand::Close)
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 读取当前浮窗状态
    pub async fn overlay_state(&self) -> Result<OverlayState> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(AssistantCommand::GetOverlayState { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 重新读取配置
    pub async fn reload_settings(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(AssistantCommand::ReloadSettings { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 健康检查
    /// 返回true表示Actor正常运行，false表示Actor无响应或已停止
    /// 超时时间为5秒
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();

        if self
            .sender
            .send(AssistantCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            warn!("助手 Actor 健康检查失败: 通道已关闭");
            return false;
        }

        match tokio::time::timeout(Duration::from_secs(5), rx).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                warn!("助手 Actor 健康检查失败: Actor已停止");
                false
            }
            Err(_) => {
                warn!("助手 Actor 健康检查失败: 超时(5秒)");
                false
            }
        }
    }
}
