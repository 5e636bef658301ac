// 手势检测 - 指定修饰键的双击状态机
//
// 只关注一个指定键的按下边沿,释放和其它键一律忽略
// 状态机本身不持锁:所有事件经由 AssistantActor 串行投递

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::models::{KeyEvent, KeyTransition, ModifierKey, Trigger};

/// 同一次物理按键被两个监视器重复上报的判定阈值
///
/// 两个事件源（进程内 + 系统级）对同一次按下的投递间隔远小于
/// 人手双击的间隔,落在该阈值内的按下视为重复投递并丢弃
const DUPLICATE_EPSILON: Duration = Duration::from_millis(30);

/// 手势状态（仅由 GestureDetector 在每个按键事件上修改）
#[derive(Debug, Default)]
pub struct GestureState {
    /// 首次按下的时间戳（Some 即 Armed 状态,对应 pendingCount == 1）
    armed_at: Option<Instant>,
    /// 最近一次被接受的按下（用于重复投递去重）
    last_press_at: Option<Instant>,
    /// 最近一次成功触发的时间戳
    last_trigger_at: Option<Instant>,
}

/// 双击手势检测器
///
/// Idle --按下--> Armed（记录时间戳）
/// Armed --窗口内再次按下--> Idle,发出 Trigger
/// Armed --超窗后按下--> Armed（以新按下重新计时,pendingCount 重置为 1）
pub struct GestureDetector {
    watched: ModifierKey,
    window: Duration,
    state: GestureState,
}

impl GestureDetector {
    pub fn new(watched: ModifierKey, window: Duration) -> Self {
        Self {
            watched,
            window,
            state: GestureState::default(),
        }
    }

    /// 处理一个按键事件,双击成立时返回 Trigger
    pub fn on_event(&mut self, event: &KeyEvent) -> Option<Trigger> {
        if event.key != self.watched || event.transition != KeyTransition::Press {
            return None;
        }

        // 重复投递去重:不更新任何状态,保证不会双触发
        if let Some(last) = self.state.last_press_at {
            if event.at.duration_since(last) < DUPLICATE_EPSILON {
                trace!("忽略重复投递的按下事件: source={:?}", event.source);
                return None;
            }
        }
        self.state.last_press_at = Some(event.at);

        match self.state.armed_at {
            None => {
                // Idle -> Armed
                self.state.armed_at = Some(event.at);
                None
            }
            Some(armed_at) => {
                let gap = event.at.duration_since(armed_at);
                if gap < self.window {
                    // 双击成立,回到 Idle
                    self.state.armed_at = None;
                    self.state.last_trigger_at = Some(event.at);
                    debug!("双击手势触发: 间隔 {:?}", gap);
                    Some(Trigger { at: event.at })
                } else {
                    // 窗口已过,本次按下视为新的首次按下
                    self.state.armed_at = Some(event.at);
                    None
                }
            }
        }
    }

    /// 当前是否处于 Armed 状态（即 pendingCount == 1）
    pub fn is_armed(&self) -> bool {
        self.state.armed_at.is_some()
    }

    /// 最近一次触发的时间戳
    pub fn last_trigger_at(&self) -> Option<Instant> {
        self.state.last_trigger_at
    }

    /// 运行时更新判定窗口（配置热更新）
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }
}
