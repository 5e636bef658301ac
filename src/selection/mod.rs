// 选区捕获 - 按序尝试多个只读策略,首个命中即返回
//
// 策略链: 焦点元素选中文本属性 -> 选区范围标记解析 -> 剪贴板兜底
// 全链路同步、有界延迟、不发起网络请求、不改写剪贴板

pub mod accessibility;
pub mod clipboard;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::models::CapturedSelection;

pub use accessibility::{
    AccessibilityBridge, FocusedElement, SelectedTextAttribute, SelectionRangeMarker,
};
pub use clipboard::ClipboardFallback;

/// 单个策略的探测结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionProbe {
    /// 命中,返回选中文本
    Found(String),
    /// 策略可用但当前没有选区
    NotFound,
    /// 策略在当前环境不可用（如无焦点元素、无辅助功能权限）
    Unavailable,
}

/// 捕获策略接口
pub trait SelectionStrategy: Send + Sync {
    /// 策略名（用于日志）
    fn name(&self) -> &'static str;

    /// 探测当前选区,必须只读且有界延迟
    fn probe(&self) -> SelectionProbe;
}

/// 选区捕获器 - 持有有序策略链
pub struct SelectionCapture {
    strategies: Vec<Box<dyn SelectionStrategy>>,
}

impl SelectionCapture {
    pub fn new(strategies: Vec<Box<dyn SelectionStrategy>>) -> Self {
        Self { strategies }
    }

    /// 默认策略链:辅助功能两级探测 + 剪贴板兜底
    pub fn with_default_chain(bridge: Arc<dyn AccessibilityBridge>) -> Self {
        Self::new(vec![
            Box::new(SelectedTextAttribute::new(Arc::clone(&bridge))),
            Box::new(SelectionRangeMarker::new(bridge)),
            Box::new(ClipboardFallback::new()),
        ])
    }

    /// 按序执行策略,首个 Found 短路返回
    ///
    /// 所有策略都未命中时返回 None（CaptureUnavailable,对用户静默）
    pub fn capture(&self) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.probe() {
                SelectionProbe::Found(text) => {
                    debug!("选区捕获命中: 策略 {} ({} 字符)", strategy.name(), text.chars().count());
                    return Some(text);
                }
                SelectionProbe::NotFound => {
                    trace!("策略 {} 无选区,继续下一策略", strategy.name());
                }
                SelectionProbe::Unavailable => {
                    trace!("策略 {} 不可用,继续下一策略", strategy.name());
                }
            }
        }
        debug!("所有捕获策略均未命中");
        None
    }

    /// 捕获并打上时间戳（供请求周期持有）
    pub fn capture_selection(&self) -> CapturedSelection {
        CapturedSelection::new(self.capture().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// 记录自己是否被调用过的桩策略
    struct StubStrategy {
        name: &'static str,
        result: SelectionProbe,
        invoked: Arc<AtomicBool>,
    }

    impl StubStrategy {
        fn new(name: &'static str, result: SelectionProbe) -> (Box<Self>, Arc<AtomicBool>) {
            let invoked = Arc::new(AtomicBool::new(false));
            (
                Box::new(Self {
                    name,
                    result,
                    invoked: Arc::clone(&invoked),
                }),
                invoked,
            )
        }
    }

    impl SelectionStrategy for StubStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn probe(&self) -> SelectionProbe {
            self.invoked.store(true, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[test]
    fn test_first_found_short_circuits() {
        let (first, first_hit) = StubStrategy::new("fail", SelectionProbe::Unavailable);
        let (second, second_hit) =
            StubStrategy::new("hit", SelectionProbe::Found("选中的文本".to_string()));
        let (third, third_hit) = StubStrategy::new("later", SelectionProbe::Found("别的".to_string()));

        let capture = SelectionCapture::new(vec![first, second, third]);
        let result = capture.capture();

        assert_eq!(result.as_deref(), Some("选中的文本"));
        assert!(first_hit.load(Ordering::SeqCst), "第一个策略应被执行");
        assert!(second_hit.load(Ordering::SeqCst), "第二个策略应被执行");
        assert!(!third_hit.load(Ordering::SeqCst), "命中后的策略不得再执行");
    }

    #[test]
    fn test_strategies_execute_in_declared_order() {
        use std::sync::Mutex;

        struct OrderedStrategy {
            name: &'static str,
            log: Arc<Mutex<Vec<&'static str>>>,
        }

        impl SelectionStrategy for OrderedStrategy {
            fn name(&self) -> &'static str {
                self.name
            }

            fn probe(&self) -> SelectionProbe {
                self.log.lock().unwrap().push(self.name);
                SelectionProbe::NotFound
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let capture = SelectionCapture::new(vec![
            Box::new(OrderedStrategy { name: "attribute", log: Arc::clone(&log) }),
            Box::new(OrderedStrategy { name: "range", log: Arc::clone(&log) }),
            Box::new(OrderedStrategy { name: "clipboard", log: Arc::clone(&log) }),
        ]);

        assert!(capture.capture().is_none());
        assert_eq!(*log.lock().unwrap(), vec!["attribute", "range", "clipboard"]);
    }

    #[test]
    fn test_all_miss_yields_empty_selection() {
        let (only, _) = StubStrategy::new("miss", SelectionProbe::NotFound);
        let capture = SelectionCapture::new(vec![only]);

        let selection = capture.capture_selection();
        assert!(selection.text.is_empty(), "全部未命中时应得到空文本");
    }
}
