// 辅助功能探测策略 - 通过平台桥读取焦点元素的选区
//
// 平台绑定（macOS AX API 等）由外壳层实现 AccessibilityBridge 注入,
// 核心只依赖该接口,保证策略链可测试

use std::sync::Arc;

use super::{SelectionProbe, SelectionStrategy};

/// 焦点元素的只读视图
pub trait FocusedElement: Send + Sync {
    /// 元素的"选中文本"属性（若平台直接暴露）
    fn selected_text(&self) -> Option<String>;

    /// 读取选区范围标记并解析为字符串
    fn resolve_selection_range(&self) -> Option<String>;
}

/// 平台辅助功能桥
pub trait AccessibilityBridge: Send + Sync {
    /// 定位系统当前的焦点 UI 元素,失败返回 None
    fn focused_element(&self) -> Option<Box<dyn FocusedElement>>;
}

/// 策略一:读取焦点元素的选中文本属性
pub struct SelectedTextAttribute {
    bridge: Arc<dyn AccessibilityBridge>,
}

impl SelectedTextAttribute {
    pub fn new(bridge: Arc<dyn AccessibilityBridge>) -> Self {
        Self { bridge }
    }
}

impl SelectionStrategy for SelectedTextAttribute {
    fn name(&self) -> &'static str {
        "selected_text_attribute"
    }

    fn probe(&self) -> SelectionProbe {
        let Some(element) = self.bridge.focused_element() else {
            return SelectionProbe::Unavailable;
        };
        match element.selected_text() {
            Some(text) if !text.is_empty() => SelectionProbe::Found(text),
            _ => SelectionProbe::NotFound,
        }
    }
}

/// 策略二:读取选区范围标记并解析
pub struct SelectionRangeMarker {
    bridge: Arc<dyn AccessibilityBridge>,
}

impl SelectionRangeMarker {
    pub fn new(bridge: Arc<dyn AccessibilityBridge>) -> Self {
        Self { bridge }
    }
}

impl SelectionStrategy for SelectionRangeMarker {
    fn name(&self) -> &'static str {
        "selection_range_marker"
    }

    fn probe(&self) -> SelectionProbe {
        let Some(element) = self.bridge.focused_element() else {
            return SelectionProbe::Unavailable;
        };
        match element.resolve_selection_range() {
            Some(text) if !text.is_empty() => SelectionProbe::Found(text),
            _ => SelectionProbe::NotFound,
        }
    }
}

/// 无辅助功能环境的空桥（headless 或未授权时使用）
pub struct NoopAccessibilityBridge;

impl AccessibilityBridge for NoopAccessibilityBridge {
    fn focused_element(&self) -> Option<Box<dyn FocusedElement>> {
        None
    }
}
