// 剪贴板兜底策略 - 只读取,绝不写入

use tracing::trace;

use super::{SelectionProbe, SelectionStrategy};

/// 策略四:返回当前剪贴板文本
///
/// 每次探测时新建剪贴板句柄,避免长期占用系统剪贴板资源
pub struct ClipboardFallback;

impl ClipboardFallback {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClipboardFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for ClipboardFallback {
    fn name(&self) -> &'static str {
        "clipboard_fallback"
    }

    fn probe(&self) -> SelectionProbe {
        let mut clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => clipboard,
            Err(e) => {
                trace!("剪贴板不可用: {}", e);
                return SelectionProbe::Unavailable;
            }
        };
        match clipboard.get_text() {
            Ok(text) if !text.is_empty() => SelectionProbe::Found(text),
            Ok(_) => SelectionProbe::NotFound,
            Err(e) => {
                // 剪贴板为空或内容非文本
                trace!("剪贴板无文本内容: {}", e);
                SelectionProbe::NotFound
            }
        }
    }
}
