// 浮窗控制 - 唯一的 OverlayState 实例及其状态迁移
//
// 状态只在 AssistantActor 的串行上下文中变更;
// 实际窗口由外壳层实现 OverlaySurface 注入

pub mod placement;

use tracing::{debug, warn};

pub use placement::{clamp_origin, place, Point, Rect, Size};

/// 提示输入条高度
const PROMPT_BAR_HEIGHT: f64 = 44.0;
/// 加载指示行高度
const LOADING_ROW_HEIGHT: f64 = 28.0;
/// 结果文本区上下留白
const TEXT_PADDING: f64 = 16.0;
/// 文本区左右留白（浮窗总宽 = 文本最大宽度 + 两侧留白）
const HORIZONTAL_PADDING: f64 = 20.0;

/// 浮窗状态
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayState {
    pub visible: bool,
    pub loading: bool,
    pub displayed_text: String,
    pub prompt_text: String,
}

/// 应用到实际窗口的一帧完整描述
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayFrame {
    pub visible: bool,
    pub loading: bool,
    pub origin: Point,
    pub size: Size,
    pub displayed_text: String,
    pub prompt_text: String,
}

/// 实际浮窗窗口的接口（外壳层实现）
pub trait OverlaySurface: Send {
    /// 当前光标位置
    fn cursor_position(&self) -> Point;

    /// 当前屏幕可见范围
    fn screen_bounds(&self) -> Rect;

    /// 按固定最大宽度测量文本换行后的高度
    fn measure_wrapped_height(&self, text: &str, max_width: f64) -> f64;

    /// 应用一帧状态到窗口
    fn apply(&mut self, frame: &OverlayFrame);
}

/// 浮窗高度 - {是否有结果文本, 是否加载中, 换行后文本高度} 的确定性函数
///
/// 每次状态变更后重算,内容不被裁切,也不留过期空白
pub fn overlay_height(has_text: bool, loading: bool, wrapped_text_height: f64) -> f64 {
    let mut height = PROMPT_BAR_HEIGHT;
    if has_text {
        height += wrapped_text_height + TEXT_PADDING;
    }
    if loading {
        height += LOADING_ROW_HEIGHT;
    }
    height
}

/// 浮窗控制器
pub struct OverlayController {
    state: OverlayState,
    origin: Point,
    surface: Box<dyn OverlaySurface>,
    max_text_width: f64,
}

impl OverlayController {
    pub fn new(surface: Box<dyn OverlaySurface>, max_text_width: f64) -> Self {
        Self {
            state: OverlayState::default(),
            origin: Point::default(),
            surface,
            max_text_width,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// 显示浮窗,初始文本为捕获到的选区
    ///
    /// 位置在可见之前计算完毕,避免窗口先闪现再跳位
    pub fn show(&mut self, initial_text: String) {
        self.state = OverlayState {
            visible: true,
            loading: false,
            displayed_text: initial_text,
            prompt_text: String::new(),
        };

        let size = self.current_size();
        self.origin = place(
            self.surface.cursor_position(),
            size,
            self.surface.screen_bounds(),
        );
        self.sync_surface();
        debug!("浮窗已显示: origin={:?}", self.origin);
    }

    /// 进入加载状态（提交提示词后、结果返回前）
    pub fn begin_loading(&mut self, prompt: &str) {
        if !self.state.visible {
            // 不变量: loading == true 蕴含 visible == true
            warn!("浮窗不可见时收到提交,忽略");
            return;
        }
        self.state.prompt_text = prompt.to_string();
        self.state.loading = true;
        self.sync_surface();
    }

    /// 结果（或错误文本）到达,结束加载
    pub fn finish(&mut self, text: String) {
        self.state.loading = false;
        self.state.displayed_text = text;
        self.sync_surface();
    }

    /// 关闭并完全复位（显式关闭或失焦时调用）
    pub fn close(&mut self) {
        self.state = OverlayState::default();
        self.origin = Point::default();
        self.sync_surface();
        debug!("浮窗已关闭");
    }

    /// 当前状态对应的浮窗尺寸
    fn current_size(&self) -> Size {
        let has_text = !self.state.displayed_text.is_empty();
        let wrapped = if has_text {
            self.surface
                .measure_wrapped_height(&self.state.displayed_text, self.max_text_width)
        } else {
            0.0
        };
        Size {
            width: self.max_text_width + 2.0 * HORIZONTAL_PADDING,
            height: overlay_height(has_text, self.state.loading, wrapped),
        }
    }

    /// 重算尺寸、夹取位置并把整帧应用到窗口
    fn sync_surface(&mut self) {
        let size = self.current_size();
        // 高度变化可能把浮窗顶出屏幕,每次应用前重新夹取
        self.origin = clamp_origin(self.origin, size, self.surface.screen_bounds());
        let frame = OverlayFrame {
            visible: self.state.visible,
            loading: self.state.loading,
            origin: self.origin,
            size,
            displayed_text: self.state.displayed_text.clone(),
            prompt_text: self.state.prompt_text.clone(),
        };
        self.surface.apply(&frame);
    }
}
