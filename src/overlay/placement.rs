// 浮窗定位 - 纯函数计算浮窗原点并夹取进屏幕范围

use serde::{Deserialize, Serialize};

/// 光标与浮窗之间的间距（逻辑像素）
const CURSOR_GAP: f64 = 12.0;

/// 平面坐标点
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// 尺寸
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// 矩形（origin + size）
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// 本矩形是否完整落在 other 内
    pub fn contained_in(&self, other: &Rect) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.max_x() <= other.max_x()
            && self.max_y() <= other.max_y()
    }
}

/// 计算浮窗原点
///
/// 默认放在光标右侧偏下;光标下方垂直空间不足以容纳浮窗时改放上方,
/// 最后逐轴夹取,保证整个矩形落在屏幕内
pub fn place(cursor: Point, overlay: Size, screen: Rect) -> Point {
    let x = cursor.x + CURSOR_GAP;

    let below_fits = cursor.y + CURSOR_GAP + overlay.height <= screen.max_y();
    let y = if below_fits {
        cursor.y + CURSOR_GAP
    } else {
        cursor.y - CURSOR_GAP - overlay.height
    };

    clamp_origin(Point { x, y }, overlay, screen)
}

/// 逐轴独立夹取原点,使矩形不越出屏幕
///
/// 浮窗比屏幕还大时贴屏幕起始边
pub fn clamp_origin(origin: Point, overlay: Size, screen: Rect) -> Point {
    let max_x = (screen.max_x() - overlay.width).max(screen.x);
    let max_y = (screen.max_y() - overlay.height).max(screen.y);
    Point {
        x: origin.x.max(screen.x).min(max_x),
        y: origin.y.max(screen.y).min(max_y),
    }
}
