//! Justified row packing
//!
//! Items are laid out left to right at the target row height. When the next
//! item would overflow the container, the current row is closed by scaling all
//! of its items by one factor so that items plus gaps fill the width exactly.
//! The last row is only scaled when it holds several items or when its single
//! item is wider than the container; a lone small image keeps its size.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing laid-out widths
pub const EPSILON: f64 = 1e-6;

/// One item to place, described by its aspect ratio (width / height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    /// Width divided by height; non-positive values use the default ratio
    pub aspect_ratio: f64,
}

impl LayoutItem {
    /// Item with the given aspect ratio
    #[must_use]
    pub const fn new(aspect_ratio: f64) -> Self {
        Self { aspect_ratio }
    }

    /// Item for an image of the given pixel size
    ///
    /// A zero height produces a ratio the layout replaces with its default.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        if height == 0 {
            return Self::new(0.0);
        }
        Self::new(f64::from(width) / f64::from(height))
    }
}

/// Position and size of a placed item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Width in layout units
    pub width: f64,
    /// Height in layout units
    pub height: f64,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
}

impl LayoutBox {
    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Space between items, horizontally and between rows
    pub gap: f64,
    /// Row height before scaling
    pub target_row_height: f64,
    /// Ratio used for items whose own ratio is unknown or invalid
    pub default_aspect_ratio: f64,
}

impl LayoutOptions {
    /// Default fallback aspect ratio (square)
    pub const DEFAULT_ASPECT_RATIO: f64 = 1.0;

    /// Options with the given gap and row height
    #[must_use]
    pub const fn new(gap: f64, target_row_height: f64) -> Self {
        Self {
            gap,
            target_row_height,
            default_aspect_ratio: Self::DEFAULT_ASPECT_RATIO,
        }
    }

    fn ratio_of(&self, item: &LayoutItem) -> f64 {
        if item.aspect_ratio.is_finite() && item.aspect_ratio > 0.0 {
            item.aspect_ratio
        } else if self.default_aspect_ratio.is_finite() && self.default_aspect_ratio > 0.0 {
            self.default_aspect_ratio
        } else {
            Self::DEFAULT_ASPECT_RATIO
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::new(8.0, 240.0)
    }
}

/// Items of the row being filled, at the reference height
struct Row {
    widths: Vec<f64>,
    total: f64,
}

impl Row {
    const fn new() -> Self {
        Self {
            widths: Vec::new(),
            total: 0.0,
        }
    }

    fn len(&self) -> usize {
        self.widths.len()
    }

    /// Width of the row including gaps if `width` were appended
    fn width_with(&self, width: f64, gap: f64) -> f64 {
        self.total + width + gap * self.len() as f64
    }

    fn push(&mut self, width: f64) {
        self.widths.push(width);
        self.total += width;
    }

    /// Emit boxes for this row at `y`, scaled by `scale`; returns the row height
    fn emit(&mut self, out: &mut Vec<LayoutBox>, scale: f64, height: f64, gap: f64, y: f64) -> f64 {
        let row_height = height * scale;
        let mut x = 0.0;
        for width in self.widths.drain(..) {
            let width = width * scale;
            out.push(LayoutBox {
                width,
                height: row_height,
                x,
                y,
            });
            x += width + gap;
        }
        self.total = 0.0;
        row_height
    }

    /// Factor that makes items plus gaps exactly `container` wide
    fn fill_scale(&self, container: f64, gap: f64) -> f64 {
        let gaps = gap * self.len().saturating_sub(1) as f64;
        (container - gaps) / self.total
    }
}

/// Lay out `items` into justified rows `container_width` wide
///
/// Returns one box per item, in input order. An empty input, a non-positive
/// container width or a non-positive row height yields no boxes.
///
/// # Examples
///
/// ```
/// use bucketview::layout::{LayoutItem, LayoutOptions, layout};
///
/// let items = [LayoutItem::new(2.0), LayoutItem::new(1.0), LayoutItem::new(1.0)];
/// let boxes = layout(&items, 500.0, &LayoutOptions::new(10.0, 100.0));
/// assert_eq!(boxes.len(), 3);
/// assert!((boxes[2].right() - 500.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn layout(items: &[LayoutItem], container_width: f64, options: &LayoutOptions) -> Vec<LayoutBox> {
    let height = options.target_row_height;
    if items.is_empty()
        || !container_width.is_finite()
        || container_width <= 0.0
        || !height.is_finite()
        || height <= 0.0
    {
        return Vec::new();
    }

    let gap = if options.gap.is_finite() { options.gap.max(0.0) } else { 0.0 };
    let mut boxes = Vec::with_capacity(items.len());
    let mut row = Row::new();
    let mut y = 0.0;

    for item in items {
        let width = height * options.ratio_of(item);
        if row.len() > 0 && row.width_with(width, gap) > container_width {
            let scale = row.fill_scale(container_width, gap);
            y += row.emit(&mut boxes, scale, height, gap, y) + gap;
        }
        row.push(width);
    }

    let unscaled = row.total + gap * row.len().saturating_sub(1) as f64;
    let scale = if row.len() > 1 || unscaled > container_width {
        row.fill_scale(container_width, gap)
    } else {
        1.0
    };
    row.emit(&mut boxes, scale, height, gap, y);

    boxes
}

/// Total height of a layout (bottom edge of the lowest box)
#[must_use]
pub fn layout_height(boxes: &[LayoutBox]) -> f64 {
    boxes.iter().map(LayoutBox::bottom).fold(0.0, f64::max)
}

/// Group boxes into rows by their shared top edge
#[must_use]
pub fn rows(boxes: &[LayoutBox]) -> Vec<&[LayoutBox]> {
    boxes
        .chunk_by(|a, b| (a.y - b.y).abs() < EPSILON)
        .collect()
}
