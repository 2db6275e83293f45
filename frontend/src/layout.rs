//! Grid auto-layout for template blocks.
//!
//! Blocks without an explicit position are placed on a grid chosen from the
//! block count. All rectangles are percentages of the template canvas, so the
//! same layout serves the inline editor and the full-screen TV preview.

use signage_types::{BlockId, BlockWithContents};
use tracing::debug;

/// Grid shape for a given number of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
    /// Gap between cells in screen pixels.
    pub gap: u32,
    /// One cell spans two grid cells (3, 5 and 7 blocks).
    pub special_layout: bool,
}

/// Hand-tuned layouts for TV screens: (count, cols, rows).
///
/// Other counts use the widescreen fallback in [`grid_layout`].
const LAYOUT_TABLE: [(usize, u32, u32); 11] = [
    (1, 1, 1),
    (2, 2, 1),
    (3, 2, 2),
    (4, 2, 2),
    (5, 3, 2),
    (6, 3, 2),
    (7, 4, 2),
    (8, 4, 2),
    (9, 3, 3),
    (12, 4, 3),
    (16, 4, 4),
];

/// Gap between cells in screen pixels. A single block fills the screen.
const GRID_GAP: u32 = 4;

/// Choose the grid for `block_count` blocks.
pub fn grid_layout(block_count: usize) -> GridLayout {
    if block_count == 0 {
        return GridLayout {
            cols: 2,
            rows: 2,
            gap: GRID_GAP,
            special_layout: false,
        };
    }

    let gap = if block_count == 1 { 0 } else { GRID_GAP };
    let special_layout = matches!(block_count, 3 | 5 | 7);

    if let Some(&(_, cols, rows)) = LAYOUT_TABLE.iter().find(|(n, ..)| *n == block_count) {
        return GridLayout {
            cols,
            rows,
            gap,
            special_layout,
        };
    }

    // Approximate a 16:9 proportioned grid.
    let cols = (block_count as f64 * 16.0 / 9.0).sqrt().ceil() as u32;
    let rows = (block_count as u32).div_ceil(cols);
    GridLayout {
        cols,
        rows,
        gap,
        special_layout,
    }
}

/// Axis-aligned rectangle in canvas percent (0..=100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BlockRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &BlockRect) -> BlockRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BlockRect {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Round every coordinate to two decimals and keep it within 100%.
    pub fn normalized(&self) -> BlockRect {
        let fix = |v: f64| round2(v).clamp(0.0, 100.0);
        BlockRect {
            x: fix(self.x),
            y: fix(self.y),
            w: fix(self.w),
            h: fix(self.h),
        }
    }

    /// Map onto a screen rectangle.
    pub fn to_screen(&self, canvas: egui::Rect) -> egui::Rect {
        let min = egui::pos2(
            canvas.left() + canvas.width() * (self.x / 100.0) as f32,
            canvas.top() + canvas.height() * (self.y / 100.0) as f32,
        );
        let size = egui::vec2(
            canvas.width() * (self.w / 100.0) as f32,
            canvas.height() * (self.h / 100.0) as f32,
        );
        egui::Rect::from_min_size(min, size)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rectangle of block `block_index` when `block_count` blocks are auto-laid out.
pub fn position_of(block_index: usize, block_count: usize) -> BlockRect {
    const THIRD: f64 = 100.0 / 3.0;

    match (block_count, block_index) {
        // Two on top, one across the bottom half.
        (3, 0) => return BlockRect::new(0.0, 0.0, 50.0, 50.0),
        (3, 1) => return BlockRect::new(50.0, 0.0, 50.0, 50.0),
        (3, 2) => return BlockRect::new(0.0, 50.0, 100.0, 50.0),
        // Full-height middle column between two stacked pairs.
        (5, 0) => return BlockRect::new(0.0, 0.0, THIRD, 50.0),
        (5, 1) => return BlockRect::new(0.0, 50.0, THIRD, 50.0),
        (5, 2) => return BlockRect::new(THIRD, 0.0, THIRD, 100.0),
        (5, 3) => return BlockRect::new(2.0 * THIRD, 0.0, THIRD, 50.0),
        (5, 4) => return BlockRect::new(2.0 * THIRD, 50.0, THIRD, 50.0),
        // Four on top, two quarters and one half below.
        (7, 6) => return BlockRect::new(50.0, 50.0, 50.0, 50.0),
        _ => {}
    }

    let grid = grid_layout(block_count);
    let cell_w = 100.0 / grid.cols as f64;
    let cell_h = 100.0 / grid.rows as f64;
    let col = (block_index as u32 % grid.cols) as f64;
    let row = (block_index as u32 / grid.cols) as f64;

    BlockRect::new(col * cell_w, row * cell_h, cell_w, cell_h)
}

/// Rectangle a block occupies: its stored placement, or its grid cell.
pub fn block_rect(block: &signage_types::Block, block_count: usize) -> BlockRect {
    match block.explicit_rect() {
        Some((x, y, w, h)) => BlockRect::new(x, y, w, h),
        None => position_of(block.block_index as usize, block_count),
    }
}

/// Bounding rectangle of several block rectangles, rounded to two decimals.
pub fn merge_rect<'a>(rects: impl IntoIterator<Item = &'a BlockRect>) -> Option<BlockRect> {
    rects
        .into_iter()
        .copied()
        .reduce(|acc, r| acc.union(&r))
        .map(|r| r.normalized())
}

/// Backend changes needed to merge a set of blocks into one.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// Block that absorbs the others (lowest index of the selection).
    pub keep: BlockId,
    /// Placement of the merged block.
    pub rect: BlockRect,
    /// Blocks removed by the merge, with their contents.
    pub delete: Vec<BlockId>,
    /// Surviving blocks with their new contiguous index and pinned rectangle.
    pub reindex: Vec<(BlockId, u32, BlockRect)>,
}

/// Plan a merge of `selected` blocks.
///
/// Returns `None` unless at least two existing blocks are selected. Every
/// surviving block is pinned to the rectangle it had before the merge so the
/// visible layout does not reflow when the block count drops.
pub fn plan_merge(blocks: &[BlockWithContents], selected: &[BlockId]) -> Option<MergePlan> {
    let count = blocks.len();
    let mut chosen: Vec<&BlockWithContents> = blocks
        .iter()
        .filter(|b| selected.contains(&b.block.id))
        .collect();
    if chosen.len() < 2 {
        return None;
    }
    chosen.sort_by_key(|b| b.block.block_index);

    let rects: Vec<BlockRect> = chosen.iter().map(|b| block_rect(&b.block, count)).collect();
    let rect = merge_rect(&rects)?;
    let keep = chosen[0].block.id.clone();
    let delete: Vec<BlockId> = chosen[1..].iter().map(|b| b.block.id.clone()).collect();

    let mut survivors: Vec<&BlockWithContents> = blocks
        .iter()
        .filter(|b| !delete.contains(&b.block.id))
        .collect();
    survivors.sort_by_key(|b| b.block.block_index);

    let reindex = survivors
        .iter()
        .enumerate()
        .map(|(new_index, b)| {
            let pinned = if b.block.id == keep {
                rect
            } else {
                block_rect(&b.block, count).normalized()
            };
            (b.block.id.clone(), new_index as u32, pinned)
        })
        .collect();

    debug!(
        "Merge plan: keep {} at {:?}, delete {} blocks",
        keep,
        rect,
        delete.len()
    );

    Some(MergePlan {
        keep,
        rect,
        delete,
        reindex,
    })
}
