use crate::config::RenderConfig;
use crate::model::QueryResult;
use crate::render::cell::{self, CellTone, FormattedCell};
use crate::render::strategy::{select_strategy, Strategy};
use crate::render::window::{
    clamp_page, page_summary, sanitize_offset, select_rows, select_window, total_pages,
    PageSummary, RenderWindow,
};
use serde::{Deserialize, Serialize};

/// Distance moved by the "scroll left/right" buttons.
pub const HORIZONTAL_SCROLL_STEP: f64 = 200.0;

/// The one cell currently shown unclamped. `row_index` is absolute within the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedCellRef {
    pub row_index: usize,
    pub cell_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalScroll {
    pub scroll_left: f64,
    pub max_scroll_left: f64,
    pub can_scroll_left: bool,
    pub can_scroll_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCell {
    #[serde(flatten)]
    pub formatted: FormattedCell,
    pub tone: CellTone,
    pub is_long_text: bool,
    pub is_expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    /// Absolute row index, used as the row key.
    pub index: usize,
    pub cells: Vec<RenderedCell>,
}

/// Everything the table needs for one paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPass {
    pub strategy: Strategy,
    pub strategy_label: Option<&'static str>,
    pub row_count_label: String,
    pub columns: Vec<String>,
    pub window: RenderWindow,
    pub rows: Vec<RenderedRow>,
    pub page: Option<PageSummary>,
    pub horizontal: HorizontalScroll,
    pub expanded: Option<ExpandedCellRef>,
    pub is_empty: bool,
}

/// A result table and the interaction state that belongs to it alone.
#[derive(Debug, Clone)]
pub struct ResultView {
    result: QueryResult,
    config: RenderConfig,
    strategy: Strategy,
    current_page: usize,
    scroll_top: f64,
    horizontal: HorizontalScroll,
    expanded: Option<ExpandedCellRef>,
}

impl ResultView {
    pub fn new(result: QueryResult, config: RenderConfig) -> Self {
        if let Some((reported, actual)) = result.row_count_mismatch() {
            tracing::warn!(reported, actual, "row_count disagrees with rows; using rows.len()");
        }
        let strategy = select_strategy(result.len(), &config);
        Self {
            result,
            config,
            strategy,
            current_page: 1,
            scroll_top: 0.0,
            horizontal: HorizontalScroll::default(),
            expanded: None,
        }
    }

    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn expanded(&self) -> Option<ExpandedCellRef> {
        self.expanded
    }

    pub fn horizontal(&self) -> HorizontalScroll {
        self.horizontal
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.result.len(), self.config.items_per_page)
    }

    /// Move to `page` (clamped). Any vertical scroll offset is dropped so state
    /// from virtual scrolling never leaks into a page change.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.current_page = clamp_page(page, self.result.len(), self.config.items_per_page);
        self.scroll_top = 0.0;
        self.current_page
    }

    /// Record the vertical scroll offset; only virtual scrolling follows it.
    pub fn scroll_to(&mut self, scroll_top: f64) {
        if self.strategy == Strategy::Virtual {
            self.scroll_top = sanitize_offset(scroll_top);
        }
    }

    pub fn scroll_horizontal(&mut self, scroll_left: f64, scroll_width: f64, client_width: f64) {
        let max = sanitize_offset(scroll_width - client_width);
        let left = sanitize_offset(scroll_left).min(max);
        self.horizontal = HorizontalScroll {
            scroll_left: left,
            max_scroll_left: max,
            can_scroll_left: left > 0.0,
            can_scroll_right: left < max,
        };
    }

    /// Target offset for one press of a horizontal scroll button.
    pub fn horizontal_step(&self, direction: ScrollDirection) -> f64 {
        let h = self.horizontal;
        let target = match direction {
            ScrollDirection::Left => h.scroll_left - HORIZONTAL_SCROLL_STEP,
            ScrollDirection::Right => h.scroll_left + HORIZONTAL_SCROLL_STEP,
        };
        target.clamp(0.0, h.max_scroll_left)
    }

    /// Double-activate on a cell. Only long text in plain or paginated tables expands;
    /// returns whether the cell is now the expanded one.
    pub fn activate_cell(&mut self, row_index: usize, cell_index: usize) -> bool {
        if self.strategy == Strategy::Virtual {
            return false;
        }
        let Some(value) = self.result.rows.get(row_index).and_then(|row| row.get(cell_index)) else {
            return false;
        };
        if !cell::format(value).is_long_text(self.config.long_text_threshold) {
            return false;
        }
        self.expanded = Some(ExpandedCellRef {
            row_index,
            cell_index,
        });
        true
    }

    /// Pointer pressed somewhere; `target` is the cell under it, if any. Collapses the
    /// expanded cell unless the press landed inside it. Returns whether it collapsed.
    pub fn pointer_down(&mut self, target: Option<ExpandedCellRef>) -> bool {
        match self.expanded {
            Some(current) if target != Some(current) => {
                self.expanded = None;
                true
            }
            _ => false,
        }
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    pub fn window(&self) -> RenderWindow {
        select_window(
            self.result.len(),
            self.strategy,
            self.current_page,
            self.scroll_top,
            &self.config,
        )
    }

    /// Format the visible window. Cost is proportional to the window, not the result.
    pub fn render(&self) -> RenderPass {
        let row_count = self.result.len();
        let is_empty = self.result.is_empty();
        let window = if is_empty {
            select_window(0, self.strategy, 1, 0.0, &self.config)
        } else {
            self.window()
        };

        let rows = select_rows(&self.result.rows, &window)
            .iter()
            .enumerate()
            .map(|(offset, row)| {
                let index = window.start_index + offset;
                RenderedRow {
                    index,
                    cells: row
                        .iter()
                        .enumerate()
                        .map(|(cell_index, value)| self.render_cell(index, cell_index, value))
                        .collect(),
                }
            })
            .collect();

        RenderPass {
            strategy: self.strategy,
            strategy_label: self.strategy.label(),
            row_count_label: row_count_label(row_count),
            columns: self.result.columns.clone(),
            window,
            rows,
            page: (self.strategy == Strategy::Paginated)
                .then(|| page_summary(row_count, self.current_page, &self.config)),
            horizontal: self.horizontal,
            expanded: self.expanded,
            is_empty,
        }
    }

    fn render_cell(&self, row_index: usize, cell_index: usize, value: &serde_json::Value) -> RenderedCell {
        let formatted = cell::format(value);
        let is_long_text = formatted.is_long_text(self.config.long_text_threshold);
        let is_expanded = self.expanded
            == Some(ExpandedCellRef {
                row_index,
                cell_index,
            });
        RenderedCell {
            tone: formatted.kind.tone(),
            formatted,
            is_long_text,
            is_expanded,
        }
    }
}

fn row_count_label(n: usize) -> String {
    let noun = if n == 1 { "row" } else { "rows" };
    format!("{} {noun}", cell::format_count(n))
}
