use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PAGINATION_THRESHOLD: usize = 1000;
pub const VIRTUAL_SCROLL_THRESHOLD: usize = 5000;
pub const ITEMS_PER_PAGE: usize = 100;
pub const ITEM_HEIGHT: u32 = 40;
pub const CONTAINER_HEIGHT: u32 = 400;
pub const BUFFER_ROWS: usize = 5;
pub const LONG_TEXT_THRESHOLD: usize = 50;

pub const EXPORT_FILE_NAME: &str = "query_results.csv";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error(
        "virtualScrollThreshold ({virtual_scroll}) must not be below paginationThreshold ({pagination})"
    )]
    ThresholdOrder {
        pagination: usize,
        virtual_scroll: usize,
    },
}

/// Tunables for the result table. Field names follow the front end's camelCase
/// options; anything left out falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub pagination_threshold: usize,
    pub virtual_scroll_threshold: usize,
    pub items_per_page: usize,
    /// Row height in px-equivalent units.
    pub item_height: u32,
    pub container_height: u32,
    /// Extra rows rendered past the viewport while virtual scrolling.
    pub buffer_rows: usize,
    pub long_text_threshold: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pagination_threshold: PAGINATION_THRESHOLD,
            virtual_scroll_threshold: VIRTUAL_SCROLL_THRESHOLD,
            items_per_page: ITEMS_PER_PAGE,
            item_height: ITEM_HEIGHT,
            container_height: CONTAINER_HEIGHT,
            buffer_rows: BUFFER_ROWS,
            long_text_threshold: LONG_TEXT_THRESHOLD,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items_per_page == 0 {
            return Err(ConfigError::Zero("itemsPerPage"));
        }
        if self.item_height == 0 {
            return Err(ConfigError::Zero("itemHeight"));
        }
        if self.container_height == 0 {
            return Err(ConfigError::Zero("containerHeight"));
        }
        if self.virtual_scroll_threshold < self.pagination_threshold {
            return Err(ConfigError::ThresholdOrder {
                pagination: self.pagination_threshold,
                virtual_scroll: self.virtual_scroll_threshold,
            });
        }
        Ok(())
    }

    /// Rows that fit in the container, rounded up.
    pub fn rows_per_viewport(&self) -> usize {
        self.container_height.div_ceil(self.item_height.max(1)) as usize
    }
}

/// How CSV fields are quoted on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvQuoting {
    /// Wrap fields containing a comma in double quotes, nothing else. Embedded
    /// quotes and newlines pass through untouched, which existing consumers of the
    /// export rely on.
    #[default]
    Lenient,
    /// RFC 4180 style: quote fields containing `,`, `"`, CR or LF and double any
    /// embedded quotes.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub quoting: CsvQuoting,
}
