use crate::config::RenderConfig;
use serde::{Deserialize, Serialize};

/// How a result table is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Every row rendered.
    Full,
    /// One page of `items_per_page` rows at a time.
    Paginated,
    /// Only the rows around the scroll viewport, with spacers around them.
    Virtual,
}

impl Strategy {
    /// Badge shown next to the row count; plain tables have none.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Strategy::Full => None,
            Strategy::Paginated => Some("Pagination"),
            Strategy::Virtual => Some("Virtual Scroll"),
        }
    }
}

pub fn select_strategy(row_count: usize, config: &RenderConfig) -> Strategy {
    if row_count > config.virtual_scroll_threshold {
        Strategy::Virtual
    } else if row_count > config.pagination_threshold {
        Strategy::Paginated
    } else {
        Strategy::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Strategy::Full)]
    #[case(1, Strategy::Full)]
    #[case(1000, Strategy::Full)]
    #[case(1001, Strategy::Paginated)]
    #[case(4999, Strategy::Paginated)]
    #[case(5000, Strategy::Paginated)]
    #[case(5001, Strategy::Virtual)]
    #[case(1_000_000, Strategy::Virtual)]
    fn default_thresholds_are_strict(#[case] rows: usize, #[case] expected: Strategy) {
        assert_eq!(select_strategy(rows, &RenderConfig::default()), expected);
    }

    #[test]
    fn every_count_maps_to_its_band() {
        let config = RenderConfig::default();
        for rows in (0..=12_000).step_by(7) {
            let expected = if rows <= 1000 {
                Strategy::Full
            } else if rows <= 5000 {
                Strategy::Paginated
            } else {
                Strategy::Virtual
            };
            assert_eq!(select_strategy(rows, &config), expected, "rows = {rows}");
        }
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let config = RenderConfig {
            pagination_threshold: 10,
            virtual_scroll_threshold: 20,
            ..Default::default()
        };
        assert_eq!(select_strategy(10, &config), Strategy::Full);
        assert_eq!(select_strategy(11, &config), Strategy::Paginated);
        assert_eq!(select_strategy(21, &config), Strategy::Virtual);
    }

    #[test]
    fn equal_thresholds_skip_pagination() {
        let config = RenderConfig {
            pagination_threshold: 100,
            virtual_scroll_threshold: 100,
            ..Default::default()
        };
        assert_eq!(select_strategy(100, &config), Strategy::Full);
        assert_eq!(select_strategy(101, &config), Strategy::Virtual);
    }

    #[test]
    fn labels() {
        assert_eq!(Strategy::Full.label(), None);
        assert_eq!(Strategy::Paginated.label(), Some("Pagination"));
        assert_eq!(Strategy::Virtual.label(), Some("Virtual Scroll"));
    }
}
