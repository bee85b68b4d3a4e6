//! Per-level ordinals for list items.
//!
//! A list run is a maximal sequence of consecutive list items. Any other
//! block ends the run and numbering restarts at 1. Each item gets a path
//! holding its ordinal at every level from 1 to its depth. Runs that never
//! nest are flat and carry no path at all.

use crate::block::{Block, Span};

/// A block after list numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberedBlock {
    Heading { level: u8, content: Vec<Span> },
    Paragraph { content: Vec<Span> },
    ListItem(NumberedListItem),
    Table { rows: Vec<Vec<Vec<Span>>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedListItem {
    /// Normalized depth, never more than one level below the previous item.
    pub depth: usize,
    /// Deepest level reached anywhere in the item's run.
    pub max_depth: usize,
    /// Ordinal at each level `1..=depth`; empty for flat runs.
    pub path: Vec<usize>,
    pub content: Vec<Span>,
}

impl NumberedListItem {
    /// True when the item belongs to a run with no nesting.
    pub fn is_flat(&self) -> bool {
        self.max_depth <= 1
    }

    /// True when the item sits at the deepest level of a nested run.
    pub fn is_terminal(&self) -> bool {
        !self.is_flat() && self.depth >= self.max_depth
    }

    /// Numeral prefix, e.g. `"2."` or `"2.3"`. Flat and terminal items have none.
    pub fn label(&self) -> Option<String> {
        if self.is_flat() || self.is_terminal() {
            return None;
        }
        let joined = self
            .path
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        if self.path.len() == 1 {
            Some(format!("{joined}."))
        } else {
            Some(joined)
        }
    }
}

/// Counter state for one list run.
///
/// Each open level remembers the source depth it was opened at, so siblings
/// written with the same (possibly over-deep) indentation land on the same
/// normalized level.
#[derive(Debug, Default)]
pub struct ListNumbering {
    counters: Vec<usize>,
    source_depths: Vec<usize>,
}

impl ListNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the most recent item, or 0 at the start of a run.
    pub fn last_depth(&self) -> usize {
        self.counters.len()
    }

    /// Record an item at `source_depth`; returns its normalized depth and path.
    pub fn advance(&mut self, source_depth: usize) -> (usize, Vec<usize>) {
        let shallower = self
            .source_depths
            .iter()
            .take_while(|&&open| open < source_depth)
            .count();
        let depth = shallower + 1;

        if depth <= self.last_depth() {
            self.counters.truncate(depth);
            self.source_depths.truncate(depth);
            self.counters[depth - 1] += 1;
            self.source_depths[depth - 1] = source_depth;
        } else {
            self.counters.push(1);
            self.source_depths.push(source_depth);
        }

        (depth, self.counters.clone())
    }

    /// Clear all counters; the next item starts a new run at 1.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.source_depths.clear();
    }
}

/// Annotate every list item with its path.
pub fn number(blocks: Vec<Block>) -> Vec<NumberedBlock> {
    let mut numbered = Vec::with_capacity(blocks.len());
    let mut numbering = ListNumbering::new();
    let mut run: Vec<NumberedListItem> = Vec::new();

    for block in blocks {
        let passthrough = match block {
            Block::ListItem { depth, content } => {
                let (depth, path) = numbering.advance(depth);
                run.push(NumberedListItem {
                    depth,
                    max_depth: 0,
                    path,
                    content,
                });
                continue;
            }
            Block::Heading { level, content } => NumberedBlock::Heading { level, content },
            Block::Paragraph { content } => NumberedBlock::Paragraph { content },
            Block::Table { rows } => NumberedBlock::Table { rows },
        };
        close_run(&mut run, &mut numbered);
        numbering.reset();
        numbered.push(passthrough);
    }
    close_run(&mut run, &mut numbered);

    numbered
}

fn close_run(run: &mut Vec<NumberedListItem>, out: &mut Vec<NumberedBlock>) {
    if run.is_empty() {
        return;
    }
    let max_depth = run.iter().map(|item| item.depth).max().unwrap_or(1);
    tracing::debug!(items = run.len(), max_depth, "closed list run");

    out.extend(run.drain(..).map(|mut item| {
        item.max_depth = max_depth;
        if max_depth <= 1 {
            item.path.clear();
        }
        NumberedBlock::ListItem(item)
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn items(depths: &[usize]) -> Vec<Block> {
        depths
            .iter()
            .enumerate()
            .map(|(i, &depth)| Block::ListItem {
                depth,
                content: vec![Span::plain(format!("item {i}"))],
            })
            .collect()
    }

    fn list_items(blocks: &[NumberedBlock]) -> Vec<&NumberedListItem> {
        blocks
            .iter()
            .filter_map(|block| match block {
                NumberedBlock::ListItem(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    fn paths(blocks: &[NumberedBlock]) -> Vec<Vec<usize>> {
        list_items(blocks)
            .into_iter()
            .map(|item| item.path.clone())
            .collect()
    }

    #[test]
    fn two_level_paths_reset_under_new_parent() {
        let numbered = number(items(&[1, 2, 2, 1, 2]));
        assert_eq!(
            paths(&numbered),
            vec![vec![1], vec![1, 1], vec![1, 2], vec![2], vec![2, 1]]
        );
    }

    #[test]
    fn three_levels() {
        let numbered = number(items(&[1, 2, 3, 3, 2, 3, 1]));
        assert_eq!(
            paths(&numbered),
            vec![
                vec![1],
                vec![1, 1],
                vec![1, 1, 1],
                vec![1, 1, 2],
                vec![1, 2],
                vec![1, 2, 1],
                vec![2],
            ]
        );
    }

    #[test]
    fn flat_run_has_no_paths() {
        let numbered = number(items(&[1, 1, 1]));
        for item in list_items(&numbered) {
            assert!(item.is_flat());
            assert!(item.path.is_empty());
            assert_eq!(item.label(), None);
        }
    }

    #[test]
    fn depth_jump_is_clamped() {
        let numbered = number(items(&[1, 4]));
        let items = list_items(&numbered);
        assert_eq!(items[1].depth, 2);
        assert_eq!(items[1].path, vec![1, 1]);
    }

    #[test]
    fn over_indented_siblings_share_a_level() {
        let numbered = number(items(&[1, 3, 3, 1, 3]));
        assert_eq!(
            paths(&numbered),
            vec![vec![1], vec![1, 1], vec![1, 2], vec![2], vec![2, 1]]
        );
    }

    #[test]
    fn first_item_of_run_is_depth_one() {
        let numbered = number(items(&[2, 2]));
        let items = list_items(&numbered);
        assert_eq!(items[0].depth, 1);
        assert_eq!(items[1].depth, 1);
        assert!(items[0].is_flat());
    }

    #[test]
    fn paragraph_restarts_numbering() {
        let mut blocks = items(&[1, 2, 1]);
        blocks.push(Block::Paragraph {
            content: vec![Span::plain("break")],
        });
        blocks.extend(items(&[1, 2]));
        let numbered = number(blocks);
        assert_eq!(
            paths(&numbered),
            vec![vec![1], vec![1, 1], vec![2], vec![1], vec![1, 1]]
        );
    }

    #[test]
    fn table_restarts_numbering() {
        let mut blocks = items(&[1, 2]);
        blocks.push(Block::Table {
            rows: vec![vec![vec![Span::plain("x")]]],
        });
        blocks.extend(items(&[1, 1]));
        let numbered = number(blocks);
        assert_eq!(paths(&numbered), vec![vec![1], vec![1, 1], vec![], vec![]]);
        assert!(matches!(numbered[2], NumberedBlock::Table { .. }));
    }

    #[test]
    fn flatness_is_decided_per_run() {
        let mut blocks = items(&[1, 1]);
        blocks.push(Block::Heading {
            level: 2,
            content: vec![Span::plain("h")],
        });
        blocks.extend(items(&[1, 2]));
        let numbered = number(blocks);
        let items = list_items(&numbered);
        assert!(items[0].is_flat());
        assert!(!items[2].is_flat());
        assert_eq!(items[2].max_depth, 2);
    }

    #[test]
    fn labels_skip_terminal_level() {
        let numbered = number(items(&[1, 2, 2, 1, 2]));
        let labels: Vec<Option<String>> =
            list_items(&numbered).iter().map(|item| item.label()).collect();
        assert_eq!(
            labels,
            vec![Some("1.".to_string()), None, None, Some("2.".to_string()), None]
        );
    }

    #[test]
    fn labels_join_path_for_middle_levels() {
        let numbered = number(items(&[1, 2, 3, 2]));
        let labels: Vec<Option<String>> =
            list_items(&numbered).iter().map(|item| item.label()).collect();
        assert_eq!(
            labels,
            vec![
                Some("1.".to_string()),
                Some("1.1".to_string()),
                None,
                Some("1.2".to_string()),
            ]
        );
    }

    #[test]
    fn non_list_blocks_pass_through_in_order() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                content: vec![Span::plain("t")],
            },
            Block::Paragraph {
                content: vec![Span::plain("p")],
            },
        ];
        assert_eq!(
            number(blocks),
            vec![
                NumberedBlock::Heading {
                    level: 1,
                    content: vec![Span::plain("t")],
                },
                NumberedBlock::Paragraph {
                    content: vec![Span::plain("p")],
                },
            ]
        );
    }

    #[test]
    fn state_machine_tracks_last_depth() {
        let mut numbering = ListNumbering::new();
        assert_eq!(numbering.last_depth(), 0);
        assert_eq!(numbering.advance(1), (1, vec![1]));
        assert_eq!(numbering.advance(2), (2, vec![1, 1]));
        assert_eq!(numbering.last_depth(), 2);
        numbering.reset();
        assert_eq!(numbering.advance(2), (1, vec![1]));
    }
}
