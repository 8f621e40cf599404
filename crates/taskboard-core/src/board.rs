use taskboard_shared::{BoardColumn, TaskId};
use tracing::debug;

use crate::cache::TaskCache;

/// The text an empty column shows, keyed by column identifier.
pub fn placeholder_message(column_key: &str) -> &'static str {
    match column_key {
        "todo" => "No tasks to do.",
        "in-progress" => "No tasks in progress.",
        "awaiting-feedback" => "No tasks awaiting feedback.",
        "done" => "No tasks done.",
        _ => "No tasks found.",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardNode {
    Card(TaskId),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub column: BoardColumn,
    nodes: Vec<BoardNode>,
}

impl ColumnView {
    fn new(column: BoardColumn) -> Self {
        let mut view = Self {
            column,
            nodes: vec![],
        };
        view.reconcile_placeholder();
        view
    }

    pub fn nodes(&self) -> &[BoardNode] {
        &self.nodes
    }

    pub fn cards(&self) -> impl Iterator<Item = &TaskId> {
        self.nodes.iter().filter_map(|node| match node {
            BoardNode::Card(id) => Some(id),
            BoardNode::Placeholder(_) => None,
        })
    }

    pub fn task_count(&self) -> usize {
        self.cards().count()
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.nodes.iter().find_map(|node| match node {
            BoardNode::Placeholder(text) => Some(*text),
            BoardNode::Card(_) => None,
        })
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| matches!(node, BoardNode::Card(card) if card == id))
    }

    /// Exactly one placeholder when there are no cards, none otherwise.
    fn reconcile_placeholder(&mut self) {
        let has_cards = self
            .nodes
            .iter()
            .any(|node| matches!(node, BoardNode::Card(_)));
        self.nodes
            .retain(|node| matches!(node, BoardNode::Card(_)));
        if !has_cards {
            self.nodes
                .push(BoardNode::Placeholder(placeholder_message(self.column.key())));
        }
    }
}

/// Where a moved card came from, enough to put it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardOrigin {
    pub column: BoardColumn,
    pub index: usize,
}

/// Column membership as drawn on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    columns: Vec<ColumnView>,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            columns: BoardColumn::ALL.into_iter().map(ColumnView::new).collect(),
        }
    }
}

impl BoardView {
    pub fn from_cache(cache: &TaskCache) -> Self {
        let mut view = Self::default();
        for task in cache.iter() {
            view.column_mut(task.record.state)
                .nodes
                .push(BoardNode::Card(task.id.clone()));
        }
        for column in &mut view.columns {
            column.reconcile_placeholder();
        }
        view
    }

    pub fn columns(&self) -> &[ColumnView] {
        &self.columns
    }

    pub fn column(&self, column: BoardColumn) -> &ColumnView {
        &self.columns[column.index()]
    }

    fn column_mut(&mut self, column: BoardColumn) -> &mut ColumnView {
        &mut self.columns[column.index()]
    }

    pub fn locate(&self, id: &TaskId) -> Option<CardOrigin> {
        self.columns.iter().find_map(|view| {
            view.position(id).map(|index| CardOrigin {
                column: view.column,
                index,
            })
        })
    }

    /// Appends the card to `to`, then fixes placeholders on both sides.
    /// Returns `None` when the card is not on the board.
    pub fn move_card(&mut self, id: &TaskId, to: BoardColumn) -> Option<CardOrigin> {
        let origin = self.locate(id)?;
        self.column_mut(origin.column).nodes.remove(origin.index);
        self.column_mut(to).nodes.push(BoardNode::Card(id.clone()));
        self.column_mut(origin.column).reconcile_placeholder();
        self.column_mut(to).reconcile_placeholder();
        debug!(task = %id, from = %origin.column, to = %to, "card moved");
        Some(origin)
    }

    /// Puts a card back where it was before a move.
    pub fn restore_card(&mut self, id: &TaskId, origin: CardOrigin) {
        let current = self.locate(id);
        if let Some(at) = current {
            self.column_mut(at.column).nodes.remove(at.index);
            self.column_mut(at.column).reconcile_placeholder();
        }

        let target = self.column_mut(origin.column);
        target
            .nodes
            .retain(|node| matches!(node, BoardNode::Card(_)));
        let index = origin.index.min(target.nodes.len());
        target.nodes.insert(index, BoardNode::Card(id.clone()));
        target.reconcile_placeholder();
        debug!(task = %id, column = %origin.column, index, "card restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cards: &[(&str, BoardColumn)]) -> BoardView {
        let mut view = BoardView::default();
        for (id, column) in cards {
            view.column_mut(*column)
                .nodes
                .push(BoardNode::Card(TaskId::from(*id)));
        }
        for column in &mut view.columns {
            column.reconcile_placeholder();
        }
        view
    }

    #[test]
    fn empty_board_shows_one_placeholder_per_column() {
        let view = BoardView::default();
        for column in view.columns() {
            assert_eq!(column.nodes().len(), 1);
            assert_eq!(column.placeholder(), Some(placeholder_message(column.column.key())));
        }
        assert_eq!(placeholder_message("backlog"), "No tasks found.");
    }

    #[test]
    fn moving_last_card_swaps_placeholders() {
        let mut view = board_with(&[("t1", BoardColumn::Todo)]);
        assert_eq!(view.column(BoardColumn::Done).task_count(), 0);

        let origin = view
            .move_card(&TaskId::from("t1"), BoardColumn::Done)
            .expect("card on board");
        assert_eq!(origin, CardOrigin { column: BoardColumn::Todo, index: 0 });

        let todo = view.column(BoardColumn::Todo);
        assert_eq!(todo.nodes(), &[BoardNode::Placeholder("No tasks to do.")]);

        let done = view.column(BoardColumn::Done);
        assert_eq!(done.nodes(), &[BoardNode::Card(TaskId::from("t1"))]);
        assert_eq!(done.placeholder(), None);
    }

    #[test]
    fn counts_shift_by_one_between_populated_columns() {
        let mut view = board_with(&[
            ("a", BoardColumn::InProgress),
            ("b", BoardColumn::InProgress),
            ("c", BoardColumn::AwaitingFeedback),
        ]);
        view.move_card(&TaskId::from("a"), BoardColumn::AwaitingFeedback)
            .expect("move");

        assert_eq!(view.column(BoardColumn::InProgress).task_count(), 1);
        assert_eq!(view.column(BoardColumn::AwaitingFeedback).task_count(), 2);
        assert_eq!(view.column(BoardColumn::InProgress).placeholder(), None);
        assert_eq!(view.column(BoardColumn::AwaitingFeedback).placeholder(), None);
    }

    #[test]
    fn restore_puts_card_back_at_its_index() {
        let mut view = board_with(&[
            ("a", BoardColumn::Todo),
            ("b", BoardColumn::Todo),
            ("c", BoardColumn::Todo),
        ]);
        let before = view.clone();
        let id = TaskId::from("b");
        let origin = view.move_card(&id, BoardColumn::Done).expect("move");
        view.restore_card(&id, origin);
        assert_eq!(view, before);
    }

    #[test]
    fn unknown_card_does_not_move() {
        let mut view = board_with(&[("a", BoardColumn::Todo)]);
        assert_eq!(view.move_card(&TaskId::from("zz"), BoardColumn::Done), None);
        assert_eq!(view.column(BoardColumn::Todo).task_count(), 1);
    }
}
