use taskboard_shared::{BoardColumn, TaskId};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task: TaskId,
    },
    HoverTarget {
        task: TaskId,
        column: BoardColumn,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start(TaskId),
    Over(BoardColumn),
    /// The pointer left `column`. `into_descendant` is set when it only moved
    /// onto an element inside that same column.
    Leave {
        column: BoardColumn,
        into_descendant: bool,
    },
    Drop(BoardColumn),
    End,
}

/// What a completed drop asks the workspace to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub task: TaskId,
    pub to: BoardColumn,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The only column currently highlighted as a drop candidate.
    pub fn highlighted(&self) -> Option<BoardColumn> {
        match &self.state {
            DragState::HoverTarget { column, .. } => Some(*column),
            _ => None,
        }
    }

    pub fn dragged_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { task } | DragState::HoverTarget { task, .. } => Some(task),
        }
    }

    pub fn handle(&mut self, event: DragEvent) -> Option<MoveRequest> {
        trace!(?event, state = ?self.state, "drag event");
        let state = std::mem::take(&mut self.state);

        let (next, request) = match (state, event) {
            (_, DragEvent::Start(task)) => (DragState::Dragging { task }, None),

            (DragState::Idle, DragEvent::Over(_)) => (DragState::Idle, None),
            (
                DragState::Dragging { task } | DragState::HoverTarget { task, .. },
                DragEvent::Over(column),
            ) => (DragState::HoverTarget { task, column }, None),

            (
                DragState::HoverTarget { task, column },
                DragEvent::Leave {
                    column: left,
                    into_descendant,
                },
            ) => {
                if !into_descendant && left == column {
                    (DragState::Dragging { task }, None)
                } else {
                    (DragState::HoverTarget { task, column }, None)
                }
            }
            (state, DragEvent::Leave { .. }) => (state, None),

            (
                DragState::Dragging { task } | DragState::HoverTarget { task, .. },
                DragEvent::Drop(to),
            ) => {
                debug!(task = %task, to = %to, "drop accepted");
                (DragState::Idle, Some(MoveRequest { task, to }))
            }
            (DragState::Idle, DragEvent::Drop(to)) => {
                warn!(to = %to, "drop without an active drag; ignoring");
                (DragState::Idle, None)
            }

            (_, DragEvent::End) => (DragState::Idle, None),
        };

        self.state = next;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskId {
        TaskId::from("t1")
    }

    #[test]
    fn full_gesture_emits_one_move() {
        let mut drag = DragController::new();
        assert_eq!(drag.handle(DragEvent::Start(task())), None);
        assert_eq!(drag.handle(DragEvent::Over(BoardColumn::InProgress)), None);
        assert_eq!(drag.highlighted(), Some(BoardColumn::InProgress));

        let request = drag.handle(DragEvent::Drop(BoardColumn::Done));
        assert_eq!(
            request,
            Some(MoveRequest {
                task: task(),
                to: BoardColumn::Done,
            })
        );
        assert_eq!(drag.state(), &DragState::Idle);
        assert_eq!(drag.highlighted(), None);

        assert_eq!(drag.handle(DragEvent::End), None);
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn entering_another_column_moves_the_single_highlight() {
        let mut drag = DragController::new();
        drag.handle(DragEvent::Start(task()));
        drag.handle(DragEvent::Over(BoardColumn::Todo));
        drag.handle(DragEvent::Over(BoardColumn::AwaitingFeedback));
        assert_eq!(drag.highlighted(), Some(BoardColumn::AwaitingFeedback));
    }

    #[test]
    fn leave_only_clears_the_column_actually_left() {
        let mut drag = DragController::new();
        drag.handle(DragEvent::Start(task()));
        drag.handle(DragEvent::Over(BoardColumn::Todo));

        drag.handle(DragEvent::Leave {
            column: BoardColumn::Todo,
            into_descendant: true,
        });
        assert_eq!(drag.highlighted(), Some(BoardColumn::Todo));

        drag.handle(DragEvent::Leave {
            column: BoardColumn::Done,
            into_descendant: false,
        });
        assert_eq!(drag.highlighted(), Some(BoardColumn::Todo));

        drag.handle(DragEvent::Leave {
            column: BoardColumn::Todo,
            into_descendant: false,
        });
        assert_eq!(drag.highlighted(), None);
        assert_eq!(drag.state(), &DragState::Dragging { task: task() });
    }

    #[test]
    fn drag_end_outside_any_column_resets() {
        let mut drag = DragController::new();
        drag.handle(DragEvent::Start(task()));
        drag.handle(DragEvent::Over(BoardColumn::Done));
        assert_eq!(drag.handle(DragEvent::End), None);
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn stray_drop_and_hover_while_idle_are_ignored() {
        let mut drag = DragController::new();
        assert_eq!(drag.handle(DragEvent::Over(BoardColumn::Todo)), None);
        assert_eq!(drag.highlighted(), None);
        assert_eq!(drag.handle(DragEvent::Drop(BoardColumn::Todo)), None);
        assert_eq!(drag.dragged_task(), None);
    }
}
