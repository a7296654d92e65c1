//! # Optimistic Board Mirror
//!
//! Client-side copy of one board that shows local card moves immediately
//! and reconciles them with the server.
//!
//! The mirror keeps two things apart:
//!
//! - the **confirmed** board, built only from server data (fetches, replies
//!   and real-time events)
//! - an ordered queue of **pending** local moves not yet settled
//!
//! [`BoardMirror::view`] replays the pending queue over the confirmed board.
//! Remote events always land on the confirmed board (last write wins), so a
//! pending move that no longer applies simply drops out of the view.
//!
//! ## Usage
//!
//! ```rust
//! use taskflow::client::BoardMirror;
//! use taskflow::shared::model::{Board, Card, Column};
//! use taskflow::shared::ordering::CardMove;
//!
//! let mut board = Board::new("Sprint");
//! let mut todo = Column::new("Todo");
//! let card = Card::new("Write docs");
//! let card_id = card.id;
//! todo.cards.push(card);
//! board.columns.push(todo);
//! board.columns.push(Column::new("Done"));
//! let (todo, done) = (board.columns[0].id, board.columns[1].id);
//!
//! let mut mirror = BoardMirror::new(board);
//! let request_id = mirror.apply_local_move(CardMove {
//!     card_id,
//!     source_column_id: todo,
//!     target_column_id: done,
//!     new_order: None,
//! }).unwrap();
//!
//! assert_eq!(mirror.view().columns[1].cards.len(), 1);
//! mirror.rollback(request_id);
//! assert_eq!(mirror.view().columns[0].cards.len(), 1);
//! ```

use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::event::{EventPayload, RealtimeEvent};
use crate::shared::model::{Board, Card, Column};
use crate::shared::ordering::{self, clamp_position, resequence_cards, resequence_columns, CardMove};

/// A local move awaiting the server's verdict
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
    pub request_id: Uuid,
    pub movement: CardMove,
}

#[derive(Debug, Clone)]
pub struct BoardMirror {
    confirmed: Board,
    pending: Vec<PendingMove>,
}

impl BoardMirror {
    pub fn new(board: Board) -> Self {
        Self {
            confirmed: board,
            pending: Vec::new(),
        }
    }

    pub fn board_id(&self) -> Uuid {
        self.confirmed.id
    }

    /// Server-confirmed state only
    pub fn confirmed(&self) -> &Board {
        &self.confirmed
    }

    pub fn pending(&self) -> &[PendingMove] {
        &self.pending
    }

    /// Queue a move after checking it applies to the current view
    ///
    /// Returns the request id to send with the HTTP call.
    pub fn apply_local_move(&mut self, movement: CardMove) -> Result<Uuid, SharedError> {
        let mut preview = self.view();
        ordering::move_card(&mut preview, &movement)?;

        let request_id = Uuid::new_v4();
        self.pending.push(PendingMove {
            request_id,
            movement,
        });
        Ok(request_id)
    }

    /// Confirmed board with every still-applicable pending move replayed
    pub fn view(&self) -> Board {
        let mut board = self.confirmed.clone();
        for pending in &self.pending {
            if let Err(e) = ordering::move_card(&mut board, &pending.movement) {
                tracing::debug!("Pending move {} no longer applies: {}", pending.request_id, e);
            }
        }
        board
    }

    /// Settle a pending move with the card the server returned
    pub fn confirm(&mut self, request_id: Uuid, card: Card) -> bool {
        let Some(pending) = self.take_pending(request_id) else {
            return false;
        };
        let order = i64::from(card.order);
        place_card(&mut self.confirmed, pending.movement.target_column_id, card, order);
        true
    }

    /// Drop a pending move the server rejected
    pub fn rollback(&mut self, request_id: Uuid) -> bool {
        self.take_pending(request_id).is_some()
    }

    /// Reset from a full refetch, discarding pending moves
    pub fn replace(&mut self, board: Board) {
        self.confirmed = board;
        self.pending.clear();
    }

    /// Apply a real-time event to the confirmed board
    ///
    /// Returns `false` when the event does not concern this board.
    pub fn apply_event(&mut self, event: &RealtimeEvent) -> bool {
        let board = &mut self.confirmed;
        match &event.payload {
            EventPayload::CardMoved {
                board_id,
                target_column_id,
                order,
                card,
                request_id,
                ..
            } if *board_id == board.id => {
                if let Some(request_id) = request_id {
                    self.pending.retain(|p| p.request_id != *request_id);
                }
                place_card(board, *target_column_id, card.clone(), *order as i64);
            }
            EventPayload::CardCreated {
                board_id,
                column_id,
                card,
            } if *board_id == board.id => {
                if board.find_card(card.id).is_none() {
                    place_card(board, *column_id, card.clone(), i64::from(card.order));
                }
            }
            EventPayload::CardUpdated {
                board_id,
                column_id,
                card,
            } if *board_id == board.id => {
                let existing = board
                    .columns
                    .iter_mut()
                    .find_map(|col| col.card_mut(card.id));
                match existing {
                    Some(slot) => *slot = card.clone(),
                    None => place_card(board, *column_id, card.clone(), i64::from(card.order)),
                }
            }
            EventPayload::CardDeleted {
                board_id, card_id, ..
            } if *board_id == board.id => {
                detach_card(board, *card_id);
            }
            EventPayload::CommentCreated {
                board_id,
                card_id,
                comment,
                ..
            } if *board_id == board.id => {
                if let Some(card) = board.columns.iter_mut().find_map(|col| col.card_mut(*card_id)) {
                    if !card.comments.iter().any(|c| c.id == comment.id) {
                        card.comments.push(comment.clone());
                    }
                }
            }
            EventPayload::ColumnCreated { board_id, column } if *board_id == board.id => {
                if board.column(column.id).is_none() {
                    place_column(board, column.clone());
                }
            }
            EventPayload::ColumnUpdated {
                board_id,
                column_id,
                name,
                limit,
            } if *board_id == board.id => {
                if let Some(column) = board.column_mut(*column_id) {
                    column.name = name.clone();
                    column.limit = *limit;
                }
            }
            EventPayload::ColumnMoved {
                board_id,
                column_id,
                order,
            } if *board_id == board.id => {
                if let Err(e) = ordering::move_column(board, *column_id, *order as i64) {
                    tracing::debug!("Ignoring column:moved: {}", e);
                }
            }
            EventPayload::ColumnDeleted {
                board_id,
                column_id,
            } if *board_id == board.id => {
                if let Err(e) = ordering::remove_column(board, *column_id) {
                    tracing::debug!("Ignoring column:deleted: {}", e);
                }
            }
            EventPayload::BoardUpdated { board_id, name } if *board_id == board.id => {
                board.name = name.clone();
            }
            _ => return false,
        }
        true
    }

    fn take_pending(&mut self, request_id: Uuid) -> Option<PendingMove> {
        let index = self.pending.iter().position(|p| p.request_id == request_id)?;
        Some(self.pending.remove(index))
    }
}

/// Remove a card from whichever column holds it
fn detach_card(board: &mut Board, card_id: Uuid) -> Option<Card> {
    board.columns.iter_mut().find_map(|column| {
        let index = column.cards.iter().position(|c| c.id == card_id)?;
        let card = column.cards.remove(index);
        resequence_cards(&mut column.cards);
        Some(card)
    })
}

/// Put `card` at `order` in `column_id`, wherever it was before
///
/// Server placements bypass the WIP limit; the server already enforced it.
fn place_card(board: &mut Board, column_id: Uuid, card: Card, order: i64) {
    if board.column(column_id).is_none() {
        tracing::warn!("Column {} missing from mirror, card {} left in place", column_id, card.id);
        return;
    }
    detach_card(board, card.id);
    if let Some(column) = board.column_mut(column_id) {
        let index = clamp_position(Some(order), column.cards.len());
        column.cards.insert(index, card);
        resequence_cards(&mut column.cards);
    }
}

fn place_column(board: &mut Board, column: Column) {
    let index = clamp_position(Some(i64::from(column.order)), board.columns.len());
    board.columns.insert(index, column);
    resequence_columns(&mut board.columns);
}
