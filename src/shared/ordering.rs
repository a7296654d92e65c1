//! Card and Column Ordering
//!
//! Pure functions that mutate the nested board → column → card vectors and
//! re-sequence the `order` fields. The server applies them to the
//! authoritative document; clients replay the very same functions over
//! their local copy for optimistic updates.
//!
//! # Positions
//!
//! Requested positions are clamped into `0..=len`: negative values insert at
//! the front, values past the end (or no value at all) append.
//!
//! # Example
//!
//! ```rust
//! use taskflow::shared::model::{Board, Card, Column};
//! use taskflow::shared::ordering::{insert_card, move_card, CardMove};
//!
//! let mut board = Board::new("Sprint");
//! board.columns.push(Column::new("Todo"));
//! board.columns.push(Column::new("Done"));
//! let (todo, done) = (board.columns[0].id, board.columns[1].id);
//!
//! let card = Card::new("Write tests");
//! let card_id = card.id;
//! insert_card(&mut board.columns[0], card, None).unwrap();
//!
//! let outcome = move_card(&mut board, &CardMove {
//!     card_id,
//!     source_column_id: todo,
//!     target_column_id: done,
//!     new_order: Some(0),
//! }).unwrap();
//! assert_eq!(outcome.order, 0);
//! assert!(board.columns[0].cards.is_empty());
//! ```

use chrono::Utc;
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::model::{Board, Card, Column};

/// A request to relocate one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: Uuid,
    pub source_column_id: Uuid,
    pub target_column_id: Uuid,
    /// Requested index in the target column, `None` appends
    pub new_order: Option<i64>,
}

/// Result of a successful [`move_card`]
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// The moved card as it now sits in the target column
    pub card: Card,
    /// Final index inside the target column
    pub order: usize,
    pub source_column_id: Uuid,
    pub target_column_id: Uuid,
}

/// Clamp a requested position into `0..=len`
pub fn clamp_position(position: Option<i64>, len: usize) -> usize {
    match position {
        Some(p) if p <= 0 => 0,
        Some(p) => usize::try_from(p).map_or(len, |p| p.min(len)),
        None => len,
    }
}

/// Renumber cards so that `order == index`
pub fn resequence_cards(cards: &mut [Card]) {
    for (index, card) in cards.iter_mut().enumerate() {
        card.order = index as u32;
    }
}

/// Renumber columns so that `order == index`
pub fn resequence_columns(columns: &mut [Column]) {
    for (index, column) in columns.iter_mut().enumerate() {
        column.order = index as u32;
    }
}

/// Insert `card` into `column`, honouring the WIP limit.
///
/// Returns the index the card landed at.
pub fn insert_card(
    column: &mut Column,
    card: Card,
    position: Option<i64>,
) -> Result<usize, SharedError> {
    if column.is_full() {
        return Err(limit_reached(column));
    }
    let index = clamp_position(position, column.cards.len());
    column.cards.insert(index, card);
    resequence_cards(&mut column.cards);
    column.updated_at = Utc::now();
    Ok(index)
}

/// Remove a card from `column` and close the gap
pub fn remove_card(column: &mut Column, card_id: Uuid) -> Result<Card, SharedError> {
    let index = column
        .cards
        .iter()
        .position(|c| c.id == card_id)
        .ok_or_else(|| SharedError::not_found("Card not found"))?;
    let card = column.cards.remove(index);
    resequence_cards(&mut column.cards);
    column.updated_at = Utc::now();
    Ok(card)
}

/// Move a card within a column or across columns of the same board.
///
/// Fails without touching the board when a column or the card is missing,
/// or when a different target column is already at its WIP limit.
pub fn move_card(board: &mut Board, request: &CardMove) -> Result<MoveOutcome, SharedError> {
    let source_index = column_index(board, request.source_column_id)
        .ok_or_else(|| SharedError::not_found("Source column not found"))?;
    let target_index = column_index(board, request.target_column_id)
        .ok_or_else(|| SharedError::not_found("Target column not found"))?;

    let card_index = board.columns[source_index]
        .cards
        .iter()
        .position(|c| c.id == request.card_id)
        .ok_or_else(|| SharedError::not_found("Card not found in source column"))?;

    if source_index != target_index && board.columns[target_index].is_full() {
        return Err(limit_reached(&board.columns[target_index]));
    }

    let now = Utc::now();
    let mut card = board.columns[source_index].cards.remove(card_index);
    card.updated_at = now;

    let target = &mut board.columns[target_index];
    let order = clamp_position(request.new_order, target.cards.len());
    target.cards.insert(order, card);
    resequence_cards(&mut target.cards);
    target.updated_at = now;
    let card = target.cards[order].clone();

    if source_index != target_index {
        let source = &mut board.columns[source_index];
        resequence_cards(&mut source.cards);
        source.updated_at = now;
    }
    board.updated_at = now;

    Ok(MoveOutcome {
        card,
        order,
        source_column_id: request.source_column_id,
        target_column_id: request.target_column_id,
    })
}

/// Insert a column into the board, returning its index
pub fn insert_column(board: &mut Board, column: Column, position: Option<i64>) -> usize {
    let index = clamp_position(position, board.columns.len());
    board.columns.insert(index, column);
    resequence_columns(&mut board.columns);
    board.updated_at = Utc::now();
    index
}

/// Reposition a column, returning its new index
pub fn move_column(board: &mut Board, column_id: Uuid, new_order: i64) -> Result<usize, SharedError> {
    let from = column_index(board, column_id)
        .ok_or_else(|| SharedError::not_found("Column not found"))?;
    let column = board.columns.remove(from);
    let to = clamp_position(Some(new_order), board.columns.len());
    board.columns.insert(to, column);
    resequence_columns(&mut board.columns);
    board.updated_at = Utc::now();
    Ok(to)
}

/// Remove a column together with its cards
pub fn remove_column(board: &mut Board, column_id: Uuid) -> Result<Column, SharedError> {
    let index = column_index(board, column_id)
        .ok_or_else(|| SharedError::not_found("Column not found"))?;
    let column = board.columns.remove(index);
    resequence_columns(&mut board.columns);
    board.updated_at = Utc::now();
    Ok(column)
}

fn column_index(board: &Board, column_id: Uuid) -> Option<usize> {
    board.columns.iter().position(|c| c.id == column_id)
}

fn limit_reached(column: &Column) -> SharedError {
    tracing::debug!(
        "Column '{}' is full: {} cards, limit {:?}",
        column.name,
        column.cards.len(),
        column.limit
    );
    SharedError::LimitReached {
        column: column.name.clone(),
        limit: column.limit.unwrap_or_default(),
    }
}
