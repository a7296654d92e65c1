//! Property-based tests for card ordering
//!
//! Whatever sequence of moves is applied, every column stays densely
//! numbered and no card is lost or duplicated.

use proptest::prelude::*;
use std::collections::BTreeSet;
use uuid::Uuid;

use taskflow::shared::model::{Board, Card, Column};
use taskflow::shared::ordering::{insert_card, move_card, CardMove};

fn board_with(sizes: &[usize], limit: Option<u32>) -> Board {
    let mut board = Board::new("Prop");
    for (i, size) in sizes.iter().enumerate() {
        let mut column = Column::new(format!("col-{i}"));
        for n in 0..*size {
            insert_card(&mut column, Card::new(format!("card-{i}-{n}")), None).unwrap();
        }
        column.limit = limit;
        board.columns.push(column);
    }
    board
}

fn card_ids(board: &Board) -> BTreeSet<Uuid> {
    board.cards().map(|c| c.id).collect()
}

fn assert_dense(board: &Board) -> Result<(), TestCaseError> {
    for column in &board.columns {
        for (index, card) in column.cards.iter().enumerate() {
            prop_assert_eq!(card.order as usize, index);
        }
    }
    Ok(())
}

/// (source column, card index, target column, requested order)
fn moves() -> impl Strategy<Value = Vec<(usize, usize, usize, Option<i64>)>> {
    prop::collection::vec(
        (0..3usize, 0..8usize, 0..3usize, prop::option::of(-3i64..12)),
        0..25,
    )
}

proptest! {
    #[test]
    fn test_moves_preserve_cards_and_density(
        sizes in prop::collection::vec(0..6usize, 3),
        steps in moves(),
    ) {
        let mut board = board_with(&sizes, None);
        let before = card_ids(&board);

        for (source, index, target, new_order) in steps {
            let Some(card) = board.columns[source].cards.get(index) else { continue };
            let request = CardMove {
                card_id: card.id,
                source_column_id: board.columns[source].id,
                target_column_id: board.columns[target].id,
                new_order,
            };
            let outcome = move_card(&mut board, &request).unwrap();
            prop_assert_eq!(board.columns[target].cards[outcome.order].id, request.card_id);
            assert_dense(&board)?;
        }

        prop_assert_eq!(card_ids(&board), before);
    }

    #[test]
    fn test_limits_hold_under_moves(
        steps in moves(),
        limit in 1u32..4,
    ) {
        let mut board = board_with(&[limit as usize, 0, 0], Some(limit));

        for (source, index, target, new_order) in steps {
            let Some(card) = board.columns[source].cards.get(index) else { continue };
            let request = CardMove {
                card_id: card.id,
                source_column_id: board.columns[source].id,
                target_column_id: board.columns[target].id,
                new_order,
            };
            let snapshot = board.clone();
            if move_card(&mut board, &request).is_err() {
                prop_assert_eq!(&board, &snapshot);
            }
            for column in &board.columns {
                prop_assert!(column.cards.len() <= limit as usize);
            }
        }
    }

    #[test]
    fn test_requested_order_is_clamped(len in 0..6usize, requested in -10i64..20) {
        let mut board = board_with(&[1, len], None);
        let card_id = board.columns[0].cards[0].id;
        let request = CardMove {
            card_id,
            source_column_id: board.columns[0].id,
            target_column_id: board.columns[1].id,
            new_order: Some(requested),
        };

        let outcome = move_card(&mut board, &request).unwrap();
        let expected = requested.clamp(0, len as i64) as usize;
        prop_assert_eq!(outcome.order, expected);
    }
}
