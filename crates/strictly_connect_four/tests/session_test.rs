//! Tests for the Connect Four game session lifecycle and move rules.

use strictly_connect_four::{Cell, GameError, GameSession, HEIGHT, Player, Position, WIDTH, rules};

fn started() -> GameSession {
    let mut session = GameSession::new();
    session.start().expect("fresh session starts");
    session
}

/// Asserts no empty cell sits below an occupied one in any column.
fn assert_gravity(session: &GameSession) {
    let rows = session.grid().rows();
    for column in 0..WIDTH {
        for row in 0..HEIGHT - 1 {
            if rows[row][column] != Cell::Empty {
                assert_ne!(
                    rows[row + 1][column],
                    Cell::Empty,
                    "floating disc at row {row}, column {column}"
                );
            }
        }
    }
}

#[test]
fn test_start_and_end_toggle_started() {
    let mut session = GameSession::new();
    assert!(!session.is_started());

    assert_eq!(session.start(), Ok(Player::One));
    assert!(session.is_started());

    assert_eq!(session.end().map(|ack| ack.ended), Ok(true));
    assert!(!session.is_started());
}

#[test]
fn test_double_start_rejected() {
    let mut session = started();
    assert_eq!(session.start(), Err(GameError::AlreadyStarted));
    assert!(session.is_started());
}

#[test]
fn test_reset_and_end_require_start() {
    let mut session = GameSession::new();
    assert_eq!(session.reset(), Err(GameError::NotStarted));
    assert_eq!(session.end(), Err(GameError::NotStarted));
}

#[test]
fn test_drop_before_start_rejected() {
    let mut session = GameSession::new();
    assert_eq!(session.drop_disc(Player::One, 0), Err(GameError::NotStarted));
    assert_eq!(session.grid().disc_count(), 0);
}

#[test]
fn test_disc_lands_on_bottom_then_stacks() {
    let mut session = started();

    let first = session.drop_disc(Player::One, 2).unwrap();
    assert_eq!(first.position, Position::new(HEIGHT - 1, 2));
    assert_eq!(first.turn, Player::Two);

    let second = session.drop_disc(Player::Two, 2).unwrap();
    assert_eq!(second.position, Position::new(HEIGHT - 2, 2));
    assert_eq!(
        second.grid.get(HEIGHT - 1, 2),
        Some(Cell::Occupied(Player::One))
    );
}

#[test]
fn test_alternating_drops_keep_gravity() {
    let mut session = started();
    let columns = [0, 3, 3, 5, 1, 3, 0, 2, 4, 3, 3, 1, 5, 5];
    let mut player = Player::One;

    for (n, &column) in columns.iter().enumerate() {
        session.play(player, column).unwrap();
        player = player.opponent();

        assert_eq!(session.grid().disc_count(), n + 1);
        assert_gravity(&session);
    }
}

#[test]
fn test_out_of_range_columns_rejected() {
    let mut session = started();
    assert_eq!(session.drop_disc(Player::One, -1), Err(GameError::InvalidColumn(-1)));
    assert_eq!(
        session.drop_disc(Player::One, WIDTH as i64),
        Err(GameError::InvalidColumn(WIDTH as i64))
    );
    assert_eq!(session.turn(), Player::One);
    assert_eq!(session.last_move(), None);
}

#[test]
fn test_full_column_rejected_and_grid_unchanged() {
    let mut session = started();
    let mut player = Player::One;
    for _ in 0..HEIGHT {
        session.drop_disc(player, 4).unwrap();
        player = player.opponent();
    }
    assert!(session.grid().is_column_full(4));

    let before = session.grid().clone();
    let turn = session.turn();
    assert_eq!(session.drop_disc(turn, 4), Err(GameError::InvalidColumn(4)));
    assert_eq!(session.grid(), &before);
    assert_eq!(session.turn(), turn);
}

#[test]
fn test_turn_alternates_and_reset_restores_first_player() {
    let mut session = started();
    session.play(Player::One, 0).unwrap();

    assert_eq!(session.check_turn(Player::One), Err(GameError::NotPlayersTurn(Player::One)));
    assert_eq!(session.check_turn(Player::Two), Ok(()));

    session.play(Player::Two, 1).unwrap();
    session.play(Player::One, 1).unwrap();
    assert_eq!(session.turn(), Player::Two);

    assert_eq!(session.reset(), Ok(Player::One));
    assert!(session.is_started());
    assert_eq!(session.check_turn(Player::One), Ok(()));
    assert_eq!(session.grid().disc_count(), 0);
    assert_eq!(session.last_move(), None);
}

#[test]
fn test_play_out_of_turn_changes_nothing() {
    let mut session = started();
    assert_eq!(
        session.play(Player::Two, 0),
        Err(GameError::NotPlayersTurn(Player::Two))
    );
    assert_eq!(session.grid().disc_count(), 0);
    assert_eq!(session.moves_remaining(), HEIGHT * WIDTH);
}

#[test]
fn test_no_win_before_first_move() {
    let session = started();
    assert!(!session.is_winning());
    assert_eq!(session.last_winner(), None);
}

#[test]
fn test_vertical_win_in_column_zero() {
    let mut session = started();
    for turn in 0..7 {
        let (player, column) = if turn % 2 == 0 {
            (Player::One, 0)
        } else {
            (Player::Two, 1)
        };
        session.play(player, column).unwrap();
        if turn < 6 {
            assert!(!session.is_winning(), "premature win after turn {turn}");
        }
    }

    assert!(session.is_winning());
    assert_eq!(session.last_winner(), Some(Player::One));
    assert_eq!(session.last_move(), Some(Position::new(3, 0)));
}

#[test]
fn test_horizontal_win_on_bottom_row() {
    let mut session = started();
    let moves = [
        (Player::One, 0),
        (Player::Two, 5),
        (Player::One, 1),
        (Player::Two, 5),
        (Player::One, 2),
        (Player::Two, 5),
        (Player::One, 3),
    ];
    for (player, column) in moves {
        assert!(!session.is_winning());
        session.play(player, column).unwrap();
    }

    assert!(session.is_winning());
    assert_eq!(session.last_winner(), Some(Player::One));
}

#[test]
fn test_diagonal_win() {
    let mut session = started();
    // Builds a "/" staircase for player 1 on columns 0..=3.
    let moves = [
        (Player::One, 0),
        (Player::Two, 1),
        (Player::One, 1),
        (Player::Two, 2),
        (Player::One, 2),
        (Player::Two, 3),
        (Player::One, 2),
        (Player::Two, 3),
        (Player::One, 3),
        (Player::Two, 5),
        (Player::One, 3),
    ];
    for (player, column) in moves {
        session.play(player, column).unwrap();
    }

    assert!(session.is_winning());
    assert_eq!(session.last_winner(), Some(Player::One));
}

#[test]
fn test_full_grid_without_winner_is_draw() {
    let mut session = started();
    // Column pairs (0,1), (2,3), (4,5) filled in the order that alternates
    // colours every two rows, which never lines up four.
    let order = [0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0];
    let mut player = Player::One;
    for offset in [0, 2, 4] {
        for &column in &order {
            session.play(player, column + offset).unwrap();
            assert!(!session.is_winning(), "unexpected win at column {}", column + offset);
            if session.moves_remaining() > 0 {
                assert!(!session.is_draw(), "draw declared with space left");
            }
            player = player.opponent();
        }
    }

    assert_eq!(session.moves_remaining(), 0);
    assert!(rules::is_full(session.grid()));
    assert!(session.is_draw());
}

#[test]
fn test_grid_serializes_as_tokens() {
    let mut session = started();
    session.play(Player::One, 0).unwrap();
    session.play(Player::Two, 0).unwrap();

    let json = serde_json::to_value(session.grid()).unwrap();
    assert_eq!(json[6][0], 1);
    assert_eq!(json[5][0], 2);
    assert_eq!(json[0][0], 0);
    assert_eq!(json.as_array().map(Vec::len), Some(HEIGHT));
}

#[test]
fn test_grid_renders_top_row_first() {
    let mut session = started();
    session.play(Player::One, 0).unwrap();
    session.play(Player::Two, 5).unwrap();

    let rendered = session.grid().to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), HEIGHT);
    assert_eq!(lines[0], "......");
    assert_eq!(lines[HEIGHT - 1], "1....2");
}
