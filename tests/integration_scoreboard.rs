use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use mathsprint::leaderboard::{leaderboard, Category, DEFAULT_LEADERBOARD_SIZE};
use mathsprint::scoreboard::{
    CachedScoreboard, CsvScoreboard, RetryConfig, RetryingRecorder, ScoreboardQuery,
    ScoreboardStore, SqliteScoreboard,
};
use mathsprint::{Difficulty, Game, Operator, SessionConfig};

fn play(
    store: Arc<dyn ScoreboardStore>,
    name: &str,
    difficulty: Difficulty,
    operator: Operator,
    correct: usize,
) {
    let recorder = RetryingRecorder::new(store, RetryConfig::default());
    let mut game = Game::seeded(
        SessionConfig::new(name, difficulty, operator),
        Box::new(recorder),
        correct as u64,
    );
    game.start(operator, difficulty).unwrap();
    for _ in 0..correct {
        let answer = game.current_prompt().and_then(|p| p.evaluate()).unwrap();
        game.submit_answer(answer).unwrap();
    }
    let result = game.end_game().unwrap();
    assert!(result.record_error.is_none());
}

#[test]
fn csv_scoreboard_round_trips_games() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("scores.csv");
    let store: Arc<dyn ScoreboardStore> = Arc::new(CsvScoreboard::new(&path));

    play(Arc::clone(&store), "ada", Difficulty::Normal, Operator::Addition, 3);
    play(Arc::clone(&store), "", Difficulty::Hard, Operator::Addition, 1);

    let raw = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "timestamp,username,difficulty,operator,score");
    assert!(lines[1].ends_with(",ada,Normal,Addition,3"));
    assert!(lines[2].ends_with(",anonymous,Hard,Invalid,1"));

    let hard = store.query(Difficulty::Hard, None).unwrap();
    assert_eq!(hard.len(), 1);
    assert_eq!(hard[0].username, "anonymous");
}

#[test]
fn sqlite_scoreboard_feeds_leaderboard() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn ScoreboardStore> =
        Arc::new(SqliteScoreboard::open(dir.path().join("scores.db")).unwrap());

    for (name, correct) in [("a", 2), ("b", 5), ("c", 1), ("d", 4)] {
        play(
            Arc::clone(&store),
            name,
            Difficulty::Normal,
            Operator::Subtraction,
            correct,
        );
    }
    play(Arc::clone(&store), "z", Difficulty::Normal, Operator::Addition, 9);

    let cat = Category {
        difficulty: Difficulty::Normal,
        operator: Some(Operator::Subtraction),
    };
    let rows = store.query(cat.difficulty, cat.operator).unwrap();
    let top = leaderboard(&rows, DEFAULT_LEADERBOARD_SIZE);

    let names: Vec<&str> = top.iter().map(|r| r.entry.username.as_str()).collect();
    assert_eq!(names, vec!["b", "d", "a", "c"]);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].entry.score, 5);
}

#[test]
fn sqlite_scoreboard_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.db");

    {
        let store: Arc<dyn ScoreboardStore> = Arc::new(SqliteScoreboard::open(&path).unwrap());
        play(store, "kim", Difficulty::Normal, Operator::Division, 2);
    }

    let reopened = SqliteScoreboard::open(&path).unwrap();
    let rows = reopened.all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "kim");
    assert_eq!(rows[0].operator, Some(Operator::Division));
}

#[test]
fn cached_scoreboard_shows_own_score_after_game() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn ScoreboardStore> = Arc::new(CachedScoreboard::new(CsvScoreboard::new(
        dir.path().join("scores.csv"),
    )));

    // warm the cache with an empty read
    assert!(store
        .query(Difficulty::Normal, Some(Operator::Multiplication))
        .unwrap()
        .is_empty());

    play(
        Arc::clone(&store),
        "lee",
        Difficulty::Normal,
        Operator::Multiplication,
        4,
    );

    let rows = store
        .query(Difficulty::Normal, Some(Operator::Multiplication))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, 4);
}

#[test]
fn unwritable_scoreboard_keeps_the_score() {
    let dir = tempdir().unwrap();
    // a directory where the CSV file should be makes every append fail
    let path = dir.path().join("scores.csv");
    fs::create_dir(&path).unwrap();

    let recorder = RetryingRecorder::new(
        CsvScoreboard::new(&path),
        RetryConfig {
            max_retries: 1,
            base_delay_ms: 1,
            backoff_multiplier: 1.0,
            max_delay_ms: 1,
        },
    );
    let mut game = Game::seeded(
        SessionConfig::new("max", Difficulty::Normal, Operator::Addition),
        Box::new(recorder),
        1,
    );
    game.start(Operator::Addition, Difficulty::Normal).unwrap();
    let answer = game.current_prompt().and_then(|p| p.evaluate()).unwrap();
    game.submit_answer(answer).unwrap();

    let result = game.end_game().unwrap();
    assert_eq!(result.final_score, 1);
    assert!(result.record_error.is_some());
    assert!(game.has_finished());
}
