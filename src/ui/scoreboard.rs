use mathsprint::{
    leaderboard::{histogram, leaderboard, score_stats, RankedEntry},
    scoreboard::ScoreboardEntry,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

use crate::App;

/// Pure presenter for a single leaderboard row
pub fn present_row(ranked: &RankedEntry) -> Row<'static> {
    let rank_style = match ranked.rank {
        1 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        2 | 3 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };

    Row::new(vec![
        Cell::from(ranked.rank.to_string()).style(rank_style),
        Cell::from(ranked.entry.username.clone()),
        Cell::from(ranked.entry.score.to_string())
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(ranked.entry.timestamp.format("%Y-%m-%d %H:%M").to_string()),
    ])
}

fn stats_line(rows: &[ScoreboardEntry]) -> String {
    match score_stats(rows) {
        Some(s) => format!(
            "{} games   best {}   worst {}   mean {:.1}   sd {:.2}",
            s.games, s.best, s.worst, s.mean, s.std_dev
        ),
        None => "No games played yet".to_string(),
    }
}

pub fn render_scoreboard(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // category tabs
            Constraint::Min(8),    // leaderboard
            Constraint::Length(10), // score distribution
            Constraint::Length(1), // stats
            Constraint::Length(1), // legend
        ])
        .split(area);

    let titles: Vec<String> = App::categories().iter().map(|c| c.title()).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Scoreboard"))
        .select(app.board_tab)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    f.render_widget(tabs, chunks[0]);

    let rows = match app.scoreboard_rows() {
        Ok(rows) => rows,
        Err(err) => {
            let msg = Paragraph::new(format!("Scoreboard unavailable: {err}"))
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            f.render_widget(msg, chunks[1]);
            return;
        }
    };

    let top = leaderboard(&rows, app.config.leaderboard_size);
    let header = Row::new(vec!["Rank", "Username", "Score", "Played"])
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
    let table = Table::new(
        top.iter().map(present_row).collect::<Vec<_>>(),
        [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(7),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Top {}", app.config.leaderboard_size)),
    );
    f.render_widget(table, chunks[1]);

    let bars: Vec<(String, u64)> = histogram(&rows)
        .into_iter()
        .map(|(score, count)| (score.to_string(), count as u64))
        .collect();
    let data: Vec<(&str, u64)> = bars.iter().map(|(l, c)| (l.as_str(), *c)).collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Score distribution"),
        )
        .data(data.as_slice())
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    f.render_widget(chart, chunks[2]);

    f.render_widget(
        Paragraph::new(stats_line(&rows))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        chunks[3],
    );

    f.render_widget(
        Paragraph::new("(←→) category / (b)ack / (q)uit")
            .style(Style::default().add_modifier(Modifier::ITALIC)),
        chunks[4],
    );
}
