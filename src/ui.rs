pub mod scoreboard;
pub mod screen;

use mathsprint::{Difficulty, EndReason, Operator, Outcome};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn example(difficulty: Difficulty, operator: Operator) -> &'static str {
    match (difficulty, operator) {
        (Difficulty::Hard, _) => "Example: 5 x 3 + 25",
        (_, Operator::Addition) => "Example: 24 + 52",
        (_, Operator::Subtraction) => "Example: 89 - 14",
        (_, Operator::Multiplication) => "Example: 3 x 2",
        (_, Operator::Division) => "Example: 24 / 6",
    }
}

fn describe(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Normal => "Pick an operator. Every prompt has two operands.",
        Difficulty::Hard => {
            "Any operator can appear. Every prompt has three operands and two operators."
        }
    }
}

/// Render a row of choices with the selected one highlighted
fn choice_line<T: PartialEq + std::fmt::Display>(
    label: &str,
    options: &[T],
    selected: &T,
    enabled: bool,
) -> Line<'static> {
    let mut spans = vec![Span::styled(format!("{label:>12}  "), bold())];
    for opt in options {
        let style = if !enabled {
            Style::default().add_modifier(Modifier::DIM)
        } else if opt == selected {
            bold().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {opt} "), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_start(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // rules
            Constraint::Length(1), // username
            Constraint::Length(1), // difficulty
            Constraint::Length(2), // operator
            Constraint::Length(2), // mode description
            Constraint::Min(1),
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("MathSprint", bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(
        "Answer as many prompts as you can in 60 seconds. Type the answer and press enter. \
         A correct answer is worth a point, a wrong one costs a point.",
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);

    let name = if app.config.username.is_empty() {
        Span::styled("(anonymous)", italic().add_modifier(Modifier::DIM))
    } else {
        Span::styled(app.config.username.clone(), bold())
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("{:>12}  ", "Username"), bold()),
        name,
        Span::styled("_", dim_bold()),
    ]))
    .render(chunks[2], buf);

    let difficulty = app.config.difficulty;
    Paragraph::new(choice_line(
        "Difficulty",
        &[Difficulty::Normal, Difficulty::Hard],
        &difficulty,
        true,
    ))
    .render(chunks[3], buf);

    Paragraph::new(choice_line(
        "Operator",
        &Operator::ALL,
        &app.config.operator,
        difficulty == Difficulty::Normal,
    ))
    .render(chunks[4], buf);

    Paragraph::new(vec![
        Line::from(describe(difficulty)),
        Line::from(Span::styled(
            example(difficulty, app.config.operator),
            italic().fg(Color::Yellow),
        )),
    ])
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    if let Some(ref status) = app.status {
        Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);
    }

    Paragraph::new(Span::styled(
        "type a name / (←→) difficulty / (↑↓) operator / (enter) start / (tab) scoreboard / (esc)ape",
        italic(),
    ))
    .render(chunks[8], buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // timer
            Constraint::Length(1), // score
            Constraint::Min(1),
            Constraint::Length(1), // prompt
            Constraint::Length(1), // input
            Constraint::Length(1), // alert
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let secs = game.seconds_remaining();
    let timer_style = if secs <= 10 {
        bold().fg(Color::Red)
    } else {
        dim_bold()
    };
    Paragraph::new(Span::styled(format!("{secs} seconds left"), timer_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(format!("Score: {}", game.score()), bold()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let prompt = game
        .current_prompt()
        .map(|p| format!("{p} = ?"))
        .unwrap_or_default();
    Paragraph::new(Span::styled(prompt, bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("> ", dim_bold()),
        Span::styled(app.input.clone(), bold()),
        Span::styled("_", dim_bold().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    let alert = match app.alert {
        Some(Outcome::Correct) => Span::styled("Correct!", bold().fg(Color::Green)),
        Some(Outcome::Wrong) => Span::styled("Wrong!", bold().fg(Color::Red)),
        None => Span::raw(""),
    };
    Paragraph::new(alert)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    Paragraph::new(Span::styled("(enter) submit / (esc) end game", italic()))
        .render(chunks[7], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // score
            Constraint::Length(1), // reason
            Constraint::Length(2), // record status
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (score, reason, record_error) = match app.game.result() {
        Some(result) => (result.final_score, Some(result.reason), result.record_error.clone()),
        None => (app.game.score(), None, None),
    };

    Paragraph::new(Span::styled(
        format!("Your final score is {score}"),
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let reason = match reason {
        Some(EndReason::TimeUp) => "Time's up!",
        Some(EndReason::DeckExhausted) => "You answered every prompt!",
        Some(EndReason::Quit) => "Game ended early.",
        None => "",
    };
    Paragraph::new(Span::styled(reason, italic()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let record = match record_error {
        Some(err) => Span::styled(
            format!("Score could not be saved: {err}"),
            Style::default().fg(Color::Red),
        ),
        None => Span::styled(
            "Score saved to the scoreboard.",
            Style::default().fg(Color::Green),
        ),
    };
    Paragraph::new(record)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(n)ew game / (s)coreboard / (esc)ape",
        italic(),
    ))
    .render(chunks[5], buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Start => render_start(self, area, buf),
            AppState::Playing => render_playing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            // drawn on the frame by ui::scoreboard
            AppState::Scoreboard => {}
        }
    }
}
