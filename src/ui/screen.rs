use ratatui::Frame;

use crate::{ui::scoreboard::render_scoreboard, App, AppState};

/// A UI screen boundary, one per app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Start, game and results screens all go through the `App` widget
pub struct WidgetScreen;

impl Screen for WidgetScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct ScoreboardScreen;

impl Screen for ScoreboardScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_scoreboard(app, f);
    }
}

pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Start | AppState::Playing | AppState::Results => Box::new(WidgetScreen),
        AppState::Scoreboard => Box::new(ScoreboardScreen),
    }
}
