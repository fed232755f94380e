use crate::prompt::{Card, Deck, Difficulty, Operator, Prompt};

/// Length of a game in timer ticks (one tick per second)
pub const TIME_LIMIT_TICKS: u32 = 60;

/// Username recorded when the player leaves the name blank
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub username: String,
    pub difficulty: Difficulty,
    pub operator: Operator,
    pub time_limit_ticks: u32,
}

impl SessionConfig {
    pub fn new(username: impl Into<String>, difficulty: Difficulty, operator: Operator) -> Self {
        Self {
            username: username.into(),
            difficulty,
            operator,
            ..Self::default()
        }
    }

    /// Name written to the scoreboard
    pub fn display_username(&self) -> &str {
        let name = self.username.trim();
        if name.is_empty() {
            ANONYMOUS
        } else {
            name
        }
    }

    /// Operator recorded for this game; hard games have none
    pub fn recorded_operator(&self) -> Option<Operator> {
        match self.difficulty {
            Difficulty::Normal => Some(self.operator),
            Difficulty::Hard => None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            difficulty: Difficulty::Normal,
            operator: Operator::Multiplication,
            time_limit_ticks: TIME_LIMIT_TICKS,
        }
    }
}

/// Mutable state of one game in progress
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Cards not yet shown
    pub deck: Deck,
    /// Card currently on screen; `None` once every card is answered
    pub current: Option<Card>,
    pub score: i64,
    pub elapsed_ticks: u32,
    /// Text left in the answer box after the last submission
    pub retained_input: String,
}

impl SessionState {
    /// Pop the first card off `deck` and show it
    pub fn new(mut deck: Deck) -> Self {
        let current = deck.pop_front();
        Self {
            deck,
            current,
            ..Self::default()
        }
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current.as_ref().map(|card| &card.prompt)
    }

    pub fn current_answer(&self) -> Option<i64> {
        self.current.as_ref().map(|card| card.answer)
    }

    /// Cards left including the one on screen
    pub fn remaining(&self) -> usize {
        self.deck.len() + usize::from(self.current.is_some())
    }

    /// Replace the current card with the next one from the deck
    pub fn advance(&mut self) {
        self.current = self.deck.pop_front();
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none() && self.deck.is_empty()
    }
}
