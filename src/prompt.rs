use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownLabel;

/// Label stored on the scoreboard in place of an operator for hard games
pub const INVALID_OPERATOR_LABEL: &str = "Invalid";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
pub enum Difficulty {
    Normal,
    Hard,
}

impl FromStr for Difficulty {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(Difficulty::Normal),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(UnknownLabel {
                kind: "difficulty",
                value: other.to_string(),
            }),
        }
    }
}

/// Operator picked for a normal game. Ignored by hard games.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
pub enum Operator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Addition,
        Operator::Subtraction,
        Operator::Multiplication,
        Operator::Division,
    ];

    pub fn symbol(self) -> Symbol {
        match self {
            Operator::Addition => Symbol::Plus,
            Operator::Subtraction => Symbol::Minus,
            Operator::Multiplication => Symbol::Times,
            Operator::Division => Symbol::Divide,
        }
    }

    /// Label written to the scoreboard: hard games have no operator of their own.
    pub fn label(operator: Option<Operator>) -> String {
        operator.map_or_else(|| INVALID_OPERATOR_LABEL.to_string(), |op| op.to_string())
    }
}

impl FromStr for Operator {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.to_string() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "operator",
                value: s.to_string(),
            })
    }
}

/// Arithmetic symbol as it appears inside a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Plus,
    Minus,
    Times,
    Divide,
}

impl Symbol {
    fn is_multiplicative(self) -> bool {
        matches!(self, Symbol::Times | Symbol::Divide)
    }

    fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Symbol::Plus => lhs.checked_add(rhs),
            Symbol::Minus => lhs.checked_sub(rhs),
            Symbol::Times => lhs.checked_mul(rhs),
            Symbol::Divide => {
                if rhs == 0 || lhs % rhs != 0 {
                    None
                } else {
                    Some(lhs / rhs)
                }
            }
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Times => "x",
            Symbol::Divide => "/",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Operand(i64),
    Operator(Symbol),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operand(n) => write!(f, "{n}"),
            Token::Operator(sym) => write!(f, "{sym}"),
        }
    }
}

/// An arithmetic expression shown to the player, kept as tokens so any
/// renderer can lay it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    tokens: Vec<Token>,
}

impl Prompt {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// `lhs <sym> rhs`
    pub fn binary(lhs: i64, sym: Symbol, rhs: i64) -> Self {
        Self::new(vec![
            Token::Operand(lhs),
            Token::Operator(sym),
            Token::Operand(rhs),
        ])
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn operands(&self) -> Vec<i64> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Operand(n) => Some(*n),
                Token::Operator(_) => None,
            })
            .collect()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Operator(sym) => Some(*sym),
                Token::Operand(_) => None,
            })
            .collect()
    }

    /// Evaluate the tokens with `x` and `/` bound tighter than `+` and `-`,
    /// otherwise left to right.
    ///
    /// Returns `None` for malformed token streams, a zero divisor, an inexact
    /// quotient, or overflow.
    pub fn evaluate(&self) -> Option<i64> {
        let mut tokens = self.tokens.iter();
        let mut terms: Vec<i64> = Vec::new();
        let mut additive: Vec<Symbol> = Vec::new();

        let mut current = match tokens.next()? {
            Token::Operand(n) => *n,
            Token::Operator(_) => return None,
        };

        loop {
            let sym = match tokens.next() {
                None => break,
                Some(Token::Operator(sym)) => *sym,
                Some(Token::Operand(_)) => return None,
            };
            let rhs = match tokens.next()? {
                Token::Operand(n) => *n,
                Token::Operator(_) => return None,
            };

            if sym.is_multiplicative() {
                current = sym.apply(current, rhs)?;
            } else {
                terms.push(current);
                additive.push(sym);
                current = rhs;
            }
        }
        terms.push(current);

        let mut terms = terms.into_iter();
        let first = terms.next()?;
        additive
            .into_iter()
            .zip(terms)
            .try_fold(first, |acc, (sym, rhs)| sym.apply(acc, rhs))
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// A prompt paired with its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub prompt: Prompt,
    pub answer: i64,
}

impl Card {
    pub fn new(prompt: Prompt, answer: i64) -> Self {
        Self { prompt, answer }
    }
}

/// Queue of cards for one game, consumed from the front
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn front(&self) -> Option<&Card> {
        self.cards.front()
    }

    pub fn pop_front(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}
