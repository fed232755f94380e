use crate::prompt::{Card, Deck, Difficulty, Operator, Prompt, Symbol, Token};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Iterations spent generating hard prompts. Skipped iterations still count,
/// so a hard deck holds at most this many cards.
pub const HARD_ATTEMPT_BUDGET: usize = 1000;

/// Largest operand of a multiplication/division term (inclusive)
pub const TABLE_MAX: i64 = 12;

/// Operand range for normal addition and subtraction (inclusive)
pub const SUM_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// Configuration for prompt generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenConfig {
    pub operator: Operator,
    pub difficulty: Difficulty,
}

impl GenConfig {
    pub fn new(operator: Operator, difficulty: Difficulty) -> Self {
        Self {
            operator,
            difficulty,
        }
    }
}

/// Builds shuffled decks of prompt/answer cards
pub struct PromptGenerator<R: Rng = StdRng> {
    config: GenConfig,
    rng: R,
}

impl PromptGenerator<StdRng> {
    /// Same seed and config always produce the same deck
    pub fn with_seed(config: GenConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PromptGenerator<R> {
    pub fn from_rng(config: GenConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> GenConfig {
        self.config
    }

    /// Generate a complete shuffled deck for the configuration
    pub fn generate(&mut self) -> Deck {
        let mut cards = match self.config.difficulty {
            Difficulty::Normal => normal_cards(self.config.operator),
            Difficulty::Hard => self.hard_cards(),
        };

        // shuffling whole cards keeps every answer attached to its prompt
        cards.shuffle(&mut self.rng);

        tracing::debug!(
            difficulty = %self.config.difficulty,
            operator = %self.config.operator,
            cards = cards.len(),
            "generated deck"
        );

        Deck::new(cards)
    }

    fn hard_cards(&mut self) -> Vec<Card> {
        let mut cards = Vec::with_capacity(HARD_ATTEMPT_BUDGET);

        for _ in 0..HARD_ATTEMPT_BUDGET {
            let i = self.rng.gen_range(0..=TABLE_MAX);
            let j = self.rng.gen_range(0..=TABLE_MAX);
            let k = self.rng.gen_range(SUM_RANGE);

            let (mut tokens, inner) = if self.rng.gen_bool(0.5) {
                (
                    vec![
                        Token::Operand(i),
                        Token::Operator(Symbol::Times),
                        Token::Operand(j),
                    ],
                    i * j,
                )
            } else {
                if j == 0 {
                    continue;
                }
                (
                    vec![
                        Token::Operand(i * j),
                        Token::Operator(Symbol::Divide),
                        Token::Operand(j),
                    ],
                    i,
                )
            };

            let outer = if self.rng.gen_bool(0.5) {
                Symbol::Plus
            } else {
                Symbol::Minus
            };
            let append = self.rng.gen_bool(0.5);

            let answer = match (outer, append) {
                (Symbol::Minus, true) => inner - k,
                (Symbol::Minus, false) => k - inner,
                _ => inner + k,
            };

            if append {
                tokens.extend([Token::Operator(outer), Token::Operand(k)]);
            } else {
                tokens = [Token::Operand(k), Token::Operator(outer)]
                    .into_iter()
                    .chain(tokens)
                    .collect();
            }

            cards.push(Card::new(Prompt::new(tokens), answer));
        }

        cards
    }
}

/// Every operand pair for a normal game, in enumeration order
fn normal_cards(operator: Operator) -> Vec<Card> {
    let pairs: Vec<(i64, i64)> = match operator {
        Operator::Multiplication => grid(0..=TABLE_MAX, 0..=TABLE_MAX),
        Operator::Addition | Operator::Subtraction => grid(SUM_RANGE, SUM_RANGE),
        Operator::Division => grid(0..=TABLE_MAX, 1..=TABLE_MAX),
    };

    pairs
        .into_iter()
        .map(|(i, j)| match operator {
            Operator::Multiplication => Card::new(Prompt::binary(i, Symbol::Times, j), i * j),
            Operator::Addition => Card::new(Prompt::binary(i, Symbol::Plus, j), i + j),
            Operator::Subtraction => Card::new(Prompt::binary(i, Symbol::Minus, j), i - j),
            // dividend is built from the quotient so division is always exact
            Operator::Division => Card::new(Prompt::binary(i * j, Symbol::Divide, j), i),
        })
        .collect()
}

fn grid(
    outer: std::ops::RangeInclusive<i64>,
    inner: std::ops::RangeInclusive<i64>,
) -> Vec<(i64, i64)> {
    outer
        .flat_map(|i| inner.clone().map(move |j| (i, j)))
        .collect()
}

/// Generate a shuffled deck, drawing all randomness from `rng`
pub fn generate<R: Rng + ?Sized>(
    operator: Operator,
    difficulty: Difficulty,
    rng: &mut R,
) -> Deck {
    PromptGenerator::from_rng(GenConfig::new(operator, difficulty), rng).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::collections::HashSet;

    fn deck_for(operator: Operator, difficulty: Difficulty, seed: u64) -> Deck {
        PromptGenerator::with_seed(GenConfig::new(operator, difficulty), seed).generate()
    }

    #[test]
    fn test_multiplication_deck_covers_table_once() {
        let deck = deck_for(Operator::Multiplication, Difficulty::Normal, 7);
        assert_eq!(deck.len(), 169);

        let pairs: HashSet<(i64, i64)> = deck
            .iter()
            .map(|card| {
                let ops = card.prompt.operands();
                assert_eq!(card.answer, ops[0] * ops[1]);
                assert_eq!(card.prompt.symbols(), vec![Symbol::Times]);
                (ops[0], ops[1])
            })
            .collect();
        assert_eq!(pairs.len(), 169);
        assert!(pairs.iter().all(|&(i, j)| (0..=12).contains(&i) && (0..=12).contains(&j)));
    }

    #[test]
    fn test_division_deck_is_exact() {
        let deck = deck_for(Operator::Division, Difficulty::Normal, 11);
        assert_eq!(deck.len(), 156);

        for card in deck.iter() {
            let ops = card.prompt.operands();
            assert!((0..=12).contains(&card.answer));
            assert_ne!(ops[1], 0);
            assert_eq!(card.answer * ops[1], ops[0]);
        }
    }

    #[test]
    fn test_addition_and_subtraction_decks() {
        let add = deck_for(Operator::Addition, Difficulty::Normal, 1);
        assert_eq!(add.len(), 10_000);
        assert!(add.iter().all(|c| c.prompt.evaluate() == Some(c.answer)));

        let sub = deck_for(Operator::Subtraction, Difficulty::Normal, 1);
        assert_eq!(sub.len(), 10_000);
        assert!(sub.iter().any(|c| c.answer < 0));
        assert!(sub.iter().all(|c| c.prompt.evaluate() == Some(c.answer)));
    }

    #[test]
    fn test_hard_deck_answers_match_tokens() {
        for seed in 0..20 {
            let deck = deck_for(Operator::Addition, Difficulty::Hard, seed);
            assert!(!deck.is_empty());
            assert!(deck.len() <= HARD_ATTEMPT_BUDGET);

            for card in deck.iter() {
                assert_eq!(card.prompt.len(), 5);
                assert_eq!(card.prompt.evaluate(), Some(card.answer), "{}", card.prompt);
            }
        }
    }

    #[test]
    fn test_hard_deck_never_divides_by_zero() {
        let deck = deck_for(Operator::Division, Difficulty::Hard, 99);
        for card in deck.iter() {
            let tokens = card.prompt.tokens();
            for (sym, rhs) in tokens.iter().tuple_windows() {
                if *sym == Token::Operator(Symbol::Divide) {
                    assert_ne!(*rhs, Token::Operand(0));
                }
            }
        }
    }

    #[test]
    fn test_hard_deck_uses_both_placements() {
        let deck = deck_for(Operator::Multiplication, Difficulty::Hard, 3);
        let leading_outer = deck
            .iter()
            .filter(|c| matches!(c.prompt.tokens()[1], Token::Operator(Symbol::Plus | Symbol::Minus)))
            .count();
        assert!(leading_outer > 0);
        assert!(leading_outer < deck.len());
    }

    #[test]
    fn test_same_seed_same_order() {
        let a = deck_for(Operator::Multiplication, Difficulty::Normal, 42);
        let b = deck_for(Operator::Multiplication, Difficulty::Normal, 42);
        assert_eq!(a, b);

        let a = deck_for(Operator::Addition, Difficulty::Hard, 42);
        let b = deck_for(Operator::Addition, Difficulty::Hard, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_deck_is_shuffled() {
        let deck = deck_for(Operator::Multiplication, Difficulty::Normal, 5);
        let ordered = normal_cards(Operator::Multiplication);
        let shuffled: Vec<Card> = deck.iter().cloned().collect();
        assert_ne!(shuffled, ordered);
    }

    #[test]
    fn test_generate_draws_from_the_given_rng() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first = generate(Operator::Division, Difficulty::Normal, &mut a);
        assert_eq!(first, generate(Operator::Division, Difficulty::Normal, &mut b));

        // the rng advanced, so the next deck is dealt differently
        let second = generate(Operator::Division, Difficulty::Normal, &mut a);
        assert_eq!(second.len(), 156);
        assert_ne!(first, second);
    }
}
