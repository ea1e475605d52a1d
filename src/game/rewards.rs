//! Math challenge questions and the seed balance they pay into.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seeds paid for each correct answer.
pub const SEEDS_PER_CORRECT_ANSWER: u32 = 10;

/// Below this score only additions and subtractions are asked.
const EASY_BELOW: u32 = 30;

/// Below this score questions are multiplications.
const MEDIUM_BELOW: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProblem {
    pub question: String,
    pub answer: i32,
}

impl MathProblem {
    pub fn is_correct(&self, answer: i32) -> bool {
        self.answer == answer
    }
}

/// Pick a question whose difficulty tracks the player's score.
pub fn generate_problem<R: Rng>(difficulty: u32, rng: &mut R) -> MathProblem {
    if difficulty < EASY_BELOW {
        if rng.random_bool(0.5) {
            let a = rng.random_range(1..=20);
            let b = rng.random_range(1..=20);
            MathProblem {
                question: format!("What is {a} + {b}?"),
                answer: a + b,
            }
        } else {
            let a = rng.random_range(1..=20);
            let b = rng.random_range(1..=a);
            MathProblem {
                question: format!("What is {a} - {b}?"),
                answer: a - b,
            }
        }
    } else if difficulty < MEDIUM_BELOW {
        let a = rng.random_range(1..=10);
        let b = rng.random_range(1..=10);
        MathProblem {
            question: format!("What is {a} × {b}?"),
            answer: a * b,
        }
    } else {
        let divisor = rng.random_range(2..=6);
        let quotient = rng.random_range(1..=10);
        MathProblem {
            question: format!("What is {} ÷ {divisor}?", divisor * quotient),
            answer: quotient,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurseError {
    #[error("not enough seeds: need {cost}, have {balance}")]
    InsufficientSeeds { cost: u32, balance: u32 },
}

/// Seeds earned in challenges and spent in the shop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPurse {
    balance: u32,
}

impl SeedPurse {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn award_correct_answer(&mut self) -> u32 {
        self.balance = self.balance.saturating_add(SEEDS_PER_CORRECT_ANSWER);
        self.balance
    }

    pub fn purchase(&mut self, cost: u32) -> Result<(), PurseError> {
        if cost > self.balance {
            return Err(PurseError::InsufficientSeeds {
                cost,
                balance: self.balance,
            });
        }
        self.balance -= cost;
        Ok(())
    }
}
