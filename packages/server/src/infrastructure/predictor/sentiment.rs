//! Lexicon-based sentiment classifier.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{PredictError, Predictor};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "awesome", "love", "like", "happy", "nice", "fantastic",
    "amazing", "wonderful", "best", "glad", "thanks", "enjoy", "cool", "fun", "perfect",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "sad", "angry", "worst", "horrible", "poor",
    "broken", "bug", "fail", "failed", "slow", "wrong", "annoying", "ugly",
];

/// Words that flip the polarity of the next word.
const NEGATIONS: &[&str] = &["not", "no", "never", "don't", "doesn't", "isn't", "wasn't"];

/// Classifies text as positive, negative or neutral by counting lexicon hits.
///
/// A negation word flips the polarity of the word directly after it, so
/// "not good" counts as negative. Any other word in between ends the
/// negation: "no doubt, this is great" stays positive.
#[derive(Debug, Clone)]
pub struct SentimentPredictor {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for SentimentPredictor {
    fn default() -> Self {
        Self::with_lexicon(POSITIVE_WORDS, NEGATIVE_WORDS)
    }
}

impl SentimentPredictor {
    pub fn with_lexicon(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|w| w.to_lowercase()).collect(),
            negative: negative.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Sum of word polarities: +1 per positive word, -1 per negative word.
    pub fn score(&self, input: &str) -> i64 {
        let mut score = 0;
        let mut negate = false;

        for word in tokenize(input) {
            if NEGATIONS.contains(&word.as_str()) {
                negate = true;
                continue;
            }
            let polarity = if self.positive.contains(&word) {
                1
            } else if self.negative.contains(&word) {
                -1
            } else {
                0
            };
            score += if negate { -polarity } else { polarity };
            // Negation only reaches the next word, scored or not.
            negate = false;
        }

        score
    }
}

fn tokenize(input: &str) -> impl Iterator<Item = String> + '_ {
    input
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl Predictor for SentimentPredictor {
    fn name(&self) -> &'static str {
        "sentiment"
    }

    async fn predict(&self, input: &str) -> Result<String, PredictError> {
        if input.trim().is_empty() {
            return Err(PredictError::EmptyInput);
        }

        let score = self.score(input);
        let label = match score {
            s if s > 0 => "positive",
            s if s < 0 => "negative",
            _ => "neutral",
        };
        Ok(format!("{} (score={})", label, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_positive_text() {
        // テスト項目: 肯定的な文は positive と判定される
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let result = predictor.predict("This is great, I love it!").await;

        // then (期待する結果):
        assert_eq!(result, Ok("positive (score=2)".to_string()));
    }

    #[tokio::test]
    async fn test_negative_text() {
        // テスト項目: 否定的な文は negative と判定される
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let result = predictor.predict("The build is broken and slow").await;

        // then (期待する結果):
        assert_eq!(result, Ok("negative (score=-2)".to_string()));
    }

    #[tokio::test]
    async fn test_neutral_text() {
        // テスト項目: 辞書に該当しない文は neutral と判定される
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let result = predictor.predict("the meeting is at noon").await;

        // then (期待する結果):
        assert_eq!(result, Ok("neutral (score=0)".to_string()));
    }

    #[test]
    fn test_negation_flips_polarity() {
        // テスト項目: 否定語の直後の単語は極性が反転する
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let score = predictor.score("this is not good");

        // then (期待する結果):
        assert_eq!(score, -1);
    }

    #[tokio::test]
    async fn test_negation_ends_at_the_next_word() {
        // テスト項目: 否定語の効果は直後の単語で終わり、離れた単語には及ばない
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let result = predictor.predict("no doubt, this is great").await;

        // then (期待する結果):
        assert_eq!(result, Ok("positive (score=1)".to_string()));
    }

    #[test]
    fn test_unscored_word_consumes_negation() {
        // テスト項目: 辞書にない単語でも否定語の効果を消費する
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let score = predictor.score("not really good");

        // then (期待する結果):
        assert_eq!(score, 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_an_error() {
        // テスト項目: 空白のみの入力は EmptyInput エラーになる
        // given (前提条件):
        let predictor = SentimentPredictor::default();

        // when (操作):
        let result = predictor.predict("   ").await;

        // then (期待する結果):
        assert_eq!(result, Err(PredictError::EmptyInput));
    }

    #[test]
    fn test_custom_lexicon_is_case_insensitive() {
        // テスト項目: カスタム辞書は大文字小文字を区別しない
        // given (前提条件):
        let predictor = SentimentPredictor::with_lexicon(&["Shiny"], &["Rusty"]);

        // when (操作):
        let score = predictor.score("SHINY shiny rusty");

        // then (期待する結果):
        assert_eq!(score, 1);
    }
}
