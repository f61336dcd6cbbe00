use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Proverb;

/// Wrong answers offered next to the correct meaning.
pub const DISTRACTORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub proverb_id: Uuid,
    pub text: String,
    pub correct_meaning: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

/// One question per proverb: its meaning plus up to three distinct meanings
/// drawn from the other proverbs, in random order.
pub fn build_quiz<R: Rng + ?Sized>(proverbs: &[Proverb], rng: &mut R) -> Vec<QuizQuestion> {
    proverbs
        .iter()
        .enumerate()
        .map(|(idx, proverb)| {
            let mut others: Vec<&str> = Vec::new();
            for (i, other) in proverbs.iter().enumerate() {
                let meaning = other.meaning.as_str();
                if i != idx && meaning != proverb.meaning && !others.contains(&meaning) {
                    others.push(meaning);
                }
            }

            let mut options: Vec<String> = others
                .choose_multiple(rng, DISTRACTORS)
                .map(|m| m.to_string())
                .collect();
            options.push(proverb.meaning.clone());
            options.shuffle(rng);

            QuizQuestion {
                proverb_id: proverb.id,
                text: proverb.text.clone(),
                correct_meaning: proverb.meaning.clone(),
                options,
            }
        })
        .collect()
}

/// `answers[i]` is the option chosen for `quiz[i]`; missing answers count as wrong.
pub fn score(quiz: &[QuizQuestion], answers: &[String]) -> QuizScore {
    let correct = quiz
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.correct_meaning == **answer)
        .count();
    let percentage = if quiz.is_empty() {
        0
    } else {
        ((correct as f64 / quiz.len() as f64) * 100.0).round() as u32
    };
    QuizScore {
        correct,
        total: quiz.len(),
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn proverb(text: &str, meaning: &str) -> Proverb {
        let now = Utc::now();
        Proverb {
            id: Uuid::new_v4(),
            text: text.to_string(),
            meaning: meaning.to_string(),
            category: None,
            region: None,
            keywords: Vec::new(),
            image_prompt: None,
            image_url: None,
            validated: true,
            popularity: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample(n: usize) -> Vec<Proverb> {
        (0..n)
            .map(|i| proverb(&format!("proverb {}", i), &format!("meaning {}", i)))
            .collect()
    }

    #[test]
    fn test_each_question_has_four_distinct_options() {
        let proverbs = sample(5);
        let mut rng = StdRng::seed_from_u64(3);
        let quiz = build_quiz(&proverbs, &mut rng);

        assert_eq!(quiz.len(), 5);
        for (question, proverb) in quiz.iter().zip(&proverbs) {
            assert_eq!(question.proverb_id, proverb.id);
            assert_eq!(question.options.len(), 4);
            assert!(question.options.contains(&proverb.meaning));
            let distinct: HashSet<_> = question.options.iter().collect();
            assert_eq!(distinct.len(), 4);
        }
    }

    #[test]
    fn test_small_pool_gives_fewer_options() {
        let proverbs = sample(2);
        let mut rng = StdRng::seed_from_u64(3);
        let quiz = build_quiz(&proverbs, &mut rng);
        assert_eq!(quiz[0].options.len(), 2);
    }

    #[test]
    fn test_duplicate_meanings_not_offered_twice() {
        let proverbs = vec![
            proverb("a", "same"),
            proverb("b", "same"),
            proverb("c", "other"),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let quiz = build_quiz(&proverbs, &mut rng);
        assert_eq!(quiz[0].options.len(), 2);
    }

    #[test]
    fn test_score_counts_matches() {
        let proverbs = sample(4);
        let mut rng = StdRng::seed_from_u64(11);
        let quiz = build_quiz(&proverbs, &mut rng);
        let answers = vec![
            quiz[0].correct_meaning.clone(),
            "wrong".to_string(),
            quiz[2].correct_meaning.clone(),
        ];
        let result = score(&quiz, &answers);
        assert_eq!(result.correct, 2);
        assert_eq!(result.total, 4);
        assert_eq!(result.percentage, 50);
        assert_eq!(score(&[], &[]).percentage, 0);
    }
}
