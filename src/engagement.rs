use crate::models::{EngagementInsight, EngagementLevel, Message};

/// Score a message from its sentiment and length.
///
/// Inputs are not range checked: negative or oversized values run through the
/// same arithmetic.
pub fn compute(sentiment: f64, message_length: i64) -> (f64, EngagementLevel) {
    let base = sentiment * 100.0;
    let score = round_to_cents(base * length_modifier(message_length));
    (score, classify(score))
}

pub fn length_modifier(message_length: i64) -> f64 {
    match message_length {
        20..=60 => 1.2,
        i64::MIN..=14 => 0.8,
        81.. => 0.9,
        _ => 1.0,
    }
}

pub fn classify(score: f64) -> EngagementLevel {
    if score >= 80.0 {
        EngagementLevel::High
    } else if score >= 60.0 {
        EngagementLevel::Medium
    } else if score >= 40.0 {
        EngagementLevel::Low
    } else {
        EngagementLevel::VeryLow
    }
}

/// Two-decimal rounding of the exact binary value, ties to even.
pub fn round_to_cents(value: f64) -> f64 {
    // Only odd multiples of 1/8 sit exactly halfway between two cents; for
    // those, scaling by 100 is exact.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return (value * 100.0).round_ties_even() / 100.0;
    }

    format!("{value:.2}").parse().unwrap_or(value)
}

impl EngagementInsight {
    pub fn from_message(message: &Message) -> Self {
        let (engagement_score, engagement_level) =
            compute(message.sentiment, message.message_length);

        EngagementInsight {
            author: message.author.clone(),
            timestamp: message.timestamp.clone(),
            category: message.category.clone(),
            sentiment: message.sentiment,
            message_length: message.message_length,
            engagement_score,
            engagement_level,
            message_key: message.key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_table_matches() {
        assert_eq!(compute(0.87, 42), (104.4, EngagementLevel::High));
        assert_eq!(compute(0.5, 10), (40.0, EngagementLevel::Low));
        assert_eq!(compute(0.5, 100), (45.0, EngagementLevel::Low));
        assert_eq!(compute(0.5, 18), (50.0, EngagementLevel::Low));
        assert_eq!(compute(0.2, 30), (24.0, EngagementLevel::VeryLow));
        assert_eq!(compute(1.0, 60), (120.0, EngagementLevel::High));
    }

    #[test]
    fn modifiers_follow_length_bands() {
        assert_eq!(length_modifier(-5), 0.8);
        assert_eq!(length_modifier(14), 0.8);
        assert_eq!(length_modifier(15), 1.0);
        assert_eq!(length_modifier(19), 1.0);
        assert_eq!(length_modifier(20), 1.2);
        assert_eq!(length_modifier(60), 1.2);
        assert_eq!(length_modifier(61), 1.0);
        assert_eq!(length_modifier(80), 1.0);
        assert_eq!(length_modifier(81), 0.9);
    }

    #[test]
    fn levels_use_inclusive_lower_bounds() {
        assert_eq!(classify(80.0), EngagementLevel::High);
        assert_eq!(classify(79.99), EngagementLevel::Medium);
        assert_eq!(classify(60.0), EngagementLevel::Medium);
        assert_eq!(classify(40.0), EngagementLevel::Low);
        assert_eq!(classify(39.99), EngagementLevel::VeryLow);
        assert_eq!(classify(-12.0), EngagementLevel::VeryLow);
        assert_eq!(classify(f64::NAN), EngagementLevel::VeryLow);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_to_cents(0.125), 0.12);
        assert_eq!(round_to_cents(0.375), 0.38);
        assert_eq!(round_to_cents(-0.625), -0.62);
        assert_eq!(round_to_cents(1.0), 1.0);
    }

    #[test]
    fn rounds_from_exact_binary_value() {
        // 0.0105 * 100 * 0.9 is 0.94500000000000006 in binary.
        assert_eq!(round_to_cents(0.0105 * 100.0 * 0.9), 0.95);
        assert_eq!(compute(0.0105, 100), (0.95, EngagementLevel::VeryLow));
        // 0.59995 * 100 is 59.994999... in binary, so it stays below Medium.
        assert_eq!(compute(0.59995, 18), (59.99, EngagementLevel::Low));
    }

    #[test]
    fn non_finite_scores_pass_through() {
        assert!(round_to_cents(f64::NAN).is_nan());
        assert_eq!(round_to_cents(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn out_of_range_inputs_are_scored() {
        assert_eq!(compute(-0.5, 30), (-60.0, EngagementLevel::VeryLow));
        assert_eq!(compute(1.5, 18), (150.0, EngagementLevel::High));
    }

    #[test]
    fn compute_is_deterministic() {
        for (sentiment, length) in [(0.33, 7), (0.61, 25), (0.99, 70), (0.05, 200)] {
            assert_eq!(compute(sentiment, length), compute(sentiment, length));
        }
    }

    #[test]
    fn insight_carries_message_fields() {
        let message = Message {
            author: Some("Charlie".to_string()),
            timestamp: Some("2025-01-29 14:35:20".to_string()),
            category: Some("humor".to_string()),
            sentiment: 0.87,
            keyword_mentioned: Some("meme".to_string()),
            message_length: 42,
            message: Some("I just shared a meme! It was amazing.".to_string()),
        };

        let insight = EngagementInsight::from_message(&message);
        assert_eq!(insight.author.as_deref(), Some("Charlie"));
        assert_eq!(insight.category.as_deref(), Some("humor"));
        assert_eq!(insight.engagement_score, 104.4);
        assert_eq!(insight.engagement_level, EngagementLevel::High);
        assert_eq!(
            insight.message_key,
            "Charlie_2025-01-29 14:35:20_I just shared a meme! It was amazing."
        );
    }
}
