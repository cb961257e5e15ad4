use crate::core::world::{FieldView, Snapshot};
use crate::simulation::autocomplete::FieldFeedback;
use crate::simulation::round::RoundPhase;

/// Text rendering of a snapshot for terminal front ends.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut output = String::new();

    if let Some(text) = &snapshot.game_over_text {
        output.push_str("=== ");
        output.push_str(&snapshot.round_label);
        output.push_str(" ===\n");
        output.push_str(text);
        output.push('\n');
        output.push_str(&format!("Score: {}\n", snapshot.score));
        return output;
    }

    output.push_str(&format!("=== {} ===\n", snapshot.round_label));
    match &snapshot.map_image {
        Some(map) => output.push_str(&format!("Map: {}\n", map)),
        None => output.push_str("Map: (none)\n"),
    }
    output.push_str(&format!(
        "{} | Score: {}\n",
        snapshot.chances_left, snapshot.score
    ));

    if snapshot.phase == RoundPhase::Inconsistent {
        output.push_str("This round has too few answer slots. Use 'skip' to continue.\n");
    }

    for (index, field) in snapshot.fields.iter().enumerate() {
        output.push_str(&render_field(index, field));
    }

    if let Some(status) = &snapshot.status {
        output.push_str(status);
        output.push('\n');
    }
    if snapshot.can_advance {
        output.push_str("Round complete. Use 'next' to continue.\n");
    }

    output
}

fn render_field(index: usize, field: &FieldView) -> String {
    let marker = match field.feedback {
        FieldFeedback::Neutral => " ",
        FieldFeedback::Correct => "+",
        FieldFeedback::Incorrect => "x",
    };
    let text = if field.text.is_empty() {
        "_____"
    } else {
        field.text.as_str()
    };
    let mut line = format!("  [{}] {}. {}", marker, index + 1, text);
    if let Some(flag) = &field.flag {
        line.push_str(&format!(" (flag: {})", flag));
    }
    line.push('\n');
    if !field.suggestions.is_empty() {
        line.push_str(&format!("       > {}\n", field.suggestions.join(" | ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::autocomplete::FieldFeedback;
    use crate::simulation::catalog::AssetRef;
    use crate::simulation::round::GameOverReason;

    fn field(text: &str, feedback: FieldFeedback) -> FieldView {
        FieldView {
            slot: Some(AssetRef::new("input_field")),
            text: text.to_string(),
            feedback,
            color: feedback.color(),
            suggestions: Vec::new(),
            flag: None,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            round_label: "Round - 2 (Attempt 1/3)".to_string(),
            phase: RoundPhase::Active,
            map_image: Some(AssetRef::new("maps/baltics.png")),
            chances_left: "Chance Left: 2".to_string(),
            score: 4,
            can_advance: false,
            status: None,
            game_over_text: None,
            fields: vec![
                field("Latvia", FieldFeedback::Correct),
                field("", FieldFeedback::Neutral),
            ],
            events: Vec::new(),
            now_ms: 0,
        }
    }

    #[test]
    fn renders_round_header_and_fields() {
        let mut snap = snapshot();
        snap.fields[1].text = "Li".to_string();
        snap.fields[1].suggestions = vec!["Libya".to_string(), "Lithuania".to_string()];

        let text = render_snapshot(&snap);
        assert!(text.starts_with("=== Round - 2 (Attempt 1/3) ==="));
        assert!(text.contains("Map: maps/baltics.png"));
        assert!(text.contains("Chance Left: 2 | Score: 4"));
        assert!(text.contains("[+] 1. Latvia"));
        assert!(text.contains("[ ] 2. Li"));
        assert!(text.contains("> Libya | Lithuania"));
    }

    #[test]
    fn game_over_replaces_the_board() {
        let mut snap = snapshot();
        snap.round_label = "GAME COMPLETE!".to_string();
        snap.phase = RoundPhase::GameOver(GameOverReason::Completed);
        snap.game_over_text = Some("CONGRATULATIONS!\nYou completed all 10 rounds!".to_string());

        let text = render_snapshot(&snap);
        assert!(text.contains("CONGRATULATIONS!"));
        assert!(text.contains("Score: 4"));
        assert!(!text.contains("Latvia"));
    }

    #[test]
    fn completed_rounds_prompt_for_next() {
        let mut snap = snapshot();
        snap.can_advance = true;
        assert!(render_snapshot(&snap).contains("Use 'next'"));
    }
}
