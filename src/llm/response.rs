//! Turning raw completion text into a clean skill list

use log::warn;
use serde_json::Value;

pub const MAX_AI_SKILLS: usize = 50;
pub const MAX_FALLBACK_SKILLS: usize = 20;

const NOISE_WORDS: &[&str] = &["Programming", "Language"];
const PREAMBLE_PREFIXES: &[&str] = &["Here", "Based", "The", "Skills"];
const BULLETS: &[&str] = &["- ", "* ", "• "];

/// Extract skills from a completion that should contain a JSON array of strings.
///
/// Text around the array is ignored. A response without any array yields no
/// skills; an array that is not valid JSON falls back to reading one skill per line.
pub fn parse_skill_response(response: &str) -> Vec<String> {
    let response = response.trim();

    let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) else {
        warn!("No JSON array found in completion");
        return Vec::new();
    };
    if end < start {
        warn!("No JSON array found in completion");
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Value>>(&response[start..=end]) {
        Ok(values) => {
            let mut skills: Vec<String> = Vec::new();
            for value in values {
                let Value::String(raw) = value else { continue };
                if raw.trim().chars().count() <= 1 {
                    continue;
                }
                let cleaned = strip_noise(&title_case(raw.trim()));
                if !cleaned.is_empty() && !skills.contains(&cleaned) {
                    skills.push(cleaned);
                }
            }
            skills.truncate(MAX_AI_SKILLS);
            skills
        }
        Err(e) => {
            warn!("Completion array is not valid JSON ({}), reading lines instead", e);
            parse_skill_lines(response)
        }
    }
}

/// Line-oriented fallback for free-form completions
pub fn parse_skill_lines(response: &str) -> Vec<String> {
    let mut skills = Vec::new();

    for line in response.lines() {
        let mut line = line.trim();
        if line.is_empty() || line.chars().count() >= 50 {
            continue;
        }
        if PREAMBLE_PREFIXES.iter().any(|p| line.starts_with(p)) {
            continue;
        }
        if let Some(rest) = BULLETS.iter().find_map(|b| line.strip_prefix(b)) {
            line = rest.trim();
        }
        if line.starts_with(|c: char| c.is_ascii_digit()) {
            line = line.split_once('.').map(|(_, rest)| rest).unwrap_or(line).trim();
        }
        if !line.is_empty() {
            skills.push(title_case(line));
        }
    }

    skills.truncate(MAX_FALLBACK_SKILLS);
    skills
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn strip_noise(skill: &str) -> String {
    let mut cleaned = skill.to_string();
    for word in NOISE_WORDS {
        cleaned = cleaned.replace(word, "");
    }
    cleaned.trim().to_string()
}
