use console::{measure_text_width, Style};
use std::path::Path;

use crate::scoring::{EvaluationResult, RubricCatalog, RubricError, SignalKind};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const PREVIEW_CHARS: usize = 60;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_item(last: bool) -> String {
    if last {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn rubrics_prefix() -> String {
    magenta().apply_to("[RUBRICS]").to_string()
}

fn detector_prefix() -> String {
    yellow().apply_to("[DETECTOR]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: i64) -> String {
    let sign = if value >= 0 { "+" } else { "-" };
    format!("{}{}", dim().apply_to(sign), value.abs())
}

pub fn preview(text: &str) -> String {
    let preview = if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS - 3).collect::<String>())
    } else {
        text.to_string()
    };
    preview.replace('\n', " ")
}

pub fn log_init(host: &str, port: u16, demo_mode: bool) {
    println!(
        "{} starting skill-grader on {}...",
        init_prefix(),
        cyan().apply_to(format!("{host}:{port}")),
    );
    println!(
        "{} demo mode is {}.",
        init_prefix(),
        if demo_mode {
            yellow().apply_to("enabled")
        } else {
            dim().apply_to("disabled")
        }
    );
}

pub fn log_lexicon_ready(version: &str, custom: Option<&Path>) {
    let source = match custom {
        Some(path) => format!(" from {}", dim().apply_to(path.display())),
        None => String::new(),
    };
    println!(
        "{} lexicon {}{} ready!",
        detector_prefix(),
        bold().apply_to(version),
        source
    );
}

pub fn log_rubrics_loaded(path: &Path, catalog: &RubricCatalog) {
    println!(
        "{} loaded {} skills from {} (version {})",
        rubrics_prefix(),
        bold().apply_to(catalog.len()),
        cyan().apply_to(path.display()),
        dim().apply_to(catalog.version())
    );
    let count = catalog.len();
    for (i, rubric) in catalog.iter().enumerate() {
        println!(
            "{}{}{}",
            tree_item(i == count - 1),
            pad_label(&rubric.id, 1),
            dim().apply_to(format!(
                "{} keyphrases, pass at {}",
                rubric.keyphrases.len(),
                rubric.pass_threshold
            ))
        );
    }
}

pub fn log_rubrics_watching(path: &Path) {
    println!(
        "{} watching {} for changes",
        rubrics_prefix(),
        dim().apply_to(path.display())
    );
}

pub fn log_rubrics_reloaded(catalog: &RubricCatalog) {
    println!(
        "{} {} {} skills (version {})",
        rubrics_prefix(),
        green().apply_to("reloaded"),
        bold().apply_to(catalog.len()),
        dim().apply_to(catalog.version())
    );
}

pub fn log_rubrics_reload_failed(error: &RubricError) {
    println!(
        "{} {} {}",
        rubrics_prefix(),
        red().apply_to("reload failed, keeping previous catalog:"),
        dim().apply_to(error)
    );
}

pub fn log_server_ready(address: &str) {
    println!(
        "{} listening on {}",
        init_prefix(),
        cyan().apply_to(format!("http://{address}"))
    );
}

pub fn log_evaluation_served(skill_id: &str, result: &EvaluationResult) {
    let status = if result.pass {
        green().apply_to("passed")
    } else {
        red().apply_to("failed")
    };
    println!(
        "{} {} {} (score: {})",
        status,
        cyan().apply_to(skill_id),
        dim().apply_to(if result.demo_mode { "[demo]" } else { "" }),
        bold().apply_to(result.score)
    );
}

/// Full console report for one evaluation, used by the CLI.
pub fn print_evaluation(skill_id: &str, answer: &str, result: &EvaluationResult) {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} {} \"{}\"",
        magenta().apply_to(bold().apply_to("[EVALUATION]")),
        cyan().apply_to(skill_id),
        dim().apply_to(preview(answer))
    ));

    if let Some(error) = &result.breakdown.error {
        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("RESULT")));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("status", 1),
            red().bold().apply_to("ERROR")
        ));
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("reason", 1),
            dim().apply_to(error)
        ));
        println!("{}\n", lines.join("\n"));
        return;
    }

    let keyphrases = &result.breakdown.keyphrases;

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("KEYPHRASES")));
    lines.push(format!("{}{}", tree_branch(), pad_label("matched", 1)));
    push_list(&mut lines, &keyphrases.matched, green());
    lines.push(format!("{}{}", tree_branch(), pad_label("missed", 1)));
    push_list(&mut lines, &keyphrases.missed, yellow());
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("words", 1),
        dim().apply_to(keyphrases.word_count)
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SCORE")));
    lines.push(format!(
        "{}{}{}",
        tree_branch(),
        pad_label("keyphrases", 1),
        format_signed(keyphrases.keyphrase_score as i64)
    ));
    lines.push(format!(
        "{}{}{}",
        tree_branch(),
        pad_label("coherence", 1),
        format_signed(keyphrases.coherence_score as i64)
    ));
    lines.push(format!(
        "{}{}{}",
        tree_branch(),
        pad_label("penalty", 1),
        format_signed(-(keyphrases.penalty as i64))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("total", 1),
        bold().apply_to(result.score)
    ));

    if let Some(detection) = &result.ai_detection {
        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("AI DETECTION")));

        let verdict_style = if detection.is_ai { red() } else { dim() };
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("verdict", 1),
            verdict_style.apply_to(format!("{} ({}%)", detection.verdict, detection.confidence))
        ));

        if !detection.signals.is_empty() {
            lines.push(format!("{}{}", tree_branch(), pad_label("signals", 1)));
            let count = detection.signals.len();
            for (i, signal) in detection.signals.iter().enumerate() {
                let style = if signal.score > 40.0 { yellow() } else { dim() };
                lines.push(format!(
                    "{}{}{}{}",
                    tree_indent(),
                    tree_item(i == count - 1),
                    pad_label(&signal.name.to_string(), 2),
                    style.apply_to(format!("{:.0}", signal.score))
                ));
            }
        }

        lines.push(format!("{}{}", tree_end(), pad_label("flags", 1)));
        if detection.flags.is_empty() {
            lines.push(format!("    {}{}", tree_end(), dim().apply_to("none")));
        } else {
            let count = detection.flags.len();
            for (i, flag) in detection.flags.iter().enumerate() {
                lines.push(format!("    {}{}", tree_item(i == count - 1), flag));
            }
        }

        if let Some(phrases) = detection.signal(SignalKind::Phrases) {
            if let Some(explanation) = &phrases.explanation {
                lines.push(format!("    {}", dim().apply_to(explanation)));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("RESULT")));

    let (status_str, status_style) = if result.pass {
        ("PASSED", green().bold())
    } else {
        ("FAILED", red().bold())
    };
    if let Some(threshold) = result.threshold {
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("threshold", 1),
            dim().apply_to(threshold)
        ));
    }
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("status", 1),
        status_style.apply_to(status_str)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("feedback", 1),
        result.feedback
    ));

    println!("{}\n", lines.join("\n"));
}

fn push_list(lines: &mut Vec<String>, items: &[String], style: Style) {
    if items.is_empty() {
        lines.push(format!("{}{}{}", tree_indent(), tree_end(), dim().apply_to("none")));
        return;
    }
    let count = items.len();
    for (i, item) in items.iter().enumerate() {
        lines.push(format!(
            "{}{}{}",
            tree_indent(),
            tree_item(i == count - 1),
            style.apply_to(item)
        ));
    }
}

pub fn log_generic_error(prefix: &str, message: &str) {
    eprintln!("{} {}", red().apply_to(prefix), message);
}
