use anyhow::{bail, Context, Result};
use clap::Parser;
use skill_grader::scoring::{
    grader_prompt, AiDetector, EvaluationMode, Evaluator, RubricCatalog, RubricProvider,
};
use skill_grader::settings::settings;
use skill_grader::utils::{log_generic_error, print_evaluation};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

/// Score a free-text answer against a skill rubric without starting the server.
#[derive(Debug, Parser)]
#[command(name = "score-answer", version)]
struct Args {
    /// Skill identifier from the rubric catalog
    skill_id: String,

    /// Answer text; read from --file or stdin when omitted
    answer: Vec<String>,

    /// Read the answer from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Return the canned demo result
    #[arg(long)]
    demo: bool,

    /// Rubric catalog to use instead of the configured one
    #[arg(short, long)]
    rubrics: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print the local-model grading prompt instead of scoring
    #[arg(long)]
    prompt: bool,
}

fn read_answer(args: &Args) -> Result<String> {
    if !args.answer.is_empty() {
        return Ok(args.answer.join(" "));
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    if io::stdin().is_terminal() {
        bail!("no answer given; pass it as arguments, with --file, or on stdin");
    }
    let mut answer = String::new();
    io::stdin().read_to_string(&mut answer)?;
    Ok(answer)
}

fn run(args: Args) -> Result<bool> {
    dotenvy::dotenv().ok();

    let answer = read_answer(&args)?;
    let rubrics_path = args
        .rubrics
        .clone()
        .unwrap_or_else(|| settings().rubrics.path.clone());
    let catalog = RubricCatalog::load(&rubrics_path)
        .with_context(|| format!("failed to load rubrics from {}", rubrics_path.display()))?;

    if args.prompt {
        let Some(rubric) = catalog.rubric(&args.skill_id) else {
            bail!("unknown skill '{}'", args.skill_id);
        };
        println!("{}", grader_prompt(&rubric.title, answer.trim()));
        return Ok(true);
    }

    let lexicon = settings().detector.load_lexicon()?;
    let evaluator = Evaluator::new(catalog, AiDetector::new(lexicon));
    let result = evaluator.evaluate(&args.skill_id, &answer, EvaluationMode::from_flag(args.demo));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_evaluation(&args.skill_id, &answer, &result);
    }

    Ok(result.pass)
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            log_generic_error("[ERROR]", &format!("{e:#}"));
            process::exit(2);
        }
    }
}
