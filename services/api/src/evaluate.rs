use clap::Args;
use inspection_ai::config::AppConfig;
use inspection_ai::error::AppError;
use inspection_ai::workflows::inspection::domain::deserialize_answers;
use inspection_ai::workflows::inspection::{Answers, EvaluationResult, InspectionEvaluator};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON object mapping checklist field names to answers
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Skip the model even when an API key is configured
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.answers)?;
    let answers = parse_answers(&raw)?;

    let evaluator = if args.offline {
        InspectionEvaluator::heuristic()
    } else {
        let config = AppConfig::load()?;
        InspectionEvaluator::from_config(&config.evaluator)
    };

    let result = evaluator.evaluate(&answers).await;
    println!("{}", render(evaluator.strategy_label(), &answers, &result));
    Ok(())
}

fn parse_answers(raw: &str) -> Result<Answers, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let answers = deserialize_answers(&mut deserializer)?;
    deserializer.end()?;
    Ok(answers)
}

fn render(strategy: &str, answers: &Answers, result: &EvaluationResult) -> String {
    let mut lines = vec![
        format!("Evaluator: {strategy}"),
        format!("Fields answered: {}", answers.len()),
        format!("Score: {}/100", result.score),
        format!("Summary: {}", result.summary),
    ];
    if answers.is_empty() {
        lines.push("Note: the answers file was empty.".to_string());
    }
    lines.join("\n")
}
