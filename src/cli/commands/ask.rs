use anyhow::{Result, bail};

use super::{build_pipeline, load_config};
use crate::chat::{Input, parse_input};
use crate::cli::ModelArgs;
use crate::input::QuestionReader;
use crate::ui::Spinner;

/// Sends one question through the pipeline and prints the answer to stdout.
pub async fn run_ask(model: &ModelArgs, question: Option<String>) -> Result<()> {
    let raw = match question {
        Some(q) => q,
        None => QuestionReader::read_stdin()?,
    };

    let Input::Text(question) = parse_input(&raw) else {
        bail!("Error: Question is empty");
    };

    let config = load_config(model, None)?;
    let pipeline = build_pipeline(&config);

    let spinner = Spinner::new("Thinking...");
    let answer = pipeline.invoke(&question).await;
    spinner.stop();

    println!("{}", answer?);
    Ok(())
}
