//! Command line tool to classify a single text with a trained model

use std::path::PathBuf;

use burn::backend::LibTorch;
use burn_intents::{
    models::bert::text_classification::Predictor, pipelines::text_classification::Predict,
    utils::devices::default_device,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [TEXT] [OPTIONS]

Arguments:
  TEXT                 The text to classify (defaults to 'brighten image by 20%')

Options:
  -h, --help           Print help
  --model-dir          The trained model directory (defaults to './intent_model')
";

/// Default text to classify
const DEFAULT_TEXT: &str = "brighten image by 20%";

#[derive(Debug)]
struct Args {
    model_dir: Option<PathBuf>,
    text: Option<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model_dir: pargs.opt_value_from_str("--model-dir")?,
            text: pargs.opt_free_from_str()?,
        };

        Ok(Some(args))
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let model_dir = args
        .model_dir
        .unwrap_or_else(|| PathBuf::from("intent_model"));
    let text = args.text.unwrap_or_else(|| DEFAULT_TEXT.to_string());

    let predictor = Predictor::<LibTorch>::load(&model_dir, default_device())?;
    let prediction = predictor.predict(&text)?;

    println!("{}", prediction);

    Ok(())
}
