//! Command line tool to classify a single text with an exported model

use std::path::PathBuf;

use burn_intents::{
    export::DEFAULT_EXPORT_DIR, pipelines::text_classification::Predict, portable::Predictor,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer_portable [TEXT] [OPTIONS]

Arguments:
  TEXT                 The text to classify (defaults to 'draw a red circle')

Options:
  -h, --help           Print help
  --model-dir          The exported model directory (defaults to './onnx_model')
  --quantized          Use the Q8_0 weights
";

/// Default text to classify
const DEFAULT_TEXT: &str = "draw a red circle";

#[derive(Debug)]
struct Args {
    model_dir: Option<PathBuf>,
    quantized: bool,
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
            quantized: pargs.contains("--quantized"),
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
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
    let text = args.text.unwrap_or_else(|| DEFAULT_TEXT.to_string());

    let predictor = if args.quantized {
        Predictor::load_quantized(&model_dir)?
    } else {
        Predictor::load(&model_dir)?
    };

    let prediction = predictor.predict(&text)?;

    println!("{}", prediction);

    Ok(())
}
