//! Command line tool to export a trained intent classifier to the portable format

use std::path::PathBuf;

use burn::backend::{ndarray::NdArrayDevice, NdArray};
use burn_intents::export::{export, ExportOptions};
use pico_args::Arguments;

const HELP: &str = "\
Usage: export [OPTIONS]

Options:
  -h, --help           Print help
  --model-dir          The trained model directory (defaults to './intent_model')
  --onnx-dir           Where the portable model is written (defaults to './onnx_model')
  --export-dir         Alias for --onnx-dir
  --no-quant           Skip writing Q8_0 weights
  --smoke-test         Load the exported model and run a test prediction
";

#[derive(Debug)]
struct Args {
    model_dir: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    quantize: bool,
    smoke_test: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let onnx_dir = pargs.opt_value_from_str("--onnx-dir")?;
        let export_dir = pargs.opt_value_from_str("--export-dir")?;

        let args = Args {
            model_dir: pargs.opt_value_from_str("--model-dir")?,
            export_dir: onnx_dir.or(export_dir),
            quantize: !(pargs.contains("--no-quant")),
            smoke_test: pargs.contains("--smoke-test"),
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

    let defaults = ExportOptions::default();
    let options = ExportOptions::new(
        args.model_dir.unwrap_or(defaults.model_dir),
        args.export_dir.unwrap_or(defaults.output_dir),
        args.quantize,
        args.smoke_test,
    );

    let report = export::<NdArray>(&options, NdArrayDevice::Cpu)?;

    println!("Exported model to {}", report.model_file.display());

    if let Some(quantized_file) = &report.quantized_file {
        println!("Quantized model saved to {}", quantized_file.display());
    }

    if let Some(prediction) = &report.smoke_test {
        println!("Smoke test prediction index: {}", prediction.index);
    }

    Ok(())
}
