//! Command line tool to fine-tune an intent classifier

use std::path::PathBuf;

use burn::backend::{Autodiff, LibTorch};
use burn_intents::{
    datasets::commands::{Splits, DEFAULT_DATA_FILE},
    models::bert,
    pipelines::text_classification::{self, training},
    utils::devices::default_device,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [OPTIONS]

Options:
  -h, --help           Print help
  -d, --data-file      The dataset file with 'train' and 'validation' splits (defaults to 'commands.json')
  -o, --output-dir     Where the trained model is written (defaults to 'intent_model')
  -m, --model          The pretrained model to fine-tune (defaults to 'bert-base-uncased')
  -n, --num-epochs     Number of epochs to train for (defaults to 3)
  -b, --batch-size     Batch size (defaults to 8)
  --logging-dir        Where training metrics are written (defaults to 'logs')
  --no-tui             Disable TUI
";

#[derive(Debug)]
struct Args {
    data_file: Option<PathBuf>,
    output_dir: Option<String>,
    model: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    logging_dir: Option<String>,
    use_tui: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            data_file: pargs.opt_value_from_str(["-d", "--data-file"])?,
            output_dir: pargs.opt_value_from_str(["-o", "--output-dir"])?,
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            logging_dir: pargs.opt_value_from_str("--logging-dir")?,
            use_tui: !(pargs.contains("--no-tui")),
        };

        Ok(Some(args))
    }

    /// Apply the provided options over the default training configuration
    fn config(&self) -> training::Config {
        let mut config = training::Config::new().with_use_tui(self.use_tui);

        if let Some(model) = &self.model {
            config.model_name = model.clone();
        }

        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }

        if let Some(num_epochs) = self.num_epochs {
            config.num_epochs = num_epochs;
        }

        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }

        if let Some(logging_dir) = &self.logging_dir {
            config.logging_dir = logging_dir.clone();
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let data_file = args
        .data_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    let splits = Splits::load(&data_file).await?;

    let config = args.config();
    let output_dir = config.output_dir.clone();

    let report = text_classification::train::<
        Autodiff<LibTorch>,
        bert::text_classification::Model<Autodiff<LibTorch>>,
    >(vec![default_device()], &splits, config)
    .await?;

    println!("Validation {}", report);
    println!("Model saved to {}", output_dir);

    Ok(())
}
