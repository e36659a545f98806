use anyhow::Result;
use clap::Parser;
use log::info;
use orion::{
    orion_core::record::{CsvRecorder, NullRecorder, Recorder},
    orion_tensorboard::TensorboardRecorder,
    OrionConfig,
};
use std::path::PathBuf;

/// Train a DQN agent on the falling-ball game
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration, the default configuration if not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of the checkpoints, overriding the configuration
    #[arg(short, long)]
    model_dir: Option<String>,

    /// Write per-episode metrics to this CSV file
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Write per-episode metrics for Tensorboard into the model directory
    #[arg(long, default_value_t = false)]
    tensorboard: bool,

    /// Print the effective configuration and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,

    /// Write the default configuration to this file and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<OrionConfig> {
    let config = match &args.config {
        Some(path) => OrionConfig::load(path)?,
        None => OrionConfig::default(),
    };
    Ok(match &args.model_dir {
        Some(model_dir) => config.model_dir(model_dir.as_str()),
        None => config,
    })
}

fn create_recorder(args: &Args, config: &OrionConfig) -> Result<Box<dyn Recorder>> {
    if args.tensorboard {
        let logdir = config
            .trainer
            .model_dir
            .clone()
            .unwrap_or_else(|| ".".to_string());
        Ok(Box::new(TensorboardRecorder::new(logdir)))
    } else if let Some(path) = &args.metrics {
        Ok(Box::new(CsvRecorder::new(path)?))
    } else {
        Ok(Box::new(NullRecorder::new()))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        OrionConfig::default().save(path)?;
        info!("Default configuration written to {:?}", path);
        return Ok(());
    }

    let config = load_config(&args)?;
    if args.show_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let mut recorder = create_recorder(&args, &config)?;
    orion::run(config, recorder.as_mut())?;
    Ok(())
}
