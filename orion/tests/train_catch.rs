use anyhow::Result;
use orion::{
    orion_candle_agent::{
        cnn::{CnnConfig, ConvLayerConfig},
        dqn::{DqnModelConfig, VisionDqnConfig},
        preprocess::{FrameStackConfig, PreprocessConfig},
        Device,
    },
    orion_catch_env::{CatchAct, CatchEnv, CatchEnvConfig},
    orion_core::{
        checkpoint::{find_checkpoints, load_latest},
        record::{BufferedRecorder, CsvRecorder},
        replay_memory::ReplayMemoryConfig,
        ExplorationConfig, TrainerConfig,
    },
    OrionConfig,
};
use tempdir::TempDir;

const MAX_EPISODES: usize = 6;

fn config(model_dir: &str) -> OrionConfig {
    let env = CatchEnvConfig::default()
        .height(6)
        .width(4)
        .paddle_width(2)
        .scale(1)
        .max_balls(3);
    let frame_stack = FrameStackConfig::default()
        .n_stack(2)
        .preprocess(PreprocessConfig::default().crop(None).max_pooling(None));
    let q_config = CnnConfig::default()
        .n_stack(2)
        .in_shape((6, 4))
        .conv(vec![ConvLayerConfig::new(4, 3)])
        .hidden(vec![8])
        .out_dim(CatchAct::N);
    let agent = VisionDqnConfig::default()
        .model_config(DqnModelConfig::default().q_config(q_config))
        .batch_size(4)
        .exploration(ExplorationConfig::default().rate(1.0).floor(0.1).steps(10))
        .device(Device::Cpu);
    let trainer = TrainerConfig::default()
        .max_episodes(MAX_EPISODES)
        .frame_skip(1)
        .train_interval(1)
        .warmup_episodes(2)
        .sync_interval(2)
        .checkpoint_interval(3)
        .summary_interval(3)
        .remember_prob(1.0)
        .model_dir(model_dir);

    OrionConfig {
        env,
        frame_stack,
        agent,
        replay_memory: ReplayMemoryConfig::default().capacity(10),
        trainer,
    }
}

#[test]
fn test_train_catch() -> Result<()> {
    let tmp_dir = TempDir::new("train_catch")?;
    let model_dir = match tmp_dir.as_ref().to_str() {
        Some(s) => s,
        None => panic!("Failed to get string of temporary directory"),
    };
    let mut recorder = BufferedRecorder::new();
    let agent = orion::run(config(model_dir), &mut recorder)?;

    // One record per episode, with a loss once training has started.
    assert_eq!(recorder.len(), MAX_EPISODES);
    for (i, record) in recorder.iter().enumerate() {
        assert_eq!(record.get_scalar("episode")?, (i + 1) as f32);
        assert!(record.get_scalar("steps")? >= 5.0);
        assert_eq!(record.get_scalar_opt("loss")?.is_some(), i >= 1);
    }
    assert_eq!(agent.n_opts(), MAX_EPISODES - 1);

    let episodes = find_checkpoints(model_dir)?
        .into_iter()
        .map(|(e, _)| e)
        .collect::<Vec<_>>();
    assert_eq!(episodes, vec![6, 3]);

    // A new agent resumes from the latest checkpoint.
    let mut agent = orion::build_agent(&config(model_dir))?;
    assert_eq!(agent.n_opts(), 0);
    let path = load_latest::<CatchEnv, _>(&mut agent, model_dir)?;
    assert_eq!(path, Some(find_checkpoints(model_dir)?[0].1.clone()));
    Ok(())
}

#[test]
fn test_csv_metrics() -> Result<()> {
    let tmp_dir = TempDir::new("csv_metrics")?;
    let model_dir = tmp_dir.path().join("model");
    let metrics = tmp_dir.path().join("metrics.csv");
    let config = config(model_dir.to_str().unwrap());

    let mut recorder = CsvRecorder::new(&metrics)?;
    orion::run(config, &mut recorder)?;

    let mut rdr = csv::Reader::from_path(&metrics)?;
    assert_eq!(
        rdr.headers()?.iter().collect::<Vec<_>>(),
        vec!["game", "steps", "loss", "exploration", "reward"]
    );
    let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), MAX_EPISODES);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][2], "");
    assert!(rows[1..].iter().all(|row| !row[2].is_empty()));
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp_dir = TempDir::new("invalid_config").unwrap();
    let mut config = config(tmp_dir.path().to_str().unwrap());
    config.frame_stack = config.frame_stack.n_stack(3);
    let mut recorder = BufferedRecorder::new();
    assert!(orion::run(config, &mut recorder).is_err());
}
