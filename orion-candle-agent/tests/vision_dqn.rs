use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{Init, VarBuilder};
use orion_candle_agent::{
    cnn::{Cnn, CnnConfig, ConvLayerConfig},
    dqn::{DqnModelConfig, VisionDqn, VisionDqnConfig},
    model::SubModel1,
    opt::OptimizerConfig,
    util::OutDim,
};
use orion_core::{
    checkpoint::{checkpoint_path, load_latest},
    record::Record,
    replay_memory::{ReplayMemory, ReplayMemoryConfig, Trajectory},
    Agent, Env, EnvStep, ExplorationConfig, Policy, RawFrame, Step,
};
use serde::{Deserialize, Serialize};
use tempdir::TempDir;

const N_ACTIONS: usize = 3;

/// Stands in for the environment type parameter of the agent.
struct NullEnv;

impl Env for NullEnv {
    type Config = ();
    type Obs = RawFrame;
    type Act = usize;
    type Info = ();

    fn build(_config: &(), _seed: i64) -> Result<Self> {
        Ok(Self)
    }

    fn reset(&mut self) -> Result<RawFrame> {
        Ok(RawFrame::zeros(6, 6))
    }

    fn step(&mut self, a: &usize) -> Result<(EnvStep<Self>, Record)> {
        let step = EnvStep::new(RawFrame::zeros(6, 6), *a, 0.0, true, false, ());
        Ok((step, Record::empty()))
    }

    fn n_actions(&self) -> usize {
        N_ACTIONS
    }
}

/// Action-values equal to a trainable bias, whatever the state.
struct ConstQ {
    bias: Tensor,
    out_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
struct ConstQConfig {
    out_dim: usize,
    value: f64,
}

impl OutDim for ConstQConfig {
    fn get_out_dim(&self) -> usize {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: usize) {
        self.out_dim = v;
    }
}

impl SubModel1 for ConstQ {
    type Config = ConstQConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: ConstQConfig) -> Result<Self> {
        let bias = vb.get_with_hints(config.out_dim, "bias", Init::Const(config.value))?;
        Ok(Self {
            bias,
            out_dim: config.out_dim,
        })
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let n = x.dim(0)?;
        Ok(self
            .bias
            .unsqueeze(0)?
            .broadcast_as((n, self.out_dim))?
            .contiguous()?)
    }
}

fn state() -> Tensor {
    Tensor::rand(0f32, 1f32, (1, 2, 6, 6), &Device::Cpu).unwrap()
}

fn trajectory(rewards: &[f32]) -> Trajectory<Tensor> {
    let steps = rewards
        .iter()
        .enumerate()
        .map(|(i, r)| Step {
            state: state(),
            action: i % N_ACTIONS,
            reward: *r,
        })
        .collect();
    Trajectory::new(steps, state()).unwrap()
}

fn memory(trajectories: Vec<Trajectory<Tensor>>) -> ReplayMemory<Tensor> {
    let mut memory = ReplayMemory::build(&ReplayMemoryConfig::default());
    for t in trajectories {
        memory.insert(t);
    }
    memory
}

fn cnn_agent() -> Result<VisionDqn<NullEnv, Cnn>> {
    cnn_agent_with_hidden(8)
}

fn cnn_agent_with_hidden(hidden: usize) -> Result<VisionDqn<NullEnv, Cnn>> {
    let q_config = CnnConfig::default()
        .n_stack(2)
        .in_shape((6, 6))
        .conv(vec![ConvLayerConfig::new(4, 3)])
        .hidden(vec![hidden])
        .out_dim(N_ACTIONS);
    let model_config = DqnModelConfig::default()
        .q_config(q_config)
        .opt_config(OptimizerConfig::Adam { lr: 0.01 });
    let config = VisionDqnConfig::default()
        .model_config(model_config)
        .batch_size(4)
        .exploration(ExplorationConfig::default().rate(1.0).floor(0.1).steps(10))
        .device(orion_candle_agent::Device::Cpu);
    VisionDqn::build(config)
}

fn const_agent(value: f64, gamma: f32) -> Result<VisionDqn<NullEnv, ConstQ>> {
    let model_config = DqnModelConfig::default().q_config(ConstQConfig {
        out_dim: N_ACTIONS,
        value,
    });
    let config = VisionDqnConfig::default()
        .model_config(model_config)
        .discount(1.0)
        .gamma(gamma)
        .punishment(-1.0)
        .incentive(1.0)
        .device(orion_candle_agent::Device::Cpu);
    VisionDqn::build(config)
}

fn max_abs_diff(a: &Tensor, b: &Tensor) -> f32 {
    (a - b)
        .unwrap()
        .abs()
        .unwrap()
        .flatten_all()
        .unwrap()
        .max(0)
        .unwrap()
        .to_scalar::<f32>()
        .unwrap()
}

#[test]
fn test_hard_sync() -> Result<()> {
    let mut agent = cnn_agent()?;
    let x = Tensor::rand(0f32, 1f32, (5, 2, 6, 6), &Device::Cpu)?;

    // The target starts as a copy of the online network.
    let q = agent.qnet().forward(&x)?;
    let q_tgt = agent.qnet_tgt().forward(&x)?;
    assert_eq!(max_abs_diff(&q, &q_tgt), 0.0);

    // Only the online network is updated.
    let mut memory = memory(vec![trajectory(&[0.0, 1.0, 0.0]), trajectory(&[1.0, 0.0])]);
    agent.opt(&mut memory)?;
    let q = agent.qnet().forward(&x)?;
    assert!(max_abs_diff(&q, &agent.qnet_tgt().forward(&x)?) > 0.0);
    assert_eq!(max_abs_diff(&q_tgt, &agent.qnet_tgt().forward(&x)?), 0.0);

    agent.sync_target()?;
    assert_eq!(max_abs_diff(&q, &agent.qnet_tgt().forward(&x)?), 0.0);

    // Updates after the sync do not leak into the target.
    agent.opt(&mut memory)?;
    let q_tgt = agent.qnet_tgt().forward(&x)?;
    assert_eq!(max_abs_diff(&q, &q_tgt), 0.0);
    assert!(max_abs_diff(&agent.qnet().forward(&x)?, &q_tgt) > 0.0);
    Ok(())
}

#[test]
fn test_empty_memory_is_a_noop() -> Result<()> {
    let mut agent = cnn_agent()?;
    let mut memory = memory(vec![]);
    assert!(agent.opt(&mut memory)?.is_none());
    assert_eq!(agent.n_opts(), 0);
    assert_eq!(agent.exploration_rate(), 1.0);
    Ok(())
}

#[test]
fn test_update_record_and_exploration() -> Result<()> {
    let mut agent = cnn_agent()?;
    let mut memory = memory(vec![
        trajectory(&[0.0, 1.0, 0.0]),
        trajectory(&[1.0, 0.0]),
        trajectory(&[0.0]),
    ]);
    let record = agent.opt(&mut memory)?.unwrap();

    assert_eq!(record.get_scalar("batch_trajectories")?, 3.0);
    assert_eq!(record.get_scalar("batch_steps")?, 6.0);
    let expected = record.get_scalar("loss_raw")? * 10000.0 / 6.0;
    assert!((record.get_scalar("loss")? - expected).abs() <= 1e-4 * expected.abs().max(1.0));

    // Decayed exactly once per update.
    assert!((agent.exploration_rate() - 0.91).abs() < 1e-9);
    assert!((record.get_scalar("exploration")? - 0.91).abs() < 1e-6);
    assert_eq!(agent.n_opts(), 1);
    Ok(())
}

#[test]
fn test_no_bootstrap_at_boundaries() -> Result<()> {
    // Two single-step trajectories: normalized returns are -1/sqrt(2) and
    // 1/sqrt(2), both at boundaries. With predictions of 3 the loss is
    // ((3 - a)^2 + (3 + a)^2) / 2 = 9 + a^2 = 9.5.
    let mut agent = const_agent(3.0, 0.5)?;
    let mut memory = memory(vec![trajectory(&[0.0]), trajectory(&[2.0])]);
    let record = agent.opt(&mut memory)?.unwrap();
    assert!((record.get_scalar("loss_raw")? - 9.5).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_bootstrap_inside_trajectory() -> Result<()> {
    // Equal returns normalize to 0. The first step bootstraps 0.5 * 3, the
    // boundary does not: ((3 - 1.5)^2 + 3^2) / 2 = 5.625.
    let mut agent = const_agent(3.0, 0.5)?;
    let mut memory = memory(vec![trajectory(&[0.0, 0.0])]);
    let record = agent.opt(&mut memory)?.unwrap();
    assert!((record.get_scalar("loss_raw")? - 5.625).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_save_and_load_params() -> Result<()> {
    let dir = TempDir::new("vision_dqn")?;
    let path = dir.path().join("weights-1.safetensors");
    let x = Tensor::rand(0f32, 1f32, (2, 2, 6, 6), &Device::Cpu)?;

    let agent = cnn_agent()?;
    agent.save_params(&path)?;
    let q = agent.qnet().forward(&x)?;

    let mut agent_ = cnn_agent()?;
    agent_.load_params(&path)?;
    assert_eq!(max_abs_diff(&q, &agent_.qnet().forward(&x)?), 0.0);
    assert_eq!(max_abs_diff(&q, &agent_.qnet_tgt().forward(&x)?), 0.0);
    Ok(())
}

#[test]
fn test_incompatible_checkpoint_keeps_fresh_params() -> Result<()> {
    let dir = TempDir::new("vision_dqn")?;
    cnn_agent_with_hidden(16)?.save_params(&checkpoint_path(dir.path(), 1))?;
    let x = Tensor::rand(0f32, 1f32, (2, 2, 6, 6), &Device::Cpu)?;

    // Repeated, since a partial write depends on the order of the variables.
    for _ in 0..10 {
        let mut agent = cnn_agent_with_hidden(8)?;
        let q = agent.qnet().forward(&x)?;
        let q_tgt = agent.qnet_tgt().forward(&x)?;
        assert!(load_latest::<NullEnv, _>(&mut agent, dir.path())?.is_none());
        assert_eq!(max_abs_diff(&q, &agent.qnet().forward(&x)?), 0.0);
        assert_eq!(max_abs_diff(&q_tgt, &agent.qnet_tgt().forward(&x)?), 0.0);
    }
    Ok(())
}

#[test]
fn test_greedy_in_eval_mode() -> Result<()> {
    let mut agent = const_agent(0.0, 0.5)?;
    let mut memory = memory(vec![trajectory(&[0.0]), trajectory(&[2.0])]);
    agent.opt(&mut memory)?;

    agent.eval();
    let s = state();
    let a = Policy::<NullEnv>::sample(&mut agent, &s)?;
    assert!(a < N_ACTIONS);
    for _ in 0..10 {
        assert_eq!(Policy::<NullEnv>::sample(&mut agent, &s)?, a);
    }
    Ok(())
}
