//! DQN agent implemented with candle.
use super::{config::VisionDqnConfig, model::DqnModel};
use crate::{model::SubModel1, util::OutDim};
use anyhow::{Context, Result};
use candle_core::{shape::D, Device, Tensor};
use candle_nn::loss::mse;
use log::trace;
use orion_core::{
    record::{Record, RecordValue},
    replay_memory::{ReplayMemory, TrajectoryBatch},
    returns::{bootstrap_targets, normalize, reward_to_go},
    Act, Agent, Env, ExplorationSchedule, Policy,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, marker::PhantomData, path::Path};

/// Scale of the reported loss per step of the batch.
const LOSS_SCALE: f32 = 10000.0;

/// DQN agent learning from batches of whole trajectories.
///
/// The agent holds an online and a target action-value function of the same
/// architecture. A learning update fits the online function to
/// `G_t + gamma * max_a Q_target(s_t+1, a)`, where `G_t` is the normalized
/// reward-to-go of the trajectory. At the last step of a trajectory the target
/// is `G_t` alone.
pub struct VisionDqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    batch_size: usize,
    discount: f32,
    gamma: f32,
    punishment: f32,
    incentive: f32,
    grad_clamp: Option<(f32, f32)>,
    exploration: ExplorationSchedule,
    n_actions: usize,
    train: bool,
    device: Device,
    n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, Q> VisionDqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs the agent. The target network starts as a copy of the
    /// online network.
    pub fn build(config: VisionDqnConfig<Q::Config>) -> Result<Self> {
        let device = Device::try_from(config.device.context("No device is given for DQN agent")?)?;
        let qnet = DqnModel::build(config.model_config.clone(), &device)?;
        let mut qnet_tgt = DqnModel::build(config.model_config, &device)?;
        qnet_tgt.copy_from(&qnet)?;

        Ok(Self {
            n_actions: qnet.out_dim(),
            qnet,
            qnet_tgt,
            batch_size: config.batch_size,
            discount: config.discount,
            gamma: config.gamma,
            punishment: config.punishment,
            incentive: config.incentive,
            grad_clamp: config.grad_clamp,
            exploration: ExplorationSchedule::build(&config.exploration)?,
            train: true,
            device,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }

    /// The online action-value function.
    pub fn qnet(&self) -> &DqnModel<Q> {
        &self.qnet
    }

    /// The target action-value function.
    pub fn qnet_tgt(&self) -> &DqnModel<Q> {
        &self.qnet_tgt
    }

    /// The number of learning updates performed.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    fn greedy(qnet: &DqnModel<Q>, state: &Tensor) -> Result<usize> {
        let a = qnet
            .forward(state)?
            .argmax(D::Minus1)?
            .flatten_all()?
            .get(0)?
            .to_scalar::<u32>()?;
        Ok(a as usize)
    }

    /// Regression targets of a batch, without gradient.
    fn targets(&self, batch: &TrajectoryBatch<Tensor>) -> Result<Tensor> {
        let mut returns = batch.rewards().to_vec();
        reward_to_go(
            &mut returns,
            batch.is_boundary(),
            self.discount,
            self.punishment,
            self.incentive,
        );
        normalize(&mut returns);

        let next_states = Tensor::cat(batch.next_states(), 0)?;
        let max_next = self
            .qnet_tgt
            .forward(&next_states)?
            .max(D::Minus1)?
            .detach()
            .to_vec1::<f32>()?;
        let targets = bootstrap_targets(&returns, &max_next, self.gamma, batch.is_boundary());

        Ok(Tensor::from_vec(targets, (batch.len(),), &self.device)?)
    }

    fn update(&mut self, batch: TrajectoryBatch<Tensor>) -> Result<Record> {
        let n = batch.len();
        trace!("Batch of {} trajectories, {} steps", batch.n_trajectories(), n);
        let tgt = self.targets(&batch)?;

        let states = Tensor::cat(batch.states(), 0)?;
        let act = batch
            .actions()
            .iter()
            .map(|a| *a as u32)
            .collect::<Vec<_>>();
        let act = Tensor::from_vec(act, (n, 1), &self.device)?;
        let pred = self
            .qnet
            .forward(&states)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;

        let loss = mse(&pred, &tgt)?;
        self.qnet.backward_step(&loss, self.grad_clamp)?;
        self.exploration.advance();
        self.n_opts += 1;

        let loss_raw = loss.to_scalar::<f32>()?;
        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss_raw * LOSS_SCALE / n as f32)),
            ("loss_raw", RecordValue::Scalar(loss_raw)),
            (
                "exploration",
                RecordValue::Scalar(self.exploration.rate() as f32),
            ),
            (
                "batch_trajectories",
                RecordValue::Scalar(batch.n_trajectories() as f32),
            ),
            ("batch_steps", RecordValue::Scalar(n as f32)),
        ]))
    }
}

impl<E, Q> Policy<E> for VisionDqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    type State = Tensor;

    /// Epsilon-greedy in training mode, greedy in evaluation mode.
    fn sample(&mut self, state: &Tensor) -> Result<E::Act> {
        let ix = if self.train {
            let qnet = &self.qnet;
            self.exploration
                .select(self.n_actions, &mut self.rng, || Self::greedy(qnet, state))?
        } else {
            Self::greedy(&self.qnet, state)?
        };
        Ok(<E::Act as Act>::from_index(ix))
    }
}

impl<E, Q> Agent<E> for VisionDqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, memory: &mut ReplayMemory<Tensor>) -> Result<Option<Record>> {
        match memory.batch(self.batch_size) {
            None => Ok(None),
            Some(batch) => Ok(Some(self.update(batch)?)),
        }
    }

    fn sync_target(&mut self) -> Result<()> {
        self.qnet_tgt.copy_from(&self.qnet)
    }

    fn exploration_rate(&self) -> f64 {
        self.exploration.rate()
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.qnet.save(path)
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path)?;
        self.sync_target()
    }
}
