//! Train [`Agent`].
mod config;
use crate::{
    checkpoint,
    record::{Record, RecordValue::Scalar, Recorder},
    replay_memory::{ReplayMemory, ReplayMemoryConfig, Trajectory},
    Act, Agent, Env, EpisodeBuffer, StateProcessor,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, info, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::{
    fs,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::SystemTime,
};

/// Phase of the training loop.
///
/// The loop starts in [`Phase::Warmup`], where episodes only fill the replay
/// memory, and switches once and for all to [`Phase::Active`] at episode
/// `warmup_episodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No learning update and no target sync.
    Warmup,

    /// Learning updates, target syncs and checkpoints at their intervals.
    Active,
}

/// Aggregates per-episode values between two summary logs.
#[derive(Default)]
struct Summary {
    episodes: usize,
    steps: usize,
    updates: usize,
    loss: f32,
    reward: f32,
}

impl Summary {
    fn push(&mut self, steps: usize, loss: Option<f32>, reward: f32) {
        self.episodes += 1;
        self.steps += steps;
        self.reward += reward;
        if let Some(loss) = loss {
            self.updates += 1;
            self.loss += loss;
        }
    }

    fn log(&mut self, episode: usize, max_episodes: usize, exploration: f64) {
        info!(
            "Episode {} (progress {} %, random {:.2} %)",
            episode,
            episode * 100 / max_episodes.max(1),
            exploration * 100.0
        );
        info!(" > Average steps: {}", self.steps / self.episodes.max(1));
        if self.updates > 0 {
            info!(" > Average loss:  {}", self.loss / self.updates as f32);
        }
        info!(" > Rewards:       {}", self.reward);
        *self = Self::default();
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the episode-level training loop.
///
/// # Training loop
///
/// 0. Given an agent implementing [`Agent`] and a recorder implementing [`Recorder`].
/// 1. Build [`Env`] and [`StateProcessor`], put the agent in training mode and
///    copy the online parameters into the target network.
/// 2. For each episode `1..=max_episodes`:
///     1. Switch to [`Phase::Active`] if `episode >= warmup_episodes`.
///     2. Reset the environment and fill the frame stack with the initial
///        observation.
///     3. Until the episode is done, sample an action for the current state,
///        repeat it `frame_skip` times (or until the episode ends) and push
///        `(state, action, summed reward)` into the [`EpisodeBuffer`].
///     4. Commit the episode to the [`ReplayMemory`] if a uniform draw is below
///        `remember_prob` or its total reward is positive. The episode buffer is
///        cleared either way.
///     5. If active and `episode % train_interval == 0`, run a learning update
///        on a non-empty memory. A failed update is logged and skipped.
///     6. If active and `episode % sync_interval == 0`, hard-sync the target
///        network.
///     7. Write the record `{episode, steps, loss, exploration, reward}`, where
///        `loss` is present only if an update ran.
///     8. Log a summary every `summary_interval` episodes, and save the online
///        parameters every `checkpoint_interval` episodes when active.
///     9. Stop early if the stop flag is set.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|C[StateProcessor]
///     C -->|State|A
///     C -->|State|D[EpisodeBuffer]
///     D -->|Trajectory|E[ReplayMemory]
///     E -->|TrajectoryBatch|A
/// ```
///
/// Everything runs on the calling thread. The only handle shared with other
/// threads is the stop flag returned by [`Trainer::stop_handle`].
pub struct Trainer<E, P>
where
    E: Env,
    P: StateProcessor<E>,
{
    config: TrainerConfig,

    /// Configuration of the environment for training.
    env_config: E::Config,

    /// Configuration of the state processor.
    processor_config: P::Config,

    memory: ReplayMemory<P::State>,

    phase: Phase,

    /// Draws of the commit policy.
    rng: SmallRng,

    stop: Arc<AtomicBool>,
}

impl<E, P> Trainer<E, P>
where
    E: Env,
    P: StateProcessor<E>,
{
    /// Constructs a trainer with an empty replay memory.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        processor_config: P::Config,
        memory_config: &ReplayMemoryConfig,
    ) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            config,
            env_config,
            processor_config,
            memory: ReplayMemory::build(memory_config),
            phase: Phase::Warmup,
            rng,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A flag which ends the training loop after the current episode when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The replay memory.
    pub fn memory(&self) -> &ReplayMemory<P::State> {
        &self.memory
    }

    /// Plays one episode and returns its steps, total reward and final state.
    ///
    /// The steps are left in `buffer`.
    fn play_episode<A>(
        frame_skip: usize,
        env: &mut E,
        processor: &mut P,
        agent: &mut A,
        buffer: &mut EpisodeBuffer<P::State>,
    ) -> Result<(usize, f32, P::State)>
    where
        A: Agent<E, State = P::State>,
    {
        let obs = env.reset()?;
        let mut state = processor.reset(&obs)?;
        let mut total_reward = 0f32;

        loop {
            let act = agent.sample(&state)?;
            let mut reward = 0f32;
            let mut done = false;
            for _ in 0..frame_skip {
                let (step, _) = env.step(&act)?;
                processor.push(&step.obs)?;
                reward += step.reward;
                if step.is_done() {
                    done = true;
                    break;
                }
            }

            let next_state = processor.state()?;
            buffer.push(state, act.index(), reward);
            total_reward += reward;
            state = next_state;

            if done {
                break;
            }
        }

        Ok((buffer.len(), total_reward, state))
    }

    /// Moves the episode into the replay memory if the commit policy keeps it.
    fn commit(
        &mut self,
        buffer: &mut EpisodeBuffer<P::State>,
        final_state: P::State,
        episode: usize,
        total_reward: f32,
    ) -> Result<()> {
        let steps = buffer.drain();
        let n_steps = steps.len();
        let draw = self.rng.gen::<f64>();
        if draw < self.config.remember_prob || total_reward > 0.0 {
            self.memory.insert(Trajectory::new(steps, final_state)?);
            info!(
                "  {} > Rewards: {} Steps: {} Memory: {} %",
                episode,
                total_reward,
                n_steps,
                self.memory.len() * 100 / self.memory.capacity().max(1)
            );
        }
        Ok(())
    }

    fn save_params<A: Agent<E>>(agent: &A, model_dir: &Path, episode: usize) {
        let path = checkpoint::checkpoint_path(model_dir, episode);
        let result = fs::create_dir_all(model_dir).map_err(anyhow::Error::from);
        match result.and_then(|_| agent.save_params(&path)) {
            Ok(()) => info!("Saved the parameters in {:?}", &path),
            Err(e) => warn!("Failed to save the parameters in {:?}: {}", &path, e),
        }
    }

    /// Trains the agent.
    pub fn train<A>(&mut self, agent: &mut A, recorder: &mut dyn Recorder) -> Result<()>
    where
        A: Agent<E, State = P::State>,
    {
        self.config.validate()?;
        let mut env = E::build(&self.env_config, self.config.seed as i64)?;
        let mut processor = P::build(&self.processor_config)?;
        let mut buffer = EpisodeBuffer::new();
        let mut summary = Summary::default();
        let max_episodes = self.config.max_episodes;
        let timer = SystemTime::now();

        agent.train();
        agent.sync_target()?;
        info!("Starting playing");

        for episode in 1..=max_episodes {
            if self.phase == Phase::Warmup && episode >= self.config.warmup_episodes {
                info!("Starting training at episode {}", episode);
                self.phase = Phase::Active;
            }
            let active = self.phase == Phase::Active;

            let (steps, reward, final_state) = Self::play_episode(
                self.config.frame_skip,
                &mut env,
                &mut processor,
                agent,
                &mut buffer,
            )?;
            self.commit(&mut buffer, final_state, episode, reward)?;

            let mut opt_record = None;
            if active && episode % self.config.train_interval == 0 && !self.memory.is_empty() {
                match agent.opt(&mut self.memory) {
                    Ok(record) => opt_record = record,
                    Err(e) => warn!("Learning update failed at episode {}: {}", episode, e),
                }
            }
            let loss = match &opt_record {
                Some(record) => record.get_scalar_opt("loss")?,
                None => None,
            };

            if active && episode % self.config.sync_interval == 0 {
                info!(" Resetting target network");
                agent.sync_target()?;
            }

            let exploration = agent.exploration_rate();
            let mut record = Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("steps", Scalar(steps as f32)),
                ("exploration", Scalar(exploration as f32)),
                ("reward", Scalar(reward)),
            ]);
            if let Some(opt_record) = opt_record {
                // Metrics of the update, without overriding the episode ones.
                record = opt_record.merge(record);
            }
            recorder.write(record)?;
            debug!("Episode {}: steps {}, reward {}, loss {:?}", episode, steps, reward, loss);

            summary.push(steps, loss, reward);
            if episode % self.config.summary_interval == 0 || episode == max_episodes {
                summary.log(episode, max_episodes, exploration);
            }

            if active && (episode % self.config.checkpoint_interval == 0 || episode == max_episodes) {
                if let Some(model_dir) = &self.config.model_dir {
                    Self::save_params(agent, Path::new(model_dir), episode);
                }
            }

            if self.stop.load(Ordering::Relaxed) {
                info!("Stopped after episode {}", episode);
                break;
            }
        }

        recorder.flush()?;
        info!(
            "Total training time: {:.2} seconds",
            timer.elapsed()?.as_secs_f32()
        );
        Ok(())
    }
}
