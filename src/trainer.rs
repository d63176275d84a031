//! DDPG training loop.
//!
//! Single-threaded driver wiring the replay buffer and four networks to
//! one environment:
//!
//! ```text
//!            ┌─────────────┐   action + noise    ┌──────────────┐
//!            │  PolicyNet  │ ──────────────────> │     Env      │
//!            └─────────────┘                     └──────┬───────┘
//!                   ▲                                   │ transition
//!  surrogate update │                                   ▼
//!            ┌──────┴──────┐       batches       ┌──────────────┐
//!            │    QNet     │ <────────────────── │ ReplayBuffer │
//!            └─────────────┘                     └──────────────┘
//!                   │ soft update
//!                   ▼
//!        target PolicyNet / target QNet
//! ```
//!
//! Each episode first advances the epsilon and learning-rate schedules,
//! then runs up to `max_episode_steps` environment steps. Every step that
//! finds more than a full batch in the buffer performs one update: the
//! critic moves toward the TD target and the policy follows the critic's
//! action gradient, after which both targets are soft-updated toward the
//! online networks.

use std::collections::VecDeque;

use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;

use crate::algorithms::ddpg::{
    critic_loss, policy_surrogate, td_targets, DDPGConfig, ExplorationNoise, PolicyNet,
    PolicyNetConfig, QNet, QNetConfig, ACTION_DIM,
};
use crate::checkpoint::{CheckpointError, Checkpointer, CheckpointerConfig};
use crate::core::{ReplayBuffer, Transition};
use crate::core::target_network::soft_update;
use crate::environment::Env;
use crate::metrics::{MetricsLogger, TrainingSnapshot};
use crate::scheduling::ExponentialDecay;

/// Number of recent episode returns kept for the running mean.
const RECENT_REWARD_WINDOW: usize = 100;

// ============================================================================
// Trainer
// ============================================================================

/// DDPG trainer owning all mutable training state.
///
/// Construction restores the newest checkpoint set when one exists in the
/// configured directory, so a process restart continues the same run.
pub struct Trainer<B: AutodiffBackend, E: Env> {
    config: DDPGConfig,
    env: E,
    device: B::Device,
    policy: PolicyNet<B>,
    policy_target: PolicyNet<B>,
    critic: QNet<B>,
    critic_target: QNet<B>,
    buffer: ReplayBuffer,
    explorer: ExplorationNoise,
    epsilon: ExponentialDecay,
    learning_rate: ExponentialDecay,
    checkpointer: Checkpointer,
    episode: usize,
    env_steps: usize,
    recent_rewards: VecDeque<f32>,
}

impl<B: AutodiffBackend, E: Env> Trainer<B, E> {
    /// Build a trainer from a config and environment, restoring the latest
    /// checkpoint set if one exists.
    pub fn new(config: DDPGConfig, env: E, device: B::Device) -> Result<Self, CheckpointError> {
        debug_assert_eq!(env.obs_shape(), config.obs_shape);
        debug_assert_eq!(env.action_dim(), ACTION_DIM);

        let policy = PolicyNetConfig::new(config.obs_shape)
            .with_hidden_size(config.actor_hidden)
            .init(&device);
        let critic = QNetConfig::new(config.obs_shape)
            .with_conv_filters(config.critic_conv_filters)
            .with_conv_kernel(config.critic_conv_kernel)
            .with_trunk_size(config.critic_trunk)
            .with_merge_size(config.critic_merge)
            .init(&device);
        // Targets start as exact copies of the online networks.
        let policy_target = policy.clone();
        let critic_target = critic.clone();

        let checkpointer = Checkpointer::new(
            CheckpointerConfig::new(config.checkpoint_dir.clone())
                .with_save_interval(config.checkpoint_interval)
                .with_keep_last_n(config.keep_last_n),
        )?;

        let epsilon = ExponentialDecay::new(config.initial_epsilon, config.epsilon_decay, 0.0);
        let learning_rate =
            ExponentialDecay::new(config.initial_lr, config.lr_decay, config.min_lr);
        let buffer = ReplayBuffer::new(config.buffer_capacity);
        let explorer = ExplorationNoise::new(config.seed);

        let mut trainer = Self {
            config,
            env,
            device,
            policy,
            policy_target,
            critic,
            critic_target,
            buffer,
            explorer,
            epsilon,
            learning_rate,
            checkpointer,
            episode: 0,
            env_steps: 0,
            recent_rewards: VecDeque::with_capacity(RECENT_REWARD_WINDOW),
        };
        trainer.restore()?;
        Ok(trainer)
    }

    /// The active configuration.
    pub fn config(&self) -> &DDPGConfig {
        &self.config
    }

    /// Episode counter; nonzero after restoring a checkpoint.
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Create configured optimizers for the policy and critic.
    ///
    /// Returns (policy_optimizer, critic_optimizer).
    pub fn create_optimizers(
        &self,
    ) -> (
        impl Optimizer<PolicyNet<B>, B>,
        impl Optimizer<QNet<B>, B>,
    ) {
        let mut policy_config = AdamConfig::new().with_epsilon(1e-5);
        let mut critic_config = AdamConfig::new().with_epsilon(1e-5);

        // Apply gradient clipping if configured
        if let Some(max_norm) = self.config.max_grad_norm {
            policy_config =
                policy_config.with_grad_clipping(Some(GradientClippingConfig::Norm(max_norm)));
            critic_config =
                critic_config.with_grad_clipping(Some(GradientClippingConfig::Norm(max_norm)));
        }

        (policy_config.init(), critic_config.init())
    }

    fn restore(&mut self) -> Result<(), CheckpointError> {
        match self.checkpointer.load_latest::<B, _, _>(
            self.policy.clone(),
            self.policy_target.clone(),
            self.critic.clone(),
            self.critic_target.clone(),
            &self.device,
        ) {
            Ok((policy, policy_target, critic, critic_target, episode)) => {
                self.policy = policy;
                self.policy_target = policy_target;
                self.critic = critic;
                self.critic_target = critic_target;
                self.episode = episode;
                println!("Restored checkpoint set from episode {}", episode);
            }
            Err(CheckpointError::NoCheckpoints) => {
                println!("No checkpoint found, starting fresh");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Run the training loop until `max_episodes` is reached, or forever
    /// when it is unset.
    ///
    /// Returns the trained online policy and critic.
    pub fn run<OP, OC, L>(
        self,
        policy_optimizer: &mut OP,
        critic_optimizer: &mut OC,
        logger: &mut L,
    ) -> Result<(PolicyNet<B>, QNet<B>), CheckpointError>
    where
        OP: Optimizer<PolicyNet<B>, B>,
        OC: Optimizer<QNet<B>, B>,
        L: MetricsLogger,
    {
        let Trainer {
            config,
            mut env,
            device,
            mut policy,
            mut policy_target,
            mut critic,
            mut critic_target,
            mut buffer,
            mut explorer,
            epsilon: mut epsilon_schedule,
            learning_rate: mut lr_schedule,
            checkpointer,
            mut episode,
            mut env_steps,
            mut recent_rewards,
        } = self;

        loop {
            episode += 1;
            // Decay first: the very first episode already runs one step
            // below the initial values.
            let epsilon = epsilon_schedule.advance();
            let lr = lr_schedule.advance();

            if checkpointer.should_save(episode) {
                checkpointer.save::<B, _, _>(
                    &policy,
                    &policy_target,
                    &critic,
                    &critic_target,
                    episode,
                )?;
                println!("Saved checkpoint set at episode {}", episode);
            }

            let mut obs = env.reset();
            let mut episode_reward = 0.0f32;
            let mut episode_steps = 0usize;
            let mut q_max_sum = 0.0f32;
            let mut loss_sum = 0.0f32;
            let mut updates = 0usize;

            for _ in 0..config.max_episode_steps {
                if config.render {
                    env.render();
                }

                let action =
                    select_action(&policy, &mut explorer, &obs, epsilon as f32, &device);
                let outcome = env.step(&action);
                episode_steps += 1;
                episode_reward += outcome.reward;

                buffer.add(Transition::new(
                    obs,
                    action,
                    outcome.reward,
                    outcome.terminal,
                    outcome.observation.clone(),
                    lr,
                ));

                // Updates begin once the buffer holds more than one batch.
                if buffer.len() > config.batch_size {
                    if let Some(batch) = buffer.sample_batch(config.batch_size) {
                        let (p, c, pt, ct, report) = train_step(
                            policy,
                            critic,
                            policy_target,
                            critic_target,
                            policy_optimizer,
                            critic_optimizer,
                            &batch,
                            config.obs_len(),
                            config.gamma,
                            config.tau,
                            &device,
                        );
                        policy = p;
                        critic = c;
                        policy_target = pt;
                        critic_target = ct;
                        q_max_sum += report.batch_max_q;
                        loss_sum += report.critic_loss;
                        updates += 1;
                    }
                }

                let terminal = outcome.terminal;
                obs = outcome.observation;
                if terminal {
                    break;
                }
            }

            env_steps += episode_steps;
            recent_rewards.push_back(episode_reward);
            if recent_rewards.len() > RECENT_REWARD_WINDOW {
                recent_rewards.pop_front();
            }
            let mean_reward = recent_rewards.iter().sum::<f32>() / recent_rewards.len() as f32;

            let avg_max_q = if updates > 0 { q_max_sum / updates as f32 } else { 0.0 };
            let mean_loss = if updates > 0 { loss_sum / updates as f32 } else { 0.0 };

            let snapshot = TrainingSnapshot::new(episode, env_steps, episode_reward)
                .with_mean_reward(mean_reward)
                .with_q_stats(avg_max_q, mean_loss)
                .with_schedules(epsilon, lr)
                .with_buffer_utilization(buffer.utilization());
            logger.log(&snapshot);

            if let Some(limit) = config.max_episodes {
                if episode >= limit {
                    break;
                }
            }
        }

        logger.flush();
        Ok((policy, critic))
    }
}

// ============================================================================
// Action selection
// ============================================================================

/// Pick an action for the given observation.
///
/// With probability epsilon the action is drawn uniformly at random,
/// otherwise the policy runs in inference mode. Exploration noise is
/// applied on top in either case.
fn select_action<B: AutodiffBackend>(
    policy: &PolicyNet<B>,
    explorer: &mut ExplorationNoise,
    obs: &[f32],
    epsilon: f32,
    device: &B::Device,
) -> Vec<f32> {
    let mut action = if explorer.should_explore(epsilon) {
        explorer.random_action()
    } else {
        policy_action(policy, obs, device)
    };
    explorer.apply(&mut action, epsilon);
    action
}

fn policy_action<B: AutodiffBackend>(
    policy: &PolicyNet<B>,
    obs: &[f32],
    device: &B::Device,
) -> Vec<f32> {
    let inference = policy.valid();
    let input =
        Tensor::<B::InnerBackend, 1>::from_floats(obs, device).reshape([1, obs.len()]);
    inference
        .forward(input)
        .into_data()
        .as_slice::<f32>()
        .unwrap()
        .to_vec()
}

// ============================================================================
// Gradient step
// ============================================================================

struct UpdateReport {
    batch_max_q: f32,
    critic_loss: f32,
}

/// One DDPG update on a sampled batch.
///
/// Order matters: the critic steps first and the policy's action gradient
/// is taken through the already-updated critic.
#[allow(clippy::too_many_arguments)]
fn train_step<B, OP, OC>(
    policy: PolicyNet<B>,
    critic: QNet<B>,
    policy_target: PolicyNet<B>,
    critic_target: QNet<B>,
    policy_optimizer: &mut OP,
    critic_optimizer: &mut OC,
    batch: &[Transition],
    obs_len: usize,
    gamma: f32,
    tau: f32,
    device: &B::Device,
) -> (PolicyNet<B>, QNet<B>, PolicyNet<B>, QNet<B>, UpdateReport)
where
    B: AutodiffBackend,
    OP: Optimizer<PolicyNet<B>, B>,
    OC: Optimizer<QNet<B>, B>,
{
    let batch_size = batch.len();
    // The learning rate travels with each stored transition; the first
    // sampled one sets the rate for this whole update.
    let lr = batch[0].learning_rate;

    let states: Vec<f32> = batch.iter().flat_map(|t| t.state.iter().copied()).collect();
    let next_states: Vec<f32> = batch
        .iter()
        .flat_map(|t| t.next_state.iter().copied())
        .collect();
    let actions: Vec<f32> = batch.iter().flat_map(|t| t.action.iter().copied()).collect();
    let rewards: Vec<f32> = batch.iter().map(|t| t.reward).collect();
    let terminals: Vec<f32> = batch
        .iter()
        .map(|t| if t.terminal { 1.0 } else { 0.0 })
        .collect();

    let states = Tensor::<B, 1>::from_floats(states.as_slice(), device)
        .reshape([batch_size, obs_len]);
    let next_states = Tensor::<B, 1>::from_floats(next_states.as_slice(), device)
        .reshape([batch_size, obs_len]);
    let actions = Tensor::<B, 1>::from_floats(actions.as_slice(), device)
        .reshape([batch_size, ACTION_DIM]);
    let rewards = Tensor::<B, 1>::from_floats(rewards.as_slice(), device);
    let terminals = Tensor::<B, 1>::from_floats(terminals.as_slice(), device);

    // TD targets from the target networks
    let next_actions = policy_target.forward(next_states.clone());
    let next_q = critic_target
        .forward(next_states, next_actions)
        .flatten::<1>(0, 1);
    let targets = td_targets(rewards, terminals, next_q, gamma);

    // Critic update. from_grads keeps only the online critic's parameters,
    // so the target networks see no update from this backward pass.
    let q_pred = critic.forward(states.clone(), actions).flatten::<1>(0, 1);
    let batch_max_q = tensor_to_scalar(&q_pred.clone().max());
    let loss = critic_loss(q_pred, targets);
    let critic_loss_val = tensor_to_scalar(&loss);
    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &critic);
    let critic = critic_optimizer.step(lr, critic, grads);

    // Policy update through the freshly updated critic
    let sampled = policy.forward(states.clone());
    let action_grads = critic.action_gradients(states, sampled.clone());
    let surrogate = policy_surrogate(sampled, action_grads);
    let grads = surrogate.backward();
    let grads = GradientsParams::from_grads(grads, &policy);
    let policy = policy_optimizer.step(lr, policy, grads);

    // Targets trail the online networks
    let policy_target = soft_update(&policy, policy_target, tau);
    let critic_target = soft_update(&critic, critic_target, tau);

    (
        policy,
        critic,
        policy_target,
        critic_target,
        UpdateReport {
            batch_max_q,
            critic_loss: critic_loss_val,
        },
    )
}

fn tensor_to_scalar<B: AutodiffBackend>(tensor: &Tensor<B, 1>) -> f32 {
    let data = tensor.clone().into_data();
    data.as_slice::<f32>().unwrap()[0]
}

// ============================================================================
// Tests
// ============================================================================
