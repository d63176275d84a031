//! DDPG training entry point.
//!
//! Trains the pixel-based driving agent on the built-in synthetic track.
//! Checkpoint sets land in `./checkpoints` and per-episode metrics append
//! to `training_log.csv`, so an interrupted run picks up where it stopped.
//! With no episode limit configured the loop runs until the process is
//! stopped.
//!
//! Run with: `cargo run --release --bin train`

use burn::backend::{Autodiff, NdArray};

use ddpg_rl::{CSVLogger, ConsoleLogger, DDPGConfig, MultiLogger, TrackEnv, Trainer};

type B = Autodiff<NdArray<f32>>;

fn main() {
    println!("=== DDPG from Pixels ===");
    println!("Environment: synthetic track");
    println!();

    let config = DDPGConfig::new();

    println!("Configuration:");
    println!(
        "  Observations: {}x{}x{} ({} values)",
        config.obs_shape[0],
        config.obs_shape[1],
        config.obs_shape[2],
        config.obs_len()
    );
    println!(
        "  Replay buffer: {} transitions, batch size {}",
        config.buffer_capacity, config.batch_size
    );
    println!(
        "  Gamma: {} | Tau: {} | Epsilon: {} x {} per episode",
        config.gamma, config.tau, config.initial_epsilon, config.epsilon_decay
    );
    println!(
        "  Learning rate: {} x {} per episode, floor {}",
        config.initial_lr, config.lr_decay, config.min_lr
    );
    println!(
        "  Checkpoints: every {} episodes -> {}",
        config.checkpoint_interval,
        config.checkpoint_dir.display()
    );
    println!();

    let device = Default::default();
    let env = TrackEnv::new(config.obs_shape);

    let trainer =
        Trainer::<B, _>::new(config, env, device).expect("checkpoint directory unavailable");
    let (mut policy_optimizer, mut critic_optimizer) = trainer.create_optimizers();

    let mut logger = MultiLogger::new()
        .add(ConsoleLogger::new(1))
        .add(CSVLogger::new("training_log.csv").expect("cannot open training_log.csv"));

    println!("Starting training...");
    println!();

    if let Err(e) = trainer.run(&mut policy_optimizer, &mut critic_optimizer, &mut logger) {
        eprintln!("Training stopped: {}", e);
        std::process::exit(1);
    }
}
