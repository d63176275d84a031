//! Checkpoint persistence for training state.
//!
//! A checkpoint *set* is four files keyed by episode number:
//!
//! ```text
//! policy_{episode:08}.bin
//! policy_target_{episode:08}.bin
//! critic_{episode:08}.bin
//! critic_target_{episode:08}.bin
//! ```
//!
//! The episode lives only in the file names; restoring scans the directory
//! for the newest complete set and hands the episode counter back alongside
//! the loaded modules. An empty or missing directory is a cold start
//! (`NoCheckpoints`), never a hard failure.

use std::fs;
use std::io;
use std::path::PathBuf;

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;

/// File name prefixes making up one checkpoint set.
const SET_MEMBERS: [&str; 4] = ["policy", "policy_target", "critic", "critic_target"];

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the checkpointer.
#[derive(Debug, Clone)]
pub struct CheckpointerConfig {
    /// Directory where checkpoint files are stored.
    pub checkpoint_dir: PathBuf,
    /// Save a set every N episodes.
    pub save_interval: usize,
    /// Number of recent sets to keep; 0 keeps all.
    pub keep_last_n: usize,
}

impl Default for CheckpointerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("checkpoints"),
            save_interval: 200,
            keep_last_n: 5,
        }
    }
}

impl CheckpointerConfig {
    /// Create a config with the given directory.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            ..Default::default()
        }
    }

    /// Builder: set the save interval in episodes.
    pub fn with_save_interval(mut self, interval: usize) -> Self {
        self.save_interval = interval;
        self
    }

    /// Builder: set how many recent sets to retain.
    pub fn with_keep_last_n(mut self, keep_last_n: usize) -> Self {
        self.keep_last_n = keep_last_n;
        self
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from checkpoint operations.
#[derive(Debug)]
pub enum CheckpointError {
    /// Filesystem error.
    Io(io::Error),
    /// Burn recorder error during save or load.
    Recorder(String),
    /// No checkpoint sets exist in the directory.
    NoCheckpoints,
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Recorder(e) => write!(f, "Recorder error: {}", e),
            CheckpointError::NoCheckpoints => write!(f, "No checkpoints found"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

// ============================================================================
// Checkpointer
// ============================================================================

/// Saves and restores the four training networks as episode-keyed sets.
pub struct Checkpointer {
    config: CheckpointerConfig,
}

impl Checkpointer {
    /// Create a checkpointer, creating the directory if needed.
    pub fn new(config: CheckpointerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &CheckpointerConfig {
        &self.config
    }

    /// Whether a set should be written at this episode.
    pub fn should_save(&self, episode: usize) -> bool {
        episode > 0 && episode % self.config.save_interval == 0
    }

    /// Persist one checkpoint set, then prune old sets.
    pub fn save<B, MP, MQ>(
        &self,
        policy: &MP,
        policy_target: &MP,
        critic: &MQ,
        critic_target: &MQ,
        episode: usize,
    ) -> Result<(), CheckpointError>
    where
        B: Backend,
        MP: Module<B>,
        MQ: Module<B>,
    {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        policy
            .clone()
            .save_file(self.member_path("policy", episode), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        policy_target
            .clone()
            .save_file(self.member_path("policy_target", episode), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        critic
            .clone()
            .save_file(self.member_path("critic", episode), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        critic_target
            .clone()
            .save_file(self.member_path("critic_target", episode), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        self.cleanup_old_sets()
    }

    /// Restore the newest set into the given module templates.
    ///
    /// Burn's recorder needs templates of the right architecture to load
    /// into; freshly initialized networks serve. Returns the restored modules
    /// and the episode the set was saved at.
    pub fn load_latest<B, MP, MQ>(
        &self,
        policy: MP,
        policy_target: MP,
        critic: MQ,
        critic_target: MQ,
        device: &B::Device,
    ) -> Result<(MP, MP, MQ, MQ, usize), CheckpointError>
    where
        B: Backend,
        MP: Module<B>,
        MQ: Module<B>,
    {
        let episode = self
            .latest_episode()?
            .ok_or(CheckpointError::NoCheckpoints)?;

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let policy = policy
            .load_file(self.member_path("policy", episode), &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        let policy_target = policy_target
            .load_file(self.member_path("policy_target", episode), &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        let critic = critic
            .load_file(self.member_path("critic", episode), &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        let critic_target = critic_target
            .load_file(self.member_path("critic_target", episode), &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        Ok((policy, policy_target, critic, critic_target, episode))
    }

    /// Episode of the newest saved set, if any.
    pub fn latest_episode(&self) -> Result<Option<usize>, CheckpointError> {
        Ok(self.saved_episodes()?.pop())
    }

    /// Episodes of all saved sets, ascending.
    pub fn saved_episodes(&self) -> Result<Vec<usize>, CheckpointError> {
        let mut episodes: Vec<usize> = fs::read_dir(&self.config.checkpoint_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let filename = path.file_name()?.to_str()?;
                // "policy_" also prefixes the target files; their stems fail
                // the numeric parse and drop out here.
                filename
                    .strip_prefix("policy_")?
                    .strip_suffix(".bin")?
                    .parse()
                    .ok()
            })
            .collect();
        episodes.sort_unstable();
        episodes.dedup();
        Ok(episodes)
    }

    fn member_path(&self, member: &str, episode: usize) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(format!("{}_{:08}.bin", member, episode))
    }

    fn cleanup_old_sets(&self) -> Result<(), CheckpointError> {
        if self.config.keep_last_n == 0 {
            return Ok(());
        }
        let episodes = self.saved_episodes()?;
        if episodes.len() <= self.config.keep_last_n {
            return Ok(());
        }
        let cutoff = episodes.len() - self.config.keep_last_n;
        for &episode in &episodes[..cutoff] {
            for member in SET_MEMBERS {
                let _ = fs::remove_file(self.member_path(member, episode));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ddpg::{PolicyNet, PolicyNetConfig, QNet, QNetConfig};
    use burn::backend::NdArray;
    use burn::tensor::Tensor;
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    const OBS: [usize; 3] = [8, 8, 1];

    fn make_policy(device: &<TestBackend as Backend>::Device) -> PolicyNet<TestBackend> {
        PolicyNetConfig::new(OBS).with_hidden_size(4).init(device)
    }

    fn make_critic(device: &<TestBackend as Backend>::Device) -> QNet<TestBackend> {
        QNetConfig::new(OBS)
            .with_conv_filters(2)
            .with_conv_kernel(3)
            .with_trunk_size(8)
            .with_merge_size(4)
            .init(device)
    }

    fn probe_policy(net: &PolicyNet<TestBackend>) -> Vec<f32> {
        let device = Default::default();
        let obs = Tensor::<TestBackend, 1>::from_floats(vec![0.5f32; 64].as_slice(), &device)
            .reshape([1, 64]);
        net.forward(obs).into_data().as_slice::<f32>().unwrap().to_vec()
    }

    #[test]
    fn test_config_defaults_and_builders() {
        let config = CheckpointerConfig::new("ckpts")
            .with_save_interval(50)
            .with_keep_last_n(2);
        assert_eq!(config.checkpoint_dir, PathBuf::from("ckpts"));
        assert_eq!(config.save_interval, 50);
        assert_eq!(config.keep_last_n, 2);

        let defaults = CheckpointerConfig::default();
        assert_eq!(defaults.save_interval, 200);
        assert_eq!(defaults.keep_last_n, 5);
    }

    #[test]
    fn test_should_save_boundaries() {
        let dir = tempdir().unwrap();
        let ckpt =
            Checkpointer::new(CheckpointerConfig::new(dir.path()).with_save_interval(200)).unwrap();
        assert!(!ckpt.should_save(0));
        assert!(!ckpt.should_save(1));
        assert!(!ckpt.should_save(199));
        assert!(ckpt.should_save(200));
        assert!(!ckpt.should_save(201));
        assert!(ckpt.should_save(400));
    }

    #[test]
    fn test_empty_directory_is_cold_start() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();
        let device = Default::default();

        assert!(ckpt.latest_episode().unwrap().is_none());

        let result = ckpt.load_latest::<TestBackend, _, _>(
            make_policy(&device),
            make_policy(&device),
            make_critic(&device),
            make_critic(&device),
            &device,
        );
        assert!(matches!(result, Err(CheckpointError::NoCheckpoints)));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();
        let device = Default::default();

        let policy = make_policy(&device);
        let policy_target = make_policy(&device);
        let critic = make_critic(&device);
        let critic_target = make_critic(&device);
        let expected = probe_policy(&policy);
        let expected_target = probe_policy(&policy_target);

        ckpt.save::<TestBackend, _, _>(&policy, &policy_target, &critic, &critic_target, 7)
            .unwrap();

        // Fresh random templates must take on the saved weights.
        let (restored, restored_target, _critic, _critic_target, episode) = ckpt
            .load_latest::<TestBackend, _, _>(
                make_policy(&device),
                make_policy(&device),
                make_critic(&device),
                make_critic(&device),
                &device,
            )
            .unwrap();

        assert_eq!(episode, 7);
        for (e, a) in expected.iter().zip(probe_policy(&restored)) {
            assert!((e - a).abs() < 1e-6);
        }
        for (e, a) in expected_target.iter().zip(probe_policy(&restored_target)) {
            assert!((e - a).abs() < 1e-6);
        }
    }

    #[test]
    fn test_latest_picks_newest() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();
        let device = Default::default();

        let policy = make_policy(&device);
        let critic = make_critic(&device);
        for episode in [3, 12, 8] {
            ckpt.save::<TestBackend, _, _>(&policy, &policy, &critic, &critic, episode)
                .unwrap();
        }

        assert_eq!(ckpt.latest_episode().unwrap(), Some(12));
        assert_eq!(ckpt.saved_episodes().unwrap(), vec![3, 8, 12]);
    }

    #[test]
    fn test_cleanup_keeps_recent_sets() {
        let dir = tempdir().unwrap();
        let ckpt =
            Checkpointer::new(CheckpointerConfig::new(dir.path()).with_keep_last_n(2)).unwrap();
        let device = Default::default();

        let policy = make_policy(&device);
        let critic = make_critic(&device);
        for episode in 1..=4 {
            ckpt.save::<TestBackend, _, _>(&policy, &policy, &critic, &critic, episode)
                .unwrap();
        }

        assert_eq!(ckpt.saved_episodes().unwrap(), vec![3, 4]);
        assert!(!dir.path().join("policy_00000001.bin").exists());
        assert!(!dir.path().join("critic_target_00000002.bin").exists());
        assert!(dir.path().join("policy_00000004.bin").exists());

        // Two sets of four files each
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 8);
    }

    #[test]
    fn test_error_display() {
        let e = CheckpointError::NoCheckpoints;
        assert_eq!(e.to_string(), "No checkpoints found");
        let e = CheckpointError::Recorder("bad record".into());
        assert!(e.to_string().contains("bad record"));
    }
}
