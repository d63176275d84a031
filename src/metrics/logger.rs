//! Training loggers.
//!
//! Provides different logging backends for per-episode training metrics.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Per-episode training snapshot for logging.
#[derive(Debug, Clone)]
pub struct TrainingSnapshot {
    /// Episode number (global, survives restarts).
    pub episode: usize,
    /// Total environment steps taken so far.
    pub env_steps: usize,
    /// Undiscounted return of this episode.
    pub episode_reward: f32,
    /// Mean return over the recent episode window.
    pub mean_reward: f32,
    /// Mean over updates of the batch-max online Q value.
    pub avg_max_q: f32,
    /// Mean critic loss over this episode's updates.
    pub critic_loss: f32,
    /// Exploration rate in effect this episode.
    pub epsilon: f64,
    /// Learning rate in effect this episode.
    pub learning_rate: f64,
    /// Replay buffer fill fraction in [0, 1].
    pub buffer_utilization: f32,
}

impl TrainingSnapshot {
    /// Create a new training snapshot.
    pub fn new(episode: usize, env_steps: usize, episode_reward: f32) -> Self {
        Self {
            episode,
            env_steps,
            episode_reward,
            mean_reward: 0.0,
            avg_max_q: 0.0,
            critic_loss: 0.0,
            epsilon: 0.0,
            learning_rate: 0.0,
            buffer_utilization: 0.0,
        }
    }

    /// Set the recent-window mean reward.
    pub fn with_mean_reward(mut self, mean_reward: f32) -> Self {
        self.mean_reward = mean_reward;
        self
    }

    /// Set critic statistics for this episode.
    pub fn with_q_stats(mut self, avg_max_q: f32, critic_loss: f32) -> Self {
        self.avg_max_q = avg_max_q;
        self.critic_loss = critic_loss;
        self
    }

    /// Set the schedule values in effect.
    pub fn with_schedules(mut self, epsilon: f64, learning_rate: f64) -> Self {
        self.epsilon = epsilon;
        self.learning_rate = learning_rate;
        self
    }

    /// Set the replay buffer fill fraction.
    pub fn with_buffer_utilization(mut self, utilization: f32) -> Self {
        self.buffer_utilization = utilization;
        self
    }
}

/// Logger trait for different logging backends.
pub trait MetricsLogger {
    /// Log a training snapshot.
    fn log(&mut self, snapshot: &TrainingSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Console logger with pretty formatting.
pub struct ConsoleLogger {
    log_interval: usize,
    last_log_episode: usize,
    start_time: Instant,
    show_header: bool,
}

impl ConsoleLogger {
    /// Create a new console logger.
    ///
    /// # Arguments
    ///
    /// * `log_interval` - Episodes between log entries
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval,
            last_log_episode: 0,
            start_time: Instant::now(),
            show_header: true,
        }
    }

    /// Reset the start time.
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }

    fn print_header(&self) {
        println!(
            "{:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>11} {:>8}",
            "Episode", "EnvSteps", "Reward", "MeanRew", "AvgMaxQ", "Loss", "Epsilon", "LR", "FPS"
        );
        println!("{}", "-".repeat(92));
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        // Check if we should log at this episode
        if snapshot.episode < self.last_log_episode + self.log_interval {
            return;
        }

        // Print header on first log
        if self.show_header {
            self.print_header();
            self.show_header = false;
        }

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let fps = if elapsed > 0.0 {
            snapshot.env_steps as f32 / elapsed
        } else {
            0.0
        };

        println!(
            "{:>8} {:>10} {:>10.2} {:>10.2} {:>10.4} {:>10.4} {:>8.4} {:>11.3e} {:>8.0}",
            snapshot.episode,
            snapshot.env_steps,
            snapshot.episode_reward,
            snapshot.mean_reward,
            snapshot.avg_max_q,
            snapshot.critic_loss,
            snapshot.epsilon,
            snapshot.learning_rate,
            fps
        );

        self.last_log_episode = snapshot.episode;
    }

    fn flush(&mut self) {
        // stdout is typically line-buffered, so nothing to do
    }
}

/// CSV file logger for analysis.
///
/// Opens in append mode so a resumed run continues the same file; the
/// header is written only when the file is empty.
pub struct CSVLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CSVLogger {
    /// Create a new CSV logger.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if needs_header {
            writeln!(
                writer,
                "episode,env_steps,episode_reward,mean_reward,avg_max_q,critic_loss,epsilon,learning_rate,buffer_utilization,elapsed_secs"
            )?;
        }

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }

    /// Reset the start time.
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }
}

impl MetricsLogger for CSVLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        let elapsed = self.start_time.elapsed().as_secs_f32();

        let _ = writeln!(
            self.writer,
            "{},{},{:.4},{:.4},{:.6},{:.6},{:.6},{:.8},{:.4},{:.2}",
            snapshot.episode,
            snapshot.env_steps,
            snapshot.episode_reward,
            snapshot.mean_reward,
            snapshot.avg_max_q,
            snapshot.critic_loss,
            snapshot.epsilon,
            snapshot.learning_rate,
            snapshot.buffer_utilization,
            elapsed
        );
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for CSVLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Multi-logger that writes to multiple backends.
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    /// Create a new multi-logger.
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
        }
    }

    /// Add a logger.
    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }
}

impl Default for MultiLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        for logger in &mut self.loggers {
            logger.log(snapshot);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[test]
    fn test_training_snapshot() {
        let snapshot = TrainingSnapshot::new(100, 1000, 150.0)
            .with_mean_reward(120.0)
            .with_q_stats(4.5, 0.3)
            .with_schedules(0.5, 3e-4)
            .with_buffer_utilization(0.25);

        assert_eq!(snapshot.episode, 100);
        assert_eq!(snapshot.env_steps, 1000);
        assert!((snapshot.episode_reward - 150.0).abs() < 0.01);
        assert!((snapshot.mean_reward - 120.0).abs() < 0.01);
        assert!((snapshot.avg_max_q - 4.5).abs() < 0.01);
        assert!((snapshot.critic_loss - 0.3).abs() < 0.01);
        assert!((snapshot.epsilon - 0.5).abs() < 1e-9);
        assert!((snapshot.learning_rate - 3e-4).abs() < 1e-9);
        assert!((snapshot.buffer_utilization - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_console_logger_interval() {
        let mut logger = ConsoleLogger::new(10);

        let snapshot1 = TrainingSnapshot::new(5, 500, 50.0);
        logger.log(&snapshot1); // Won't print (5 < 0 + 10)

        let snapshot2 = TrainingSnapshot::new(10, 1000, 100.0);
        logger.log(&snapshot2); // Will print (10 >= 0 + 10)
    }

    #[test]
    fn test_csv_logger_writes_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        {
            let mut logger = CSVLogger::new(&path).unwrap();
            logger.log(&TrainingSnapshot::new(1, 120, 3.5).with_schedules(0.99, 1e-4));
            logger.log(&TrainingSnapshot::new(2, 260, 4.0).with_schedules(0.98, 9.9e-5));
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("episode,env_steps,episode_reward"));
        assert!(lines[1].starts_with("1,120,3.5000"));
        assert!(lines[2].starts_with("2,260,4.0000"));
    }

    #[test]
    fn test_csv_logger_appends_without_duplicate_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        {
            let mut logger = CSVLogger::new(&path).unwrap();
            logger.log(&TrainingSnapshot::new(1, 100, 1.0));
        }
        {
            let mut logger = CSVLogger::new(&path).unwrap();
            logger.log(&TrainingSnapshot::new(2, 200, 2.0));
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let header_count = contents
            .lines()
            .filter(|l| l.starts_with("episode,"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    struct RecordingLogger {
        calls: Rc<RefCell<usize>>,
    }

    impl MetricsLogger for RecordingLogger {
        fn log(&mut self, _snapshot: &TrainingSnapshot) {
            *self.calls.borrow_mut() += 1;
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let calls = Rc::new(RefCell::new(0));
        let mut multi = MultiLogger::new()
            .add(RecordingLogger { calls: calls.clone() })
            .add(RecordingLogger { calls: calls.clone() });

        multi.log(&TrainingSnapshot::new(10, 1000, 100.0));
        multi.flush();

        assert_eq!(*calls.borrow(), 2);
    }
}
