//! Replay buffer element for off-policy learning.
//!
//! A transition records one environment interaction together with the decayed
//! learning rate in force when it was collected. Updates that later sample the
//! transition replay that stored rate instead of the current one, so old
//! experience is consumed at the optimizer setting it was gathered under.

/// One environment interaction.
///
/// `state` and `next_state` are flattened pixel observations in HWC row-major
/// order. `action` is the 3-dimensional control vector (steering, throttle,
/// brake). Transitions are immutable once stored.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Observation the action was selected from.
    pub state: Vec<f32>,
    /// Control vector applied to the environment.
    pub action: Vec<f32>,
    /// Reward received for the step.
    pub reward: f32,
    /// Episode ended at this step.
    pub terminal: bool,
    /// Observation after the step.
    pub next_state: Vec<f32>,
    /// Decayed learning rate at insertion time.
    pub learning_rate: f64,
}

impl Transition {
    /// Create a new transition.
    pub fn new(
        state: Vec<f32>,
        action: Vec<f32>,
        reward: f32,
        terminal: bool,
        next_state: Vec<f32>,
        learning_rate: f64,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            terminal,
            next_state,
            learning_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_fields() {
        let t = Transition::new(
            vec![1.0, 2.0],
            vec![0.5, 0.9, 0.0],
            -0.25,
            false,
            vec![2.0, 3.0],
            1e-4,
        );
        assert_eq!(t.state, vec![1.0, 2.0]);
        assert_eq!(t.action.len(), 3);
        assert_eq!(t.reward, -0.25);
        assert!(!t.terminal);
        assert_eq!(t.next_state, vec![2.0, 3.0]);
        assert_eq!(t.learning_rate, 1e-4);
    }

    #[test]
    fn test_transition_terminal() {
        let t = Transition::new(vec![0.0], vec![0.0, 0.0, 0.0], 1.0, true, vec![1.0], 1e-4);
        assert!(t.terminal);
    }

    #[test]
    fn test_transition_keeps_insertion_rate() {
        let t = Transition::new(vec![0.0], vec![0.0, 0.0, 0.0], 0.0, false, vec![0.0], 5e-5);
        let copy = t.clone();
        assert_eq!(copy.learning_rate, 5e-5);
    }
}
