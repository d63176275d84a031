//! DDPG loss computations.
//!
//! Free functions shared by the trainer:
//! - bootstrapped TD targets from the target networks
//! - mean-squared critic regression loss
//! - the actor's surrogate objective built from critic action gradients
//!
//! The surrogate trick: minimizing `sum(actor(s) * -dQ/da)` pushes each
//! action component along its action gradient, so a descending optimizer
//! ascends the critic's action-value estimate.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Bootstrapped regression targets for the critic.
///
/// Terminal transitions contribute the bare reward; non-terminal ones add the
/// discounted target-network estimate:
///
/// ```text
/// y_i = r_i + (1 - terminal_i) * gamma * Q_target(s', mu_target(s'))
/// ```
///
/// # Arguments
/// * `rewards` - Rewards `[batch]`
/// * `terminals` - Terminal flags as 1.0 / 0.0 `[batch]`
/// * `next_q` - Target critic estimates for next states `[batch]`
/// * `gamma` - Discount factor
pub fn td_targets<B: Backend>(
    rewards: Tensor<B, 1>,
    terminals: Tensor<B, 1>,
    next_q: Tensor<B, 1>,
    gamma: f32,
) -> Tensor<B, 1> {
    let not_done = terminals.mul_scalar(-1.0).add_scalar(1.0);
    rewards + not_done * next_q.mul_scalar(gamma)
}

/// Mean squared error between predicted Q values and supplied targets.
pub fn critic_loss<B: Backend>(predicted: Tensor<B, 1>, targets: Tensor<B, 1>) -> Tensor<B, 1> {
    (predicted - targets).powf_scalar(2.0).mean()
}

/// Surrogate objective whose gradient is the negated policy gradient.
///
/// `action_grads` must be a constant with respect to the policy parameters;
/// only `actions` carries autodiff history. Summed over the batch, not
/// averaged, matching the scale the critic's summed-output gradient implies.
pub fn policy_surrogate<B: Backend>(
    actions: Tensor<B, 2>,
    action_grads: Tensor<B, 2>,
) -> Tensor<B, 1> {
    (actions * action_grads.neg()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_terminal_targets_are_bare_rewards() {
        let device = Default::default();
        let rewards = Tensor::<TestBackend, 1>::from_floats([1.0, -2.0], &device);
        let terminals = Tensor::<TestBackend, 1>::from_floats([1.0, 1.0], &device);
        let next_q = Tensor::<TestBackend, 1>::from_floats([100.0, 100.0], &device);

        let targets = td_targets(rewards, terminals, next_q, 0.9);
        let values = targets.into_data();
        let values = values.as_slice::<f32>().unwrap();
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!((values[1] + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_terminal_targets_bootstrap() {
        let device = Default::default();
        let rewards = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0], &device);
        let terminals = Tensor::<TestBackend, 1>::from_floats([0.0, 0.0], &device);
        let next_q = Tensor::<TestBackend, 1>::from_floats([10.0, -5.0], &device);

        let targets = td_targets(rewards, terminals, next_q, 0.9);
        let values = targets.into_data();
        let values = values.as_slice::<f32>().unwrap();
        // 1 + 0.9 * 10 = 10, 2 + 0.9 * -5 = -2.5
        assert!((values[0] - 10.0).abs() < 1e-5);
        assert!((values[1] + 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_mixed_batch() {
        let device = Default::default();
        let rewards = Tensor::<TestBackend, 1>::from_floats([0.5, 0.5], &device);
        let terminals = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0], &device);
        let next_q = Tensor::<TestBackend, 1>::from_floats([4.0, 4.0], &device);

        let targets = td_targets(rewards, terminals, next_q, 0.5);
        let values = targets.into_data();
        let values = values.as_slice::<f32>().unwrap();
        assert!((values[0] - 2.5).abs() < 1e-6);
        assert!((values[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_critic_loss_exact() {
        let device = Default::default();
        let predicted = Tensor::<TestBackend, 1>::from_floats([1.0, 3.0], &device);
        let targets = Tensor::<TestBackend, 1>::from_floats([2.0, 5.0], &device);

        let loss = critic_loss(predicted, targets);
        let value = loss.into_data().as_slice::<f32>().unwrap()[0];
        // (1 + 4) / 2
        assert!((value - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_critic_loss_zero_at_fit() {
        let device = Default::default();
        let predicted = Tensor::<TestBackend, 1>::from_floats([0.25, -1.5, 3.0], &device);
        let targets = predicted.clone();

        let loss = critic_loss(predicted, targets);
        let value = loss.into_data().as_slice::<f32>().unwrap()[0];
        assert!(value.abs() < 1e-7);
    }

    #[test]
    fn test_policy_surrogate_exact() {
        let device = Default::default();
        let actions = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0, 0.5]], &device);
        let grads = Tensor::<TestBackend, 2>::from_floats([[0.5, -1.0, 2.0]], &device);

        let surrogate = policy_surrogate(actions, grads);
        let value = surrogate.into_data().as_slice::<f32>().unwrap()[0];
        // -(1 * 0.5) - (2 * -1.0) - (0.5 * 2.0) = -0.5 + 2.0 - 1.0
        assert!((value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_policy_surrogate_sums_over_batch() {
        let device = Default::default();
        let actions =
            Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &device);
        let grads =
            Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &device);

        let surrogate = policy_surrogate(actions, grads);
        let value = surrogate.into_data().as_slice::<f32>().unwrap()[0];
        assert!((value + 2.0).abs() < 1e-6, "summed, not averaged: {}", value);
    }
}
