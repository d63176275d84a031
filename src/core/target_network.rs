//! Target network soft updates.
//!
//! The critic bootstraps from its own value estimates, so regressing toward
//! targets produced by the live network chases a moving target. Both the
//! policy and the critic therefore keep a slow copy whose parameters change
//! only through Polyak averaging:
//!
//! ```text
//! θ_target = τ * θ_online + (1 - τ) * θ_target
//! ```
//!
//! applied per parameter tensor after every gradient update. Parameters are
//! matched by traversal order, which is deterministic for two modules of the
//! same architecture, so independently created online/target pairs line up.

use burn::module::{Module, ModuleMapper, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

// ============================================================================
// Parameter Traversal
// ============================================================================

/// Collects every float parameter of a module, flattened to 1D.
///
/// Flattening sidesteps const-generic dimension mismatches when storing
/// tensors of varying rank in one collection.
struct ParamExtractor<B: Backend> {
    params: Vec<Tensor<B, 1>>,
}

impl<B: Backend> ParamExtractor<B> {
    fn new() -> Self {
        Self { params: Vec::new() }
    }
}

impl<B: Backend> ModuleMapper<B> for ParamExtractor<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let val = param.val();
        let total_size: usize = val.dims().iter().product();
        self.params.push(val.reshape([total_size]));
        param
    }
}

/// Blends collected online parameters into the visited target parameters.
struct SoftUpdateMapper<B: Backend> {
    online_params: Vec<Tensor<B, 1>>,
    tau: f32,
    index: usize,
}

impl<B: Backend> ModuleMapper<B> for SoftUpdateMapper<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let target_val = param.val();
        let shape = target_val.dims();
        let total_size: usize = shape.iter().product();

        let idx = self.index;
        self.index += 1;

        if let Some(online) = self.online_params.get(idx) {
            let target_flat = target_val.reshape([total_size]);
            let interpolated = online.clone().mul_scalar(self.tau)
                + target_flat.mul_scalar(1.0 - self.tau);
            Param::initialized(param.id.clone(), interpolated.reshape(shape))
        } else {
            // Architectures disagree; leave the target parameter untouched.
            param
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Polyak-average online parameters into a target module.
///
/// Every parameter becomes `τ * online + (1 - τ) * target`. The two modules
/// must share an architecture; parameters are paired by traversal order.
///
/// # Arguments
/// * `online` - The training module with current weights
/// * `target` - The target module to blend into
/// * `tau` - Blend rate in [0, 1]
///
/// # Returns
/// The updated target module.
pub fn soft_update<B, M>(online: &M, target: M, tau: f32) -> M
where
    B: Backend,
    M: Module<B>,
{
    // tau = 1 is a hard copy
    if (tau - 1.0).abs() < 1e-6 {
        return online.clone();
    }
    // tau = 0 leaves the target unchanged
    if tau.abs() < 1e-6 {
        return target;
    }

    let mut extractor = ParamExtractor::new();
    let _ = online.clone().map(&mut extractor);

    let mut updater = SoftUpdateMapper {
        online_params: extractor.params,
        tau,
        index: 0,
    };
    target.map(&mut updater)
}

/// L2 norm over every float parameter of a module.
///
/// Diagnostic for divergence checks: a training run whose parameter norm
/// explodes has lost the plot long before the losses show it.
pub fn param_l2_norm<B, M>(module: &M) -> f32
where
    B: Backend,
    M: Module<B>,
{
    let mut extractor = ParamExtractor::new();
    let _ = module.clone().map(&mut extractor);

    let mut sum_squares = 0.0f32;
    for tensor in extractor.params {
        let sq = tensor.powf_scalar(2.0).sum();
        sum_squares += sq.into_data().as_slice::<f32>().unwrap()[0];
    }
    sum_squares.sqrt()
}

// ============================================================================
// Tests
// ============================================================================
