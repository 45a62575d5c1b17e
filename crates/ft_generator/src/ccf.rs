//! Common-cause failure group synthesis.
//!
//! Basic events are shuffled and sliced into consecutive groups of random
//! size. Each group gets a shared probability and factors drawn from the
//! configured CCF model.

#![allow(clippy::cast_precision_loss)] // binomial coefficients of small group sizes

use crate::error::Result;
use crate::factors::CalculatedFactors;
use ft_model::{BasicEventId, CcfGroup, CcfModel, FaultTree, Probability};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Constant weight of alpha levels past the seventh.
const ALPHA_TAIL: f64 = 1e-5;

/// Partitions basic events into CCF groups and records the rest as non-CCF.
///
/// Without requested groups, every basic event is non-CCF and no random
/// draws are made.
///
/// # Errors
///
/// Fails only if the model rejects a group, which indicates a bug here.
pub fn generate_ccf_groups<R: Rng + ?Sized>(
    tree: &mut FaultTree,
    factors: &CalculatedFactors,
    rng: &mut R,
) -> Result<()> {
    let size = factors.size();
    let mut members: Vec<BasicEventId> = tree.basic_event_ids().collect();
    if size.num_ccf == 0 {
        tree.set_non_ccf_events(members)?;
        return Ok(());
    }

    members.shuffle(rng);
    let mut first = 0;
    while tree.ccf_groups().len() < size.num_ccf {
        let group_size = rng.gen_range(2..=size.ccf_size);
        let last = first + group_size;
        if last > members.len() {
            break;
        }
        let name = format!("CCF{}", tree.ccf_groups().len() + 1);
        let group = construct_ccf_group(name, members[first..last].to_vec(), factors, rng)?;
        tree.add_ccf_group(group)?;
        first = last;
    }
    debug!(
        groups = tree.ccf_groups().len(),
        non_ccf = members.len() - first,
        "generated CCF groups"
    );
    tree.set_non_ccf_events(members[first..].to_vec())?;
    Ok(())
}

fn construct_ccf_group<R: Rng + ?Sized>(
    name: String,
    members: Vec<BasicEventId>,
    factors: &CalculatedFactors,
    rng: &mut R,
) -> Result<CcfGroup> {
    let probability = Probability::point(rng.gen_range(factors.min_prob()..=factors.max_prob()))?;
    let model = factors.size().ccf_model;
    let levels = members.len();
    let values = match model {
        CcfModel::Mgl => mgl_factors(levels, rng),
        CcfModel::AlphaFactor => alpha_factors(levels, rng),
    };
    Ok(CcfGroup::new(name, members, probability, model, values)?)
}

/// Draws alpha-factor proportions for a group of `levels` members.
///
/// The first level is drawn in `[0.9, 1)`, the next three in
/// `[0.001, 0.01)`, the next three in `[0.0001, 0.001)` and the rest are
/// fixed. The result is normalized and sorted in descending order.
pub fn alpha_factors<R: Rng + ?Sized>(levels: usize, rng: &mut R) -> Vec<f64> {
    let mut alphas: Vec<f64> = (0..levels)
        .map(|i| match i {
            0 => rng.gen_range(0.9..1.0),
            1..=3 => rng.gen_range(0.001..0.01),
            4..=6 => rng.gen_range(0.0001..0.001),
            _ => ALPHA_TAIL,
        })
        .collect();
    let total: f64 = alphas.iter().sum();
    for alpha in &mut alphas {
        *alpha /= total;
    }
    alphas.sort_by(|a, b| b.total_cmp(a));
    alphas
}

/// Draws Multiple Greek Letter factors for a group of `levels` members.
///
/// `levels - 1` betas are drawn: the first in `[0.005, 0.1)`, each later one
/// within 20% of five times the first. Factor `k` is
/// `(1 - beta_k) * prod(beta_j, j < k) / C(levels - 1, k)`.
///
/// The factors strictly decrease only for groups of up to five members.
/// Past the middle of the row `C(levels - 1, k)` shrinks again, so the
/// last factors of a larger group can grow: with six members the last
/// step rises once its beta exceeds 0.5, and with seven or more smaller
/// betas suffice. Every factor stays positive for any group size.
pub fn mgl_factors<R: Rng + ?Sized>(levels: usize, rng: &mut R) -> Vec<f64> {
    let count = levels.saturating_sub(1);
    let mut betas = Vec::with_capacity(count);
    for i in 0..count {
        let beta = if i == 0 {
            rng.gen_range(5.0e-3..1.0e-1)
        } else {
            let first = betas[0];
            rng.gen_range(5.0 * first - first / 5.0..5.0 * first + first / 5.0)
        };
        betas.push(beta);
    }

    let mut running = 1.0;
    betas
        .iter()
        .enumerate()
        .map(|(k, beta)| {
            let factor = (1.0 - beta) * running / binomial(count, k);
            running *= beta;
            factor
        })
        .collect()
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
