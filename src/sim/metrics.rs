//! Adequacy metric reductions over a net capacity matrix.

use crate::array::NetCapacityMatrix;
use crate::sim::simulation::SimulationWindow;

/// The four adequacy metrics this crate computes, each a trial-averaged
/// reduction over a net capacity matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Expected unserved energy, MWh per study horizon.
    Eue,
    /// Loss-of-load hours, h per study horizon.
    Lolh,
    /// Loss-of-load days, d per study horizon.
    Lold,
    /// Loss-of-load frequency, count of shortfall runs per study horizon.
    Lolf,
}

/// Evaluates `kind` against `ncm`, averaged over trials.
///
/// `window` supplies the `start_hour` anchor used for calendar-day grouping
/// in [`MetricKind::Lold`].
pub fn evaluate(ncm: &NetCapacityMatrix, window: SimulationWindow, kind: MetricKind) -> f64 {
    match kind {
        MetricKind::Eue => eue(ncm),
        MetricKind::Lolh => lolh(ncm),
        MetricKind::Lold => lold(ncm, window),
        MetricKind::Lolf => lolf(ncm),
    }
}

fn trial_mean(ncm: &NetCapacityMatrix, per_trial: impl Fn(usize) -> f64) -> f64 {
    let trials = ncm.trials();
    if trials == 0 {
        return 0.0;
    }
    (0..trials).map(per_trial).sum::<f64>() / trials as f64
}

fn eue(ncm: &NetCapacityMatrix) -> f64 {
    trial_mean(ncm, |t| {
        (0..ncm.hours())
            .map(|h| (-ncm.get(h, t)).max(0.0))
            .sum::<f64>()
    })
}

fn lolh(ncm: &NetCapacityMatrix) -> f64 {
    trial_mean(ncm, |t| {
        (0..ncm.hours()).filter(|&h| ncm.get(h, t) < 0.0).count() as f64
    })
}

fn lold(ncm: &NetCapacityMatrix, window: SimulationWindow) -> f64 {
    trial_mean(ncm, |t| {
        let mut days = std::collections::BTreeSet::new();
        for h in 0..ncm.hours() {
            if ncm.get(h, t) < 0.0 {
                let absolute_hour = window.start_hour + h as i64;
                days.insert(absolute_hour.div_euclid(24));
            }
        }
        days.len() as f64
    })
}

fn lolf(ncm: &NetCapacityMatrix) -> f64 {
    trial_mean(ncm, |t| {
        let mut runs = 0u64;
        let mut in_run = false;
        for h in 0..ncm.hours() {
            let shortfall = ncm.get(h, t) < 0.0;
            if shortfall && !in_run {
                runs += 1;
            }
            in_run = shortfall;
        }
        runs as f64
    })
}
