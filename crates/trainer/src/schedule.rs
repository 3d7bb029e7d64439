use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

/// Learning-rate annealing driven by held-out perplexity.
///
/// The first evaluation that fails to improve on the previous one switches
/// halving on; from then on the rate is halved after every evaluation. A
/// second failure ends training.
#[derive(Debug, Clone)]
pub struct Annealing {
    learning_rate: f64,
    tolerance: f64,
    previous: f64,
    halving: bool,
}

impl Annealing {
    pub fn new(learning_rate: f64, tolerance: f64) -> Self {
        Self {
            learning_rate,
            tolerance,
            previous: f64::MAX,
            halving: false,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn is_halving(&self) -> bool {
        self.halving
    }

    /// Improvement is judged on negative log perplexity, scaled by the tolerance.
    fn improved(&self, perplexity: f64) -> bool {
        -perplexity.log10() * self.tolerance >= -self.previous.log10()
    }

    pub fn observe(&mut self, dev_perplexity: f64) -> Decision {
        if !self.improved(dev_perplexity) {
            if self.halving {
                warn!(
                    "Held-out perplexity {:.4} did not improve on {:.4} again, stopping",
                    dev_perplexity, self.previous
                );
                return Decision::Stop;
            }
            warn!(
                "Held-out perplexity {:.4} did not improve on {:.4}, halving learning rate",
                dev_perplexity, self.previous
            );
            self.halving = true;
        }
        if self.halving {
            self.learning_rate /= 2.0;
        }
        self.previous = dev_perplexity;
        Decision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(schedule: &mut Annealing, perplexities: &[f64]) -> Vec<(Decision, f64)> {
        perplexities
            .iter()
            .map(|&ppl| (schedule.observe(ppl), schedule.learning_rate()))
            .collect()
    }

    #[test]
    fn improving_perplexity_keeps_rate() {
        let mut schedule = Annealing::new(0.1, 1.003);
        let steps = run(&mut schedule, &[500.0, 300.0, 200.0]);
        assert!(steps.iter().all(|&step| step == (Decision::Continue, 0.1)));
        assert!(!schedule.is_halving());
    }

    #[test]
    fn halves_once_then_stops_on_second_failure() {
        let mut schedule = Annealing::new(0.1, 1.003);
        let steps = run(&mut schedule, &[100.0, 50.0, 60.0, 70.0]);
        assert_eq!(
            steps,
            vec![
                (Decision::Continue, 0.1),
                (Decision::Continue, 0.1),
                (Decision::Continue, 0.05),
                (Decision::Stop, 0.05),
            ]
        );
    }

    #[test]
    fn keeps_halving_while_improving() {
        let mut schedule = Annealing::new(0.1, 1.003);
        let steps = run(&mut schedule, &[100.0, 120.0, 80.0, 60.0]);
        let rates: Vec<f64> = steps.iter().map(|&(_, lr)| lr).collect();
        assert_eq!(rates, vec![0.1, 0.05, 0.025, 0.0125]);
        assert!(steps.iter().all(|&(d, _)| d == Decision::Continue));
    }

    #[test]
    fn marginal_gain_counts_as_failure() {
        let mut schedule = Annealing::new(0.1, 1.003);
        assert_eq!(schedule.observe(100.0), Decision::Continue);
        // log10(99.9) * 1.003 is still above log10(100)
        assert_eq!(schedule.observe(99.9), Decision::Continue);
        assert!(schedule.is_halving());
        assert_eq!(schedule.observe(99.8), Decision::Stop);
    }

    #[test]
    fn first_evaluation_always_counts_as_improvement() {
        let mut schedule = Annealing::new(0.1, 1.003);
        assert_eq!(schedule.observe(1e6), Decision::Continue);
        assert!(!schedule.is_halving());
    }
}
