use serde::Serialize;

use super::spread::PredictionResult;

/// Tally of graded predictions for a set of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccuracySummary {
    pub correct: u32,
    pub incorrect: u32,
    /// Games without a final score yet
    pub pending: u32,
}

impl AccuracySummary {
    pub fn record(&mut self, result: &PredictionResult) {
        match result.outcome_correct {
            Some(true) => self.correct += 1,
            Some(false) => self.incorrect += 1,
            None => self.pending += 1,
        }
    }

    pub fn decided(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Fraction of decided games called correctly.
    pub fn hit_rate(&self) -> Option<f64> {
        match self.decided() {
            0 => None,
            n => Some(f64::from(self.correct) / f64::from(n)),
        }
    }
}

impl<'a> FromIterator<&'a PredictionResult> for AccuracySummary {
    fn from_iter<I: IntoIterator<Item = &'a PredictionResult>>(iter: I) -> Self {
        let mut summary = AccuracySummary::default();
        for result in iter {
            summary.record(result);
        }
        summary
    }
}
