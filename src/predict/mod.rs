pub mod accuracy;
pub mod elo;
pub mod spread;

pub use accuracy::AccuracySummary;
pub use spread::{predict_from_ai_spread, predict_from_ratings, PredictionResult};
