/// Questionnaire completion as a percentage; zero when there are no questions.
pub fn progress_percentage(answered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    answered as f64 / total as f64 * 100.0
}

/// Cosmetic readiness level shown next to the submit control. Never gates submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    MoreNeeded,
    Sufficient,
    Ready,
}

impl Readiness {
    pub const SUFFICIENT_PCT: f64 = 40.0;
    pub const READY_PCT: f64 = 60.0;

    pub fn from_counts(answered: usize, total: usize) -> Self {
        let pct = progress_percentage(answered, total);
        if total > 0 && pct >= Self::READY_PCT {
            Readiness::Ready
        } else if total > 0 && pct >= Self::SUFFICIENT_PCT {
            Readiness::Sufficient
        } else {
            Readiness::MoreNeeded
        }
    }

    pub fn is_sufficient(&self) -> bool {
        *self >= Readiness::Sufficient
    }
}

pub fn progress_hint(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        "Ready for comprehensive analysis!"
    } else if percentage >= 50.0 {
        "Great progress - keep going!"
    } else {
        "Answer more questions for better accuracy"
    }
}
