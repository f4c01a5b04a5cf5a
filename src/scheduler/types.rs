use thiserror::Error;

/// Seuil indicatif : au-delà, la note « over limit » est ajoutée sans bloquer l'assignation.
pub const OVER_LIMIT_THRESHOLD: u32 = 8;

/// Horizon du planning classique.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;
/// Horizon du brouillon envoyé à l'amélioration externe.
pub const ENHANCEMENT_HORIZON_DAYS: u32 = 14;

pub const NO_MEMBERS_NOTE: &str = "No members available";
pub const ALL_BUSY_NOTE: &str = "All active members busy";
pub const OVER_LIMIT_NOTE: &str = "Over limit (fallback)";
pub const THURSDAY_PREP_NOTE: &str = "Thu Dinner Prep";
pub const FRIDAY_PREP_NOTE: &str = "Fri All-Day Prep";

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid horizon: {0} days (must be >= 0)")]
    InvalidHorizon(i64),
    #[error("invalid start date: {0}")]
    InvalidDate(String),
    #[error("schedule would run past the last representable date")]
    DateOverflow,
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("unknown member: {0}")]
    UnknownMember(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
