#![forbid(unsafe_code)]
//! Corvée — répartition des corvées d'une colocation (sans BD).
//!
//! - Stockage fichier (JSON), import/export CSV.
//! - Remplacements repas au moins chargé, boissons et week-end en round-robin.
//! - Absences et jours chargés respectés, au jour près.
//! - Passage d'amélioration externe re-validé, repli sur le planning de base.

pub mod calendar;
pub mod enhance;
pub mod io;
pub mod model;
pub mod notification;
pub mod scheduler;
pub mod storage;

pub use calendar::DayCode;
pub use enhance::{
    enhance_or_baseline, reconcile, ConstraintView, EnhanceError, EnhanceOutcome, EnhanceRequest,
    ScheduleEnhancer,
};
pub use model::{
    DaySchedule, HomeVisit, Household, Member, MemberId, ProxyCounts, Task, TaskId, TaskKind,
};
pub use notification::{due_reminders, Reminder, ReminderRenderer, ReminderSettings, TextReminder};
pub use scheduler::{generate, SchedError, ScheduleFilter, Scheduler};
pub use storage::{JsonStorage, Storage};
