mod assignment;
mod availability;
mod context;
mod mutate;
mod query;
mod types;

pub use availability::{is_active, is_available};
pub use query::{MemberStats, ScheduleFilter, UpcomingTask};
pub use types::{
    SchedError, ALL_BUSY_NOTE, DEFAULT_HORIZON_DAYS, ENHANCEMENT_HORIZON_DAYS, FRIDAY_PREP_NOTE,
    NO_MEMBERS_NOTE, OVER_LIMIT_NOTE, OVER_LIMIT_THRESHOLD, THURSDAY_PREP_NOTE,
};

use crate::calendar;
use crate::model::{DaySchedule, HomeVisit, Household, Member, MemberId, TaskId};
use chrono::NaiveDate;

/// Planning de base : équilibrage au moins chargé pour les repas,
/// round-robin pour les boissons et la préparation du week-end.
///
/// Calcul pur : les compteurs de travail sont recréés à chaque appel.
pub fn generate(
    members: &[Member],
    absences: &[HomeVisit],
    start: NaiveDate,
    days: u32,
) -> Vec<DaySchedule> {
    assignment::generate(members, absences, start, days)
}

/// Scheduler : vue en lecture sur un roster et son journal d'absences
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    members: &'a [Member],
    absences: &'a [HomeVisit],
}

impl<'a> Scheduler<'a> {
    pub fn new(members: &'a [Member], absences: &'a [HomeVisit]) -> Self {
        Self { members, absences }
    }

    pub fn for_household(household: &'a Household) -> Self {
        Self::new(&household.members, &household.home_visits)
    }

    pub fn members(&self) -> &'a [Member] {
        self.members
    }

    pub fn is_active(&self, member: &Member, date: NaiveDate) -> bool {
        availability::is_active(member, date, self.absences)
    }

    pub fn active_members(&self, date: NaiveDate) -> Vec<&'a Member> {
        self.members
            .iter()
            .filter(|m| availability::is_active(m, date, self.absences))
            .collect()
    }

    pub fn generate(&self, start: NaiveDate, days: u32) -> Vec<DaySchedule> {
        generate(self.members, self.absences, start, days)
    }

    /// Point d'entrée depuis l'extérieur : date ISO et horizon non typés,
    /// validés avant le calcul.
    pub fn generate_from(&self, start: &str, days: i64) -> Result<Vec<DaySchedule>, SchedError> {
        let horizon = u32::try_from(days).map_err(|_| SchedError::InvalidHorizon(days))?;
        let start_date = parse_start_date(start)?;
        if horizon > 0 && calendar::add_days(start_date, horizon - 1).is_none() {
            return Err(SchedError::DateOverflow);
        }
        Ok(self.generate(start_date, horizon))
    }
}

/// Date de début d'un planning : `YYYY-MM-DD` strict, sans heure.
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, SchedError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| SchedError::InvalidDate(format!("{raw}: {e}")))
}

pub fn toggle_completed(schedule: &mut [DaySchedule], task_id: &TaskId) -> Result<bool, SchedError> {
    mutate::toggle_completed(schedule, task_id)
}

pub fn filter_schedule(schedule: &[DaySchedule], filter: &ScheduleFilter) -> Vec<DaySchedule> {
    query::filter_schedule(schedule, filter)
}

pub fn upcoming_for_member<'a>(schedule: &'a [DaySchedule], member: &MemberId) -> Vec<UpcomingTask<'a>> {
    query::upcoming_for_member(schedule, member)
}

pub fn member_stats(schedule: &[DaySchedule], member: &MemberId) -> MemberStats {
    query::member_stats(schedule, member)
}
