use crate::calendar::DayCode;
use crate::model::{HomeVisit, Member, TaskKind};
use chrono::NaiveDate;

/// Membre arrivé à cette date et sans absence couvrant ce jour.
pub fn is_active(member: &Member, date: NaiveDate, absences: &[HomeVisit]) -> bool {
    member.start_date <= date && !is_away(member, date, absences)
}

/// Actif, et hors de ses jours chargés pour les corvées qui en tiennent compte.
pub fn is_available(member: &Member, date: NaiveDate, absences: &[HomeVisit], kind: TaskKind) -> bool {
    is_active(member, date, absences) && !blocked_by_busy_day(member, DayCode::of(date), kind)
}

pub(super) fn blocked_by_busy_day(member: &Member, day: DayCode, kind: TaskKind) -> bool {
    kind.respects_busy_days() && member.is_busy_on(day)
}

fn is_away(member: &Member, date: NaiveDate, absences: &[HomeVisit]) -> bool {
    absences
        .iter()
        .any(|visit| visit.member_id == member.id && visit.contains(date))
}
