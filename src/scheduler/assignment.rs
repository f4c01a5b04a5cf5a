use super::context::{Meal, SchedulingContext};
use super::types::{
    ALL_BUSY_NOTE, FRIDAY_PREP_NOTE, NO_MEMBERS_NOTE, OVER_LIMIT_NOTE, OVER_LIMIT_THRESHOLD,
    THURSDAY_PREP_NOTE,
};
use crate::calendar::{self, DayCode};
use crate::model::{DaySchedule, HomeVisit, Member, Task, TaskKind};
use chrono::NaiveDate;
use tracing::{debug, warn};

pub(super) fn generate(
    members: &[Member],
    absences: &[HomeVisit],
    start: NaiveDate,
    days: u32,
) -> Vec<DaySchedule> {
    if members.is_empty() {
        return Vec::new();
    }

    let mut ctx = SchedulingContext::new(members);
    // au-delà de NaiveDate::MAX la boucle s'arrête de toute façon
    let reachable = (NaiveDate::MAX - start).num_days().saturating_add(1);
    let capacity = u32::try_from(reachable).map_or(days, |r| days.min(r));
    let mut out = Vec::with_capacity(capacity as usize);

    for offset in 0..days {
        let Some(date) = calendar::add_days(start, offset) else {
            warn!(%start, offset, "date overflow, schedule truncated");
            break;
        };
        out.push(plan_day(&mut ctx, absences, offset + 1, date));
    }

    debug!(%start, days = out.len(), members = members.len(), "baseline schedule generated");
    out
}

fn plan_day(
    ctx: &mut SchedulingContext<'_>,
    absences: &[HomeVisit],
    day_number: u32,
    date: NaiveDate,
) -> DaySchedule {
    let mut day = DaySchedule::new(day_number, date);
    let active = ctx.active_on(date, absences);

    if active.is_empty() {
        debug!(%date, "no active member");
        day.tasks
            .push(Task::unassigned(TaskKind::ProxyLunch, NO_MEMBERS_NOTE));
        return day;
    }

    for meal in [Meal::Lunch, Meal::Dinner] {
        let task = match ctx.take_least_loaded(&active, day.day_of_week, meal) {
            Some((idx, count)) => {
                let note = (count > OVER_LIMIT_THRESHOLD).then(|| OVER_LIMIT_NOTE.to_string());
                Task::assigned(meal.kind(), ctx.member_id(idx), note)
            }
            None => {
                debug!(%date, kind = %meal.kind(), "every active member is busy");
                Task::unassigned(meal.kind(), ALL_BUSY_NOTE)
            }
        };
        day.tasks.push(task);
    }

    if let Some(idx) = ctx.drinks.next(&active) {
        day.tasks
            .push(Task::assigned(TaskKind::BuyDrinks, ctx.member_id(idx), None));
    }

    let prep = match day.day_of_week {
        DayCode::Thu => Some((&mut ctx.thursday_prep, THURSDAY_PREP_NOTE)),
        DayCode::Fri => Some((&mut ctx.friday_prep, FRIDAY_PREP_NOTE)),
        _ => None,
    };
    if let Some((rotation, note)) = prep {
        if let Some(idx) = rotation.next(&active) {
            day.tasks.push(Task::assigned(
                TaskKind::WeekendPrep,
                ctx.member_id(idx),
                Some(note.to_string()),
            ));
        }
    }

    day
}
