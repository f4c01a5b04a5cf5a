use crate::calendar::DayCode;
use crate::model::{DaySchedule, MemberId, Task, TaskKind};

/// Filtre d'affichage ; `None` signifie « tous ».
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub day: Option<DayCode>,
    pub kind: Option<TaskKind>,
    pub assignee: Option<MemberId>,
}

impl ScheduleFilter {
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.kind.is_none() && self.assignee.is_none()
    }

    fn keeps(&self, task: &Task) -> bool {
        let kind_ok = self.kind.map_or(true, |k| task.kind == k);
        let assignee_ok = self
            .assignee
            .as_ref()
            .map_or(true, |id| task.assignee_id.as_ref() == Some(id));
        kind_ok && assignee_ok
    }
}

/// Tâche à venir, avec son jour.
#[derive(Debug, Clone, Copy)]
pub struct UpcomingTask<'a> {
    pub day: &'a DaySchedule,
    pub task: &'a Task,
}

/// Nombre de jours avec une corvée donnée pour un membre.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberStats {
    pub lunch: usize,
    pub dinner: usize,
    pub drinks: usize,
}

pub(super) fn filter_schedule(schedule: &[DaySchedule], filter: &ScheduleFilter) -> Vec<DaySchedule> {
    schedule
        .iter()
        .filter(|day| filter.day.map_or(true, |d| day.day_of_week == d))
        .filter_map(|day| {
            let tasks: Vec<Task> = day.tasks.iter().filter(|t| filter.keeps(t)).cloned().collect();
            if tasks.is_empty() {
                return None;
            }
            Some(DaySchedule {
                tasks,
                ..day.clone()
            })
        })
        .collect()
}

pub(super) fn upcoming_for_member<'a>(
    schedule: &'a [DaySchedule],
    member: &MemberId,
) -> Vec<UpcomingTask<'a>> {
    let mut out: Vec<UpcomingTask<'a>> = schedule
        .iter()
        .flat_map(|day| {
            day.tasks
                .iter()
                .filter(|t| t.assignee_id.as_ref() == Some(member) && !t.completed)
                .map(move |task| UpcomingTask { day, task })
        })
        .collect();
    out.sort_by_key(|u| u.day.iso_date);
    out
}

pub(super) fn member_stats(schedule: &[DaySchedule], member: &MemberId) -> MemberStats {
    let days_with = |kind: TaskKind| {
        schedule
            .iter()
            .filter(|day| {
                day.tasks
                    .iter()
                    .any(|t| t.kind == kind && t.assignee_id.as_ref() == Some(member))
            })
            .count()
    };
    MemberStats {
        lunch: days_with(TaskKind::ProxyLunch),
        dinner: days_with(TaskKind::ProxyDinner),
        drinks: days_with(TaskKind::BuyDrinks),
    }
}
