//! Passage optionnel par un service externe qui « améliore » le planning de base.
//!
//! Le service n'est pas fiable : sa réponse est re-validée contre le schéma,
//! et au moindre écart le planning de base est conservé tel quel.

use crate::calendar::{self, DayCode};
use crate::model::{DaySchedule, HomeVisit, Member, MemberId, Task, TaskId, TaskKind};
use crate::scheduler::{self, ENHANCEMENT_HORIZON_DAYS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Vue restreinte d'un membre transmise au service (ni compteurs ni données perso).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintView {
    pub id: MemberId,
    pub name: String,
    pub busy_days: Vec<DayCode>,
}

impl From<&Member> for ConstraintView {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            busy_days: member.busy_days.clone(),
        }
    }
}

/// Charge utile envoyée au service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub draft: Vec<DaySchedule>,
    pub members: Vec<ConstraintView>,
}

impl EnhanceRequest {
    pub fn new(draft: Vec<DaySchedule>, members: &[Member]) -> Self {
        Self {
            draft,
            members: members.iter().map(ConstraintView::from).collect(),
        }
    }
}

/// Collaborateur externe : renvoie la réponse brute (JSON) du service.
pub trait ScheduleEnhancer {
    fn enhance(&self, request: &EnhanceRequest) -> anyhow::Result<String>;
}

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("no member to schedule")]
    EmptyRoster,
    #[error("malformed enhancement output: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown task type in enhancement output: {0}")]
    UnknownKind(String),
    #[error("unknown weekday in enhancement output: {0}")]
    UnknownWeekday(String),
    #[error("invalid day number in enhancement output: {0}")]
    InvalidDayNumber(f64),
    #[error("assignee {0} is not a roster member")]
    UnknownAssignee(String),
    #[error("assignee {member} is not active on {date}")]
    InactiveAssignee { member: String, date: NaiveDate },
    #[error("enhancement output must cover days 1..={expected} in order, got {got:?}")]
    DaySequence { expected: u32, got: Vec<u32> },
    #[error("day {0} falls past the last representable date")]
    DateOverflow(u32),
    #[error(transparent)]
    Enhancer(#[from] anyhow::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDay {
    date: f64,
    day_of_week: String,
    tasks: Vec<RawTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    assignee_id: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

/// Re-valide la réponse du service contre le schéma `DaySchedule`.
///
/// `isoDate`, `displayDate` et le jour de semaine sont recalculés depuis le
/// numéro du jour ; les identifiants absents sont régénérés ; `completed`
/// absent vaut `false`. Un assigné inconnu du roster, ou absent ce jour-là,
/// rejette toute la réponse.
pub fn reconcile(
    raw: &str,
    start: NaiveDate,
    members: &[Member],
    absences: &[HomeVisit],
) -> Result<Vec<DaySchedule>, EnhanceError> {
    let days: Vec<RawDay> = serde_json::from_str(raw)?;
    days.into_iter()
        .map(|day| reconcile_day(day, start, members, absences))
        .collect()
}

/// Les numéros de jour doivent valoir exactement `1..=horizon`, dans l'ordre.
pub fn check_day_sequence(schedule: &[DaySchedule], horizon: u32) -> Result<(), EnhanceError> {
    let complete = schedule.len() == horizon as usize
        && schedule.iter().zip(1..=horizon).all(|(day, n)| day.date == n);
    if complete {
        Ok(())
    } else {
        Err(EnhanceError::DaySequence {
            expected: horizon,
            got: schedule.iter().map(|d| d.date).collect(),
        })
    }
}

fn reconcile_day(
    raw: RawDay,
    start: NaiveDate,
    members: &[Member],
    absences: &[HomeVisit],
) -> Result<DaySchedule, EnhanceError> {
    if raw.date.fract() != 0.0 || raw.date < 1.0 || raw.date > f64::from(u32::MAX) {
        return Err(EnhanceError::InvalidDayNumber(raw.date));
    }
    let number = raw.date as u32;
    let claimed = raw
        .day_of_week
        .parse::<DayCode>()
        .map_err(|_| EnhanceError::UnknownWeekday(raw.day_of_week.clone()))?;
    let date = calendar::add_days(start, number - 1).ok_or(EnhanceError::DateOverflow(number))?;

    let mut day = DaySchedule::new(number, date);
    if claimed != day.day_of_week {
        debug!(day = number, %claimed, actual = %day.day_of_week, "weekday rewritten from day number");
    }

    for task in raw.tasks {
        let kind = task
            .kind
            .parse::<TaskKind>()
            .map_err(|_| EnhanceError::UnknownKind(task.kind.clone()))?;
        let assignee_id = match task.assignee_id {
            Some(id) => {
                let id = MemberId::new(id);
                let Some(member) = members.iter().find(|m| m.id == id) else {
                    return Err(EnhanceError::UnknownAssignee(id.as_str().to_string()));
                };
                if !scheduler::is_active(member, date, absences) {
                    return Err(EnhanceError::InactiveAssignee {
                        member: id.as_str().to_string(),
                        date,
                    });
                }
                Some(id)
            }
            None => None,
        };
        let id = task
            .id
            .filter(|id| !id.trim().is_empty())
            .map(TaskId::new)
            .unwrap_or_else(TaskId::random);
        day.tasks.push(Task {
            id,
            kind,
            assignee_id,
            note: task.note,
            completed: task.completed.unwrap_or(false),
        });
    }
    Ok(day)
}

/// Remplacement repas placé sur un jour chargé de l'assigné.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyDayViolation {
    pub day: u32,
    pub iso_date: NaiveDate,
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub member_id: MemberId,
}

/// Contrôle indicatif : on ne se fie pas aux affirmations du service.
pub fn busy_day_violations(schedule: &[DaySchedule], members: &[Member]) -> Vec<BusyDayViolation> {
    let mut out = Vec::new();
    for day in schedule {
        for task in day.tasks.iter().filter(|t| t.kind.respects_busy_days()) {
            let Some(member) = task
                .assignee_id
                .as_ref()
                .and_then(|id| members.iter().find(|m| &m.id == id))
            else {
                continue;
            };
            if member.is_busy_on(day.day_of_week) {
                out.push(BusyDayViolation {
                    day: day.date,
                    iso_date: day.iso_date,
                    task_id: task.id.clone(),
                    kind: task.kind,
                    member_id: member.id.clone(),
                });
            }
        }
    }
    out
}

/// Résultat d'un passage d'amélioration.
#[derive(Debug)]
pub struct EnhanceOutcome {
    pub schedule: Vec<DaySchedule>,
    /// Raison du repli sur le planning de base, le cas échéant.
    pub error: Option<EnhanceError>,
}

impl EnhanceOutcome {
    pub fn applied(&self) -> bool {
        self.error.is_none()
    }
}

/// Construit le brouillon sur 14 jours, le soumet au service et applique la
/// réponse si elle est valide ; sinon renvoie le brouillon intact.
pub fn enhance_or_baseline(
    enhancer: &dyn ScheduleEnhancer,
    members: &[Member],
    absences: &[HomeVisit],
    start: NaiveDate,
) -> EnhanceOutcome {
    let baseline = scheduler::generate(members, absences, start, ENHANCEMENT_HORIZON_DAYS);
    if members.is_empty() {
        return EnhanceOutcome {
            schedule: baseline,
            error: Some(EnhanceError::EmptyRoster),
        };
    }

    let request = EnhanceRequest::new(baseline, members);
    let result = enhancer
        .enhance(&request)
        .map_err(EnhanceError::from)
        .and_then(|raw| reconcile(&raw, start, members, absences))
        .and_then(|schedule| {
            check_day_sequence(&schedule, ENHANCEMENT_HORIZON_DAYS).map(|()| schedule)
        });

    match result {
        Ok(schedule) => {
            let violations = busy_day_violations(&schedule, members);
            if !violations.is_empty() {
                warn!(count = violations.len(), "enhanced schedule places proxies on busy days");
            }
            EnhanceOutcome {
                schedule,
                error: None,
            }
        }
        Err(err) => {
            warn!(error = %err, "enhancement discarded, keeping baseline schedule");
            EnhanceOutcome {
                schedule: request.draft,
                error: Some(err),
            }
        }
    }
}
