use crate::calendar::{self, DayCode};
use crate::notification::ReminderSettings;
use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour Member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compteurs de remplacement repas, propres à un calcul de planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyCounts {
    pub lunch: u32,
    pub dinner: u32,
}

/// Membre de la colocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Date d'arrivée (incluse).
    #[serde(with = "calendar::day_format")]
    pub start_date: NaiveDate,
    /// Jours où le membre ne remplace jamais pour un repas.
    #[serde(default)]
    pub busy_days: Vec<DayCode>,
    #[serde(default)]
    pub proxy_counts: ProxyCounts,
}

impl Member {
    pub fn new<N: Into<String>>(name: N, start_date: NaiveDate) -> Self {
        Self {
            id: MemberId::random(),
            name: name.into(),
            start_date,
            busy_days: Vec::new(),
            proxy_counts: ProxyCounts::default(),
        }
    }

    pub fn with_busy_days<I: IntoIterator<Item = DayCode>>(mut self, days: I) -> Self {
        self.busy_days = days.into_iter().collect();
        self
    }

    pub fn is_busy_on(&self, day: DayCode) -> bool {
        self.busy_days.contains(&day)
    }
}

/// Absence (retour à la maison) d'un membre, bornes incluses, au jour près.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeVisit {
    pub id: String,
    pub member_id: MemberId,
    #[serde(with = "calendar::day_format")]
    pub start_date: NaiveDate,
    #[serde(with = "calendar::day_format")]
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HomeVisit {
    /// N'impose pas `start <= end` : un intervalle inversé ne contient aucun jour.
    pub fn new(member_id: MemberId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            start_date,
            end_date,
            reason: None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Identifiant fort pour Task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Les quatre types de corvée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "Proxy Lunch")]
    ProxyLunch,
    #[serde(rename = "Proxy Dinner")]
    ProxyDinner,
    #[serde(rename = "Buy Drinks")]
    BuyDrinks,
    #[serde(rename = "Weekend Prep")]
    WeekendPrep,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::ProxyLunch,
        TaskKind::ProxyDinner,
        TaskKind::BuyDrinks,
        TaskKind::WeekendPrep,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::ProxyLunch => "Proxy Lunch",
            TaskKind::ProxyDinner => "Proxy Dinner",
            TaskKind::BuyDrinks => "Buy Drinks",
            TaskKind::WeekendPrep => "Weekend Prep",
        }
    }

    /// Seuls les remplacements repas tiennent compte des jours chargés.
    pub fn respects_busy_days(self) -> bool {
        matches!(self, TaskKind::ProxyLunch | TaskKind::ProxyDinner)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
        for kind in TaskKind::ALL {
            let name: String = kind.as_str().chars().filter(|c| !c.is_whitespace()).collect();
            if name.eq_ignore_ascii_case(&wanted) {
                return Ok(kind);
            }
        }
        bail!("unknown task type: {s}")
    }
}

/// Corvée d'une journée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub assignee_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn assigned(kind: TaskKind, assignee: MemberId, note: Option<String>) -> Self {
        Self {
            id: TaskId::random(),
            kind,
            assignee_id: Some(assignee),
            note,
            completed: false,
        }
    }

    pub fn unassigned<N: Into<String>>(kind: TaskKind, note: N) -> Self {
        Self {
            id: TaskId::random(),
            kind,
            assignee_id: None,
            note: Some(note.into()),
            completed: false,
        }
    }
}

/// Planning d'un jour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    /// Numéro du jour, 1 pour le premier jour du calcul.
    pub date: u32,
    pub display_date: String,
    #[serde(with = "calendar::day_format")]
    pub iso_date: NaiveDate,
    pub day_of_week: DayCode,
    pub tasks: Vec<Task>,
}

impl DaySchedule {
    pub fn new(day_number: u32, date: NaiveDate) -> Self {
        Self {
            date: day_number,
            display_date: calendar::display_date(date),
            iso_date: date,
            day_of_week: DayCode::of(date),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, kind: TaskKind) -> Option<&Task> {
        self.tasks.iter().find(|t| t.kind == kind)
    }
}

/// Colocation complète (fichier JSON)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub home_visits: Vec<HomeVisit>,
    #[serde(default)]
    pub schedule: Vec<DaySchedule>,
    #[serde(default)]
    pub reminders: ReminderSettings,
}

impl Household {
    pub fn find_member_by_name<'a>(&'a self, name: &str) -> Option<&'a Member> {
        self.members.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }
    pub fn find_member_by_id<'a>(&'a self, id: &MemberId) -> Option<&'a Member> {
        self.members.iter().find(|m| &m.id == id)
    }
    /// Résout un membre par identifiant, puis par nom.
    pub fn resolve_member<'a>(&'a self, key: &str) -> Option<&'a Member> {
        self.find_member_by_id(&MemberId::new(key))
            .or_else(|| self.find_member_by_name(key))
    }
    pub fn member_name<'a>(&'a self, id: Option<&MemberId>) -> Option<&'a str> {
        id.and_then(|id| self.find_member_by_id(id))
            .map(|m| m.name.as_str())
    }
}
