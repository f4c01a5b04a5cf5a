use crate::model::{DaySchedule, Member, Task, TaskId, TaskKind};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Réglages des rappels, persistés avec la colocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub days_before: u32,
    /// Heure d'envoi `HH:MM`.
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default = "default_task_types")]
    pub task_types: Vec<TaskKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_enabled: bool,
}

fn default_time() -> String {
    "09:00".to_string()
}

fn default_task_types() -> Vec<TaskKind> {
    vec![
        TaskKind::ProxyLunch,
        TaskKind::ProxyDinner,
        TaskKind::WeekendPrep,
    ]
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            days_before: 0,
            time: default_time(),
            task_types: default_task_types(),
            email: None,
            email_enabled: false,
        }
    }
}

impl ReminderSettings {
    fn email_recipient(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| self.email_enabled && !e.is_empty())
    }
}

/// Représente un rappel généré pour une tâche.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub task_id: TaskId,
    pub member_name: String,
    pub notice_at: NaiveDateTime,
    pub title: String,
    pub message: String,
    pub content: String,
    /// Destinataire si l'envoi par e-mail est activé.
    pub email_to: Option<String>,
}

/// Permet de customiser le rendu du message (texte, SMS, etc.).
pub trait ReminderRenderer {
    fn render(&self, member_name: &str, day: &DaySchedule, task: &Task) -> String;
}

/// Gabarit texte simple destiné à un futur mail/SMS.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReminder;

impl ReminderRenderer for TextReminder {
    fn render(&self, member_name: &str, day: &DaySchedule, task: &Task) -> String {
        let mut out = format!(
            "Hi {name},\n\nYou are on \"{kind}\" on {display} ({dow}, {iso}).\n",
            name = member_name,
            kind = task.kind,
            display = day.display_date,
            dow = day.day_of_week,
            iso = day.iso_date.format("%Y-%m-%d"),
        );
        if let Some(note) = &task.note {
            out.push_str(&format!("Note: {note}\n"));
        }
        out.push_str("\nPlease mark it done once finished.\n");
        out
    }
}

/// Rappels dus pour `today` : tâches du jour `today + days_before`, du bon type,
/// assignées, non terminées et pas encore notifiées (`notified` est mis à jour).
pub fn due_reminders(
    schedule: &[DaySchedule],
    members: &[Member],
    settings: &ReminderSettings,
    today: NaiveDate,
    notified: &mut HashSet<TaskId>,
    renderer: &dyn ReminderRenderer,
) -> Result<Vec<Reminder>> {
    if !settings.enabled || schedule.is_empty() {
        return Ok(Vec::new());
    }

    let time = NaiveTime::parse_from_str(settings.time.trim(), "%H:%M")
        .with_context(|| format!("invalid reminder time: {}", settings.time))?;
    let target = today
        .checked_add_days(Days::new(u64::from(settings.days_before)))
        .context("reminder target date overflow")?;
    let notice_at = today.and_time(time);

    let mut out = Vec::new();
    for day in schedule.iter().filter(|d| d.iso_date == target) {
        for task in &day.tasks {
            let Some(assignee) = task.assignee_id.as_ref() else {
                continue;
            };
            if task.completed
                || !settings.task_types.contains(&task.kind)
                || notified.contains(&task.id)
            {
                continue;
            }

            let member_name = members
                .iter()
                .find(|m| &m.id == assignee)
                .map(|m| m.name.as_str())
                .unwrap_or("Someone");
            let title = format!("Upcoming: {}", task.kind);
            let message = format!(
                "{member_name} has {} on {} ({}).",
                task.kind, day.display_date, day.day_of_week
            );
            let email_to = settings.email_recipient().map(str::to_string);
            if let Some(to) = &email_to {
                info!(to = %to, subject = %title, "reminder e-mail queued");
            }

            notified.insert(task.id.clone());
            out.push(Reminder {
                task_id: task.id.clone(),
                member_name: member_name.to_string(),
                notice_at,
                content: renderer.render(member_name, day, task),
                title,
                message,
                email_to,
            });
        }
    }

    Ok(out)
}
