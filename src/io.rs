use crate::calendar::{self, DayCode};
use crate::model::{DaySchedule, HomeVisit, Household, Member};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de membres depuis CSV: header `name,start_date[,busy_days]`
/// (`busy_days` séparés par `;`, ex. `Mon;Wed`).
pub fn import_members_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Member>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let start = rec.get(1).context("missing start_date")?.trim();
        if name.is_empty() {
            bail!("invalid member row (empty name)");
        }
        let start = calendar::parse_day(start)
            .with_context(|| format!("invalid start_date for member {name}"))?;
        let mut member = Member::new(name, start);
        if let Some(days) = rec.get(2) {
            member.busy_days = parse_busy_days(days)
                .with_context(|| format!("invalid busy_days for member {name}"))?;
        }
        out.push(member);
    }
    Ok(out)
}

pub fn parse_busy_days(raw: &str) -> anyhow::Result<Vec<DayCode>> {
    let mut days = Vec::new();
    for chunk in raw.split([';', ',']).map(str::trim).filter(|c| !c.is_empty()) {
        let day: DayCode = chunk.parse()?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Import d'absences: header `member,start_date,end_date[,reason]`.
/// `member` est un identifiant ou un nom déjà présent dans la colocation.
pub fn import_home_visits_csv<P: AsRef<Path>>(
    path: P,
    household: &Household,
) -> anyhow::Result<Vec<HomeVisit>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let key = rec.get(0).context("missing member")?.trim();
        let start = rec.get(1).context("missing start_date")?;
        let end = rec.get(2).context("missing end_date")?;
        let member = household
            .resolve_member(key)
            .with_context(|| format!("unknown member: {key}"))?;
        let mut visit = new_home_visit(member, start, end)?;
        visit.reason = rec
            .get(3)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        out.push(visit);
    }
    Ok(out)
}

/// Construit une absence validée (`start <= end`), au jour près.
pub fn new_home_visit(member: &Member, start: &str, end: &str) -> anyhow::Result<HomeVisit> {
    let start = calendar::parse_day(start).context("invalid absence start")?;
    let end = calendar::parse_day(end).context("invalid absence end")?;
    if end < start {
        bail!("absence of {} ends ({end}) before it starts ({start})", member.name);
    }
    Ok(HomeVisit::new(member.id.clone(), start, end))
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &[DaySchedule]) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV du planning: header `date,iso_date,day,type,assignee,note,completed`
pub fn export_schedule_csv<P: AsRef<Path>>(
    path: P,
    schedule: &[DaySchedule],
    household: &Household,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "iso_date", "day", "type", "assignee", "note", "completed"])?;
    let mut num = itoa::Buffer::new();
    for day in schedule {
        let iso = calendar::iso_date(day.iso_date);
        for task in &day.tasks {
            let assignee = household
                .member_name(task.assignee_id.as_ref())
                .unwrap_or("");
            w.write_record([
                num.format(day.date),
                iso.as_str(),
                day.day_of_week.as_str(),
                task.kind.as_str(),
                assignee,
                task.note.as_deref().unwrap_or(""),
                if task.completed { "true" } else { "false" },
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}
