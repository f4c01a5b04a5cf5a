#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use corvee::{
    calendar::{self, DayCode},
    enhance::{busy_day_violations, enhance_or_baseline, EnhanceRequest, ScheduleEnhancer},
    io,
    model::{Household, Member, TaskId, TaskKind},
    notification::{due_reminders, TextReminder},
    scheduler::{self, SchedError, ScheduleFilter, Scheduler, DEFAULT_HORIZON_DAYS},
    storage::{JsonStorage, Storage},
};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de répartition des corvées (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de la colocation
    #[arg(long, global = true, default_value = "household.json")]
    household: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un membre
    AddMember {
        #[arg(long)]
        name: String,
        /// Date d'arrivée YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Jours chargés, ex. "Mon;Wed"
        #[arg(long)]
        busy: Option<String>,
    },

    /// Importer des membres depuis un CSV
    ImportMembers {
        #[arg(long)]
        csv: String,
    },

    /// Déclarer une absence (bornes incluses)
    AddVisit {
        /// Nom ou identifiant du membre
        #[arg(long)]
        member: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Importer des absences depuis un CSV
    ImportVisits {
        #[arg(long)]
        csv: String,
    },

    /// Générer le planning de base (remplace le précédent)
    Generate {
        /// YYYY-MM-DD, aujourd'hui par défaut
        #[arg(long)]
        start: Option<String>,
        #[arg(long, default_value_t = i64::from(DEFAULT_HORIZON_DAYS), allow_negative_numbers = true)]
        days: i64,
    },

    /// Lister, filtrer et optionnellement exporter le planning
    List {
        #[arg(long)]
        day: Option<String>,
        /// ex. "Proxy Lunch"
        #[arg(long)]
        kind: Option<String>,
        /// Nom ou identifiant du membre
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Marquer une tâche comme faite (ou l'inverse)
    Toggle {
        #[arg(long)]
        task_id: String,
    },

    /// Nombre de jours de repas et de boissons par membre
    Stats,

    /// Appliquer la réponse d'un service d'amélioration externe
    Enhance {
        /// YYYY-MM-DD, aujourd'hui par défaut
        #[arg(long)]
        start: Option<String>,
        /// Écrit ici la requête (brouillon + contraintes) destinée au service
        #[arg(long)]
        request_out: Option<PathBuf>,
        /// Réponse JSON du service
        #[arg(long)]
        response: PathBuf,
    },

    /// Régler les rappels
    Reminders {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        days_before: Option<u32>,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        /// liste "Proxy Lunch,Weekend Prep"
        #[arg(long)]
        types: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        email_enabled: Option<bool>,
    },

    /// Générer les rappels dus aujourd'hui
    Notify {
        /// YYYY-MM-DD, aujourd'hui par défaut
        #[arg(long)]
        today: Option<String>,
        /// Fichier de sortie (texte brut)
        #[arg(long)]
        out: Option<String>,
    },
}

/// Lit la réponse du service depuis un fichier, après avoir déposé la requête.
struct FileEnhancer {
    request_out: Option<PathBuf>,
    response: PathBuf,
}

impl ScheduleEnhancer for FileEnhancer {
    fn enhance(&self, request: &EnhanceRequest) -> Result<String> {
        if let Some(path) = &self.request_out {
            let json = serde_json::to_string_pretty(request)?;
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        std::fs::read_to_string(&self.response)
            .with_context(|| format!("reading {}", self.response.display()))
    }
}

fn parse_start(raw: Option<String>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => Ok(scheduler::parse_start_date(&raw)?),
        None => Ok(Local::now().date_naive()),
    }
}

fn resolve<'a>(household: &'a Household, key: &str) -> Result<&'a Member> {
    household
        .resolve_member(key)
        .ok_or_else(|| SchedError::UnknownMember(key.to_string()).into())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.household)?;
    let mut household = storage.load()?;

    let code = match cli.cmd {
        Commands::AddMember { name, start, busy } => {
            let start = calendar::parse_day(&start)?;
            let mut member = Member::new(name.trim(), start);
            if let Some(days) = busy {
                member.busy_days = io::parse_busy_days(&days)?;
            }
            println!("{} {}", member.id, member.name);
            household.members.push(member);
            storage.save(&household)?;
            0
        }
        Commands::ImportMembers { csv } => {
            let members = io::import_members_csv(csv)?;
            household.members.extend(members);
            storage.save(&household)?;
            0
        }
        Commands::AddVisit {
            member,
            start,
            end,
            reason,
        } => {
            let who = resolve(&household, &member)?;
            let mut visit = io::new_home_visit(who, &start, &end)?;
            visit.reason = reason;
            household.home_visits.push(visit);
            storage.save(&household)?;
            0
        }
        Commands::ImportVisits { csv } => {
            let visits = io::import_home_visits_csv(csv, &household)?;
            household.home_visits.extend(visits);
            storage.save(&household)?;
            0
        }
        Commands::Generate { start, days } => {
            let start = match start {
                Some(raw) => raw,
                None => calendar::iso_date(Local::now().date_naive()),
            };
            let schedule = Scheduler::for_household(&household).generate_from(&start, days)?;
            if household.members.is_empty() {
                eprintln!("warning: no member, the schedule is now empty");
            }
            println!("{} day(s) generated from {}", schedule.len(), start.trim());
            household.schedule = schedule;
            storage.save(&household)?;
            0
        }
        Commands::List {
            day,
            kind,
            member,
            out_json,
            out_csv,
        } => {
            let filter = ScheduleFilter {
                day: day.as_deref().map(str::parse::<DayCode>).transpose()?,
                kind: kind.as_deref().map(str::parse::<TaskKind>).transpose()?,
                assignee: match member {
                    Some(key) => Some(resolve(&household, &key)?.id.clone()),
                    None => None,
                },
            };
            let shown = scheduler::filter_schedule(&household.schedule, &filter);
            if let Some(path) = out_json {
                io::export_schedule_json(path, &shown)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &shown, &household)?;
            }
            // impression compacte
            for d in &shown {
                for t in &d.tasks {
                    println!(
                        "{:>2} {} {} | {:<12} | {:<8} | {}{}",
                        d.date,
                        d.iso_date,
                        d.day_of_week,
                        t.kind.as_str(),
                        household.member_name(t.assignee_id.as_ref()).unwrap_or("-"),
                        t.id.as_str(),
                        t.note.as_deref().map(|n| format!(" ({n})")).unwrap_or_default()
                    );
                }
            }
            0
        }
        Commands::Toggle { task_id } => {
            let done = scheduler::toggle_completed(&mut household.schedule, &TaskId::new(&task_id))?;
            println!("{task_id}: {}", if done { "done" } else { "todo" });
            storage.save(&household)?;
            0
        }
        Commands::Stats => {
            for m in &household.members {
                let st = scheduler::member_stats(&household.schedule, &m.id);
                println!(
                    "{:<12} lunch={} dinner={} drinks={}",
                    m.name, st.lunch, st.dinner, st.drinks
                );
            }
            0
        }
        Commands::Enhance {
            start,
            request_out,
            response,
        } => {
            if household.members.is_empty() {
                bail!("aucun membre : ajoute des membres d'abord");
            }
            let start = parse_start(start)?;
            let enhancer = FileEnhancer {
                request_out,
                response,
            };
            let outcome = enhance_or_baseline(
                &enhancer,
                &household.members,
                &household.home_visits,
                start,
            );
            for v in busy_day_violations(&outcome.schedule, &household.members) {
                eprintln!(
                    "warning: day {} ({}) {} placed on a busy day of {}",
                    v.day,
                    v.iso_date,
                    v.kind,
                    household.member_name(Some(&v.member_id)).unwrap_or("?")
                );
            }
            let code = match &outcome.error {
                None => {
                    println!("enhanced schedule applied ({} day(s))", outcome.schedule.len());
                    0
                }
                Some(err) => {
                    eprintln!("enhancement failed, falling back to basic schedule: {err}");
                    // Code 2 = WARNING/INCOMPLETE
                    2
                }
            };
            household.schedule = outcome.schedule;
            storage.save(&household)?;
            code
        }
        Commands::Reminders {
            enabled,
            days_before,
            time,
            types,
            email,
            email_enabled,
        } => {
            let settings = &mut household.reminders;
            if let Some(v) = enabled {
                settings.enabled = v;
            }
            if let Some(v) = days_before {
                settings.days_before = v;
            }
            if let Some(v) = time {
                chrono::NaiveTime::parse_from_str(v.trim(), "%H:%M")
                    .with_context(|| format!("invalid time: {v}"))?;
                settings.time = v.trim().to_string();
            }
            if let Some(list) = types {
                settings.task_types = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<TaskKind>)
                    .collect::<Result<_>>()?;
            }
            if let Some(v) = email {
                settings.email = Some(v);
            }
            if let Some(v) = email_enabled {
                settings.email_enabled = v;
            }
            println!("{}", serde_json::to_string_pretty(&household.reminders)?);
            storage.save(&household)?;
            0
        }
        Commands::Notify { today, out } => {
            let today = parse_start(today)?;
            let mut notified = HashSet::new();
            let reminders = due_reminders(
                &household.schedule,
                &household.members,
                &household.reminders,
                today,
                &mut notified,
                &TextReminder,
            )?;
            if reminders.is_empty() {
                println!("no reminder due");
            }
            let mut body = String::new();
            for r in &reminders {
                println!("{} | {} | {}", r.notice_at, r.title, r.message);
                if let Some(to) = &r.email_to {
                    println!("  -> email to {to}");
                }
                body.push_str(&r.content);
                body.push('\n');
            }
            if let Some(path) = out {
                std::fs::write(&path, body)?;
            }
            0
        }
    };

    std::process::exit(code);
}
