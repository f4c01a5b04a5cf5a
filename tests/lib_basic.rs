#![forbid(unsafe_code)]
use chrono::NaiveDate;
use corvee::scheduler::{self, ALL_BUSY_NOTE, NO_MEMBERS_NOTE, OVER_LIMIT_NOTE};
use corvee::{generate, DayCode, HomeVisit, Member, MemberId, SchedError, Scheduler, TaskKind};
use std::collections::HashMap;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn member(id: &str, busy: &[DayCode]) -> Member {
    let mut m = Member::new(id, day(2023, 10, 1)).with_busy_days(busy.iter().copied());
    m.id = MemberId::new(id);
    m
}

fn assignees(schedule: &[corvee::DaySchedule], kind: TaskKind) -> Vec<Option<String>> {
    schedule
        .iter()
        .map(|d| {
            d.task(kind)
                .and_then(|t| t.assignee_id.as_ref())
                .map(|id| id.as_str().to_string())
        })
        .collect()
}

// 2024-01-01 est un lundi
fn monday() -> NaiveDate {
    day(2024, 1, 1)
}

fn some(ids: &[&str]) -> Vec<Option<String>> {
    ids.iter().map(|s| Some(s.to_string())).collect()
}

#[test]
fn emits_one_day_per_requested_day() {
    let members = vec![member("a", &[]), member("b", &[DayCode::Tue]), member("c", &[])];
    let schedule = generate(&members, &[], monday(), 30);

    assert_eq!(schedule.len(), 30);
    for (i, d) in schedule.iter().enumerate() {
        assert_eq!(d.date as usize, i + 1);
        assert_eq!(d.day_of_week, DayCode::of(d.iso_date));
    }
    for w in schedule.windows(2) {
        assert!(w[0].iso_date < w[1].iso_date);
    }
    assert_eq!(schedule[0].display_date, "Jan 1");
    assert_eq!(schedule[29].iso_date, day(2024, 1, 30));
}

#[test]
fn empty_roster_or_zero_days_yield_nothing() {
    assert!(generate(&[], &[], monday(), 14).is_empty());
    assert!(generate(&[member("a", &[])], &[], monday(), 0).is_empty());
}

#[test]
fn day_without_active_member_has_single_placeholder() {
    let mut late = member("late", &[]);
    late.start_date = day(2024, 1, 3);
    let schedule = generate(&[late], &[], monday(), 4);

    for d in &schedule[..2] {
        assert_eq!(d.tasks.len(), 1);
        assert_eq!(d.tasks[0].kind, TaskKind::ProxyLunch);
        assert!(d.tasks[0].assignee_id.is_none());
        assert_eq!(d.tasks[0].note.as_deref(), Some(NO_MEMBERS_NOTE));
    }
    // arrivé le 3 : assigné à partir de là
    assert_eq!(
        schedule[2].task(TaskKind::ProxyLunch).unwrap().assignee_id,
        Some(MemberId::new("late"))
    );
}

#[test]
fn meal_proxies_go_to_least_loaded_available_member() {
    let members = vec![
        member("a", &[DayCode::Mon, DayCode::Wed]),
        member("b", &[DayCode::Tue, DayCode::Thu]),
        member("c", &[DayCode::Fri]),
        member("d", &[DayCode::Mon, DayCode::Tue]),
    ];
    let absences = vec![
        HomeVisit::new(MemberId::new("c"), day(2024, 1, 8), day(2024, 1, 12)),
        HomeVisit::new(MemberId::new("a"), day(2024, 1, 20), day(2024, 1, 21)),
    ];
    let schedule = generate(&members, &absences, monday(), 30);

    for kind in [TaskKind::ProxyLunch, TaskKind::ProxyDinner] {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for d in &schedule {
            let available: Vec<&Member> = members
                .iter()
                .filter(|m| scheduler::is_available(m, d.iso_date, &absences, kind))
                .collect();
            let Some(task) = d.task(kind) else {
                continue;
            };
            let Some(chosen) = task.assignee_id.as_ref() else {
                assert!(available.is_empty());
                continue;
            };
            let pre = counts.get(chosen.as_str()).copied().unwrap_or(0);
            let min = available
                .iter()
                .map(|m| counts.get(m.id.as_str()).copied().unwrap_or(0))
                .min()
                .unwrap();
            assert_eq!(pre, min, "day {} {kind}", d.date);
            let first_tied = available
                .iter()
                .find(|m| counts.get(m.id.as_str()).copied().unwrap_or(0) == min)
                .unwrap();
            assert_eq!(&first_tied.id, chosen, "tie-break on day {}", d.date);
            *counts.entry(chosen.as_str()).or_default() += 1;
        }
    }
}

#[test]
fn every_assignee_is_active_that_day() {
    let members = vec![member("a", &[]), member("b", &[DayCode::Sat]), member("c", &[])];
    let absences = vec![
        HomeVisit::new(MemberId::new("a"), day(2024, 1, 2), day(2024, 1, 9)),
        HomeVisit::new(MemberId::new("b"), day(2024, 1, 4), day(2024, 1, 5)),
    ];
    let sched = Scheduler::new(&members, &absences);
    let schedule = sched.generate(monday(), 21);

    let on_the_fourth: Vec<&str> = sched
        .active_members(day(2024, 1, 4))
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(on_the_fourth, vec!["c"]);

    for d in &schedule {
        for t in &d.tasks {
            if let Some(id) = &t.assignee_id {
                let m = members.iter().find(|m| &m.id == id).unwrap();
                assert!(sched.is_active(m, d.iso_date), "{} on {}", id, d.iso_date);
            }
        }
    }
}

#[test]
fn buy_drinks_cycles_in_roster_order() {
    let members = vec![member("a", &[DayCode::Mon]), member("b", &[]), member("c", &[])];
    let schedule = generate(&members, &[], monday(), 9);
    let drinks = assignees(&schedule, TaskKind::BuyDrinks);
    assert_eq!(drinks, some(&["a", "b", "c", "a", "b", "c", "a", "b", "c"]));
}

#[test]
fn drink_pointer_indexes_the_day_active_subset() {
    let members = vec![member("a", &[]), member("b", &[]), member("c", &[])];
    let absences = vec![HomeVisit::new(MemberId::new("b"), day(2024, 1, 2), day(2024, 1, 2))];
    let schedule = generate(&members, &absences, monday(), 3);
    // jour 1 : [a,b,c][0] ; jour 2 : [a,c][1] ; jour 3 : [a,b,c][2]
    assert_eq!(
        assignees(&schedule, TaskKind::BuyDrinks),
        some(&["a", "c", "c"])
    );
}

#[test]
fn absence_bounds_are_inclusive_at_day_granularity() {
    let a = member("a", &[]);
    let visit: HomeVisit = serde_json::from_str(
        r#"{"id":"v1","memberId":"a","startDate":"2024-01-05T18:30:00Z","endDate":"2024-01-07T00:15:00+01:00"}"#,
    )
    .unwrap();
    let absences = vec![visit];

    assert!(scheduler::is_active(&a, day(2024, 1, 4), &absences));
    for d in 5..=7 {
        assert!(!scheduler::is_active(&a, day(2024, 1, d), &absences));
    }
    assert!(scheduler::is_active(&a, day(2024, 1, 8), &absences));

    let others = vec![a.clone(), member("b", &[])];
    let schedule = generate(&others, &absences, monday(), 10);
    for d in &schedule[4..7] {
        assert!(d.tasks.iter().all(|t| t.assignee_id != Some(a.id.clone())));
    }
}

#[test]
fn busy_days_only_block_meal_proxies() {
    let a = member("a", &[DayCode::Mon]);
    assert!(!scheduler::is_available(&a, monday(), &[], TaskKind::ProxyLunch));
    assert!(!scheduler::is_available(&a, monday(), &[], TaskKind::ProxyDinner));
    assert!(scheduler::is_available(&a, monday(), &[], TaskKind::BuyDrinks));
    assert!(scheduler::is_available(&a, monday(), &[], TaskKind::WeekendPrep));
    assert!(scheduler::is_available(&a, day(2024, 1, 2), &[], TaskKind::ProxyLunch));
}

#[test]
fn weekend_prep_only_on_thursday_and_friday() {
    let members = vec![member("a", &[]), member("b", &[]), member("c", &[]), member("d", &[])];
    let schedule = generate(&members, &[], monday(), 7);

    let prep_days: Vec<u32> = schedule
        .iter()
        .filter(|d| d.task(TaskKind::WeekendPrep).is_some())
        .map(|d| d.date)
        .collect();
    assert_eq!(prep_days, vec![4, 5]);
    assert_eq!(
        schedule[3].task(TaskKind::WeekendPrep).unwrap().note.as_deref(),
        Some("Thu Dinner Prep")
    );
    assert_eq!(
        schedule[4].task(TaskKind::WeekendPrep).unwrap().note.as_deref(),
        Some("Fri All-Day Prep")
    );
}

#[test]
fn thursday_and_friday_prep_rotate_independently() {
    let members = vec![member("a", &[]), member("b", &[]), member("c", &[])];
    let schedule = generate(&members, &[], monday(), 14);
    let prep = assignees(&schedule, TaskKind::WeekendPrep);
    // jeudis : jours 4 et 11 ; vendredis : jours 5 et 12
    let week_ends: Vec<Option<String>> = [3, 4, 10, 11].iter().map(|&i| prep[i].clone()).collect();
    assert_eq!(week_ends, some(&["a", "a", "b", "b"]));
    assert!(prep[0].is_none() && prep[5].is_none());
    assert_eq!(schedule[3].tasks.len(), 4);
}

#[test]
fn monday_example_with_one_busy_member() {
    let members = vec![member("a", &[DayCode::Mon]), member("b", &[]), member("c", &[])];
    let schedule = generate(&members, &[], monday(), 1);
    assert_eq!(schedule.len(), 1);
    let d = &schedule[0];

    let b_or_c = [Some(MemberId::new("b")), Some(MemberId::new("c"))];
    assert!(b_or_c.contains(&d.task(TaskKind::ProxyLunch).unwrap().assignee_id));
    assert!(b_or_c.contains(&d.task(TaskKind::ProxyDinner).unwrap().assignee_id));
    assert_eq!(
        d.task(TaskKind::BuyDrinks).unwrap().assignee_id,
        Some(MemberId::new("a"))
    );
    assert!(d.task(TaskKind::WeekendPrep).is_none());
    let order: Vec<TaskKind> = d.tasks.iter().map(|t| t.kind).collect();
    assert_eq!(order, vec![TaskKind::ProxyLunch, TaskKind::ProxyDinner, TaskKind::BuyDrinks]);
}

#[test]
fn all_busy_members_leave_meal_proxies_unassigned() {
    let members = vec![member("a", &[DayCode::Mon])];
    let schedule = generate(&members, &[], monday(), 1);
    let d = &schedule[0];
    for kind in [TaskKind::ProxyLunch, TaskKind::ProxyDinner] {
        let t = d.task(kind).unwrap();
        assert!(t.assignee_id.is_none());
        assert_eq!(t.note.as_deref(), Some(ALL_BUSY_NOTE));
    }
    assert_eq!(
        d.task(TaskKind::BuyDrinks).unwrap().assignee_id,
        Some(MemberId::new("a"))
    );
}

#[test]
fn over_limit_note_is_advisory() {
    let schedule = generate(&[member("solo", &[])], &[], monday(), 10);
    for d in &schedule {
        let lunch = d.task(TaskKind::ProxyLunch).unwrap();
        assert_eq!(lunch.assignee_id, Some(MemberId::new("solo")));
        if d.date <= 8 {
            assert_eq!(lunch.note, None);
        } else {
            assert_eq!(lunch.note.as_deref(), Some(OVER_LIMIT_NOTE));
        }
    }
}

#[test]
fn caller_counters_are_neither_read_nor_mutated() {
    let mut a = member("a", &[]);
    a.proxy_counts.lunch = 100;
    let members = vec![a, member("b", &[])];
    let before = members.clone();

    let schedule = generate(&members, &[], monday(), 5);
    assert_eq!(members, before);
    assert_eq!(
        schedule[0].task(TaskKind::ProxyLunch).unwrap().assignee_id,
        Some(MemberId::new("a"))
    );
}

#[test]
fn decisions_are_deterministic_but_ids_are_fresh() {
    let members = vec![member("a", &[DayCode::Fri]), member("b", &[]), member("c", &[])];
    let one = generate(&members, &[], monday(), 14);
    let two = generate(&members, &[], monday(), 14);

    for kind in TaskKind::ALL {
        assert_eq!(assignees(&one, kind), assignees(&two, kind));
    }
    assert_ne!(one[0].tasks[0].id, two[0].tasks[0].id);

    let mut ids: Vec<&str> = one
        .iter()
        .flat_map(|d| d.tasks.iter().map(|t| t.id.as_str()))
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn boundary_rejects_bad_horizon_and_dates() {
    let members = vec![member("a", &[])];
    let sched = Scheduler::new(&members, &[]);

    assert!(matches!(
        sched.generate_from("2024-01-01", -1),
        Err(SchedError::InvalidHorizon(-1))
    ));
    assert!(matches!(
        sched.generate_from("01/01/2024", 14),
        Err(SchedError::InvalidDate(_))
    ));
    assert_eq!(sched.generate_from("2024-01-01", 14).unwrap().len(), 14);
    assert!(sched.generate_from("2024-01-01", 0).unwrap().is_empty());
    assert!(matches!(
        sched.generate_from("2024-01-01T08:00:00", 14),
        Err(SchedError::InvalidDate(_))
    ));
    assert_eq!(scheduler::parse_start_date(" 2024-01-01 ").unwrap(), monday());
}

#[test]
fn huge_horizon_is_truncated_at_the_last_date() {
    let members = vec![member("a", &[])];
    let last = generate(&members, &[], NaiveDate::MAX, u32::MAX);
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].iso_date, NaiveDate::MAX);

    let eve = NaiveDate::MAX.pred_opt().unwrap();
    assert_eq!(generate(&members, &[], eve, u32::MAX).len(), 2);

    assert!(matches!(
        Scheduler::new(&members, &[]).generate_from("2024-01-01", i64::from(u32::MAX)),
        Err(SchedError::DateOverflow)
    ));
}
