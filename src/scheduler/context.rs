use super::availability;
use crate::calendar::DayCode;
use crate::model::{HomeVisit, Member, MemberId, ProxyCounts, TaskKind};
use chrono::NaiveDate;

/// Remplacement repas suivi par un compteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Meal {
    Lunch,
    Dinner,
}

impl Meal {
    pub(super) fn kind(self) -> TaskKind {
        match self {
            Meal::Lunch => TaskKind::ProxyLunch,
            Meal::Dinner => TaskKind::ProxyDinner,
        }
    }

    fn count(self, counts: &ProxyCounts) -> u32 {
        match self {
            Meal::Lunch => counts.lunch,
            Meal::Dinner => counts.dinner,
        }
    }

    fn count_mut(self, counts: &mut ProxyCounts) -> &mut u32 {
        match self {
            Meal::Lunch => &mut counts.lunch,
            Meal::Dinner => &mut counts.dinner,
        }
    }
}

/// Pointeur de rotation persistant sur tout le calcul.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Rotation {
    pointer: usize,
}

impl Rotation {
    /// Élément `pointer mod len` du groupe du jour, puis avance d'un cran.
    pub(super) fn next<T: Copy>(&mut self, pool: &[T]) -> Option<T> {
        if pool.is_empty() {
            return None;
        }
        let picked = pool[self.pointer % pool.len()];
        self.pointer += 1;
        Some(picked)
    }
}

#[derive(Debug)]
struct WorkingMember<'a> {
    member: &'a Member,
    counts: ProxyCounts,
}

/// Copie de travail d'un calcul : compteurs remis à zéro et pointeurs de rotation.
/// Jamais partagée avec le roster de l'appelant.
#[derive(Debug)]
pub(super) struct SchedulingContext<'a> {
    roster: Vec<WorkingMember<'a>>,
    pub(super) drinks: Rotation,
    pub(super) thursday_prep: Rotation,
    pub(super) friday_prep: Rotation,
}

impl<'a> SchedulingContext<'a> {
    pub(super) fn new(members: &'a [Member]) -> Self {
        Self {
            roster: members
                .iter()
                .map(|member| WorkingMember {
                    member,
                    counts: ProxyCounts::default(),
                })
                .collect(),
            drinks: Rotation::default(),
            thursday_prep: Rotation::default(),
            friday_prep: Rotation::default(),
        }
    }

    /// Positions (ordre du roster) des membres actifs ce jour-là.
    pub(super) fn active_on(&self, date: NaiveDate, absences: &[HomeVisit]) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, w)| availability::is_active(w.member, date, absences))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub(super) fn member_id(&self, idx: usize) -> MemberId {
        self.roster[idx].member.id.clone()
    }

    /// Membre disponible le moins chargé ; à égalité, le premier du roster.
    /// Incrémente son compteur et renvoie `(position, nouvelle valeur)`.
    pub(super) fn take_least_loaded(
        &mut self,
        active: &[usize],
        day: DayCode,
        meal: Meal,
    ) -> Option<(usize, u32)> {
        let idx = active
            .iter()
            .copied()
            .filter(|&idx| {
                !availability::blocked_by_busy_day(self.roster[idx].member, day, meal.kind())
            })
            .min_by_key(|&idx| meal.count(&self.roster[idx].counts))?;

        let counter = meal.count_mut(&mut self.roster[idx].counts);
        *counter += 1;
        Some((idx, *counter))
    }
}
