use super::SchedError;
use crate::model::{DaySchedule, TaskId};

/// Bascule l'état `completed` d'une tâche et renvoie le nouvel état.
pub(super) fn toggle_completed(
    schedule: &mut [DaySchedule],
    task_id: &TaskId,
) -> Result<bool, SchedError> {
    let task = schedule
        .iter_mut()
        .flat_map(|day| day.tasks.iter_mut())
        .find(|task| &task.id == task_id)
        .ok_or_else(|| SchedError::UnknownTask(task_id.as_str().to_string()))?;

    task.completed = !task.completed;
    Ok(task.completed)
}
