use crate::action::Action;
use crate::error::{Result, TrackerError};
use crate::task::Task;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

// ---------------------------------------------------------------------------
// TaskList
// ---------------------------------------------------------------------------

/// Ordered collection of tasks in which no two tasks share a name.
///
/// Every insertion path checks the name index, so the only way to hold two
/// tasks with the same name is to not put them in the same list.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    names: HashSet<String>,
}

impl PartialEq for TaskList {
    fn eq(&self, other: &Self) -> bool {
        self.tasks == other.tasks
    }
}

impl Eq for TaskList {}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Result<Self> {
        let mut list = Self::new();
        list.extend(tasks)?;
        Ok(list)
    }

    pub fn push(&mut self, task: Task) -> Result<()> {
        if self.names.contains(task.name()) {
            tracing::debug!(task = %task.name(), "rejecting duplicate task name");
            return Err(TrackerError::DuplicateName(task.name().to_string()));
        }
        self.names.insert(task.name().to_string());
        self.tasks.push(task);
        Ok(())
    }

    /// Append every task, or none of them if any name collides.
    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) -> Result<()> {
        let incoming: Vec<Task> = tasks.into_iter().collect();
        let mut seen: HashSet<&str> = HashSet::new();
        for task in &incoming {
            if self.names.contains(task.name()) || !seen.insert(task.name()) {
                tracing::debug!(task = %task.name(), "rejecting duplicate task name");
                return Err(TrackerError::DuplicateName(task.name().to_string()));
            }
        }
        for task in incoming {
            self.names.insert(task.name().to_string());
            self.tasks.push(task);
        }
        Ok(())
    }

    /// Concatenate two lists under the same uniqueness rule.
    pub fn concat(mut self, other: impl IntoIterator<Item = Task>) -> Result<Self> {
        self.extend(other)?;
        Ok(self)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    /// Tasks whose name contains `query`, case-insensitively.
    pub fn search(&self, query: &str) -> Vec<&Task> {
        let query = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.name().to_lowercase().contains(&query))
            .collect()
    }

    /// Remove the task equal (by value) to `task`.
    pub fn remove(&mut self, task: &Task) -> Result<Task> {
        let pos = self.position(task)?;
        let removed = self.tasks.remove(pos);
        self.names.remove(removed.name());
        Ok(removed)
    }

    /// Swap `old` for `new` in place. `new` may keep `old`'s name but must not
    /// take the name of any other task.
    pub fn replace(&mut self, old: &Task, new: Task) -> Result<()> {
        let pos = self.position(old)?;
        if new.name() != old.name() && self.names.contains(new.name()) {
            return Err(TrackerError::DuplicateName(new.name().to_string()));
        }
        self.names.remove(old.name());
        self.names.insert(new.name().to_string());
        self.tasks[pos] = new;
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn position(&self, task: &Task) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t == task)
            .ok_or_else(|| TrackerError::TaskNotFound(task.name().to_string()))
    }

    // -----------------------------------------------------------------------
    // Due-period queries
    // -----------------------------------------------------------------------

    /// Next occurrence of every task that falls between the task's start and
    /// `when + period`, in list order.
    pub fn get_next_tasks_due_period(
        &self,
        period: TimeDelta,
        when: Option<DateTime<Utc>>,
    ) -> Vec<(&Task, DateTime<Utc>)> {
        let when = when.unwrap_or_else(Utc::now);
        let Some(limit) = when.checked_add_signed(period) else {
            return Vec::new();
        };

        self.tasks
            .iter()
            .filter_map(|task| {
                let start = task.start_time()?;
                let next = task.next_programmed_time(when)?;
                (start <= next && next <= limit).then_some((task, next))
            })
            .collect()
    }

    /// Every occurrence of every task inside the window spanned by `when` and
    /// `when + period`, in list order. Tasks with no occurrence are left out.
    pub fn get_all_tasks_due_period(
        &self,
        period: TimeDelta,
        when: Option<DateTime<Utc>>,
    ) -> Vec<(&Task, Vec<DateTime<Utc>>)> {
        let when = when.unwrap_or_else(Utc::now);
        self.tasks
            .iter()
            .filter_map(|task| {
                let mut times = task.get_all_programmed_times(period, Some(when));
                if times.is_empty() {
                    return None;
                }
                times.sort();
                Some((task, times))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

impl IntoIterator for TaskList {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

impl TryFrom<Vec<Task>> for TaskList {
    type Error = TrackerError;

    fn try_from(tasks: Vec<Task>) -> Result<Self> {
        Self::from_tasks(tasks)
    }
}

// ---------------------------------------------------------------------------
// ActionList
// ---------------------------------------------------------------------------

/// Ordered collection of actions.
///
/// Equality ignores order: two lists are equal when they hold the same
/// actions once sorted by timestamp. Actions sharing a timestamp are compared
/// as a multiset.
#[derive(Debug, Clone, Default)]
pub struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Remove the first action equal to `action`.
    pub fn remove(&mut self, action: &Action) -> Result<Action> {
        let pos = self
            .actions
            .iter()
            .position(|a| a == action)
            .ok_or_else(|| TrackerError::ActionNotFound {
                task: action.task_name().to_string(),
                timestamp: action.timestamp(),
            })?;
        Ok(self.actions.remove(pos))
    }

    /// Actions recorded against a task with `task`'s name.
    pub fn for_task(&self, task: &Task) -> Self {
        self.actions
            .iter()
            .filter(|a| a.references(task))
            .cloned()
            .collect()
    }

    pub fn count_for(&self, task: &Task) -> usize {
        self.actions.iter().filter(|a| a.references(task)).count()
    }

    /// Stable sort by timestamp.
    pub fn sort(&mut self, order: SortOrder) {
        match order {
            SortOrder::Asc => self.actions.sort_by_key(Action::timestamp),
            SortOrder::Desc => self
                .actions
                .sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn by_timestamp(&self) -> Vec<&Action> {
        let mut sorted: Vec<&Action> = self.actions.iter().collect();
        sorted.sort_by_key(|a| a.timestamp());
        sorted
    }
}

impl PartialEq for ActionList {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let ours = self.by_timestamp();
        let theirs = other.by_timestamp();

        let mut i = 0;
        while i < ours.len() {
            let ts = ours[i].timestamp();
            let end = ours[i..]
                .iter()
                .position(|a| a.timestamp() != ts)
                .map_or(ours.len(), |p| i + p);
            let group = &theirs[i..end];
            if group.iter().any(|a| a.timestamp() != ts) || !same_elements(&ours[i..end], group) {
                return false;
            }
            i = end;
        }
        true
    }
}

impl Eq for ActionList {}

fn same_elements(a: &[&Action], b: &[&Action]) -> bool {
    a.iter().all(|x| {
        let count = |side: &[&Action]| side.iter().filter(|y| **y == *x).count();
        count(a) == count(b)
    })
}

impl From<Vec<Action>> for ActionList {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl FromIterator<Action> for ActionList {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

impl IntoIterator for ActionList {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn task1() -> Task {
        Task::new(
            "my first task",
            "a description for my task1",
            Some(at(2023, 12, 24, 17, 32)),
            TimeDelta::minutes(60),
        )
        .unwrap()
    }

    fn task2() -> Task {
        Task::new(
            "my second task",
            "a description for my task2",
            Some(at(2023, 12, 25, 17, 32)),
            TimeDelta::minutes(30),
        )
        .unwrap()
    }

    fn task3() -> Task {
        Task::new(
            "my third task",
            "adding this one #3",
            Some(at(2023, 12, 25, 17, 32)),
            TimeDelta::minutes(30),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_names_rejected_on_every_path() {
        let dup = task1().with_changes(Default::default()).unwrap();

        let mut list = TaskList::from_tasks([task1()]).unwrap();
        assert!(matches!(list.push(dup.clone()), Err(TrackerError::DuplicateName(_))));

        let mut list = TaskList::from_tasks([task1()]).unwrap();
        assert!(matches!(
            list.extend([dup.clone()]),
            Err(TrackerError::DuplicateName(_))
        ));

        assert!(matches!(
            TaskList::from_tasks([task1(), dup.clone()]),
            Err(TrackerError::DuplicateName(_))
        ));

        let list = TaskList::new().concat([task1()]).unwrap();
        assert!(matches!(list.concat([dup]), Err(TrackerError::DuplicateName(_))));
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut list = TaskList::from_tasks([task1()]).unwrap();
        let err = list.extend([task2(), task3(), task2()]).unwrap_err();
        assert!(matches!(err, TrackerError::DuplicateName(name) if name == "my second task"));
        assert_eq!(list.len(), 1);
        assert!(!list.contains_name("my second task"));
    }

    #[test]
    fn lookup_returns_none_when_missing() {
        let list = TaskList::from_tasks([task1(), task2()]).unwrap();
        assert_eq!(list.get("my second task"), Some(&task2()));
        assert_eq!(list.get("nope"), None);
    }

    #[test]
    fn search_matches_substrings() {
        let list = TaskList::from_tasks([task1(), task2(), task3()]).unwrap();
        let names: Vec<&str> = list.search("SECOND").iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["my second task"]);
        assert_eq!(list.search("task").len(), 3);
    }

    #[test]
    fn remove_frees_the_name() {
        let mut list = TaskList::from_tasks([task1(), task2()]).unwrap();
        list.remove(&task1()).unwrap();
        assert!(!list.contains_name("my first task"));
        list.push(task1()).unwrap();
        let names: Vec<&str> = list.iter().map(Task::name).collect();
        assert_eq!(names, vec!["my second task", "my first task"]);

        let other = task3();
        assert!(matches!(list.remove(&other), Err(TrackerError::TaskNotFound(_))));
    }

    #[test]
    fn replace_keeps_position_and_checks_names() {
        let mut list = TaskList::from_tasks([task1(), task2()]).unwrap();
        let renamed = task1()
            .with_changes(crate::task::TaskChanges {
                name: Some("renamed".to_string()),
                ..Default::default()
            })
            .unwrap();
        list.replace(&task1(), renamed.clone()).unwrap();
        assert_eq!(list.iter().next(), Some(&renamed));
        assert!(list.contains_name("renamed"));
        assert!(!list.contains_name("my first task"));

        let clash = renamed
            .with_changes(crate::task::TaskChanges {
                name: Some("my second task".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(
            list.replace(&renamed, clash),
            Err(TrackerError::DuplicateName(_))
        ));
    }

    #[test]
    fn all_tasks_due_period_forward_and_backward() {
        let list = TaskList::from_tasks([task1(), task2()]).unwrap();
        let when = Some(at(2024, 1, 30, 10, 10));

        let forward = list.get_all_tasks_due_period(TimeDelta::hours(1), when);
        assert_eq!(
            forward,
            vec![
                (&task1(), vec![at(2024, 1, 30, 10, 32)]),
                (&task2(), vec![at(2024, 1, 30, 10, 32), at(2024, 1, 30, 11, 2)]),
            ]
        );

        let backward = list.get_all_tasks_due_period(TimeDelta::hours(-1), when);
        assert_eq!(
            backward,
            vec![
                (&task1(), vec![at(2024, 1, 30, 9, 32)]),
                (&task2(), vec![at(2024, 1, 30, 9, 32), at(2024, 1, 30, 10, 2)]),
            ]
        );
    }

    #[test]
    fn all_tasks_due_period_skips_idle_tasks() {
        let idle = Task::new("idle", "", None, TimeDelta::days(1)).unwrap();
        let list = TaskList::from_tasks([idle, task1()]).unwrap();
        let due = list.get_all_tasks_due_period(TimeDelta::minutes(10), Some(at(2024, 1, 30, 10, 10)));
        assert!(due.is_empty());
    }

    #[test]
    fn next_tasks_due_period_filters_by_window() {
        let later = Task::new(
            "yearly",
            "",
            Some(at(2025, 1, 1, 0, 0)),
            TimeDelta::days(365),
        )
        .unwrap();
        let list = TaskList::from_tasks([task2(), later, task1()]).unwrap();
        let when = Some(at(2024, 1, 30, 10, 10));

        let due = list.get_next_tasks_due_period(TimeDelta::minutes(30), when);
        assert_eq!(
            due,
            vec![
                (&task2(), at(2024, 1, 30, 10, 32)),
                (&task1(), at(2024, 1, 30, 10, 32)),
            ]
        );

        assert!(list
            .get_next_tasks_due_period(TimeDelta::minutes(10), when)
            .is_empty());
    }

    fn action(ts: DateTime<Utc>, task: Task, name: &str) -> Action {
        Action::new(ts, task).with_name(name).with_actor("me")
    }

    #[test]
    fn action_list_equality_ignores_order() {
        let a = action(at(2024, 1, 1, 0, 0), task1(), "new year");
        let b = action(at(2024, 1, 2, 0, 0), task1(), "second day");
        assert_eq!(
            ActionList::from(vec![a.clone(), b.clone()]),
            ActionList::from(vec![b.clone(), a.clone()])
        );
        assert_ne!(ActionList::from(vec![a.clone()]), ActionList::from(vec![a.clone(), b.clone()]));
        assert_ne!(ActionList::from(vec![a.clone(), a]), ActionList::from(vec![b.clone(), b]));
    }

    #[test]
    fn action_list_equality_with_shared_timestamps() {
        let ts = at(2024, 1, 1, 0, 0);
        let a = action(ts, task1(), "a");
        let b = action(ts, task2(), "b");
        let c = action(at(2024, 1, 3, 0, 0), task2(), "c");
        assert_eq!(
            ActionList::from(vec![a.clone(), b.clone(), c.clone()]),
            ActionList::from(vec![c.clone(), b.clone(), a.clone()])
        );
        assert_ne!(
            ActionList::from(vec![a.clone(), a.clone(), c.clone()]),
            ActionList::from(vec![a, b, c])
        );
    }

    #[test]
    fn action_list_filters_and_sorts() {
        let a1 = action(at(2024, 1, 1, 0, 0), task1(), "a1");
        let a2 = action(at(2024, 1, 2, 0, 0), task1(), "a2");
        let b1 = action(at(2024, 1, 1, 0, 0), task2(), "b1");
        let list = ActionList::from(vec![a2.clone(), b1, a1.clone()]);

        let mut mine = list.for_task(&task1());
        assert_eq!(mine.len(), 2);
        assert_eq!(list.count_for(&task2()), 1);

        mine.sort(SortOrder::Desc);
        let order: Vec<&Action> = mine.iter().collect();
        assert_eq!(order, vec![&a2, &a1]);

        mine.sort(SortOrder::Asc);
        assert_eq!(mine.iter().next(), Some(&a1));
    }

    #[test]
    fn action_list_remove_missing_fails() {
        let a = action(at(2024, 1, 1, 0, 0), task1(), "a");
        let mut list = ActionList::new();
        assert!(matches!(list.remove(&a), Err(TrackerError::ActionNotFound { .. })));
        list.push(a.clone());
        assert_eq!(list.remove(&a).unwrap(), a);
        assert!(list.is_empty());
    }
}
