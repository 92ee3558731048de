//! The driver that turns tasks into a diff.
//!
//! [`Algorithm`] is an explicit stack machine. The agenda holds tasks still to
//! be decomposed, interleaved with assembly instructions that fold finished
//! child diffs back into merge nodes. Decomposing a task either pushes a value
//! (terminal tasks) or pushes more work; assembly runs eagerly between steps,
//! so a pending algorithm always has a task on top of its agenda.
//!
//! Because the whole state is a value, the caller decides how far to go:
//! [`Algorithm::run`] drives to completion, [`Algorithm::step`] decomposes a
//! single task, [`Algorithm::run_for`] stops after a fixed amount of work and
//! [`Algorithm::steps`] exposes the progression as an iterator.

use core::iter::FusedIterator;

use crate::algorithm::Task;
use crate::config::DiffConfig;
use crate::diff::{Diff, Patch};
use crate::rules::{self, Children, Structure};
use crate::rws::{self, Correspondence};
use crate::term::{Syntax, Term, TermTypes};

/// How many child diffs a merge node waits for.
#[derive(Debug, Clone, Copy)]
enum Arity {
    /// One list produced by an alignment.
    Aligned,
    /// This many individual diffs.
    Positional(usize),
}

enum Instr<'a, T: TermTypes> {
    /// Decompose a task.
    Run(Task<'a, T>),
    /// Pop finished children and build a merge node for `old`/`new`.
    Merge {
        old: &'a Term<T>,
        new: &'a Term<T>,
        slot: bool,
        children: Arity,
    },
    /// Gather the last `n` diffs into a list.
    Collect(usize),
}

impl<T: TermTypes> Clone for Instr<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Instr::Run(task) => Instr::Run(*task),
            Instr::Merge {
                old,
                new,
                slot,
                children,
            } => Instr::Merge {
                old: *old,
                new: *new,
                slot: *slot,
                children: *children,
            },
            Instr::Collect(n) => Instr::Collect(*n),
        }
    }
}

enum Value<'a, T: TermTypes> {
    Diff(Diff<'a, T>),
    List(Vec<Diff<'a, T>>),
}

impl<T: TermTypes> Clone for Value<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Value::Diff(diff) => Value::Diff(diff.clone()),
            Value::List(diffs) => Value::List(diffs.clone()),
        }
    }
}

impl<'a, T: TermTypes> Value<'a, T> {
    fn into_diff(self) -> Diff<'a, T> {
        match self {
            Value::Diff(diff) => diff,
            Value::List(_) => unreachable!("aligned children are only consumed by merge nodes"),
        }
    }

    fn into_list(self) -> Vec<Diff<'a, T>> {
        match self {
            Value::List(diffs) => diffs,
            Value::Diff(_) => unreachable!("a merge over aligned children expects a list"),
        }
    }
}

/// The outcome of a single step.
pub enum Step<'a, T: TermTypes> {
    /// More work remains.
    Pending(Algorithm<'a, T>),
    /// The diff is complete.
    Done(Diff<'a, T>),
}

/// One observation from [`Algorithm::steps`].
pub enum Progress<'a, T: TermTypes> {
    /// This task was decomposed.
    Task(Task<'a, T>),
    /// The final diff.
    Done(Diff<'a, T>),
}

/// A diff computation in progress.
pub struct Algorithm<'a, T: TermTypes> {
    config: DiffConfig,
    agenda: Vec<Instr<'a, T>>,
    values: Vec<Value<'a, T>>,
    steps: usize,
}

impl<T: TermTypes> Clone for Algorithm<'_, T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            agenda: self.agenda.clone(),
            values: self.values.clone(),
            steps: self.steps,
        }
    }
}

impl<'a, T: TermTypes> Algorithm<'a, T> {
    /// Start diffing `old` against `new`.
    pub fn new(old: &'a Term<T>, new: &'a Term<T>, config: &DiffConfig) -> Self {
        Self {
            config: config.clone(),
            agenda: vec![Instr::Run(Task::Diff(old, new))],
            values: Vec::new(),
            steps: 0,
        }
    }

    /// The task the next step will decompose.
    pub fn next_task(&self) -> Option<&Task<'a, T>> {
        match self.agenda.last() {
            Some(Instr::Run(task)) => Some(task),
            _ => None,
        }
    }

    /// Number of tasks decomposed so far.
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Number of instructions still on the agenda, tasks and assembly alike.
    pub fn pending(&self) -> usize {
        self.agenda.len()
    }

    /// Decompose exactly one task.
    pub fn step(mut self) -> Step<'a, T> {
        self.advance();
        self.finish()
    }

    /// Decompose at most `max_steps` tasks.
    pub fn run_for(mut self, max_steps: usize) -> Step<'a, T> {
        for _ in 0..max_steps {
            if !self.advance() {
                break;
            }
        }
        self.finish()
    }

    /// Run to completion.
    pub fn run(mut self) -> Diff<'a, T> {
        while self.advance() {}
        self.into_diff()
    }

    /// Iterate over the decomposed tasks, ending with the final diff.
    pub fn steps(self) -> Steps<'a, T> {
        Steps {
            algorithm: Some(self),
        }
    }

    /// Decompose the next task, then fold any finished children. Returns
    /// `false` when there was nothing left to do.
    fn advance(&mut self) -> bool {
        self.settle();
        let Some(Instr::Run(task)) = self.agenda.pop() else {
            return false;
        };
        trace!(step = self.steps, %task, "decompose");
        self.steps += 1;
        self.decompose(task);
        self.settle();
        true
    }

    fn finish(self) -> Step<'a, T> {
        if self.agenda.is_empty() {
            Step::Done(self.into_diff())
        } else {
            Step::Pending(self)
        }
    }

    fn into_diff(mut self) -> Diff<'a, T> {
        debug_assert!(self.agenda.is_empty(), "agenda must be drained");
        debug_assert_eq!(self.values.len(), 1, "exactly one root value");
        self.pop_value().into_diff()
    }

    fn pop_value(&mut self) -> Value<'a, T> {
        match self.values.pop() {
            Some(value) => value,
            None => unreachable!("every assembly instruction follows the tasks producing its inputs"),
        }
    }

    fn push_diff(&mut self, diff: Diff<'a, T>) {
        self.values.push(Value::Diff(diff));
    }

    fn decompose(&mut self, task: Task<'a, T>) {
        match task {
            Task::Diff(old, new) => match rules::correspond(old, new) {
                Some(structure) => self.expand(old, new, structure),
                None => self.agenda.push(Instr::Run(Task::Zip(old, new))),
            },
            Task::Zip(old, new) => match rules::zip(old, new) {
                Some(structure) => self.expand(old, new, structure),
                None => self.agenda.push(Instr::Run(Task::Replace(old, new))),
            },
            Task::Align(old, new) => {
                let correspondences = rws::align_terms(old, new, &self.config);
                self.agenda.push(Instr::Collect(correspondences.len()));
                for correspondence in correspondences.into_iter().rev() {
                    let task = match correspondence {
                        Correspondence::Old(a) => Task::Delete(a),
                        Correspondence::New(b) => Task::Insert(b),
                        Correspondence::Paired(a, b) => Task::Diff(a, b),
                    };
                    self.agenda.push(Instr::Run(task));
                }
            }
            Task::Delete(old) => self.push_diff(Diff::Patch(Patch::Delete(old))),
            Task::Insert(new) => self.push_diff(Diff::Patch(Patch::Insert(new))),
            Task::Replace(old, new) => self.push_diff(Diff::Patch(Patch::Replace(old, new))),
        }
    }

    /// Schedule the child work of a matched pair: the slot runs first, then
    /// the children, then the merge that folds them.
    fn expand(&mut self, old: &'a Term<T>, new: &'a Term<T>, structure: Structure<'a, T>) {
        let Structure { slot, children } = structure;
        let arity = match &children {
            Children::Aligned(..) => Arity::Aligned,
            Children::Positional(tasks) => Arity::Positional(tasks.len()),
        };
        self.agenda.push(Instr::Merge {
            old,
            new,
            slot: slot.is_some(),
            children: arity,
        });
        match children {
            Children::Aligned(a, b) => self.agenda.push(Instr::Run(Task::Align(a, b))),
            Children::Positional(tasks) => {
                self.agenda
                    .extend(tasks.into_iter().rev().map(Instr::Run));
            }
        }
        if let Some(slot) = slot {
            self.agenda.push(Instr::Run(slot));
        }
    }

    /// Run assembly instructions until a task (or nothing) is on top.
    fn settle(&mut self) {
        loop {
            match self.agenda.pop() {
                Some(Instr::Run(task)) => {
                    self.agenda.push(Instr::Run(task));
                    return;
                }
                Some(Instr::Collect(n)) => {
                    let at = self.values.len() - n;
                    let diffs: Vec<_> = self.values.drain(at..).map(Value::into_diff).collect();
                    self.values.push(Value::List(diffs));
                }
                Some(Instr::Merge {
                    old,
                    new,
                    slot,
                    children,
                }) => {
                    let children = match children {
                        Arity::Aligned => self.pop_value().into_list(),
                        Arity::Positional(n) => {
                            let at = self.values.len() - n;
                            self.values.drain(at..).map(Value::into_diff).collect()
                        }
                    };
                    let slot = slot.then(|| Box::new(self.pop_value().into_diff()));
                    let syntax = match new.syntax() {
                        Syntax::Leaf(label) => Syntax::Leaf(label.clone()),
                        Syntax::Sequence(_) => Syntax::Sequence(children),
                        Syntax::Container { .. } => Syntax::Container { slot, children },
                        Syntax::Branch(_) => Syntax::Branch(children),
                    };
                    self.push_diff(Diff::merge(old, new, syntax));
                }
                None => return,
            }
        }
    }
}

/// Iterator returned by [`Algorithm::steps`].
pub struct Steps<'a, T: TermTypes> {
    algorithm: Option<Algorithm<'a, T>>,
}

impl<'a, T: TermTypes> Iterator for Steps<'a, T> {
    type Item = Progress<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut algorithm = self.algorithm.take()?;
        match algorithm.next_task().copied() {
            Some(task) => {
                algorithm.advance();
                self.algorithm = Some(algorithm);
                Some(Progress::Task(task))
            }
            None => Some(Progress::Done(algorithm.into_diff())),
        }
    }
}

impl<T: TermTypes> FusedIterator for Steps<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::SimpleTypes;
    use facet_testhelpers::test;

    type TestTypes = SimpleTypes<&'static str, &'static str>;

    fn ident(name: &'static str) -> Term<TestTypes> {
        Term::leaf("identifier", name)
    }

    fn sample() -> (Term<TestTypes>, Term<TestTypes>) {
        let old = Term::sequence(
            "statements",
            [
                Term::branch("call", [ident("f"), ident("x")]),
                Term::container("function", Some(ident("main")), [ident("a")]),
            ],
        );
        let new = Term::sequence(
            "statements",
            [
                Term::branch("call", [ident("f"), ident("y")]),
                Term::container("function", Some(ident("main")), [ident("a"), ident("b")]),
            ],
        );
        (old, new)
    }

    #[test]
    fn test_single_steps_reach_the_same_result_as_run() {
        let (old, new) = sample();
        let config = DiffConfig::default();
        let expected = Algorithm::new(&old, &new, &config).run();

        let mut algorithm = Algorithm::new(&old, &new, &config);
        let mut steps = 0;
        let diff = loop {
            assert!(algorithm.next_task().is_some(), "pending implies a task on top");
            match algorithm.step() {
                Step::Pending(next) => algorithm = next,
                Step::Done(diff) => break diff,
            }
            steps += 1;
            assert!(steps < 1000, "diff must terminate");
        };

        assert_eq!(diff, expected);
    }

    #[test]
    fn test_step_trace_starts_with_root_and_ends_with_done() {
        let (old, new) = sample();
        let progress: Vec<_> = Algorithm::new(&old, &new, &DiffConfig::default())
            .steps()
            .collect();

        assert!(matches!(progress.first(), Some(Progress::Task(Task::Diff(a, b))) if core::ptr::eq(*a, &old) && core::ptr::eq(*b, &new)));
        assert!(matches!(progress.last(), Some(Progress::Done(_))));
        let done = progress
            .iter()
            .filter(|p| matches!(p, Progress::Done(_)))
            .count();
        assert_eq!(done, 1);
    }

    #[test]
    fn test_steps_are_restartable() {
        let (old, new) = sample();
        let start = Algorithm::new(&old, &new, &DiffConfig::default());

        let first: Vec<String> = start
            .clone()
            .steps()
            .filter_map(|p| match p {
                Progress::Task(task) => Some(task.to_string()),
                Progress::Done(_) => None,
            })
            .collect();
        let second: Vec<String> = start
            .steps()
            .filter_map(|p| match p {
                Progress::Task(task) => Some(task.to_string()),
                Progress::Done(_) => None,
            })
            .collect();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_for_bounds_work() {
        let (old, new) = sample();
        let algorithm = Algorithm::new(&old, &new, &DiffConfig::default());
        let total = algorithm.clone().steps().count() - 1;

        match algorithm.clone().run_for(2) {
            Step::Pending(rest) => {
                assert_eq!(rest.steps_taken(), 2);
                assert!(rest.pending() > 0);
                // Resuming finishes the job.
                let resumed = rest.run();
                assert_eq!(resumed, algorithm.clone().run());
            }
            Step::Done(_) => panic!("two steps are not enough for this diff"),
        }

        assert!(matches!(algorithm.run_for(total), Step::Done(_)));
    }

    #[test]
    fn test_category_mismatch_is_replaced_without_recursion() {
        let old = Term::<TestTypes>::container("function", Some(ident("f")), [ident("x")]);
        let new = Term::<TestTypes>::container("class", Some(ident("f")), [ident("x")]);

        let tasks: Vec<String> = Algorithm::new(&old, &new, &DiffConfig::default())
            .steps()
            .filter_map(|p| match p {
                Progress::Task(task) => Some(task.to_string()),
                Progress::Done(_) => None,
            })
            .collect();
        assert_eq!(
            tasks,
            vec!["diff(function, class)", "zip(function, class)", "replace(function, class)"]
        );
    }
}
