//! Periodic jobs run between assistant turns
//!
//! Nothing runs on its own: the main loop calls [`Scheduler::run_pending`]
//! after each turn and every job whose period has elapsed runs synchronously
//! on the loop thread. Jobs receive the shared context (the speech output)
//! as `&mut` instead of capturing it.

use std::time::{Duration, Instant};

struct ScheduledJob<C: ?Sized> {
    name: String,
    period: Duration,
    /// `None` when the period runs past the end of the clock
    next_run: Option<Instant>,
    job: Box<dyn FnMut(&mut C)>,
}

/// Registry of periodic jobs over a context type `C`
pub struct Scheduler<C: ?Sized> {
    jobs: Vec<ScheduledJob<C>>,
}

impl<C: ?Sized> Scheduler<C> {
    #[must_use]
    pub const fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Start registering a job that runs every `period`
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use orion::scheduler::Scheduler;
    ///
    /// let mut scheduler: Scheduler<Vec<String>> = Scheduler::new();
    /// scheduler
    ///     .every(Duration::from_secs(3600))
    ///     .named("reminder")
    ///     .run(|log| log.push("Reminder: Time to take a break!".to_string()));
    /// assert_eq!(scheduler.len(), 1);
    /// ```
    #[must_use = "the job is only registered by `run`"]
    pub fn every(&mut self, period: Duration) -> JobBuilder<'_, C> {
        JobBuilder {
            scheduler: self,
            period,
            name: None,
            first_run: None,
        }
    }

    /// Run every job that is due now
    ///
    /// Returns the number of jobs that ran.
    pub fn run_pending(&mut self, context: &mut C) -> usize {
        self.run_pending_at(Instant::now(), context)
    }

    /// Run every job due at `now`; the next run is `now + period`
    pub fn run_pending_at(&mut self, now: Instant, context: &mut C) -> usize {
        let mut ran = 0;

        for scheduled in &mut self.jobs {
            if scheduled.next_run.is_none_or(|next| next > now) {
                continue;
            }

            tracing::debug!(job = %scheduled.name, "running scheduled job");
            (scheduled.job)(context);
            scheduled.next_run = now.checked_add(scheduled.period);
            ran += 1;
        }

        ran
    }

    /// Earliest upcoming run, if any job is registered
    #[must_use]
    pub fn next_run(&self) -> Option<Instant> {
        self.jobs.iter().filter_map(|j| j.next_run).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl<C: ?Sized> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending registration returned by [`Scheduler::every`]
pub struct JobBuilder<'a, C: ?Sized> {
    scheduler: &'a mut Scheduler<C>,
    period: Duration,
    name: Option<String>,
    first_run: Option<Instant>,
}

impl<C: ?Sized> JobBuilder<'_, C> {
    /// Name used in logs
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Count the first period from `start` instead of now
    #[must_use]
    pub const fn starting_from(mut self, start: Instant) -> Self {
        self.first_run = Some(start);
        self
    }

    /// Register `job`
    pub fn run(self, job: impl FnMut(&mut C) + 'static) {
        let start = self.first_run.unwrap_or_else(Instant::now);
        let name = self
            .name
            .unwrap_or_else(|| format!("job-{}", self.scheduler.jobs.len() + 1));

        let next_run = start.checked_add(self.period);
        if next_run.is_none() {
            tracing::warn!(job = %name, period_secs = self.period.as_secs(), "period too long, job will never run");
        } else {
            tracing::info!(job = %name, period_secs = self.period.as_secs(), "scheduled job");
        }

        self.scheduler.jobs.push(ScheduledJob {
            name,
            period: self.period,
            next_run,
            job: Box::new(job),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_not_due_before_period() {
        let start = Instant::now();
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.every(HOUR).starting_from(start).run(|n| *n += 1);

        let mut count = 0;
        assert_eq!(scheduler.run_pending_at(start, &mut count), 0);
        assert_eq!(scheduler.run_pending_at(start + HOUR - Duration::from_secs(1), &mut count), 0);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_runs_once_per_period() {
        let start = Instant::now();
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.every(HOUR).starting_from(start).run(|n| *n += 1);

        let mut count = 0;
        assert_eq!(scheduler.run_pending_at(start + HOUR, &mut count), 1);
        // Same instant again: already rescheduled
        assert_eq!(scheduler.run_pending_at(start + HOUR, &mut count), 0);
        assert_eq!(scheduler.run_pending_at(start + HOUR * 2, &mut count), 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_late_check_does_not_burst() {
        let start = Instant::now();
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.every(HOUR).starting_from(start).run(|n| *n += 1);

        let mut count = 0;
        let late = start + HOUR * 5;
        assert_eq!(scheduler.run_pending_at(late, &mut count), 1);
        assert_eq!(scheduler.next_run(), Some(late + HOUR));
        assert_eq!(count, 1);
    }

    #[test]
    fn test_jobs_have_independent_periods() {
        let start = Instant::now();
        let mut scheduler: Scheduler<Vec<&'static str>> = Scheduler::default();
        scheduler
            .every(Duration::from_secs(10))
            .starting_from(start)
            .run(|log| log.push("fast"));
        scheduler
            .every(Duration::from_secs(30))
            .named("slow")
            .starting_from(start)
            .run(|log| log.push("slow"));

        let mut log = Vec::new();
        for secs in [10, 20, 30] {
            scheduler.run_pending_at(start + Duration::from_secs(secs), &mut log);
        }

        assert_eq!(log, ["fast", "fast", "fast", "slow"]);
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_endless_period_is_never_due() {
        let start = Instant::now();
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler
            .every(Duration::from_secs(u64::MAX))
            .starting_from(start)
            .run(|n| *n += 1);

        let mut count = 0;
        assert_eq!(scheduler.run_pending_at(start + HOUR * 24, &mut count), 0);
        assert_eq!(scheduler.next_run(), None);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unsized_context() {
        let start = Instant::now();
        let mut scheduler: Scheduler<dyn std::fmt::Write> = Scheduler::new();
        scheduler
            .every(HOUR)
            .starting_from(start)
            .run(|out| {
                let _ = std::fmt::Write::write_str(out, "tick");
            });

        let mut out = String::new();
        scheduler.run_pending_at(start + HOUR, &mut out);
        assert_eq!(out, "tick");
    }
}
