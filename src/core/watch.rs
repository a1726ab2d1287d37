// File: src/core/watch.rs
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::core::api::{ApiError, ClusterApi, CombinedStatus};
use crate::core::cluster::ShellNode;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long a command waits for its watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTime {
    Forever,
    Seconds(u64),
    /// Fire and forget; the watcher is dropped unpolled.
    NoWait,
}

impl WaitTime {
    /// Absent or zero waits forever, negative does not wait at all.
    pub fn from_arg(seconds: Option<i32>) -> Self {
        match seconds {
            None | Some(0) => WaitTime::Forever,
            Some(s) if s < 0 => WaitTime::NoWait,
            Some(s) => WaitTime::Seconds(s as u64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    TimedOut,
}

pub trait Watcher: Send {
    /// One synchronous check. Predicate failures count as "not yet".
    fn is_completed(&mut self) -> bool;

    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Poll until the target state holds or `timeout` elapses.
    fn wait_completion(&mut self, timeout: WaitTime) -> bool {
        poll_until(self, timeout)
    }
}

fn poll_until<W: Watcher + ?Sized>(watcher: &mut W, timeout: WaitTime) -> bool {
    let interval = watcher.poll_interval();
    let deadline = match timeout {
        WaitTime::NoWait => return watcher.is_completed(),
        WaitTime::Forever => None,
        WaitTime::Seconds(secs) => Some(Instant::now() + Duration::from_secs(secs)),
    };

    loop {
        if watcher.is_completed() {
            return true;
        }
        match deadline {
            None => thread::sleep(interval),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                thread::sleep(interval.min(deadline - now));
            }
        }
    }
}

/// Polls an arbitrary predicate.
pub struct PollWatcher<F> {
    label: String,
    predicate: F,
    interval: Duration,
    polls: u64,
}

impl<F> PollWatcher<F>
where
    F: FnMut() -> Result<bool, ApiError> + Send,
{
    pub fn new(label: impl Into<String>, interval: Duration, predicate: F) -> Self {
        Self {
            label: label.into(),
            predicate,
            interval,
            polls: 0,
        }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl<F> Watcher for PollWatcher<F>
where
    F: FnMut() -> Result<bool, ApiError> + Send,
{
    fn is_completed(&mut self) -> bool {
        self.polls += 1;
        match (self.predicate)() {
            Ok(done) => done,
            Err(e) => {
                log::debug!("{}: poll {} failed, retrying: {}", self.label, self.polls, e);
                false
            }
        }
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }
}

/// Waits until `node` reports one of `targets`.
pub fn status_watcher(
    api: Arc<dyn ClusterApi>,
    node: ShellNode,
    targets: Vec<CombinedStatus>,
    interval: Duration,
) -> Box<dyn Watcher> {
    let label = format!("status of {}", node.key());
    Box::new(PollWatcher::new(label, interval, move || {
        let snapshot = api.get_status(&node)?;
        Ok(targets.contains(&snapshot.status))
    }))
}

/// Already in the requested state.
pub struct NullWatcher;

impl Watcher for NullWatcher {
    fn is_completed(&mut self) -> bool {
        true
    }
}

/// All members must hold at the same check, within one shared deadline.
pub struct CompositeWatcher {
    members: Vec<Box<dyn Watcher>>,
}

impl CompositeWatcher {
    pub fn new(members: Vec<Box<dyn Watcher>>) -> Self {
        Self { members }
    }
}

impl Watcher for CompositeWatcher {
    fn is_completed(&mut self) -> bool {
        // Every member is polled each cycle, even after one is still pending.
        self.members
            .iter_mut()
            .fold(true, |done, member| member.is_completed() && done)
    }

    fn poll_interval(&self) -> Duration {
        self.members
            .iter()
            .map(|member| member.poll_interval())
            .min()
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    const FAST: Duration = Duration::from_millis(5);

    fn flips_after(polls: u64) -> PollWatcher<impl FnMut() -> Result<bool, ApiError> + Send> {
        let mut seen = 0;
        PollWatcher::new("test", FAST, move || {
            seen += 1;
            Ok(seen > polls)
        })
    }

    #[test]
    fn test_wait_arg_mapping() {
        assert_eq!(WaitTime::from_arg(None), WaitTime::Forever);
        assert_eq!(WaitTime::from_arg(Some(0)), WaitTime::Forever);
        assert_eq!(WaitTime::from_arg(Some(-1)), WaitTime::NoWait);
        assert_eq!(WaitTime::from_arg(Some(30)), WaitTime::Seconds(30));
    }

    #[test]
    fn test_forever_returns_only_once_satisfied() {
        let mut watcher = flips_after(5);
        assert!(watcher.wait_completion(WaitTime::Forever));
        assert_eq!(watcher.polls(), 6);
    }

    #[test]
    fn test_timeout_returns_false() {
        let mut watcher = PollWatcher::new("never", Duration::from_millis(100), || Ok(false));
        let started = Instant::now();
        assert!(!watcher.wait_completion(WaitTime::Seconds(1)));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[test]
    fn test_predicate_errors_are_retried() {
        let mut attempts = 0;
        let mut watcher = PollWatcher::new("flaky", FAST, move || {
            attempts += 1;
            if attempts < 3 {
                Err(ApiError::Unreachable("n1".to_string()))
            } else {
                Ok(true)
            }
        });
        assert!(watcher.wait_completion(WaitTime::Seconds(5)));
        assert_eq!(watcher.polls(), 3);
    }

    #[test]
    fn test_composite_requires_every_member() {
        let members: Vec<Box<dyn Watcher>> = vec![
            Box::new(flips_after(1)),
            Box::new(flips_after(4)),
            Box::new(NullWatcher),
        ];
        let mut composite = CompositeWatcher::new(members);
        assert!(composite.wait_completion(WaitTime::Seconds(5)));
    }

    #[test]
    fn test_composite_times_out_with_one_unsatisfied() {
        let members: Vec<Box<dyn Watcher>> = vec![
            Box::new(NullWatcher),
            Box::new(PollWatcher::new("stuck", FAST, || Ok(false))),
        ];
        let mut composite = CompositeWatcher::new(members);
        let started = Instant::now();
        assert!(!composite.wait_completion(WaitTime::Seconds(1)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_composite_polls_members_behind_a_pending_one() {
        let checks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&checks);
        let members: Vec<Box<dyn Watcher>> = vec![
            Box::new(PollWatcher::new("pending", FAST, || Ok(false))),
            Box::new(PollWatcher::new("counted", FAST, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })),
        ];
        let mut composite = CompositeWatcher::new(members);
        assert!(!composite.is_completed());
        assert!(!composite.is_completed());
        assert_eq!(checks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_composite_shares_one_deadline() {
        // Each member burns 100ms per check; ten members must not stretch a 1s budget to 10s.
        let checks = Arc::new(AtomicU64::new(0));
        let members: Vec<Box<dyn Watcher>> = (0..10)
            .map(|_| {
                let checks = Arc::clone(&checks);
                Box::new(PollWatcher::new("slow", FAST, move || {
                    checks.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(100));
                    Ok(true)
                })) as Box<dyn Watcher>
            })
            .chain(std::iter::once(
                Box::new(PollWatcher::new("never", FAST, || Ok(false))) as Box<dyn Watcher>
            ))
            .collect();

        let started = Instant::now();
        assert!(!CompositeWatcher::new(members).wait_completion(WaitTime::Seconds(1)));
        assert!(started.elapsed() < Duration::from_millis(2500));
        assert!(checks.load(Ordering::SeqCst) >= 10);
    }

    #[test]
    fn test_composite_result_independent_of_member_order() {
        let ready = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ready);
        let late = PollWatcher::new("late", FAST, move || Ok(flag.load(Ordering::SeqCst)));
        let mut watchers: Vec<Box<dyn Watcher>> = vec![Box::new(late), Box::new(flips_after(2))];
        watchers.reverse();

        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            ready.store(true, Ordering::SeqCst);
        });
        assert!(CompositeWatcher::new(watchers).wait_completion(WaitTime::Seconds(5)));
        setter.join().unwrap();
    }
}
