// File: src/core/pool.rs
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Run `task` over `items` on at most `workers` threads.
///
/// Results come back in input order. Every item is attempted even if
/// earlier ones fail; callers count the failures themselves.
pub fn run_bounded<T, R, F>(items: Vec<T>, workers: usize, task: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, total);
    log::debug!("running {} task(s) on {} worker(s)", total, workers);

    let queue = Mutex::new(items.into_iter().enumerate());
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            let task = &task;
            scope.spawn(move || loop {
                let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                let Some((index, item)) = next else {
                    break;
                };
                if tx.send((index, task(item))).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    for (index, result) in rx {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_results_keep_input_order() {
        let out = run_bounded((0..20).collect(), 4, |n: u32| {
            thread::sleep(Duration::from_millis(u64::from(20 - n)));
            n * 10
        });
        assert_eq!(out, (0..20).map(|n| n * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrency_never_exceeds_bound() {
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        run_bounded((0..16).collect::<Vec<u32>>(), 3, |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            active.fetch_sub(1, Ordering::SeqCst);
        });
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_failures_do_not_stop_other_items() {
        let out: Vec<Result<u32, String>> = run_bounded(vec![1, 2, 3, 4], 2, |n| {
            if n % 2 == 0 {
                Err(format!("item {} failed", n))
            } else {
                Ok(n)
            }
        });
        assert_eq!(out.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(out[1], Err("item 2 failed".to_string()));
    }

    #[test]
    fn test_empty_input() {
        let out: Vec<u32> = run_bounded(Vec::<u32>::new(), 8, |n| n);
        assert!(out.is_empty());
    }
}
