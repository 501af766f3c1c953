use std::collections::BTreeMap;
use std::sync::Arc;

use crossbeam_channel::unbounded;
use pin_selector::CpuId;
use pin_selector::CpuPin;
use pin_selector::CyclicPinSelector;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::errors::AppError;
use crate::errors::Result;

/// One pin drawn by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub worker: usize,
    pub round: usize,

    /// Selector ticket, `None` when the selector had nothing to hand out
    pub ticket: Option<usize>,
    pub cpu_id: Option<CpuId>,

    /// Whether `apply` reported a successful binding
    pub applied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationSummary {
    pub per_cpu: BTreeMap<CpuId, usize>,
    pub unpinned: usize,
    pub applied: usize,
}

/// Spawn `workers` threads that each draw `rounds` pins from a shared selector
///
/// `apply` runs on the worker thread with the drawn pin, so it can bind that
/// thread. Assignments are returned ordered by ticket (unpinned draws last,
/// by worker and round).
pub fn run_rotation<H, A>(selector: Arc<CyclicPinSelector<H>>, workers: usize, rounds: usize, apply: A) -> Result<Vec<Assignment>>
where
    H: Send + Sync + 'static,
    A: Fn(CpuPin<&H>) -> bool + Send + Sync + 'static,
{
    if !selector.has_next() {
        warn!("No CPUs configured, {} workers will run unpinned", workers);
    }

    let apply = Arc::new(apply);
    let (tx, rx) = unbounded();
    let mut handles = Vec::with_capacity(workers);

    for worker in 0..workers {
        let selector = Arc::clone(&selector);
        let apply = Arc::clone(&apply);
        let tx = tx.clone();

        let handle = std::thread::Builder::new().name(format!("pin-worker-{worker}")).spawn(move || {
            for round in 0..rounds {
                let assignment = match selector.next_ticket() {
                    Some(ticket) => {
                        let applied = apply(CpuPin::Cpu(ticket.handle));
                        debug!("Worker {} round {} drew ticket {} -> CPU {}", worker, round, ticket.ticket, ticket.cpu_id);
                        Assignment { worker, round, ticket: Some(ticket.ticket), cpu_id: Some(ticket.cpu_id), applied }
                    }
                    None => {
                        let applied = apply(CpuPin::Noop);
                        Assignment { worker, round, ticket: None, cpu_id: None, applied }
                    }
                };

                if tx.send(assignment).is_err() {
                    break;
                }
            }
        })?;

        handles.push(handle);
    }

    // Only worker clones remain, so the receiver drains once they finish
    drop(tx);

    for (worker, handle) in handles.into_iter().enumerate() {
        handle.join().map_err(|_| AppError::WorkerPanicked(worker))?;
    }

    let mut assignments: Vec<Assignment> = rx.iter().collect();
    assignments.sort_unstable_by_key(|a| (a.ticket.is_none(), a.ticket, a.worker, a.round));

    info!("Rotation finished: {} workers drew {} pins", workers, assignments.len());

    Ok(assignments)
}

/// Count draws per CPU
pub fn summarize(assignments: &[Assignment]) -> RotationSummary {
    let mut summary = RotationSummary::default();

    for assignment in assignments {
        match assignment.cpu_id {
            Some(cpu_id) => *summary.per_cpu.entry(cpu_id).or_default() += 1,
            None => summary.unpinned += 1,
        }
        if assignment.applied {
            summary.applied += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    fn selector(ids: &[CpuId]) -> Arc<CyclicPinSelector<CpuId>> {
        Arc::new(CyclicPinSelector::new(ids, &|id: CpuId| Ok::<_, Infallible>(id)).unwrap())
    }

    #[test]
    fn test_rotation_covers_every_ticket() {
        let assignments = run_rotation(selector(&[0, 1, 2]), 4, 6, |_| false).unwrap();

        assert_eq!(assignments.len(), 24);
        for (expected, assignment) in assignments.iter().enumerate() {
            assert_eq!(assignment.ticket, Some(expected));
            assert_eq!(assignment.cpu_id, Some((expected % 3) as CpuId));
            assert!(!assignment.applied);
        }
    }

    #[test]
    fn test_rotation_even_split() {
        let assignments = run_rotation(selector(&[3, 7]), 5, 4, |_| false).unwrap();
        let summary = summarize(&assignments);

        assert_eq!(summary.per_cpu.get(&3), Some(&10));
        assert_eq!(summary.per_cpu.get(&7), Some(&10));
        assert_eq!(summary.unpinned, 0);
        assert_eq!(summary.applied, 0);
    }

    #[test]
    fn test_rotation_applies_on_worker() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let assignments = run_rotation(selector(&[1]), 3, 2, move |pin| {
            counter.fetch_add(1, Ordering::Relaxed);
            pin == CpuPin::Cpu(&1)
        })
        .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 6);
        assert_eq!(summarize(&assignments).applied, 6);
    }

    #[test]
    fn test_rotation_without_cpus() {
        let empty: Arc<CyclicPinSelector<CpuId>> = Arc::new(CyclicPinSelector::empty());
        let assignments = run_rotation(empty, 2, 3, |pin| pin.is_pinned()).unwrap();

        assert_eq!(assignments.len(), 6);
        assert!(assignments.iter().all(|a| a.ticket.is_none() && a.cpu_id.is_none() && !a.applied));

        let summary = summarize(&assignments);
        assert!(summary.per_cpu.is_empty());
        assert_eq!(summary.unpinned, 6);
    }

    #[test]
    fn test_zero_workers() {
        let assignments = run_rotation(selector(&[0]), 0, 10, |_| false).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_worker_panic_reported() {
        let result = run_rotation(selector(&[0, 1]), 2, 1, |pin| {
            if pin == CpuPin::Cpu(&1) {
                panic!("bind failed");
            }
            false
        });

        assert!(matches!(result, Err(AppError::WorkerPanicked(_))));
    }
}
