use super::*;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn small_config() -> PoolConfig {
    PoolConfig {
        workers: 3,
        queue_capacity: 8,
        enqueue_timeout: Duration::from_millis(500),
        shutdown_timeout: Duration::from_secs(5),
    }
}

#[test]
fn add_task_before_start_is_rejected() -> Result<(), String> {
    run_async_test(async {
        let handled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&handled);
        let pool = WorkerPool::new(small_config(), move |_: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        match pool.add_task(1).await {
            Err(PoolError::NotStarted) => {}
            other => return Err(format!("Expected NotStarted, got {:?}", other)),
        }
        if handled.load(Ordering::SeqCst) != 0 {
            return Err("Rejected task reached the handler".to_owned());
        }
        Ok(())
    })
}

#[test]
fn stop_drains_every_accepted_task() -> Result<(), String> {
    run_async_test(async {
        let handled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&handled);
        let pool = WorkerPool::new(small_config(), move |_: u32| {
            std::thread::sleep(Duration::from_millis(1));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        pool.start();

        let total: u32 = 200;
        for task in 0..total {
            pool.add_task(task)
                .await
                .map_err(|err| format!("add_task {} failed: {}", task, err))?;
        }
        pool.stop()
            .await
            .map_err(|err| format!("stop failed: {}", err))?;

        let seen = handled.load(Ordering::SeqCst);
        if seen != 200 {
            return Err(format!("Expected 200 handled tasks, got {}", seen));
        }
        if pool.is_running() {
            return Err("Pool still running after stop".to_owned());
        }
        Ok(())
    })
}

#[test]
fn start_twice_is_a_no_op() -> Result<(), String> {
    run_async_test(async {
        let pool = WorkerPool::new(small_config(), |_: u32| {});
        pool.start();
        pool.start();
        let stats = pool.stats();
        if stats.workers != 3 {
            return Err(format!("Expected 3 workers, got {}", stats.workers));
        }
        if !pool.is_running() {
            return Err("Pool should be running".to_owned());
        }
        pool.stop()
            .await
            .map_err(|err| format!("stop failed: {}", err))?;
        Ok(())
    })
}

#[test]
fn add_task_after_stop_is_rejected_and_restart_works() -> Result<(), String> {
    run_async_test(async {
        let handled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&handled);
        let pool = WorkerPool::new(small_config(), move |_: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        pool.start();
        pool.add_task(1)
            .await
            .map_err(|err| format!("add_task failed: {}", err))?;
        pool.stop()
            .await
            .map_err(|err| format!("stop failed: {}", err))?;

        if pool.add_task(2).await.is_ok() {
            return Err("Expected add_task to fail after stop".to_owned());
        }

        pool.start();
        pool.add_task(3)
            .await
            .map_err(|err| format!("add_task after restart failed: {}", err))?;
        pool.stop()
            .await
            .map_err(|err| format!("second stop failed: {}", err))?;

        let seen = handled.load(Ordering::SeqCst);
        if seen != 2 {
            return Err(format!("Expected 2 handled tasks, got {}", seen));
        }
        Ok(())
    })
}

#[test]
fn full_queue_rejects_without_handing_task_over() -> Result<(), String> {
    run_async_test(async {
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let gate_rx = Arc::new(Mutex::new(gate_rx));
        let handled_ids = Arc::new(Mutex::new(Vec::new()));
        let handled = Arc::clone(&handled_ids);
        let config = PoolConfig {
            workers: 1,
            queue_capacity: 2,
            enqueue_timeout: Duration::from_millis(50),
            shutdown_timeout: Duration::from_secs(5),
        };
        let pool = WorkerPool::new(config, move |task: u32| {
            if let Ok(gate) = gate_rx.lock() {
                gate.recv().ok();
            }
            if let Ok(mut ids) = handled.lock() {
                ids.push(task);
            }
        });
        pool.start();

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for task in 0..10_u32 {
            match pool.add_task(task).await {
                Ok(()) => accepted.push(task),
                Err(PoolError::Saturated { .. }) => rejected.push(task),
                Err(err) => return Err(format!("Unexpected error: {}", err)),
            }
        }
        drop(gate_tx);
        pool.stop()
            .await
            .map_err(|err| format!("stop failed: {}", err))?;

        if rejected.is_empty() {
            return Err("Expected the saturated queue to reject tasks".to_owned());
        }
        if accepted.len() > 3 {
            return Err(format!(
                "Queue of 2 plus one busy worker accepted {} tasks",
                accepted.len()
            ));
        }
        let mut ids = handled_ids
            .lock()
            .map_err(|err| format!("lock failed: {}", err))?
            .clone();
        ids.sort_unstable();
        if ids != accepted {
            return Err(format!(
                "Handled {:?} but accepted {:?}",
                ids, accepted
            ));
        }
        Ok(())
    })
}

#[test]
fn stop_times_out_on_stuck_handler() -> Result<(), String> {
    run_async_test(async {
        let config = PoolConfig {
            workers: 1,
            queue_capacity: 4,
            enqueue_timeout: Duration::from_millis(50),
            shutdown_timeout: Duration::from_millis(100),
        };
        let pool = WorkerPool::new(config, |_: u32| {
            std::thread::sleep(Duration::from_millis(400));
        });
        pool.start();
        pool.add_task(1)
            .await
            .map_err(|err| format!("add_task failed: {}", err))?;
        pool.add_task(2)
            .await
            .map_err(|err| format!("add_task failed: {}", err))?;

        match pool.stop().await {
            Err(PoolError::ShutdownTimeout { pending, .. }) if pending >= 1 => {}
            other => return Err(format!("Expected ShutdownTimeout, got {:?}", other)),
        }
        if pool.is_running() {
            return Err("Pool should be idle after a forced stop".to_owned());
        }
        if pool.stats().in_flight != 0 {
            return Err("In-flight counter should reset after a forced stop".to_owned());
        }
        Ok(())
    })
}

#[test]
fn abandoned_task_does_not_touch_restarted_pool() -> Result<(), String> {
    run_async_test(async {
        let (old_tx, old_rx) = std::sync::mpsc::channel::<()>();
        let (new_tx, new_rx) = std::sync::mpsc::channel::<()>();
        let old_rx = Mutex::new(old_rx);
        let new_rx = Mutex::new(new_rx);
        let handled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&handled);
        let config = PoolConfig {
            workers: 1,
            queue_capacity: 4,
            enqueue_timeout: Duration::from_millis(50),
            shutdown_timeout: Duration::from_millis(100),
        };
        let pool = WorkerPool::new(config, move |task: u32| {
            let gate = if task == 1 { &old_rx } else { &new_rx };
            if let Ok(gate) = gate.lock() {
                gate.recv_timeout(Duration::from_secs(5)).ok();
            }
            counter.fetch_add(1, Ordering::SeqCst);
        });

        pool.start();
        pool.add_task(1)
            .await
            .map_err(|err| format!("add_task failed: {}", err))?;
        match pool.stop().await {
            Err(PoolError::ShutdownTimeout { .. }) => {}
            other => return Err(format!("Expected ShutdownTimeout, got {:?}", other)),
        }

        pool.start();
        pool.add_task(10)
            .await
            .map_err(|err| format!("add_task after restart failed: {}", err))?;

        old_tx
            .send(())
            .map_err(|err| format!("release old task failed: {}", err))?;
        tokio::time::sleep(Duration::from_millis(200)).await;
        if handled.load(Ordering::SeqCst) != 1 {
            return Err("Abandoned task should have finished by now".to_owned());
        }
        let in_flight = pool.stats().in_flight;
        if in_flight != 1 {
            return Err(format!(
                "Late completion leaked into the new run: in_flight {}",
                in_flight
            ));
        }

        new_tx
            .send(())
            .map_err(|err| format!("release new task failed: {}", err))?;
        pool.stop()
            .await
            .map_err(|err| format!("stop failed: {}", err))?;
        if handled.load(Ordering::SeqCst) != 2 {
            return Err(format!(
                "Expected 2 handled tasks, got {}",
                handled.load(Ordering::SeqCst)
            ));
        }
        Ok(())
    })
}
