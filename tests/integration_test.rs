use parfn::prelude::*;
use std::time::Duration;

fn pool_with(threads: usize) -> WorkerPool {
    let config = Config::builder().num_threads(threads).build().unwrap();
    WorkerPool::new(config).unwrap()
}

#[test]
fn map_parallel_doubles_in_order() {
    let pool = pool_with(8);

    let result = map_parallel_with(&pool, 1..=100, |x: i32| (x * 2).to_string()).unwrap();
    let expected = map(1..=100, |x: i32| (x * 2).to_string());

    assert_eq!(result.len(), 100);
    assert_eq!(result.first().map(String::as_str), Some("2"));
    assert_eq!(result.last().map(String::as_str), Some("200"));
    assert_eq!(result, expected);
}

#[test]
fn filter_parallel_keeps_odds_in_order() {
    let pool = pool_with(8);

    let result = filter_parallel_with(&pool, 1..=100, |x: &i32| x % 2 != 0).unwrap();
    let expected: Vec<i32> = (1..=100).step_by(2).collect();

    assert_eq!(result, expected);
}

#[test]
fn reduce_parallel_sums_to_serial_result() {
    let pool = pool_with(8);

    let parallel = reduce_parallel_with(&pool, 1..=100, |a: i32, b| a + b).unwrap();
    let serial = reduce(1..=100, |a: i32, b| a + b);

    assert_eq!(parallel, Some(5050));
    assert_eq!(parallel, serial);
}

#[test]
fn ordering_is_independent_of_completion_order() {
    let pool = pool_with(8);

    // uneven task durations scramble completion order
    let result = map_parallel_with(&pool, 0..64, |x: u64| {
        std::thread::sleep(Duration::from_millis(x % 5));
        x * x
    })
    .unwrap();

    let expected = map(0..64, |x: u64| x * x);
    assert_eq!(result, expected);
}

#[test]
fn empty_inputs_yield_empty_results() {
    let pool = pool_with(2);

    assert_eq!(
        map_parallel_with(&pool, Vec::<i32>::new(), |x| x * 2).unwrap(),
        Vec::<i32>::new()
    );
    assert_eq!(
        filter_parallel_with(&pool, Vec::<i32>::new(), |_| true).unwrap(),
        Vec::<i32>::new()
    );
    assert_eq!(
        reduce_parallel_with(&pool, Vec::<i32>::new(), |a, b| a + b).unwrap(),
        None
    );
}

#[test]
fn single_element_runs_on_the_calling_thread() {
    let pool = pool_with(2);

    let caller = std::thread::current().id();
    let result = map_parallel_with(&pool, vec![5], move |x: i32| {
        assert_eq!(std::thread::current().id(), caller);
        x * 2
    })
    .unwrap();

    assert_eq!(result, vec![10]);
    assert_eq!(pool.metrics().tasks_submitted, 0);
}

#[test]
fn panicking_transform_fails_the_call_and_spares_the_pool() {
    let pool = pool_with(4);

    let result = map_parallel_with(&pool, 1..=32, |x: i32| {
        if x == 7 {
            panic!("bad element");
        }
        x
    });
    assert!(matches!(result, Err(Error::TaskPanicked(_))));

    let next = reduce_parallel_with(&pool, 1..=10, |a: i32, b| a + b).unwrap();
    assert_eq!(next, Some(55));
}

#[test]
fn reduce_parallel_preserves_chunk_order_for_concatenation() {
    let pool = pool_with(4);

    let words: Vec<String> = (1..=40).map(|i| format!("{i},")).collect();
    let expected = words.concat();

    let reduced = reduce_parallel_with(&pool, words, |a, b| a + &b).unwrap();
    assert_eq!(reduced, Some(expected));
}

#[test]
fn idle_workers_expire_and_later_calls_still_run() {
    let config = Config::builder()
        .num_threads(2)
        .idle_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let pool = WorkerPool::new(config).unwrap();

    let first = map_parallel_with(&pool, 1..=16, |x: i32| x + 1).unwrap();
    assert_eq!(first.len(), 16);

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while pool.live_workers() > 0 {
        assert!(
            std::time::Instant::now() < deadline,
            "idle workers never expired"
        );
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(pool.metrics().threads_expired >= 1);

    let second = map_parallel_with(&pool, 1..=16, |x: i32| x + 1).unwrap();
    assert_eq!(second, first);
    assert!(pool.metrics().threads_spawned >= 2);
}

#[test]
fn concurrent_calls_on_a_shared_pool_stay_isolated() {
    let pool = pool_with(8);

    std::thread::scope(|s| {
        for caller in 0..8usize {
            let pool = &pool;
            s.spawn(move || {
                for round in 0..25usize {
                    let base = (caller * 1000 + round) as i64;

                    let mapped =
                        map_parallel_with(pool, base..base + 50, |x: i64| x * 3).unwrap();
                    let expected = map(base..base + 50, |x: i64| x * 3);
                    assert_eq!(mapped, expected);

                    let kept =
                        filter_parallel_with(pool, base..base + 50, |x: &i64| x % 2 == 0)
                            .unwrap();
                    let expected = filter(base..base + 50, |x: &i64| x % 2 == 0);
                    assert_eq!(kept, expected);

                    let total = reduce_parallel_with(pool, base..base + 50, |a, b| a + b).unwrap();
                    let expected = reduce(base..base + 50, |a: i64, b| a + b);
                    assert_eq!(total, expected);
                }
            });
        }
    });
}

// The shared-pool paths are exercised in one test function: the pool
// is process-wide state, and independent test functions racing to
// create and drop it would observe each other.
#[test]
fn shared_pool_lifecycle() {
    shutdown();
    assert!(current_pool().is_none());

    // lazy provisioning on the first parallel call
    let doubled = map_parallel(1..=50, |x: i32| x * 2).unwrap();
    assert_eq!(doubled, map(1..=50, |x: i32| x * 2));

    let first = current_pool().expect("pool must exist after a parallel call");

    // a second call with a very different size reuses the same pool
    let summed = reduce_parallel(1..=5000, |a: i64, b| a + b).unwrap();
    assert_eq!(summed, Some(12_502_500));

    let second = current_pool().expect("pool must persist across calls");
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let odds = filter_parallel(1..=9, |x: &i32| x % 2 != 0).unwrap();
    assert_eq!(odds, vec![1, 3, 5, 7, 9]);

    shutdown();
    assert!(current_pool().is_none());

    // explicit configuration beats the lazy sizing
    let config = Config::builder().num_threads(3).build().unwrap();
    configure(config).unwrap();

    let pool = current_pool().expect("configure must install the pool");
    assert_eq!(pool.num_threads(), 3);

    let config = Config::builder().num_threads(5).build().unwrap();
    assert!(matches!(configure(config), Err(Error::AlreadyInitialized)));

    let tripled = map_parallel(1..=30, |x: i32| x * 3).unwrap();
    assert_eq!(tripled, map(1..=30, |x: i32| x * 3));

    shutdown();

    // concurrent first calls race to create the pool; exactly one wins
    // and every call still gets a correct result
    std::thread::scope(|s| {
        for caller in 0..8i64 {
            s.spawn(move || {
                let base = caller * 100;
                let mapped = map_parallel(base..base + 40, |x: i64| x + 1).unwrap();
                assert_eq!(mapped, map(base..base + 40, |x: i64| x + 1));
            });
        }
    });
    assert!(current_pool().is_some());

    shutdown();
}
