//! A caller-owned pool shared across calls.

use parfn::prelude::*;

fn main() -> Result<()> {
    let config = Config::builder()
        .num_threads(4)
        .thread_name_prefix("demo-worker")
        .build()?;
    let pool = WorkerPool::new(config)?;

    let doubled = map_parallel_with(&pool, 1..=16, |x: i32| x * 2)?;
    println!("doubled: {:?}", doubled);

    let longest = reduce_parallel_with(
        &pool,
        vec!["pooled".to_string(), "parallel".to_string(), "ops".to_string()],
        |a, b| if a.len() >= b.len() { a } else { b },
    )?;
    println!("longest: {:?}", longest);

    let snapshot = pool.metrics();
    println!(
        "tasks submitted: {}, executed: {}",
        snapshot.tasks_submitted, snapshot.tasks_executed
    );
    Ok(())
}
