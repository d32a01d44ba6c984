//! Serial and parallel higher-order ops on the shared pool.

use parfn::prelude::*;
use std::time::{Duration, Instant};

fn slow_double(x: u64) -> u64 {
    std::thread::sleep(Duration::from_millis(10));
    x * 2
}

fn main() -> Result<()> {
    let items: Vec<u64> = (1..=48).collect();

    let start = Instant::now();
    let serial_result = map(items.clone(), slow_double);
    println!("serial map:   {:?}", start.elapsed());

    let start = Instant::now();
    let parallel_result = map_parallel(items.clone(), slow_double)?;
    println!("parallel map: {:?}", start.elapsed());
    assert_eq!(serial_result, parallel_result);

    let odds = filter_parallel(items.clone(), |x: &u64| x % 2 == 1)?;
    println!("odd items:    {}", odds.len());

    let sum = reduce_parallel(items, |a, b| a + b)?;
    println!("sum:          {:?}", sum);

    shutdown();
    Ok(())
}
