//! Row ownership: every row is covered exactly once per round, for every mapping,
//! thread count and block size, including more threads than rows.

use std::ops::Range;
use std::sync::Mutex;
use std::thread;

use itmv::parallel::block_range;
use itmv::{MappingStrategy, RowAssignment, RowPartitioner, RunOptions};

/// Collect every row handed out in one round, one `Vec` per rank.
fn one_round(n: usize, opts: &RunOptions) -> Vec<Vec<Range<usize>>> {
    let partitioner = RowPartitioner::new(n, opts);
    if opts.mapping.is_claimed() {
        let queue = partitioner.work_queue();
        let owned = Mutex::new(vec![Vec::new(); opts.thread_count]);
        thread::scope(|s| {
            for rank in 0..opts.thread_count {
                let (queue, owned) = (&queue, &owned);
                s.spawn(move || {
                    assert_eq!(partitioner.assignment(rank), RowAssignment::Claimed);
                    let mut mine = Vec::new();
                    while let Some(r) = queue.claim() {
                        mine.push(r);
                    }
                    owned.lock().unwrap()[rank] = mine;
                });
            }
        });
        owned.into_inner().unwrap()
    } else {
        (0..opts.thread_count)
            .map(|rank| match partitioner.assignment(rank) {
                RowAssignment::Static(ranges) => ranges,
                RowAssignment::Claimed => panic!("static mapping handed out a claimed assignment"),
            })
            .collect()
    }
}

fn assert_exact_cover(n: usize, per_rank: &[Vec<Range<usize>>], what: &str) {
    let mut hits = vec![0u32; n];
    for ranges in per_rank {
        for r in ranges {
            assert!(!r.is_empty(), "{what}: empty range handed out");
            for i in r.clone() {
                hits[i] += 1;
            }
        }
    }
    for (i, &h) in hits.iter().enumerate() {
        assert_eq!(h, 1, "{what}: row {i} covered {h} times");
    }
}

#[test]
fn every_mapping_covers_every_row_once() {
    for n in [1, 2, 7, 16, 17, 64, 100, 257] {
        for threads in [1, 2, 3, 4, 8, 16] {
            for bs in [1, 2, 3, 16] {
                for mapping in MappingStrategy::ALL {
                    let opts = RunOptions::new(threads, mapping, bs);
                    let what = format!("n={n} threads={threads} bs={bs} {mapping}");
                    assert_exact_cover(n, &one_round(n, &opts), &what);
                }
            }
        }
    }
}

#[test]
fn more_threads_than_rows() {
    let n = 3;
    for mapping in MappingStrategy::ALL {
        let opts = RunOptions::new(8, mapping, 1);
        let per_rank = one_round(n, &opts);
        assert_exact_cover(n, &per_rank, &mapping.to_string());
        if !mapping.is_claimed() {
            // ranks 3..8 own nothing
            assert!(per_rank[3..].iter().all(Vec::is_empty), "{mapping}");
        }
    }
}

#[test]
fn block_sizes_are_ceil_n_over_threads() {
    // n = 10, 4 threads: chunk 3 -> 3, 3, 3, 1
    let lens: Vec<_> = (0..4).map(|rank| block_range(rank, 4, 10).len()).collect();
    assert_eq!(lens, vec![3, 3, 3, 1]);
    // n = 5, 4 threads: chunk 2 -> 2, 2, 1, 0
    let lens: Vec<_> = (0..4).map(|rank| block_range(rank, 4, 5).len()).collect();
    assert_eq!(lens, vec![2, 2, 1, 0]);
}

#[test]
fn block_cyclic_deals_blocks_round_robin() {
    let opts = RunOptions::new(2, MappingStrategy::BlockCyclic, 2);
    let p = RowPartitioner::new(9, &opts);
    assert_eq!(p.assignment(0), RowAssignment::Static(vec![0..2, 4..6, 8..9]));
    assert_eq!(p.assignment(1), RowAssignment::Static(vec![2..4, 6..8]));
    assert_eq!(p.assignment(0).static_len(), Some(5));
}

#[test]
fn queue_is_reusable_across_rounds() {
    for mapping in [MappingStrategy::Dynamic, MappingStrategy::Guided] {
        let queue = RowPartitioner::new(50, &RunOptions::new(4, mapping, 3)).work_queue();
        for _ in 0..3 {
            let mut covered = 0;
            while let Some(r) = queue.claim() {
                covered += r.len();
            }
            assert_eq!(covered, 50, "{mapping}");
            assert!(queue.claim().is_none());
            queue.reset();
        }
    }
}

#[test]
fn guided_claims_shrink_but_respect_the_minimum() {
    let queue =
        RowPartitioner::new(100, &RunOptions::new(4, MappingStrategy::Guided, 5)).work_queue();
    let sizes: Vec<usize> = std::iter::from_fn(|| queue.claim()).map(|r| r.len()).collect();
    assert_eq!(sizes[0], 25);
    assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    // only the last claim may fall below the minimum chunk
    assert!(sizes[..sizes.len() - 1].iter().all(|&s| s >= 5));
    assert_eq!(sizes.iter().sum::<usize>(), 100);
}
