use std::env;
use std::time::Instant;

use itmv::{
    ItmvContext, ItmvError, MappingStrategy, MatrixKind, RunOptions, itmv_mult_seq,
    parallel_itmv_mult,
};

// usage: fixed_point [n] [t] [threads] [mapping] [block_size]
fn main() -> Result<(), ItmvError> {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    let arg =
        |i: usize, default: usize| args.get(i).and_then(|s| s.parse().ok()).unwrap_or(default);
    let n = arg(0, 512);
    let t = arg(1, 1024);
    let mut opts = RunOptions::default();
    opts.thread_count = arg(2, opts.thread_count);
    if let Some(m) = args.get(3) {
        opts.mapping = m.parse::<MappingStrategy>()?;
    }
    opts.block_size = arg(4, 8);

    for kind in [MatrixKind::Dense, MatrixKind::UpperTriangular] {
        let mut seq = ItmvContext::<f64>::fixed_point(n, kind, t)?;
        let start = Instant::now();
        let seq_stats = itmv_mult_seq(&mut seq)?;
        let seq_secs = start.elapsed().as_secs_f64();

        let mut ctx = ItmvContext::<f64>::fixed_point(n, kind, t)?;
        let start = Instant::now();
        let stats = parallel_itmv_mult(&mut ctx, &opts)?;
        let secs = start.elapsed().as_secs_f64();

        let flops = (ctx.a.flops_per_sweep() * stats.iterations as u64) as f64;
        let max_err = ctx.y.iter().fold(0.0f64, |m, &v| m.max((v - 1.0).abs()));
        let agree = ctx.y == seq.y;
        println!(
            "{kind:?} n={n} threads={} mapping={} bs={}: {} sweeps, converged={}, \
             max |y - 1| = {max_err:.2e}, matches sequential: {agree}",
            opts.thread_count, opts.mapping, opts.block_size, stats.iterations, stats.converged
        );
        println!(
            "  sequential {:.3} ms ({:.3} GFLOPS), threaded {:.3} ms ({:.3} GFLOPS)",
            seq_secs * 1e3,
            (ctx.a.flops_per_sweep() * seq_stats.iterations as u64) as f64 / seq_secs / 1e9,
            secs * 1e3,
            flops / secs / 1e9
        );

        #[cfg(feature = "rayon")]
        {
            let mut ctx = ItmvContext::<f64>::fixed_point(n, kind, t)?;
            let start = Instant::now();
            let stats = itmv::rayon_itmv_mult(&mut ctx, &opts)?;
            let secs = start.elapsed().as_secs_f64();
            println!(
                "  rayon {:.3} ms ({:.3} GFLOPS), {} sweeps",
                secs * 1e3,
                (ctx.a.flops_per_sweep() * stats.iterations as u64) as f64 / secs / 1e9,
                stats.iterations
            );
        }
    }
    Ok(())
}
