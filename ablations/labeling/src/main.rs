//! 串行与并行 26-邻域连通域标记的消融实验.

mod profile;
mod result;
mod runner;

fn main() -> std::io::Result<()> {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init();
    let threads = utils::cpus();
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        log::warn!("rayon global pool already initialised: {e}");
    }
    runner::run().analyze()
}
