use terracap::config::RecorderConfig;

fn main() {
    let config = RecorderConfig::from_args(std::env::args().skip(1));

    if let Err(err) = terracap::run(config) {
        eprintln!("terracap failed: {}", err);
        std::process::exit(1);
    }
}
