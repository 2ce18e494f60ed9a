use spotview::config::ViewerConfig;

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::from_args(std::env::args())?;
    pollster::block_on(spotview::run(config))
}
