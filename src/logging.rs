use anyhow::Result;
use tracing_subscriber::fmt;

pub fn init(verbose: bool) -> Result<()> {
    if !verbose {
        return Ok(());
    }
    let _ = fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();
    Ok(())
}
