use flexi_logger::{DeferredNow, Logger, Record};

use crate::Error;

/// Compact `LEVEL message` format for terminal output.
fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(w, "{:<5} {}", record.level(), record.args())
}

pub fn init() -> Result<(), Error> {
    Logger::try_with_env_or_str("info")?
        .format(cli_format)
        .log_to_stdout()
        .start()?;

    Ok(())
}
