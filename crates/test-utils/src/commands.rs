use procpool::exec::{CommandOptions, ExternalCommand, ProcessPool};

/// Resolve `cmd` on `pool`, or return `None` after printing why, so the
/// calling test can bail out on machines without that program.
///
/// ```ignore
/// let Some(echo) = command_or_skip(&pool, "echo") else { return };
/// ```
pub fn command_or_skip(pool: &ProcessPool, cmd: &str) -> Option<ExternalCommand> {
    command_with_options_or_skip(pool, cmd, CommandOptions::default())
}

pub fn command_with_options_or_skip(
    pool: &ProcessPool,
    cmd: &str,
    options: CommandOptions,
) -> Option<ExternalCommand> {
    match pool.command(cmd, options) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("skipping: `{cmd}` is necessary to run this test: {e}");
            None
        }
    }
}
