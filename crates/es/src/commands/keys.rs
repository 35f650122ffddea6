//! Keys command implementation.
//!
//! Lists the filter keys and operators the parser understands.

use super::{CommandContext, Result};
use crate::output::{format_keys_json, format_keys_table};

/// Executes the keys command.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    if ctx.json_output {
        println!("{}", format_keys_json()?);
    } else if !ctx.quiet {
        print!("{}", format_keys_table(ctx.use_colors));
    }
    Ok(())
}
