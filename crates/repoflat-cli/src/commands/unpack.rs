//! Unpack command implementation.

use crate::cli::RuleArg;
use crate::cli::UnpackArgs;
use crate::error::with_hint;
use crate::output::OutputFormatter;
use anyhow::Result;
use repoflat_core::BatchConfig;
use repoflat_core::BatchRunner;
use repoflat_core::EntryFilter;
use repoflat_core::FilterRule;
use repoflat_core::UnpackConfig;

pub fn execute(args: &UnpackArgs, rules: &[RuleArg], formatter: &dyn OutputFormatter) -> Result<()> {
    let config = BatchConfig {
        dest_root: args.dest.clone(),
        unpack: UnpackConfig {
            filter: build_filter(rules)?,
            extract: !args.dry_run,
            max_file_size: args.max_file_size,
            max_files: args.max_files,
        },
        repo_index: args.repo_index.clone(),
        provenance_db: args.srcmap.clone(),
    };

    let mut runner = with_hint(BatchRunner::new(config))?;
    let report = runner.run(&args.archives);
    with_hint(runner.finish())?;

    formatter.format_batch_report(&report)?;

    Ok(())
}

fn build_filter(rules: &[RuleArg]) -> Result<EntryFilter> {
    let mut filter = EntryFilter::new();
    for rule in rules {
        let rule = match rule {
            RuleArg::Accept(pattern) => FilterRule::include(pattern),
            RuleArg::Reject(pattern) => FilterRule::exclude(pattern),
        };
        filter.push(with_hint(rule)?);
    }
    Ok(filter)
}
