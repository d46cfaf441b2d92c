//! Lookup command implementation.

use crate::cli::LookupArgs;
use crate::error::with_hint;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use repoflat_core::ProvenanceStore;

pub fn execute(args: &LookupArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    // Opening creates the database, which a read-only query must not do.
    if !args.srcmap.is_file() {
        bail!(
            "Provenance database not found: {}\n\
             HINT: Pass the --srcmap file written by 'repoflat unpack'.",
            args.srcmap.display()
        );
    }

    let store = with_hint(ProvenanceStore::open(&args.srcmap))?;
    let records = with_hint(store.lookup(&args.flat_name))?;

    formatter.format_lookup(&args.flat_name, &records)?;

    Ok(())
}
