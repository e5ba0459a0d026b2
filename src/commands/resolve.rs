use anyhow::Result;
use tracing::{info, warn};

use crate::cli::ResolveArgs;
use crate::encyclopedia::reference::ReferenceResolver;
use crate::store::CorpusStore;

pub async fn run(args: ResolveArgs) -> Result<()> {
    let corpus = CorpusStore::new(&args.corpus_dir);
    let resolver = ReferenceResolver::build(&corpus).await?;

    match resolver.resolve(&args.section) {
        Some(target) => info!(code = %args.section, target, "resolved section reference"),
        None => warn!(code = %args.section, "section code not present in reference map"),
    }

    Ok(())
}
