use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ComposeArgs;
use crate::commands::default_db_path;
use crate::encyclopedia::compose::compose_article;
use crate::encyclopedia::crosslink::CrossLinker;
use crate::encyclopedia::reference::ReferenceResolver;
use crate::store::{CorpusStore, SqliteStore};
use crate::util::write_json_pretty;

pub async fn run(args: ComposeArgs) -> Result<()> {
    let corpus = CorpusStore::new(&args.corpus_dir);
    let db_path = args
        .db_path
        .unwrap_or_else(|| default_db_path(&args.cache_root));
    let store = SqliteStore::new(&db_path);

    let linker = CrossLinker::new()?;
    let resolver = ReferenceResolver::build(&corpus).await?;

    let article = compose_article(&corpus, &store, &resolver, &linker, args.chapter).await?;

    info!(
        chapter = article.chapter_number,
        sections = article.sections.len(),
        annotated_sections = article.supplementary.len(),
        "article composed"
    );

    match args.out {
        Some(path) => {
            write_json_pretty(&path, &article)?;
            info!(path = %path.display(), "wrote composed article");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &article)
                .context("failed to serialize composed article")?;
            handle
                .write_all(b"\n")
                .context("failed to finalize composed article output")?;
        }
    }

    Ok(())
}
