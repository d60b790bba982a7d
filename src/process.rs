use std::path::PathBuf;

use chrono::Local;
use futures::TryStreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::fetch::PaginatedFetcher;
use crate::format::{author_record_line, facet_stats_line, grant_record_line};
use crate::parse::{parse_authors, parse_grants, GrantId};
use crate::query::{FacetField, Query};
use crate::request::SearchClient;
use crate::{info_time, Error, Result, AUTHOR_FIELDS, DEFAULT_GRANT_FILTER};

/// What to do with every identifier of the input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Bibliography per author: one line per record.
    Authors,
    /// Records acknowledging a grant, looked up with a static filter query.
    Grants { filter: String },
    /// Refereed / non-refereed counts and the `top` publication venues per author.
    Facets { top: u32 },
}

impl Job {
    pub fn grants() -> Self {
        Job::Grants {
            filter: DEFAULT_GRANT_FILTER.to_string(),
        }
    }
}

/// Counters for one run over all input files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub identifiers: usize,
    pub failed: usize,
    pub lines_written: u64,
    pub unreadable_files: usize,
}

/// Runs `job` for every identifier of every file, writing TSV lines to `out`.
/// Failures are reported and skipped per identifier (or per file if it can't be read).
/// Only a failing `out` aborts the run.
pub async fn process_files<W>(client: &SearchClient, job: &Job, paths: &[PathBuf], out: &mut W) -> Result<RunSummary>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = RunSummary::default();

    for path in paths {
        let start_time = Local::now();
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                error!("couldn't read input file {}: {e}", path.display());
                summary.unreadable_files += 1;
                continue;
            }
        };

        match job {
            Job::Authors => {
                for author in parse_authors(&text) {
                    let res = process_author(client, &author, out).await;
                    record_outcome(&mut summary, "author", &author, res)?;
                }
            }
            Job::Grants { filter } => {
                for grant in parse_grants(path, &text) {
                    let res = process_grant(client, filter, &grant, out).await;
                    record_outcome(&mut summary, "grant", &grant.grant, res)?;
                }
            }
            Job::Facets { top } => {
                for author in parse_authors(&text) {
                    let res = process_author_facets(client, &author, *top, out).await;
                    record_outcome(&mut summary, "author", &author, res)?;
                }
            }
        }
        info_time!(start_time, "finished input file {}", path.display());
    }

    out.flush().await?;
    Ok(summary)
}

fn record_outcome(summary: &mut RunSummary, kind: &str, id: &str, res: Result<u64>) -> Result<()> {
    summary.identifiers += 1;
    match res {
        Ok(lines) => summary.lines_written += lines,
        // Output is gone, nothing more to do.
        Err(Error::Io(e)) => return Err(Error::Io(e)),
        Err(e) => {
            summary.failed += 1;
            error!("error retrieving results for {kind} {id}: {}", e.message());
        }
    }
    Ok(())
}

pub fn author_query(author: &str) -> Query {
    Query::new(format!("author:{author}"))
}

/// Drains all pages for `author`, one line per record.
pub async fn process_author<W>(client: &SearchClient, author: &str, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let query = author_query(author).fields(AUTHOR_FIELDS);
    info!("issuing query for author {author}");

    let records = PaginatedFetcher::new(client, &query).records();
    tokio::pin!(records);

    let mut written = 0;
    while let Some(record) = records.try_next().await? {
        out.write_all(author_record_line(&record).as_bytes()).await?;
        written += 1;
    }
    Ok(written)
}

/// Drains all pages for one grant id, one `bibcode org grant` line per record.
pub async fn process_grant<W>(client: &SearchClient, filter: &str, grant: &GrantId, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let query = Query::new(grant.grant.as_str()).filter(filter).fields(["bibcode"]);
    info!("issuing query for grant {}", grant.grant);

    let mut fetcher = PaginatedFetcher::new(client, &query);
    let mut written = 0;
    let mut first = true;
    while let Some(page) = fetcher.next_page().await? {
        if first {
            info!("found {} documents for grant {}", page.hits, grant.grant);
            first = false;
        }
        for record in &page.records {
            out.write_all(grant_record_line(record, &grant.org, &grant.grant).as_bytes())
                .await?;
            written += 1;
        }
    }
    Ok(written)
}

/// Facet statistics only, no documents: a single request with `rows=0`.
pub async fn process_author_facets<W>(client: &SearchClient, author: &str, top: u32, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let query = author_query(author)
        .facet(FacetField::new("property"))
        .facet(FacetField::limited("bibstem", top));
    info!("issuing facet query for author {author}");

    let page = client.search(&query, 0, 0).await?;

    let properties = page.facet("property");
    let count_of = |name: &str| {
        properties
            .iter()
            .find(|(value, _)| value.eq_ignore_ascii_case(name))
            .map_or(0, |(_, count)| *count)
    };
    let venues: Vec<_> = page.facet("bibstem").into_iter().take(top as usize).collect();

    let line = facet_stats_line(author, count_of("refereed"), count_of("notrefereed"), &venues);
    out.write_all(line.as_bytes()).await?;
    Ok(1)
}
