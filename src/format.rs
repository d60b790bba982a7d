use crate::response::Record;

/// Makes a value safe to put in a TSV column.
pub fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// Joins columns into one TSV line, newline included.
pub fn tsv_line<I, S>(columns: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = columns
        .into_iter()
        .map(|c| clean(c.as_ref()))
        .collect::<Vec<_>>()
        .join("\t");
    line.push('\n');
    line
}

/// `bibcode \t title \t pub \t author;author;...`
pub fn author_record_line(record: &Record) -> String {
    tsv_line([
        record.text("bibcode"),
        record.text("title"),
        record.text("pub"),
        record.list("author").join(";"),
    ])
}

/// `bibcode \t org \t grant`
pub fn grant_record_line(record: &Record, org: &str, grant: &str) -> String {
    tsv_line([record.text("bibcode").as_str(), org, grant])
}

/// `author \t refereed \t notrefereed \t venue:count,venue:count`
pub fn facet_stats_line(author: &str, refereed: u64, not_refereed: u64, venues: &[(String, u64)]) -> String {
    let venues = venues
        .iter()
        .map(|(venue, count)| format!("{venue}:{count}"))
        .collect::<Vec<_>>()
        .join(",");
    tsv_line([
        author.to_string(),
        refereed.to_string(),
        not_refereed.to_string(),
        venues,
    ])
}
