use std::fmt;

/// A facet request, rendered as `field` or `field:limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetField {
    pub name: String,
    pub limit: Option<u32>,
}

impl FacetField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limit: None,
        }
    }

    pub fn limited(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: name.into(),
            limit: Some(limit),
        }
    }
}

impl fmt::Display for FacetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            Some(limit) => write!(f, "{}:{limit}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// One search request minus the paging parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub q: String,
    /// Static sub-query sent as `filter` so the upstream can cache it.
    pub filter: Option<String>,
    pub fields: Vec<String>,
    pub facets: Vec<FacetField>,
}

impl Query {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn facet(mut self, facet: FacetField) -> Self {
        self.facets.push(facet);
        self
    }

    /// Query string parameters for a page of `rows` records starting at `start`.
    /// `facet` may repeat, so this is a list rather than a map.
    pub fn params(&self, start: u64, rows: u32, dev_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone())];
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        if !self.fields.is_empty() {
            params.push(("fl", self.fields.join(",")));
        }
        params.push(("rows", rows.to_string()));
        params.push(("start", start.to_string()));
        params.extend(self.facets.iter().map(|f| ("facet", f.to_string())));
        params.push(("dev_key", dev_key.to_string()));
        params
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.q)
    }
}
