use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use xi_rope::Rope;

use super::{
    annotation::{Annotation, AnnotationRef, Name, TargetText, TextTarget},
    index::IntervalIndex,
    range::Range,
    slice::{slice_to_string, utf16_len},
    source::{TranscriptSource, value_to_string},
};
use crate::error::SourceError;

/// Restricts the annotations returned by [`Text::find`].
#[derive(Clone, Copy)]
pub enum AnnotationFilter<'a> {
    Any,
    /// Local name equals.
    Name(&'a str),
    /// Local name is one of.
    Names(&'a BTreeSet<String>),
    Predicate(&'a dyn Fn(&Annotation) -> bool),
}

impl AnnotationFilter<'_> {
    pub fn accepts(&self, annotation: &Annotation) -> bool {
        match self {
            AnnotationFilter::Any => true,
            AnnotationFilter::Name(name) => annotation.local_name() == *name,
            AnnotationFilter::Names(names) => names.contains(annotation.local_name()),
            AnnotationFilter::Predicate(p) => p(annotation),
        }
    }
}

/// A text with its standoff annotations, indexed for overlap queries.
///
/// Offsets are UTF-16 code units of the content. Built once from a
/// transcript document and read-only afterwards.
#[derive(Debug)]
pub struct Text {
    id: String,
    kind: Option<String>,
    content: Rope,
    content_length: usize,
    range: Range,
    annotations: Vec<Annotation>,
    index: IntervalIndex<AnnotationRef>,
    by_local_name: HashMap<String, Vec<AnnotationRef>>,
}

impl Text {
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Self::from_source(TranscriptSource::from_json(json)?)
    }

    pub fn from_source(source: TranscriptSource) -> Result<Self, SourceError> {
        let id = value_to_string(&source.text.id);
        let content = Rope::from(source.text_content.as_str());
        let content_length = utf16_len(&content);
        if let Some(declared) = source.text.length {
            if declared != content_length {
                debug!("text {id} declares length {declared}, content has {content_length}");
            }
        }
        let range = source
            .text_range
            .unwrap_or_else(|| Range::new(0, content_length));

        let names: HashMap<&str, Name> = source
            .names
            .iter()
            .map(|(key, (ns, local))| (key.as_str(), Name::new(ns.clone(), local.as_str())))
            .collect();

        let mut annotations = Vec::with_capacity(source.annotations.len());
        let mut index = IntervalIndex::new();
        let mut by_local_name: HashMap<String, Vec<AnnotationRef>> = HashMap::new();

        for raw in &source.annotations {
            let annotation_id = value_to_string(&raw.id);
            let name = names
                .get(raw.n.as_str())
                .cloned()
                .ok_or_else(|| SourceError::UnknownName {
                    annotation: annotation_id.clone(),
                    key: raw.n.clone(),
                })?;
            if raw.t.is_empty() {
                return Err(SourceError::NoTarget {
                    annotation: annotation_id,
                });
            }

            let mut targets = Vec::with_capacity(raw.t.len());
            for (start, end, text_id) in &raw.t {
                if start > end {
                    return Err(SourceError::InvertedRange {
                        annotation: annotation_id,
                        start: *start,
                        end: *end,
                    });
                }
                let target_text = value_to_string(text_id);
                targets.push(TextTarget {
                    text: if target_text == id {
                        TargetText::Own
                    } else {
                        TargetText::Foreign(target_text)
                    },
                    range: Range::new(*start, *end),
                });
            }

            let annotation = Annotation {
                id: annotation_id,
                name,
                data: raw
                    .d
                    .iter()
                    .map(|(k, v)| (k.clone(), value_to_string(v)))
                    .collect(),
                targets,
            };

            let slot = annotations.len();
            match annotation.local_range() {
                Some(r) => {
                    index.insert(r, slot);
                }
                None => warn!(
                    "annotation {} ({}) has no target in text {id}, not indexed",
                    annotation.id, annotation.name
                ),
            }
            by_local_name
                .entry(annotation.local_name().to_string())
                .or_default()
                .push(slot);
            annotations.push(annotation);
        }
        index.rebuild_max_end();

        debug!(
            "loaded text {id}: {content_length} units, {} annotations in {} ranges",
            annotations.len(),
            index.bucket_count()
        );

        Ok(Self {
            id,
            kind: source.text.kind,
            content,
            content_length,
            range,
            annotations,
            index,
            by_local_name,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn content(&self) -> &Rope {
        &self.content
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, r: AnnotationRef) -> &Annotation {
        &self.annotations[r]
    }

    pub fn index(&self) -> &IntervalIndex<AnnotationRef> {
        &self.index
    }

    /// Annotations with the given local name, in load order.
    pub fn by_local_name(&self, local: &str) -> &[AnnotationRef] {
        self.by_local_name.get(local).map_or(&[], Vec::as_slice)
    }

    /// Content of a range as a String.
    pub fn slice(&self, range: Range) -> String {
        slice_to_string(&self.content, range)
    }

    /// Annotations overlapping `[start, end)`, in range order. An empty
    /// annotation lying inside the query also matches. Missing bounds default
    /// to the whole content.
    pub fn find(
        &self,
        start: Option<usize>,
        end: Option<usize>,
        filter: AnnotationFilter<'_>,
    ) -> Vec<AnnotationRef> {
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(self.content_length).max(start);
        self.index
            .find(Range::new(start, end), |r| filter.accepts(&self.annotations[*r]))
            .into_iter()
            .copied()
            .collect()
    }

    /// Splits `[start, end)` at every boundary of the given annotations (all
    /// of them by default) that falls strictly inside. The returned ranges are
    /// contiguous and cover `[start, end)`; an empty span yields no ranges.
    pub fn partition(
        &self,
        annotations: Option<&[AnnotationRef]>,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Vec<Range> {
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(self.content_length).max(start);

        let mut offsets = vec![start, end];
        let mut cut = |a: &Annotation| {
            for r in a.local_ranges() {
                for offset in [r.start, r.end] {
                    if offset > start && offset < end {
                        offsets.push(offset);
                    }
                }
            }
        };
        match annotations {
            Some(refs) => refs.iter().for_each(|r| cut(&self.annotations[*r])),
            None => self.annotations.iter().for_each(&mut cut),
        }

        offsets.sort_unstable();
        offsets.dedup();
        offsets.windows(2).map(|w| Range::new(w[0], w[1])).collect()
    }
}
