use log::{debug, trace};
use std::collections::HashMap;

use crate::data::{ClassSection, ResolvedSection, SubjectId};

/// Sections sharing a subject and offering period are allocated together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub subject_id: SubjectId,
    pub offered_month: String,
}

impl GroupKey {
    /// `None` when the section has no subject or the subject has no offering period.
    pub fn for_section(resolved: &ResolvedSection) -> Option<GroupKey> {
        let subject = resolved
            .subject
            .as_ref()
            .filter(|_| resolved.section.subject_id.is_some())?;
        if subject.offered_month.is_empty() {
            return None;
        }
        Some(GroupKey {
            subject_id: subject.id,
            offered_month: subject.offered_month.clone(),
        })
    }
}

/// A non-empty, ordered run of sections processed as one unit by the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup {
    pub key: Option<GroupKey>,
    pub sections: Vec<ClassSection>,
}

impl SectionGroup {
    pub fn total_students(&self) -> u64 {
        self.sections.iter().map(|s| s.students_count as u64).sum()
    }

    pub fn is_cooperative(&self) -> bool {
        self.key.is_some()
    }
}

/// Partitions candidates into cooperative groups and singletons, smallest demand first.
///
/// Keyed groups keep first-seen order, singletons follow in input order, and the
/// sort by total students is stable, so the queue is reproducible for a given input.
pub fn group_sections(candidates: &[ResolvedSection]) -> Vec<SectionGroup> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut keyed: Vec<SectionGroup> = Vec::new();
    let mut singles: Vec<SectionGroup> = Vec::new();

    for resolved in candidates {
        match GroupKey::for_section(resolved) {
            Some(key) => {
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    keyed.push(SectionGroup {
                        key: Some(key),
                        sections: Vec::new(),
                    });
                    keyed.len() - 1
                });
                keyed[slot].sections.push(resolved.section.clone());
            }
            None => singles.push(SectionGroup {
                key: None,
                sections: vec![resolved.section.clone()],
            }),
        }
    }

    debug!(
        "Grouped {} sections into {} cooperative groups and {} singletons",
        candidates.len(),
        keyed.len(),
        singles.len()
    );

    let mut queue = keyed;
    queue.extend(singles);
    queue.sort_by_key(SectionGroup::total_students);

    for group in &queue {
        trace!(
            "queue entry: {} section(s), {} students, key {:?}",
            group.sections.len(),
            group.total_students(),
            group.key
        );
    }
    queue
}
