//! crates/exam_allotment_core/src/repository.rs
//!
//! The collection of committed allotments and its read-only projections.
//!
//! Every mutation writes the whole collection through the [`AllotmentStore`]
//! port. The in-memory change happens first; a failed write is returned to the
//! caller but not rolled back.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{AllocationEntry, Allotment, AllotmentId, Exam};
use crate::ports::{AllotmentStore, PortError, PortResult};

/// Stored exam date format.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// The most recent allotments, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAllotments {
    pub items: Vec<Allotment>,
    /// True when older allotments were cut off.
    pub has_more: bool,
}

/// All allotments of one exam date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateGroup {
    pub date: String,
    /// Long form such as `Monday, March 3, 2025`; the raw date if it does not parse.
    pub label: String,
    pub allotments: Vec<Allotment>,
}

pub struct AllotmentRepository {
    allotments: Vec<Allotment>,
    store: Arc<dyn AllotmentStore>,
}

impl AllotmentRepository {
    /// Reads the stored collection. Records without an id are given one and
    /// the collection is written back.
    pub fn load(store: Arc<dyn AllotmentStore>) -> PortResult<Self> {
        let mut allotments = store.load()?;

        let mut repaired = 0usize;
        for allotment in allotments.iter_mut().filter(|a| a.id.is_blank()) {
            allotment.id = AllotmentId::generate();
            repaired += 1;
        }

        let repository = Self { allotments, store };
        if repaired > 0 {
            info!(repaired, "Assigned ids to stored allotments without one");
            repository.persist()?;
        }
        debug!(count = repository.allotments.len(), "Allotments loaded");
        Ok(repository)
    }

    pub fn all(&self) -> &[Allotment] {
        &self.allotments
    }

    pub fn len(&self) -> usize {
        self.allotments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allotments.is_empty()
    }

    pub fn get(&self, id: &AllotmentId) -> Option<&Allotment> {
        self.allotments.iter().find(|a| &a.id == id)
    }

    /// Like [`get`](Self::get), but a miss is a [`PortError::NotFound`].
    pub fn require(&self, id: &AllotmentId) -> PortResult<&Allotment> {
        self.get(id)
            .ok_or_else(|| PortError::NotFound(format!("Allotment {} not found", id)))
    }

    /// Records a seat plan for `exam` and returns the stored allotment.
    pub fn commit(&mut self, exam: &Exam, allocation: Vec<AllocationEntry>) -> PortResult<Allotment> {
        let allotment = Allotment::new(exam, allocation);
        info!(
            id = %allotment.id,
            subject = %allotment.subject,
            date = %allotment.date,
            time = %allotment.time,
            students = allotment.seated(),
            rooms = allotment.allocation.len(),
            "Allotment committed"
        );
        self.allotments.insert(0, allotment.clone());
        self.persist()?;
        Ok(allotment)
    }

    /// Students already seated for the exam across all of its allotments.
    pub fn count_allocated(&self, exam: &Exam) -> usize {
        let key = exam.group_key();
        self.allotments
            .iter()
            .filter(|a| a.group_key() == key)
            .map(|a| a.seated() as usize)
            .sum()
    }

    /// Removes an allotment. Returns `false` if no allotment has that id.
    pub fn delete(&mut self, id: &AllotmentId) -> PortResult<bool> {
        let Some(index) = self.allotments.iter().position(|a| &a.id == id) else {
            debug!(id = %id, "Delete requested for unknown allotment");
            return Ok(false);
        };
        let removed = self.allotments.remove(index);
        info!(id = %removed.id, subject = %removed.subject, "Allotment deleted");
        self.persist()?;
        Ok(true)
    }

    /// The `limit` most recent allotments by commit time. Allotments without a
    /// timestamp count as the oldest.
    pub fn list_recent(&self, limit: usize) -> RecentAllotments {
        let mut sorted: Vec<&Allotment> = self.allotments.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        RecentAllotments {
            items: sorted.into_iter().take(limit).cloned().collect(),
            has_more: self.allotments.len() > limit,
        }
    }

    /// Allotments grouped by date, newest date first, morning before evening.
    pub fn list_grouped(&self) -> Vec<DateGroup> {
        let mut sorted: Vec<&Allotment> = self.allotments.iter().collect();
        sorted.sort_by(|a, b| newest_date_first(&a.date, &b.date).then(a.time.cmp(&b.time)));

        let mut groups: Vec<DateGroup> = Vec::new();
        for allotment in sorted {
            match groups.last_mut() {
                Some(group) if group.date == allotment.date => group.allotments.push(allotment.clone()),
                _ => groups.push(DateGroup {
                    date: allotment.date.clone(),
                    label: date_label(&allotment.date),
                    allotments: vec![allotment.clone()],
                }),
            }
        }
        groups
    }

    fn persist(&self) -> PortResult<()> {
        self.store.save(&self.allotments)
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

fn newest_date_first(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}

fn date_label(date: &str) -> String {
    parse_date(date).map_or_else(
        || date.to_string(),
        |d| d.format("%A, %B %-d, %Y").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExamTime, Student};
    use crate::ports::InMemoryStore;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn exam(subject: &str, date: &str, time: ExamTime) -> Exam {
        Exam {
            subject: subject.into(),
            date: date.into(),
            time,
            semester: "5".into(),
            branch: "CSE".into(),
            slot: "A".into(),
        }
    }

    fn entry(room: &str, n: usize) -> AllocationEntry {
        AllocationEntry {
            room_no: room.into(),
            allocated_seats: n as u32,
            participants: (0..n)
                .map(|i| Student::new(i.to_string(), "S", "CSE", "5"))
                .collect(),
        }
    }

    fn empty_repository() -> (Arc<InMemoryStore>, AllotmentRepository) {
        let store = Arc::new(InMemoryStore::new());
        let repository = AllotmentRepository::load(store.clone()).unwrap();
        (store, repository)
    }

    #[test]
    fn commit_persists_newest_first() {
        let (store, mut repo) = empty_repository();
        let first = repo.commit(&exam("DBMS", "04-03-2025", ExamTime::Morning), vec![entry("R1", 3)]).unwrap();
        let second = repo.commit(&exam("OS", "05-03-2025", ExamTime::Morning), vec![entry("R2", 2)]).unwrap();

        let saved = store.snapshot().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].id, second.id);
        assert_eq!(saved[1].id, first.id);
        assert_eq!(repo.get(&first.id).map(|a| a.seated()), Some(3));
    }

    #[test]
    fn count_allocated_sums_matching_allotments() {
        let (_, mut repo) = empty_repository();
        let dbms = exam("DBMS", "04-03-2025", ExamTime::Morning);
        repo.commit(&dbms, vec![entry("R1", 3), entry("R2", 2)]).unwrap();
        repo.commit(&exam("dbms ", "04-03-2025", ExamTime::Evening), vec![entry("R3", 4)]).unwrap();
        repo.commit(&exam("OS", "04-03-2025", ExamTime::Morning), vec![entry("R4", 7)]).unwrap();

        assert_eq!(repo.count_allocated(&dbms), 9);
        assert_eq!(repo.count_allocated(&dbms), 9);
    }

    #[test]
    fn delete_of_unknown_id_is_a_no_op() {
        let (store, mut repo) = empty_repository();
        repo.commit(&exam("DBMS", "04-03-2025", ExamTime::Morning), vec![entry("R1", 1)]).unwrap();

        assert!(!repo.delete(&AllotmentId::from("missing")).unwrap());
        assert_eq!(repo.len(), 1);
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn require_reports_a_miss_as_not_found() {
        let (_, mut repo) = empty_repository();
        let committed = repo.commit(&exam("DBMS", "04-03-2025", ExamTime::Morning), vec![entry("R1", 1)]).unwrap();
        assert_eq!(repo.require(&committed.id).map(|a| a.id.clone()).unwrap(), committed.id);

        let err = repo.require(&AllotmentId::from("missing")).unwrap_err();
        assert!(matches!(err, PortError::NotFound(ref message) if message.contains("missing")));
    }

    #[test]
    fn load_assigns_missing_ids_and_writes_back() {
        let mut legacy = Allotment::new(&exam("DBMS", "04-03-2025", ExamTime::Morning), vec![entry("R1", 1)]);
        legacy.id = AllotmentId::default();
        let store = Arc::new(InMemoryStore::with_allotments(vec![legacy]));

        let repo = AllotmentRepository::load(store.clone()).unwrap();
        assert!(!repo.all()[0].id.is_blank());
        assert_eq!(store.snapshot().unwrap()[0].id, repo.all()[0].id);
    }

    #[test]
    fn recent_list_is_newest_first_and_flags_more() {
        let (_, mut repo) = empty_repository();
        let mut ids = Vec::new();
        for i in 0..4 {
            let a = repo.commit(&exam("DBMS", "04-03-2025", ExamTime::Morning), vec![entry(&format!("R{i}"), 1)]).unwrap();
            ids.push(a.id);
        }
        // Pin timestamps so ordering does not depend on clock resolution.
        let base = Utc::now();
        for (offset, allotment) in repo.allotments.iter_mut().rev().enumerate() {
            allotment.timestamp = Some(base + Duration::seconds(offset as i64));
        }
        repo.allotments[3].timestamp = None;

        let recent = repo.list_recent(2);
        assert!(recent.has_more);
        assert_eq!(recent.items.len(), 2);
        assert_eq!(recent.items[0].id, ids[3]);
        assert_eq!(recent.items[1].id, ids[2]);

        let all = repo.list_recent(5);
        assert!(!all.has_more);
        assert_eq!(all.items.last().map(|a| a.id.clone()), Some(ids[0].clone()));
    }

    #[test]
    fn grouped_view_orders_dates_descending_and_morning_first() {
        let (_, mut repo) = empty_repository();
        repo.commit(&exam("A", "28-02-2025", ExamTime::Morning), vec![entry("R1", 1)]).unwrap();
        repo.commit(&exam("B", "03-03-2025", ExamTime::Evening), vec![entry("R1", 1)]).unwrap();
        repo.commit(&exam("C", "03-03-2025", ExamTime::Morning), vec![entry("R2", 1)]).unwrap();
        repo.commit(&exam("D", "someday", ExamTime::Morning), vec![entry("R3", 1)]).unwrap();

        let groups = repo.list_grouped();
        let dates: Vec<_> = groups.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["03-03-2025", "28-02-2025", "someday"]);
        assert_eq!(groups[0].label, "Monday, March 3, 2025");
        assert_eq!(groups[0].allotments[0].subject, "C");
        assert_eq!(groups[0].allotments[1].subject, "B");
        assert_eq!(groups[2].label, "someday");
    }

    proptest! {
        #[test]
        fn deletion_order_does_not_matter(first in 0usize..5, second in 0usize..5) {
            prop_assume!(first != second);

            let store = Arc::new(InMemoryStore::new());
            let mut repo = AllotmentRepository::load(store).unwrap();
            let ids: Vec<AllotmentId> = (0..5)
                .map(|i| {
                    repo.commit(&exam("DBMS", "04-03-2025", ExamTime::Morning), vec![entry(&format!("R{i}"), i + 1)])
                        .unwrap()
                        .id
                })
                .collect();
            let snapshot = repo.allotments.clone();

            let mut forward = AllotmentRepository::load(Arc::new(InMemoryStore::with_allotments(snapshot.clone()))).unwrap();
            forward.delete(&ids[first]).unwrap();
            forward.delete(&ids[second]).unwrap();

            let mut backward = AllotmentRepository::load(Arc::new(InMemoryStore::with_allotments(snapshot))).unwrap();
            backward.delete(&ids[second]).unwrap();
            backward.delete(&ids[first]).unwrap();

            prop_assert_eq!(forward.all(), backward.all());
        }
    }
}
