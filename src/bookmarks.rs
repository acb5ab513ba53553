//! Room outline entries embedded into rendered reports with `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

/// One outline entry pointing at the first page of a room section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomBookmark {
    pub title: String,
    /// 1-based page number.
    pub page: usize,
}

impl RoomBookmark {
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
        }
    }
}

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed by `lopdf`.
    Parse(lopdf::Error),
    /// A required catalog entry was missing from the document trailer.
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    InvalidCatalog,
    /// A bookmark refers to a page the document does not have.
    MissingPage {
        /// Index of the bookmark whose page is missing.
        index: usize,
        /// The requested (1-indexed) page number.
        page: usize,
    },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Parse(err.into())
    }
}

impl std::fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse PDF bytes: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing"),
            Self::InvalidCatalog => write!(f, "PDF catalog entry is not a dictionary"),
            Self::MissingPage { index, page } => write!(
                f,
                "Bookmark {} refers to missing page {}",
                index, page
            ),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MissingCatalog | Self::InvalidCatalog | Self::MissingPage { .. } => None,
        }
    }
}

/// Adds a flat `/Outlines` tree with one `/Dest [page /Fit]` entry per room.
///
/// Returns the input unchanged when there is nothing to bookmark.
pub fn apply_room_bookmarks(
    pdf_bytes: &[u8],
    bookmarks: &[RoomBookmark],
) -> Result<Vec<u8>, BookmarkError> {
    if bookmarks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let targets = room_pages(&document.get_pages(), bookmarks)?;
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let outlines_id = document.new_object_id();
    let entry_ids: Vec<ObjectId> = targets.iter().map(|_| document.new_object_id()).collect();

    for (index, (bookmark, page_ref)) in bookmarks.iter().zip(&targets).enumerate() {
        let previous = index.checked_sub(1).map(|prev| entry_ids[prev]);
        let next = entry_ids.get(index + 1).copied();
        let entry = room_entry(&bookmark.title, *page_ref, outlines_id, previous, next);
        document.objects.insert(entry_ids[index], Object::Dictionary(entry));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name(b"Outlines".to_vec()));
    outlines.set("Count", Object::Integer(entry_ids.len() as i64));
    if let (Some(first), Some(last)) = (entry_ids.first(), entry_ids.last()) {
        outlines.set("First", Object::Reference(*first));
        outlines.set("Last", Object::Reference(*last));
    }
    document.objects.insert(outlines_id, Object::Dictionary(outlines));

    document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?
        .set("Outlines", Object::Reference(outlines_id));

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Page object of every bookmark, in bookmark order.
fn room_pages(
    pages: &BTreeMap<u32, ObjectId>,
    bookmarks: &[RoomBookmark],
) -> Result<Vec<ObjectId>, BookmarkError> {
    bookmarks
        .iter()
        .enumerate()
        .map(|(index, bookmark)| {
            u32::try_from(bookmark.page)
                .ok()
                .and_then(|page| pages.get(&page))
                .copied()
                .ok_or(BookmarkError::MissingPage {
                    index,
                    page: bookmark.page,
                })
        })
        .collect()
}

fn room_entry(
    title: &str,
    page_ref: ObjectId,
    parent: ObjectId,
    previous: Option<ObjectId>,
    next: Option<ObjectId>,
) -> Dictionary {
    let mut entry = Dictionary::new();
    entry.set("Title", Object::string_literal(title));
    entry.set(
        "Dest",
        Object::Array(vec![Object::Reference(page_ref), Object::Name(b"Fit".to_vec())]),
    );
    entry.set("Parent", Object::Reference(parent));
    if let Some(previous) = previous {
        entry.set("Prev", Object::Reference(previous));
    }
    if let Some(next) = next {
        entry.set("Next", Object::Reference(next));
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReportBuilder, RoomAssignment, ScheduleResult, Student};

    fn detailed_pdf() -> Vec<u8> {
        let schedule = ScheduleResult::new("Mid Term", "2024-11-15", "FN")
            .with_room(RoomAssignment::new("101", "MAIN", "Ground").with_student(Student::new("1", "Asha", "I BBA")))
            .with_room(RoomAssignment::new("102", "MAIN", "Ground").with_student(Student::new("2", "Ravi", "I BBA")));
        ReportBuilder::new()
            .without_logo()
            .build()
            .unwrap()
            .generate_detailed(&schedule)
            .unwrap()
            .bytes()
            .to_vec()
    }

    #[test]
    fn entries_are_chained_under_the_outline_root() {
        let bytes = apply_room_bookmarks(
            &detailed_pdf(),
            &[RoomBookmark::new("101", 1), RoomBookmark::new("102", 2)],
        )
        .unwrap();
        let document = Document::load_mem(&bytes).unwrap();
        let outlines_id = document
            .catalog()
            .unwrap()
            .get(b"Outlines")
            .and_then(Object::as_reference)
            .unwrap();
        let outlines = document.get_object(outlines_id).and_then(Object::as_dict).unwrap();
        let first = outlines.get(b"First").and_then(Object::as_reference).unwrap();
        let first_entry = document.get_object(first).and_then(Object::as_dict).unwrap();
        assert!(first_entry.get(b"Prev").is_err());
        let second = first_entry.get(b"Next").and_then(Object::as_reference).unwrap();
        assert_eq!(outlines.get(b"Last").and_then(Object::as_reference).unwrap(), second);
    }

    #[test]
    fn bookmark_past_the_last_page_is_rejected() {
        let err = apply_room_bookmarks(&detailed_pdf(), &[RoomBookmark::new("101", 9)]).unwrap_err();
        assert!(matches!(err, BookmarkError::MissingPage { index: 0, page: 9 }));
    }

    #[test]
    fn no_bookmarks_leaves_the_bytes_alone() {
        let bytes = b"%PDF-1.3 not parsed".to_vec();
        assert_eq!(apply_room_bookmarks(&bytes, &[]).unwrap(), bytes);
    }
}
