//! Selected file list shared by the compress and merge flows
//!
//! The vector order is the display order. Every reorder (sort, drag-and-drop
//! swap, move) mutates the vector directly; nothing else tracks positions.

use crate::error::DeskError;
use crate::format::format_file_size;
use crate::notice::{Notice, Notices};
use crate::sort::{compare_names, MergeSort, SortOrder};
use crate::validation::{page_count, quick_validate};
use serde::Serialize;
use std::collections::BTreeMap;

/// One file picked by the user
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    /// Session-unique, increasing in insertion order
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
    /// Read locally when the document parses; `None` otherwise
    pub page_count: Option<u32>,
    /// Clockwise degrees: 0, 90, 180 or 270
    pub rotation: u16,
}

/// Per-file entry of the merge `metadata` form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationMeta {
    pub rotation: u16,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct FileList {
    files: Vec<SelectedFile>,
    next_id: u64,
    sort_order: SortOrder,
    notices: Notices,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file after checking it is a PDF
    pub fn add_file(&mut self, name: &str, bytes: Vec<u8>) -> Result<u64, DeskError> {
        quick_validate(name, &bytes)?;

        let id = self.next_id;
        self.next_id += 1;

        self.files.push(SelectedFile {
            id,
            name: name.to_string(),
            size: bytes.len() as u64,
            page_count: page_count(&bytes).ok(),
            bytes,
            rotation: 0,
        });

        Ok(id)
    }

    /// Add a batch; non-PDF files are skipped with a warning notice.
    /// Returns how many were accepted.
    pub fn add_files<I, S>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let mut accepted = 0;
        for (name, bytes) in files {
            match self.add_file(name.as_ref(), bytes) {
                Ok(_) => accepted += 1,
                Err(e) => self.notices.push(Notice::warning(e.to_string())),
            }
        }

        if accepted > 0 {
            self.notices.push(Notice::info(format!(
                "{} PDF file(s) added",
                accepted
            )));
        }
        accepted
    }

    pub fn remove(&mut self, id: u64) -> Result<SelectedFile, DeskError> {
        let index = self.index_of(id).ok_or(DeskError::OutOfBounds {
            index: id as usize,
            len: self.files.len(),
        })?;
        Ok(self.files.remove(index))
    }

    /// Drop every file and return to the initial sort state
    pub fn clear(&mut self) {
        self.files.clear();
        self.sort_order = SortOrder::default();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The processing interface is shown only while files are selected
    pub fn is_interface_visible(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn get(&self, id: u64) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Sum of known page counts
    pub fn total_pages(&self) -> u32 {
        self.files.iter().filter_map(|f| f.page_count).sum()
    }

    /// "3 files - 1.5 MB - 12 pages"
    pub fn summary(&self) -> String {
        format!(
            "{} files - {} - {} pages",
            self.files.len(),
            format_file_size(self.total_size()),
            self.total_pages()
        )
    }

    /// Drag-and-drop: swap the dragged entry with the drop target.
    /// Returns false when nothing moved.
    pub fn swap(&mut self, dragged_id: u64, target_id: u64) -> bool {
        if dragged_id == target_id {
            return false;
        }
        match (self.index_of(dragged_id), self.index_of(target_id)) {
            (Some(a), Some(b)) => {
                self.files.swap(a, b);
                true
            }
            _ => false,
        }
    }

    /// Splice the entry at `from` into position `to`
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<(), DeskError> {
        let len = self.files.len();
        if from >= len {
            return Err(DeskError::OutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(DeskError::OutOfBounds { index: to, len });
        }
        let file = self.files.remove(from);
        self.files.insert(to, file);
        Ok(())
    }

    /// Rotate a file a quarter turn clockwise, returning the new angle
    pub fn rotate(&mut self, id: u64) -> Result<u16, DeskError> {
        let len = self.files.len();
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(DeskError::OutOfBounds {
                index: id as usize,
                len,
            })?;
        file.rotation = (file.rotation + 90) % 360;
        Ok(file.rotation)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Advance the four-state cycle and apply it
    pub fn cycle_sort(&mut self) -> SortOrder {
        self.sort_order = self.sort_order.next();
        self.sort_order.apply(&mut self.files);
        self.notices.push(Notice::info(self.sort_order.notice_text()));
        self.sort_order
    }

    /// Jump straight to `order` and apply it
    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort_order = order;
        order.apply(&mut self.files);
        self.notices.push(Notice::info(order.notice_text()));
    }

    pub fn apply_merge_sort(&mut self, order: MergeSort) {
        match order {
            MergeSort::Asc => self.files.sort_by(|a, b| compare_names(&a.name, &b.name)),
            MergeSort::Desc => self.files.sort_by(|a, b| compare_names(&b.name, &a.name)),
            MergeSort::Original => self.files.sort_by_key(|f| f.id),
        }
    }

    /// Display index -> rotation, for rotated files only
    pub fn rotation_metadata(&self) -> BTreeMap<String, RotationMeta> {
        self.files
            .iter()
            .enumerate()
            .filter(|(_, f)| f.rotation != 0)
            .map(|(i, f)| {
                (
                    i.to_string(),
                    RotationMeta {
                        rotation: f.rotation,
                        name: f.name.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}
