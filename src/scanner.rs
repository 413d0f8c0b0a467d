//! Background directory scan for DICOM series.
//!
//! A worker thread walks a directory tree, reads each candidate file's
//! header, and groups the files into series. Progress and the final result
//! are reported to the owning thread over a channel; the owner may poll
//! between frames or block. Cancellation is cooperative: the worker checks
//! a shared flag between files and exits without a completion message.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use dicom::object::{FileDicomObject, InMemDicomObject, open_file};
use dicom_dictionary_std::tags;
use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Messages sent from the scan worker to the owning thread.
pub enum ScanMessage {
    /// Scan progress as a `[0, 1]` fraction plus a status line.
    Progress(f32, String),

    /// Scan finished; all discovered series, in first-seen order.
    Complete(Vec<SeriesEntry>),

    /// Scan failed before producing a result.
    Error(String),
}

/// Header fields read from one file during the scan.
#[derive(Clone, Debug, PartialEq)]
pub struct FileHeader {
    pub patient_id: String,
    pub patient_name: String,
    pub study_uid: String,
    pub series_uid: String,
    pub modality: String,
    pub slice_location: Option<f32>,
}

/// One member file of a series with its ordering key.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesFile {
    pub path: PathBuf,
    pub slice_location: Option<f32>,
}

/// One series: identity headers plus its member files ordered by slice
/// location (ties keep scan order).
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesEntry {
    pub patient_id: String,
    pub patient_name: String,
    pub study_uid: String,
    pub series_uid: String,
    pub modality: String,
    pub files: Vec<SeriesFile>,
}

/// A running directory scan.
pub struct ScanHandle {
    rx: Receiver<ScanMessage>,
    cancel: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Request cooperative cancellation; the worker stops between files.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Non-blocking poll for the next message.
    pub fn try_recv(&self) -> Option<ScanMessage> {
        self.rx.try_recv().ok()
    }

    /// Block until the next message, or `None` once the worker is gone.
    pub fn recv(&self) -> Option<ScanMessage> {
        self.rx.recv().ok()
    }

    /// Wait for the worker thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

pub struct ScanJob;

impl ScanJob {
    /// Start scanning `root` on a background thread.
    pub fn spawn(root: impl Into<PathBuf>) -> ScanHandle {
        let root = root.into();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let (tx, rx) = channel();
        let join = thread::spawn(move || scan_worker(&root, &tx, &worker_cancel));
        ScanHandle {
            rx,
            cancel,
            join: Some(join),
        }
    }
}

fn scan_worker(root: &Path, tx: &Sender<ScanMessage>, cancel: &AtomicBool) {
    let files = match collect_files(root) {
        Ok(files) => files,
        Err(err) => {
            let _ = tx.send(ScanMessage::Error(err.to_string()));
            return;
        }
    };

    let total = files.len();
    let mut headers = Vec::new();
    for (index, path) in files.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        match read_header(path) {
            Some(header) => headers.push((path.clone(), header)),
            None => warn!("skipping non-DICOM file {}", path.display()),
        }
        let scanned = index + 1;
        let _ = tx.send(ScanMessage::Progress(
            scanned as f32 / total.max(1) as f32,
            format!("Scanned {scanned}/{total} files"),
        ));
    }

    if cancel.load(Ordering::SeqCst) {
        return;
    }
    let _ = tx.send(ScanMessage::Complete(group_series(headers)));
}

// Depth-first walk; unreadable subdirectories are skipped, an unreadable
// root fails the scan. Files are visited in path order so grouping is
// deterministic.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let mut pending = Vec::new();

    for entry in fs::read_dir(root)? {
        pending.push(entry?.path());
    }

    while let Some(path) = pending.pop() {
        if path.is_dir() {
            match fs::read_dir(&path) {
                Ok(entries) => {
                    for entry in entries.filter_map(Result::ok) {
                        pending.push(entry.path());
                    }
                }
                Err(err) => warn!("skipping unreadable directory {}: {err}", path.display()),
            }
        } else {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn read_header(path: &Path) -> Option<FileHeader> {
    let object = open_file(path).ok()?;
    Some(FileHeader {
        patient_id: string_element(&object, tags::PATIENT_ID),
        patient_name: string_element(&object, tags::PATIENT_NAME),
        study_uid: string_element(&object, tags::STUDY_INSTANCE_UID),
        series_uid: string_element(&object, tags::SERIES_INSTANCE_UID),
        modality: string_element(&object, tags::MODALITY),
        slice_location: object
            .element(tags::SLICE_LOCATION)
            .ok()
            .and_then(|element| element.to_float32().ok()),
    })
}

fn string_element(object: &FileDicomObject<InMemDicomObject>, tag: dicom::core::Tag) -> String {
    object
        .element(tag)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

// Series appear in first-seen order; within a series, files are ordered by
// slice location with scan order preserved on ties.
fn group_series(headers: Vec<(PathBuf, FileHeader)>) -> Vec<SeriesEntry> {
    let mut series: Vec<SeriesEntry> = Vec::new();

    for (path, header) in headers {
        let file = SeriesFile {
            path,
            slice_location: header.slice_location,
        };
        match series
            .iter_mut()
            .find(|entry| entry.series_uid == header.series_uid)
        {
            Some(entry) => entry.files.push(file),
            None => series.push(SeriesEntry {
                patient_id: header.patient_id,
                patient_name: header.patient_name,
                study_uid: header.study_uid,
                series_uid: header.series_uid,
                modality: header.modality,
                files: vec![file],
            }),
        }
    }

    for entry in &mut series {
        entry.files.sort_by(|a, b| {
            a.slice_location
                .partial_cmp(&b.slice_location)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    series
}
