//! The file set merger: collects validated input paths and produces one
//! merged output document through a [`Rasterizer`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::MergeOptions;
use crate::error::{Error, Result};
use crate::pdf::PageIndex;
use crate::raster::{MupdfRasterizer, Rasterizer};

/// Outcome of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of input files merged (duplicates counted)
    pub files: usize,
    /// Number of pages written to the output
    pub pages: usize,
    /// Where the merged document was written
    pub output: PathBuf,
}

/// Ordered collection of input PDFs plus the options applied when merging them.
///
/// Not synchronized: share across threads only behind the caller's own lock.
pub struct FileSetMerger<R: Rasterizer = MupdfRasterizer> {
    rasterizer: R,
    options: MergeOptions,
    files: Vec<PathBuf>,
}

impl FileSetMerger {
    /// Create a merger backed by MuPDF
    pub const fn new(options: MergeOptions) -> Self {
        Self::with_rasterizer(MupdfRasterizer::new(), options)
    }
}

impl Default for FileSetMerger {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

impl<R: Rasterizer> FileSetMerger<R> {
    /// Create with a custom rasterizer
    pub const fn with_rasterizer(rasterizer: R, options: MergeOptions) -> Self {
        Self {
            rasterizer,
            options,
            files: Vec::new(),
        }
    }

    /// Append a file to the merge list.
    ///
    /// Fails with [`Error::FileNotFound`] if `path` is not an existing file;
    /// the list is left untouched in that case. Duplicates are accepted and
    /// produce duplicate pages.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_file = std::fs::metadata(path).is_ok_and(|meta| meta.is_file());
        if !is_file {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        debug!("Added {} (#{})", path.display(), self.files.len() + 1);
        self.files.push(path.to_path_buf());
        Ok(())
    }

    /// Whether `path` was added, compared by exact string equality
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let needle = path.as_ref().as_os_str();
        self.files.iter().any(|file| file.as_os_str() == needle)
    }

    /// Drop every added file. Options are kept.
    pub fn reset(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub const fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub const fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Merge all added files, in order, into `output`
    pub fn generate(&self, output: impl AsRef<Path>) -> Result<MergeReport> {
        self.generate_with_progress(output, None)
    }

    /// Merge all added files, calling `progress_callback(done, total)` after each file
    pub fn generate_with_progress(
        &self,
        output: impl AsRef<Path>,
        progress_callback: Option<&dyn Fn(usize, usize)>,
    ) -> Result<MergeReport> {
        if self.files.is_empty() {
            return Err(Error::NoFilesDefined);
        }
        self.options.validate()?;

        let output = output.as_ref();
        let total_files = self.files.len();
        info!(
            "Merging {} files into {} with {} at {} DPI",
            total_files,
            output.display(),
            self.rasterizer.name(),
            self.options.effective_density()
        );

        let mut merged = self.rasterizer.begin(&self.options)?;
        let mut pages_written = 0;

        for (file_num, path) in self.files.iter().enumerate() {
            // Scoped per file: the source is dropped before the next one loads
            let source = self.rasterizer.load(path)?;
            let page_count = self.rasterizer.page_count(&source);
            debug!("Appending {} ({} pages)", path.display(), page_count);

            for page_num in 0..page_count {
                let page = PageIndex::try_from_page_num(page_num, page_count)?;
                self.rasterizer
                    .append_page(&mut merged, &source, page, &self.options)?;
                pages_written += 1;
            }

            if let Some(callback) = progress_callback {
                callback(file_num + 1, total_files);
            }
        }

        self.rasterizer.write(merged, output)?;
        info!("Wrote {} pages to {}", pages_written, output.display());

        Ok(MergeReport {
            files: total_files,
            pages: pages_written,
            output: output.to_path_buf(),
        })
    }
}

impl<R: Rasterizer> std::fmt::Debug for FileSetMerger<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSetMerger")
            .field("rasterizer", &self.rasterizer.name())
            .field("options", &self.options)
            .field("files", &self.files)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Density;
    use std::cell::{Cell, RefCell};

    /// Records every call instead of rendering. Each loaded file reports
    /// `pages_per_file` pages.
    #[derive(Default)]
    struct FakeRasterizer {
        pages_per_file: usize,
        fail_load: bool,
        fail_write: bool,
        loads: RefCell<Vec<PathBuf>>,
        written: RefCell<Option<(PathBuf, Vec<(PathBuf, usize, f32)>)>>,
    }

    impl FakeRasterizer {
        fn with_pages(pages_per_file: usize) -> Self {
            Self {
                pages_per_file,
                ..Default::default()
            }
        }
    }

    impl Rasterizer for FakeRasterizer {
        type Source = PathBuf;
        type Output = Vec<(PathBuf, usize, f32)>;

        fn name(&self) -> &'static str {
            "fake"
        }

        fn load(&self, path: &Path) -> Result<PathBuf> {
            if self.fail_load {
                return Err(Error::PdfOpen(format!("corrupt: {}", path.display())));
            }
            self.loads.borrow_mut().push(path.to_path_buf());
            Ok(path.to_path_buf())
        }

        fn page_count(&self, _source: &PathBuf) -> usize {
            self.pages_per_file
        }

        fn begin(&self, _options: &MergeOptions) -> Result<Self::Output> {
            Ok(Vec::new())
        }

        fn append_page(
            &self,
            output: &mut Self::Output,
            source: &PathBuf,
            page: PageIndex,
            options: &MergeOptions,
        ) -> Result<()> {
            output.push((
                source.clone(),
                page.as_usize(),
                options.effective_density().dpi(),
            ));
            Ok(())
        }

        fn write(&self, output: Self::Output, path: &Path) -> Result<()> {
            if self.fail_write {
                return Err(Error::PdfSave("read-only".to_string()));
            }
            *self.written.borrow_mut() = Some((path.to_path_buf(), output));
            Ok(())
        }
    }

    fn touch(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.5").unwrap();
        path
    }

    #[test]
    fn test_add_missing_file_fails() {
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());
        let result = merger.add("/foo.pdf");

        assert!(matches!(result, Err(Error::FileNotFound(ref p)) if p == Path::new("/foo.pdf")));
        assert!(merger.is_empty());
    }

    #[test]
    fn test_failed_add_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());
        merger.add(&file).unwrap();

        assert!(matches!(merger.add("/nope.pdf"), Err(Error::FileNotFound(_))));
        assert_eq!(merger.len(), 1);
        assert!(merger.contains(&file));
        assert!(!merger.contains("/nope.pdf"));
    }

    #[test]
    fn test_add_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());

        assert!(matches!(merger.add(dir.path()), Err(Error::FileNotFound(_))));
        assert!(!merger.contains(dir.path()));
    }

    #[test]
    fn test_contains_after_add() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());

        assert!(!merger.contains(&file));
        merger.add(&file).unwrap();
        assert!(merger.contains(&file));
    }

    #[test]
    fn test_contains_is_exact_string_match() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());
        merger.add(&file).unwrap();

        // Same file through a different spelling is not a match
        let respelled = dir.path().join(".").join("dummy.pdf");
        assert!(!merger.contains(&respelled));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());
        merger.add(&file).unwrap();
        merger.add(&file).unwrap();

        assert_eq!(merger.len(), 2);
    }

    #[test]
    fn test_reset_clears_files_keeps_options() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(&dir, "a.pdf");
        let b = touch(&dir, "b.pdf");
        let options = MergeOptions::default().with_density(Density::new(150.0).unwrap());
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), options.clone());
        merger.add(&a).unwrap();
        merger.add(&b).unwrap();

        merger.reset();

        assert!(!merger.contains(&a));
        assert!(!merger.contains(&b));
        assert!(merger.is_empty());
        assert_eq!(merger.options(), &options);
    }

    #[test]
    fn test_generate_without_files_fails() {
        let merger = FileSetMerger::with_rasterizer(FakeRasterizer::default(), MergeOptions::default());

        assert!(matches!(merger.generate("/foo.pdf"), Err(Error::NoFilesDefined)));
        assert!(matches!(
            merger.generate("/does/not/exist/out.pdf"),
            Err(Error::NoFilesDefined)
        ));
        assert!(merger.rasterizer().written.borrow().is_none());
    }

    #[test]
    fn test_generate_after_reset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(1), MergeOptions::default());
        merger.add(&file).unwrap();
        merger.reset();

        assert!(matches!(merger.generate(dir.path().join("out.pdf")), Err(Error::NoFilesDefined)));
    }

    #[test]
    fn test_generate_appends_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(&dir, "a.pdf");
        let b = touch(&dir, "b.pdf");
        let out = dir.path().join("out.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(2), MergeOptions::default());
        merger.add(&a).unwrap();
        merger.add(&b).unwrap();
        merger.add(&a).unwrap();

        let report = merger.generate(&out).unwrap();
        assert_eq!(report.files, 3);
        assert_eq!(report.pages, 6);
        assert_eq!(report.output, out);

        let written = merger.rasterizer().written.borrow();
        let (path, pages) = written.as_ref().unwrap();
        assert_eq!(path, &out);
        let order: Vec<(&Path, usize)> = pages.iter().map(|(p, n, _)| (p.as_path(), *n)).collect();
        assert_eq!(
            order,
            vec![
                (a.as_path(), 0),
                (a.as_path(), 1),
                (b.as_path(), 0),
                (b.as_path(), 1),
                (a.as_path(), 0),
                (a.as_path(), 1),
            ]
        );
    }

    #[test]
    fn test_generate_forwards_options_to_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let options = MergeOptions::default().with_density("150".parse().unwrap());
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(3), options);
        merger.add(&file).unwrap();

        merger.generate(dir.path().join("out.pdf")).unwrap();

        let written = merger.rasterizer().written.borrow();
        let (_, pages) = written.as_ref().unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|(_, _, dpi)| (*dpi - 150.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_generate_does_not_recheck_existence() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(1), MergeOptions::default());
        merger.add(&file).unwrap();
        std::fs::remove_file(&file).unwrap();

        // The fake never touches the filesystem, so generate succeeds
        assert!(merger.generate(dir.path().join("out.pdf")).is_ok());
        assert!(merger.contains(&file));
    }

    #[test]
    fn test_load_error_propagates_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let rasterizer = FakeRasterizer {
            fail_load: true,
            ..FakeRasterizer::with_pages(1)
        };
        let mut merger = FileSetMerger::with_rasterizer(rasterizer, MergeOptions::default());
        merger.add(&file).unwrap();

        let err = merger.generate(dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, Error::PdfOpen(ref msg) if msg.starts_with("corrupt")));
        assert!(merger.rasterizer().written.borrow().is_none());
    }

    #[test]
    fn test_write_error_propagates_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let rasterizer = FakeRasterizer {
            fail_write: true,
            ..FakeRasterizer::with_pages(1)
        };
        let mut merger = FileSetMerger::with_rasterizer(rasterizer, MergeOptions::default());
        merger.add(&file).unwrap();

        let err = merger.generate(dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, Error::PdfSave(_)));
    }

    #[test]
    fn test_invalid_options_rejected_at_generate() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let options = MergeOptions::default().with_quality(0);
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(1), options);
        merger.add(&file).unwrap();

        let err = merger.generate(dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { ref field, .. } if field == "quality"));
        assert!(merger.rasterizer().loads.borrow().is_empty());
    }

    #[test]
    fn test_progress_reported_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(&dir, "a.pdf");
        let b = touch(&dir, "b.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(1), MergeOptions::default());
        merger.add(&a).unwrap();
        merger.add(&b).unwrap();

        let calls = RefCell::new(Vec::new());
        let last = Cell::new(0);
        let callback: &dyn Fn(usize, usize) = &|done, total| {
            calls.borrow_mut().push((done, total));
            last.set(done);
        };
        merger
            .generate_with_progress(dir.path().join("out.pdf"), Some(callback))
            .unwrap();

        assert_eq!(calls.into_inner(), vec![(1, 2), (2, 2)]);
        assert_eq!(last.get(), 2);
    }

    #[test]
    fn test_generate_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(&dir, "dummy.pdf");
        let mut merger = FileSetMerger::with_rasterizer(FakeRasterizer::with_pages(1), MergeOptions::default());
        merger.add(&file).unwrap();

        merger.generate(dir.path().join("one.pdf")).unwrap();
        merger.generate(dir.path().join("two.pdf")).unwrap();

        assert_eq!(merger.len(), 1);
        assert_eq!(merger.rasterizer().loads.borrow().len(), 2);
    }
}
